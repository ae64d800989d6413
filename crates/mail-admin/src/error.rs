//! Error types for the admin subsystem

use mail_models::ModelError;
use thiserror::Error;

/// Admin error type
#[derive(Debug, Error)]
pub enum AdminError {
	/// The entity type already has a controller on this site
	#[error("Model '{0}' is already registered with admin")]
	AlreadyRegistered(String),

	/// Model not registered with admin
	#[error("Model '{0}' is not registered with admin")]
	NotRegistered(String),

	/// No record with this primary key
	#[error("{model} with pk {pk} does not exist")]
	ObjectNotFound { model: String, pk: i64 },

	#[error("Permission denied: {0}")]
	PermissionDenied(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Database error: {0}")]
	DatabaseError(String),

	/// Path or method does not map to an admin view
	#[error("Invalid admin route: {0}")]
	InvalidRoute(String),
}

impl From<ModelError> for AdminError {
	fn from(err: ModelError) -> Self {
		AdminError::ValidationError(err.to_string())
	}
}

/// Result type for admin operations
pub type AdminResult<T> = Result<T, AdminError>;
