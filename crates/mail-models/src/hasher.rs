use crate::model::{ModelError, ModelResult};

/// Password hasher trait
///
/// # Examples
///
/// ```
/// use mail_models::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new();
/// let hash = hasher.hash("my_secure_password").unwrap();
///
/// assert!(hasher.verify("my_secure_password", &hash).unwrap());
/// assert!(!hasher.verify("wrong_password", &hash).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
	/// Hashes a password
	fn hash(&self, password: &str) -> ModelResult<String>;

	/// Verifies a password against a hash
	///
	/// `Ok(false)` on mismatch, an error only when the hash cannot be parsed.
	fn verify(&self, password: &str, hash: &str) -> ModelResult<bool>;
}

/// Argon2id password hasher
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl Argon2Hasher {
	/// Creates a new Argon2 password hasher
	pub fn new() -> Self {
		Self
	}
}

impl PasswordHasher for Argon2Hasher {
	fn hash(&self, password: &str) -> ModelResult<String> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHasher as _, SaltString},
		};
		use rand::RngCore;

		let mut salt_bytes = [0u8; 16];
		rand::thread_rng().fill_bytes(&mut salt_bytes);

		let salt =
			SaltString::encode_b64(&salt_bytes).map_err(|e| ModelError::Hashing(e.to_string()))?;

		Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| ModelError::Hashing(e.to_string()))
	}

	fn verify(&self, password: &str, hash: &str) -> ModelResult<bool> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHash, PasswordVerifier},
		};

		let parsed = PasswordHash::new(hash).map_err(|e| ModelError::Hashing(e.to_string()))?;

		Ok(Argon2::default()
			.verify_password(password.as_bytes(), &parsed)
			.is_ok())
	}
}
