//! Mail app: the `Email` entity

use crate::model::{FieldMeta, FieldType, Model, ModelMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

static EMAIL_FIELDS: [FieldMeta; 8] = [
	FieldMeta::new("id", FieldType::Integer).non_editable(),
	FieldMeta::new("sender", FieldType::Char(254)),
	FieldMeta::new("recipients", FieldType::List),
	FieldMeta::new("subject", FieldType::Char(255)).blank(),
	FieldMeta::new("body", FieldType::Text).blank(),
	FieldMeta::new("timestamp", FieldType::DateTime).non_editable(),
	FieldMeta::new("read", FieldType::Boolean),
	FieldMeta::new("archived", FieldType::Boolean),
];

static EMAIL_META: ModelMeta = ModelMeta {
	app_label: "mail",
	model_name: "Email",
	verbose_name: "email",
	verbose_name_plural: "emails",
	table_name: "mail_email",
	pk_field: "id",
	fields: &EMAIL_FIELDS,
};

/// A message as stored in a mailbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
	#[serde(default)]
	pub id: Option<i64>,
	pub sender: String,
	#[serde(default)]
	pub recipients: Vec<String>,
	#[serde(default)]
	pub subject: String,
	#[serde(default)]
	pub body: String,
	#[serde(default = "Utc::now")]
	pub timestamp: DateTime<Utc>,
	#[serde(default)]
	pub read: bool,
	#[serde(default)]
	pub archived: bool,
}

impl Email {
	/// Create an unread, unarchived, unsaved email stamped with the current time
	pub fn new(
		sender: impl Into<String>,
		recipients: Vec<impl Into<String>>,
		subject: impl Into<String>,
		body: impl Into<String>,
	) -> Self {
		Self {
			id: None,
			sender: sender.into(),
			recipients: recipients.into_iter().map(Into::into).collect(),
			subject: subject.into(),
			body: body.into(),
			timestamp: Utc::now(),
			read: false,
			archived: false,
		}
	}

	pub fn mark_read(&mut self) {
		self.read = true;
	}

	pub fn set_archived(&mut self, archived: bool) {
		self.archived = archived;
	}
}

impl Model for Email {
	fn meta() -> &'static ModelMeta {
		&EMAIL_META
	}

	fn pk(&self) -> Option<i64> {
		self.id
	}
}
