//! Storage seam for admin CRUD operations
//!
//! The admin works on dynamic data: every record is a JSON object keyed by
//! field name. [`InMemoryDatabase`] backs tests and the management commands.

use crate::{AdminError, AdminResult};
use async_trait::async_trait;
use dashmap::DashMap;
use mail_models::Record;
use serde_json::Value;
use std::collections::BTreeMap;

/// Record storage used by admin views
#[async_trait]
pub trait AdminDatabase: Send + Sync {
	/// Every record in a table, in primary key order
	async fn list(&self, table: &str) -> AdminResult<Vec<Record>>;

	async fn get(&self, table: &str, pk: i64) -> AdminResult<Option<Record>>;

	/// Insert a record, assigning and returning its primary key
	async fn insert(&self, table: &str, pk_field: &str, record: Record) -> AdminResult<i64>;

	/// Replace an existing record
	async fn update(&self, table: &str, pk: i64, record: Record) -> AdminResult<()>;

	/// Delete a record, returning whether it existed
	async fn delete(&self, table: &str, pk: i64) -> AdminResult<bool>;
}

/// In-memory table store with per-table sequential primary keys
#[derive(Default)]
pub struct InMemoryDatabase {
	tables: DashMap<String, Table>,
}

#[derive(Default)]
struct Table {
	last_pk: i64,
	rows: BTreeMap<i64, Record>,
}

impl InMemoryDatabase {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl AdminDatabase for InMemoryDatabase {
	async fn list(&self, table: &str) -> AdminResult<Vec<Record>> {
		Ok(self
			.tables
			.get(table)
			.map(|t| t.rows.values().cloned().collect())
			.unwrap_or_default())
	}

	async fn get(&self, table: &str, pk: i64) -> AdminResult<Option<Record>> {
		Ok(self
			.tables
			.get(table)
			.and_then(|t| t.rows.get(&pk).cloned()))
	}

	async fn insert(&self, table: &str, pk_field: &str, mut record: Record) -> AdminResult<i64> {
		let mut entry = self.tables.entry(table.to_string()).or_default();
		entry.last_pk += 1;
		let pk = entry.last_pk;
		record.insert(pk_field.to_string(), Value::from(pk));
		entry.rows.insert(pk, record);
		Ok(pk)
	}

	async fn update(&self, table: &str, pk: i64, record: Record) -> AdminResult<()> {
		let mut entry = self
			.tables
			.get_mut(table)
			.ok_or_else(|| AdminError::DatabaseError(format!("table {} does not exist", table)))?;
		match entry.rows.get_mut(&pk) {
			Some(existing) => {
				*existing = record;
				Ok(())
			}
			None => Err(AdminError::DatabaseError(format!(
				"no row {} in {}",
				pk, table
			))),
		}
	}

	async fn delete(&self, table: &str, pk: i64) -> AdminResult<bool> {
		Ok(self
			.tables
			.get_mut(table)
			.map(|mut t| t.rows.remove(&pk).is_some())
			.unwrap_or(false))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn record(value: Value) -> Record {
		value.as_object().cloned().unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_insert_assigns_sequential_keys_per_table() {
		// Arrange
		let db = InMemoryDatabase::new();

		// Act
		let first = db.insert("mail_email", "id", record(json!({"subject": "a"}))).await.unwrap();
		let second = db.insert("mail_email", "id", record(json!({"subject": "b"}))).await.unwrap();
		let other = db.insert("auth_user", "id", record(json!({"username": "c"}))).await.unwrap();

		// Assert
		assert_eq!((first, second, other), (1, 2, 1));
		let stored = db.get("mail_email", 2).await.unwrap().unwrap();
		assert_eq!(stored["id"], json!(2));
	}

	#[rstest]
	#[tokio::test]
	async fn test_deleted_keys_are_not_reused() {
		// Arrange
		let db = InMemoryDatabase::new();
		let pk = db.insert("mail_email", "id", Record::new()).await.unwrap();

		// Act
		assert!(db.delete("mail_email", pk).await.unwrap());
		let next = db.insert("mail_email", "id", Record::new()).await.unwrap();

		// Assert
		assert_eq!(next, pk + 1);
		assert!(!db.delete("mail_email", pk).await.unwrap());
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_replaces_row() {
		// Arrange
		let db = InMemoryDatabase::new();
		let pk = db.insert("mail_email", "id", record(json!({"read": false}))).await.unwrap();

		// Act
		db.update("mail_email", pk, record(json!({"id": pk, "read": true})))
			.await
			.unwrap();

		// Assert
		let rows = db.list("mail_email").await.unwrap();
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0]["read"], json!(true));
	}

	#[rstest]
	fn test_unknown_table_reads_as_empty() {
		// Arrange
		let db = InMemoryDatabase::new();

		// Act
		let rows = tokio_test::block_on(db.list("auth_user")).unwrap();
		let row = tokio_test::block_on(db.get("auth_user", 1)).unwrap();

		// Assert
		assert!(rows.is_empty());
		assert!(row.is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_missing_row_fails() {
		// Arrange
		let db = InMemoryDatabase::new();

		// Act
		let result = db.update("mail_email", 9, Record::new()).await;

		// Assert
		assert!(matches!(result, Err(AdminError::DatabaseError(_))));
		assert!(db.list("mail_email").await.unwrap().is_empty());
	}
}
