//! Admin views: dashboard, change list and change form
//!
//! Views are computed from a controller's configuration plus the entity's
//! metadata and records. They are plain serializable values; turning them into
//! HTML or JSON responses is left to the serving layer.

use crate::model_admin::{ModelAdmin, STR_FIELD};
use crate::site::AdminSite;
use crate::{AdminError, AdminResult};
use mail_models::{FieldType, ModelMeta, PermissionsMixin, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Convert a field name to a label: `"first_name"` becomes `"First name"`
pub fn humanize_field_name(field: &str) -> String {
	capitalize(&field.replace('_', " "))
}

fn capitalize(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Default string form of a record, e.g. `"Email object (3)"`
pub fn object_repr(meta: &ModelMeta, record: &Record) -> String {
	match record.get(meta.pk_field).and_then(Value::as_i64) {
		Some(pk) => format!("{} object ({})", meta.model_name, pk),
		None => format!("{} object (None)", meta.model_name),
	}
}

fn value_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Null => String::new(),
		Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
		other => other.to_string(),
	}
}

fn parse_bool(text: &str) -> Option<bool> {
	match text.trim().to_lowercase().as_str() {
		"true" | "1" | "yes" => Some(true),
		"false" | "0" | "no" => Some(false),
		_ => None,
	}
}

fn value_matches(value: Option<&Value>, expected: &str) -> bool {
	match value {
		Some(Value::Bool(b)) => parse_bool(expected) == Some(*b),
		Some(Value::Array(items)) => items.iter().any(|item| value_text(item) == expected),
		Some(other) => value_text(other) == expected,
		None => expected.is_empty(),
	}
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
	let a = a.unwrap_or(&Value::Null);
	let b = b.unwrap_or(&Value::Null);
	match (a, b) {
		(Value::Null, Value::Null) => Ordering::Equal,
		(Value::Null, _) => Ordering::Less,
		(_, Value::Null) => Ordering::Greater,
		(Value::Number(x), Value::Number(y)) => x
			.as_f64()
			.partial_cmp(&y.as_f64())
			.unwrap_or(Ordering::Equal),
		(Value::Bool(x), Value::Bool(y)) => x.cmp(y),
		(Value::String(x), Value::String(y)) => x.cmp(y),
		_ => value_text(a).cmp(&value_text(b)),
	}
}

fn is_empty_value(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) => true,
		Some(Value::String(s)) => s.trim().is_empty(),
		Some(Value::Array(items)) => items.is_empty(),
		Some(_) => false,
	}
}

/// Query parameters of a change-list request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
	/// Free-text search across the controller's search fields
	#[serde(default, rename = "q")]
	pub search: Option<String>,
	/// Exact-match filters keyed by field name
	#[serde(default)]
	pub filters: BTreeMap<String, String>,
	/// Comma-separated ordering override, `-` prefix for descending
	#[serde(default, rename = "o")]
	pub ordering: Option<String>,
	/// 1-based page number
	#[serde(default, rename = "p")]
	pub page: Option<usize>,
}

impl ListParams {
	pub fn with_search(mut self, term: impl Into<String>) -> Self {
		self.search = Some(term.into());
		self
	}

	pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
		self.filters.insert(field.into(), value.into());
		self
	}

	pub fn with_ordering(mut self, ordering: impl Into<String>) -> Self {
		self.ordering = Some(ordering.into());
		self
	}

	pub fn with_page(mut self, page: usize) -> Self {
		self.page = Some(page);
		self
	}
}

/// A change-list column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
	pub field: String,
	pub label: String,
	pub sortable: bool,
	/// Whether the cell links to the change form
	pub link: bool,
}

/// A change-list row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
	pub pk: Option<i64>,
	pub values: Vec<Value>,
}

/// Sidebar filter for one `list_filter` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterInfo {
	pub field: String,
	pub title: String,
	pub choices: Vec<String>,
	pub selected: Option<String>,
}

/// Rendered change list for one entity
#[derive(Debug, Clone, Serialize)]
pub struct ChangeList {
	pub model: String,
	pub title: String,
	pub columns: Vec<Column>,
	pub rows: Vec<Row>,
	pub filters: Vec<FilterInfo>,
	pub search_enabled: bool,
	pub search: Option<String>,
	pub ordering: Vec<String>,
	/// Rows matching search and filters
	pub count: usize,
	/// Rows in the table
	pub total_count: usize,
	pub page: usize,
	pub page_size: usize,
	pub total_pages: usize,
}

impl ChangeList {
	/// Apply search, filters, ordering and pagination to `records`
	///
	/// # Errors
	///
	/// [`AdminError::ValidationError`] for a filter on a field outside
	/// `list_filter`, an ordering on an unknown field, or a page out of range.
	pub fn build(
		meta: &ModelMeta,
		admin: &dyn ModelAdmin,
		records: Vec<Record>,
		params: &ListParams,
		default_per_page: usize,
	) -> AdminResult<Self> {
		let list_filter = admin.list_filter();
		for field in params.filters.keys() {
			if !list_filter.contains(&field.as_str()) {
				return Err(AdminError::ValidationError(format!(
					"Filtering by {} not allowed",
					field
				)));
			}
		}

		let ordering = Self::resolve_ordering(meta, admin, params)?;
		let filters = Self::filter_info(meta, admin, &records, params);
		let total_count = records.len();

		let search_fields = admin.search_fields();
		let terms: Vec<String> = params
			.search
			.as_deref()
			.map(|q| q.split_whitespace().map(str::to_lowercase).collect())
			.unwrap_or_default();

		let mut matched: Vec<Record> = records
			.into_iter()
			.filter(|record| {
				// Every term must hit at least one search field
				search_fields.is_empty()
					|| terms.iter().all(|term| {
						search_fields.iter().any(|field| {
							record
								.get(*field)
								.map(|v| value_text(v).to_lowercase().contains(term))
								.unwrap_or(false)
						})
					})
			})
			.filter(|record| {
				params
					.filters
					.iter()
					.all(|(field, expected)| value_matches(record.get(field), expected))
			})
			.collect();

		matched.sort_by(|a, b| {
			ordering
				.iter()
				.map(|key| {
					let (field, descending) = match key.strip_prefix('-') {
						Some(field) => (field, true),
						None => (key.as_str(), false),
					};
					let ord = compare_values(a.get(field), b.get(field));
					if descending { ord.reverse() } else { ord }
				})
				.find(|ord| *ord != Ordering::Equal)
				.unwrap_or(Ordering::Equal)
		});

		let count = matched.len();
		let page_size = admin.list_per_page().unwrap_or(default_per_page).max(1);
		let total_pages = count.div_ceil(page_size).max(1);
		let page = params.page.unwrap_or(1);
		if page == 0 || page > total_pages {
			return Err(AdminError::ValidationError(format!(
				"Invalid page ({}): page must be between 1 and {}",
				page, total_pages
			)));
		}

		let links = admin.list_display_links();
		let columns: Vec<Column> = admin
			.list_display()
			.into_iter()
			.map(|field| Column {
				field: field.to_string(),
				label: if field == STR_FIELD {
					capitalize(meta.verbose_name)
				} else {
					humanize_field_name(field)
				},
				sortable: field != STR_FIELD,
				link: links.contains(&field),
			})
			.collect();

		let rows = matched
			.iter()
			.skip((page - 1) * page_size)
			.take(page_size)
			.map(|record| Row {
				pk: record.get(meta.pk_field).and_then(Value::as_i64),
				values: columns
					.iter()
					.map(|column| {
						if column.field == STR_FIELD {
							Value::String(object_repr(meta, record))
						} else {
							record.get(&column.field).cloned().unwrap_or(Value::Null)
						}
					})
					.collect(),
			})
			.collect();

		Ok(Self {
			model: meta.qualified_name(),
			title: format!("Select {} to change", meta.verbose_name),
			columns,
			rows,
			filters,
			search_enabled: !search_fields.is_empty(),
			search: params.search.clone(),
			ordering,
			count,
			total_count,
			page,
			page_size,
			total_pages,
		})
	}

	fn resolve_ordering(
		meta: &ModelMeta,
		admin: &dyn ModelAdmin,
		params: &ListParams,
	) -> AdminResult<Vec<String>> {
		let ordering: Vec<String> = match params.ordering.as_deref() {
			Some(requested) if !requested.trim().is_empty() => requested
				.split(',')
				.map(|key| key.trim().to_string())
				.filter(|key| !key.is_empty())
				.collect(),
			_ => admin.ordering().into_iter().map(str::to_string).collect(),
		};

		for key in &ordering {
			let field = key.trim_start_matches('-');
			if !meta.has_field(field) {
				return Err(AdminError::ValidationError(format!(
					"Cannot order by unknown field {}",
					field
				)));
			}
		}

		if ordering.is_empty() {
			Ok(vec![format!("-{}", meta.pk_field)])
		} else {
			Ok(ordering)
		}
	}

	fn filter_info(
		meta: &ModelMeta,
		admin: &dyn ModelAdmin,
		records: &[Record],
		params: &ListParams,
	) -> Vec<FilterInfo> {
		admin
			.list_filter()
			.into_iter()
			.map(|field| {
				let is_bool = meta
					.field(field)
					.map(|f| f.field_type == FieldType::Boolean)
					.unwrap_or(false);
				let choices = if is_bool {
					vec!["true".to_string(), "false".to_string()]
				} else {
					let mut seen = BTreeSet::new();
					for value in records.iter().filter_map(|r| r.get(field)) {
						match value {
							Value::Array(items) => seen.extend(items.iter().map(value_text)),
							Value::Null => {}
							other => {
								seen.insert(value_text(other));
							}
						}
					}
					seen.into_iter().collect()
				};
				FilterInfo {
					field: field.to_string(),
					title: humanize_field_name(field),
					choices,
					selected: params.filters.get(field).cloned(),
				}
			})
			.collect()
	}
}

/// One input on the change form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
	pub name: String,
	pub label: String,
	/// `None` for form-only inputs such as password confirmation
	pub field_type: Option<FieldType>,
	pub required: bool,
	pub readonly: bool,
	/// Rendered with the two-pane selector
	pub horizontal: bool,
	pub value: Option<Value>,
}

/// A rendered fieldset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormFieldset {
	pub name: Option<String>,
	pub fields: Vec<FormField>,
}

/// Rendered add or change form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeForm {
	pub model: String,
	pub title: String,
	pub pk: Option<i64>,
	pub object_repr: Option<String>,
	pub fieldsets: Vec<FormFieldset>,
}

impl ChangeForm {
	/// Build the add form (`record` is `None`) or the change form for `record`
	pub fn build(meta: &ModelMeta, admin: &dyn ModelAdmin, record: Option<&Record>) -> Self {
		let fieldsets = match record {
			Some(_) => admin.fieldsets(),
			None => admin.add_fieldsets(),
		};
		let readonly_fields = admin.readonly_fields();
		let horizontal = admin.filter_horizontal();

		let fieldsets = fieldsets
			.into_iter()
			.map(|fieldset| FormFieldset {
				name: fieldset.name,
				fields: fieldset
					.fields
					.iter()
					.map(|name| {
						let field_meta = meta.field(name);
						let readonly = readonly_fields.contains(&name.as_str())
							|| field_meta.map(|f| !f.editable).unwrap_or(false);
						let required = !readonly
							&& field_meta
								.map(|f| !f.blank && f.field_type != FieldType::Boolean)
								.unwrap_or(true);
						FormField {
							name: name.clone(),
							label: humanize_field_name(name),
							field_type: field_meta.map(|f| f.field_type),
							required,
							readonly,
							horizontal: horizontal.contains(&name.as_str()),
							value: record.and_then(|r| r.get(name)).cloned(),
						}
					})
					.collect(),
			})
			.collect();

		let (title, pk, repr) = match record {
			Some(record) => (
				format!("Change {}", meta.verbose_name),
				record.get(meta.pk_field).and_then(Value::as_i64),
				Some(object_repr(meta, record)),
			),
			None => (format!("Add {}", meta.verbose_name), None, None),
		};

		Self {
			model: meta.qualified_name(),
			title,
			pk,
			object_repr: repr,
			fieldsets,
		}
	}

	/// Every input, across fieldsets
	pub fn fields(&self) -> impl Iterator<Item = &FormField> {
		self.fieldsets.iter().flat_map(|fs| fs.fields.iter())
	}
}

/// Clean submitted form data against the form the user was shown
///
/// Keeps only writable inputs, runs the controller's
/// [`prepare_submission`](ModelAdmin::prepare_submission) hook, drops anything
/// that is not a model field, merges onto `existing` and checks required fields.
pub fn clean_submission(
	meta: &ModelMeta,
	admin: &dyn ModelAdmin,
	data: Record,
	existing: Option<Record>,
) -> AdminResult<Record> {
	let change = existing.is_some();
	let form = ChangeForm::build(meta, admin, existing.as_ref());

	let writable: Vec<&FormField> = form.fields().filter(|f| !f.readonly).collect();
	let mut cleaned: Record = data
		.into_iter()
		.filter(|(key, _)| writable.iter().any(|f| &f.name == key))
		.collect();

	admin.prepare_submission(&mut cleaned, change)?;
	cleaned.retain(|key, _| meta.field(key).map(|f| f.editable).unwrap_or(false));

	let too_long: Vec<String> = cleaned
		.iter()
		.filter_map(|(key, value)| {
			let FieldType::Char(max_length) = meta.field(key)?.field_type else {
				return None;
			};
			let length = value.as_str()?.chars().count();
			(length > max_length).then(|| {
				format!(
					"{}: Ensure this value has at most {} characters (it has {}).",
					key, max_length, length
				)
			})
		})
		.collect();
	if !too_long.is_empty() {
		return Err(AdminError::ValidationError(too_long.join(" ")));
	}

	let mut merged = existing.unwrap_or_default();
	merged.extend(cleaned);

	let missing: Vec<&str> = writable
		.iter()
		.filter(|f| f.required && f.field_type.is_some())
		.filter(|f| is_empty_value(merged.get(&f.name)))
		.map(|f| f.name.as_str())
		.collect();
	if !missing.is_empty() {
		return Err(AdminError::ValidationError(format!(
			"This field is required: {}",
			missing.join(", ")
		)));
	}

	Ok(merged)
}

/// Reject `record` if a unique field repeats a value held by another row
///
/// `rows` is the table content; the row whose primary key equals the record's
/// own is skipped, so saving an unchanged object passes.
pub fn check_unique(meta: &ModelMeta, record: &Record, rows: &[Record]) -> AdminResult<()> {
	let own_pk = record.get(meta.pk_field).and_then(Value::as_i64);
	for field in meta.unique_fields() {
		let Some(value) = record.get(field.name).filter(|v| !v.is_null()) else {
			continue;
		};
		let taken = rows
			.iter()
			.filter(|row| own_pk.is_none() || row.get(meta.pk_field).and_then(Value::as_i64) != own_pk)
			.any(|row| row.get(field.name) == Some(value));
		if taken {
			return Err(AdminError::ValidationError(format!(
				"{}: A {} with that {} already exists.",
				field.name,
				meta.verbose_name,
				field.name.replace('_', " ")
			)));
		}
	}
	Ok(())
}

/// A model entry on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
	pub model_name: String,
	pub verbose_name_plural: String,
	pub admin_url: String,
	pub add_url: Option<String>,
}

/// Models of one app on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSection {
	pub app_label: String,
	pub models: Vec<ModelEntry>,
}

/// Admin index page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
	pub site_name: String,
	pub apps: Vec<AppSection>,
}

impl Dashboard {
	/// List the models `user` may see, grouped by app
	pub async fn build(site: &AdminSite, user: &dyn PermissionsMixin) -> Self {
		let mut apps: Vec<AppSection> = Vec::new();

		for registration in site.registrations() {
			let meta = registration.meta();
			let admin = registration.admin();
			if !admin.has_module_permission(user).await {
				continue;
			}
			let can_view = admin.has_view_permission(user).await;
			let can_add = admin.has_add_permission(user).await;
			if !can_view && !can_add {
				continue;
			}

			let admin_url = format!(
				"{}{}/{}/",
				site.url_prefix(),
				meta.app_label,
				meta.model_name.to_lowercase()
			);
			let entry = ModelEntry {
				model_name: meta.model_name.to_string(),
				verbose_name_plural: capitalize(meta.verbose_name_plural),
				add_url: can_add.then(|| format!("{}add/", admin_url)),
				admin_url,
			};

			match apps.iter_mut().find(|app| app.app_label == meta.app_label) {
				Some(app) => app.models.push(entry),
				None => apps.push(AppSection {
					app_label: meta.app_label.to_string(),
					models: vec![entry],
				}),
			}
		}

		Self {
			site_name: site.name().to_string(),
			apps,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{ModelAdminConfig, UserAdmin};
	use mail_models::{Email, Model, User};
	use rstest::{fixture, rstest};
	use serde_json::json;

	fn record(value: Value) -> Record {
		value.as_object().cloned().unwrap()
	}

	#[fixture]
	fn users() -> Vec<Record> {
		vec![
			record(json!({"id": 1, "username": "carol", "email": "carol@example.com", "first_name": "Carol", "last_name": "", "is_staff": true, "is_superuser": false, "is_active": true, "groups": ["editors"]})),
			record(json!({"id": 2, "username": "alice", "email": "alice@example.com", "first_name": "Alice", "last_name": "Smith", "is_staff": false, "is_superuser": false, "is_active": true, "groups": []})),
			record(json!({"id": 3, "username": "bob", "email": "bob@corp.test", "first_name": "Bob", "last_name": "Smith", "is_staff": true, "is_superuser": true, "is_active": false, "groups": ["editors", "ops"]})),
		]
	}

	#[rstest]
	#[case("first_name", "First name")]
	#[case("is_staff", "Is staff")]
	#[case("id", "Id")]
	fn test_humanize_field_name(#[case] field: &str, #[case] expected: &str) {
		// Act & Assert
		assert_eq!(humanize_field_name(field), expected);
	}

	#[rstest]
	fn test_user_changelist_default_ordering(users: Vec<Record>) {
		// Arrange
		let admin = UserAdmin::new();

		// Act
		let list = ChangeList::build(User::meta(), &admin, users, &ListParams::default(), 100)
			.unwrap();

		// Assert
		let pks: Vec<_> = list.rows.iter().map(|r| r.pk).collect();
		assert_eq!(pks, vec![Some(2), Some(3), Some(1)]);
		assert_eq!(list.columns[0].field, "username");
		assert!(list.columns[0].link);
		assert!(!list.columns[1].link);
		assert!(list.search_enabled);
		assert_eq!(list.count, 3);
	}

	#[rstest]
	fn test_search_requires_every_term(users: Vec<Record>) {
		// Arrange
		let admin = UserAdmin::new();
		let params = ListParams::default().with_search("smith BOB");

		// Act
		let list = ChangeList::build(User::meta(), &admin, users, &params, 100).unwrap();

		// Assert
		assert_eq!(list.count, 1);
		assert_eq!(list.total_count, 3);
		assert_eq!(list.rows[0].pk, Some(3));
	}

	#[rstest]
	#[case("is_staff", "true", vec![Some(3), Some(1)])]
	#[case("is_active", "0", vec![Some(3)])]
	#[case("groups", "editors", vec![Some(3), Some(1)])]
	fn test_filters_match_exactly(
		users: Vec<Record>,
		#[case] field: &str,
		#[case] value: &str,
		#[case] expected: Vec<Option<i64>>,
	) {
		// Arrange
		let admin = UserAdmin::new();
		let params = ListParams::default()
			.with_filter(field, value)
			.with_ordering("-id");

		// Act
		let list = ChangeList::build(User::meta(), &admin, users, &params, 100).unwrap();

		// Assert
		let pks: Vec<_> = list.rows.iter().map(|r| r.pk).collect();
		assert_eq!(pks, expected);
	}

	#[rstest]
	fn test_filter_outside_list_filter_rejected(users: Vec<Record>) {
		// Arrange
		let admin = UserAdmin::new();
		let params = ListParams::default().with_filter("email", "x");

		// Act
		let result = ChangeList::build(User::meta(), &admin, users, &params, 100);

		// Assert
		assert!(matches!(result, Err(AdminError::ValidationError(_))));
	}

	#[rstest]
	fn test_filter_choices(users: Vec<Record>) {
		// Arrange
		let admin = UserAdmin::new();

		// Act
		let list = ChangeList::build(User::meta(), &admin, users, &ListParams::default(), 100)
			.unwrap();

		// Assert
		let groups = list.filters.iter().find(|f| f.field == "groups").unwrap();
		assert_eq!(groups.choices, vec!["editors", "ops"]);
		let staff = list.filters.iter().find(|f| f.field == "is_staff").unwrap();
		assert_eq!(staff.choices, vec!["true", "false"]);
		assert_eq!(staff.title, "Is staff");
	}

	#[rstest]
	fn test_ordering_by_multiple_keys(users: Vec<Record>) {
		// Arrange
		let admin = UserAdmin::new();
		let params = ListParams::default().with_ordering("last_name,-username");

		// Act
		let list = ChangeList::build(User::meta(), &admin, users, &params, 100).unwrap();

		// Assert
		let pks: Vec<_> = list.rows.iter().map(|r| r.pk).collect();
		assert_eq!(pks, vec![Some(1), Some(3), Some(2)]);
		assert_eq!(list.ordering, vec!["last_name", "-username"]);
	}

	#[rstest]
	fn test_ordering_unknown_field_rejected(users: Vec<Record>) {
		// Arrange
		let admin = UserAdmin::new();
		let params = ListParams::default().with_ordering("shoe_size");

		// Act & Assert
		assert!(ChangeList::build(User::meta(), &admin, users, &params, 100).is_err());
	}

	#[rstest]
	fn test_default_admin_lists_object_repr_newest_first() {
		// Arrange
		let admin = ModelAdminConfig::for_model::<Email>();
		let records = (1..=3)
			.map(|id| record(json!({"id": id, "sender": "a@example.com"})))
			.collect();

		// Act
		let list =
			ChangeList::build(Email::meta(), &admin, records, &ListParams::default(), 100)
				.unwrap();

		// Assert
		assert_eq!(list.columns.len(), 1);
		assert_eq!(list.columns[0].label, "Email");
		assert!(!list.columns[0].sortable);
		assert_eq!(list.rows[0].values, vec![json!("Email object (3)")]);
		assert_eq!(list.ordering, vec!["-id"]);
		assert!(!list.search_enabled);
	}

	#[rstest]
	#[case(1, 2, vec![Some(5), Some(4)])]
	#[case(3, 2, vec![Some(1)])]
	fn test_pagination(
		#[case] page: usize,
		#[case] per_page: usize,
		#[case] expected: Vec<Option<i64>>,
	) {
		// Arrange
		let admin = ModelAdminConfig::for_model::<Email>();
		let records = (1..=5)
			.map(|id| record(json!({"id": id, "sender": "a@example.com"})))
			.collect();
		let params = ListParams::default().with_page(page);

		// Act
		let list = ChangeList::build(Email::meta(), &admin, records, &params, per_page).unwrap();

		// Assert
		assert_eq!(list.total_pages, 3);
		let pks: Vec<_> = list.rows.iter().map(|r| r.pk).collect();
		assert_eq!(pks, expected);
	}

	#[rstest]
	#[case(0)]
	#[case(2)]
	fn test_page_out_of_range(#[case] page: usize) {
		// Arrange
		let admin = ModelAdminConfig::for_model::<Email>();
		let params = ListParams::default().with_page(page);

		// Act
		let result = ChangeList::build(Email::meta(), &admin, vec![], &params, 100);

		// Assert
		assert!(matches!(result, Err(AdminError::ValidationError(_))));
	}

	#[rstest]
	fn test_user_change_form_marks_readonly_and_horizontal() {
		// Arrange
		let admin = UserAdmin::new();
		let existing = User::new("alice").to_record().unwrap();

		// Act
		let form = ChangeForm::build(User::meta(), &admin, Some(&existing));

		// Assert
		assert_eq!(form.fieldsets.len(), 4);
		let date_joined = form.fields().find(|f| f.name == "date_joined").unwrap();
		assert!(date_joined.readonly);
		assert!(!date_joined.required);
		let groups = form.fields().find(|f| f.name == "groups").unwrap();
		assert!(groups.horizontal);
		let username = form.fields().find(|f| f.name == "username").unwrap();
		assert!(username.required);
		assert_eq!(username.value, Some(json!("alice")));
		assert_eq!(form.title, "Change user");
	}

	#[rstest]
	fn test_user_add_form_uses_add_fieldsets() {
		// Arrange
		let admin = UserAdmin::new();

		// Act
		let form = ChangeForm::build(User::meta(), &admin, None);

		// Assert
		let names: Vec<_> = form.fields().map(|f| f.name.as_str()).collect();
		assert_eq!(names, vec!["username", "password1", "password2"]);
		assert!(form.fields().all(|f| f.required));
		assert_eq!(form.fields().nth(1).unwrap().field_type, None);
		assert_eq!(form.pk, None);
	}

	#[rstest]
	fn test_email_form_lists_every_editable_field() {
		// Arrange
		let admin = ModelAdminConfig::for_model::<Email>();

		// Act
		let form = ChangeForm::build(Email::meta(), &admin, None);

		// Assert
		let names: Vec<_> = form.fields().map(|f| f.name.as_str()).collect();
		assert_eq!(
			names,
			vec!["sender", "recipients", "subject", "body", "read", "archived"]
		);
	}

	#[rstest]
	fn test_clean_submission_drops_readonly_and_unknown_keys() {
		// Arrange
		let admin = UserAdmin::new();
		let existing = User::new("alice").to_record().unwrap();
		let data = record(json!({
			"username": "alice2",
			"date_joined": "1999-01-01T00:00:00Z",
			"password": "plain",
			"favourite_colour": "blue",
		}));

		// Act
		let cleaned = clean_submission(User::meta(), &admin, data, Some(existing.clone())).unwrap();

		// Assert
		assert_eq!(cleaned["username"], json!("alice2"));
		assert_eq!(cleaned["date_joined"], existing["date_joined"]);
		assert_eq!(cleaned["password"], existing["password"]);
		assert!(!cleaned.contains_key("favourite_colour"));
	}

	#[rstest]
	fn test_clean_submission_requires_fields() {
		// Arrange
		let admin = ModelAdminConfig::for_model::<Email>();
		let data = record(json!({"sender": "", "recipients": []}));

		// Act
		let err = clean_submission(Email::meta(), &admin, data, None).unwrap_err();

		// Assert
		let message = err.to_string();
		assert!(message.contains("sender"));
		assert!(message.contains("recipients"));
		assert!(!message.contains("subject"));
	}

	#[rstest]
	#[case(150, true)]
	#[case(151, false)]
	fn test_clean_submission_limits_username_length(#[case] length: usize, #[case] accepted: bool) {
		// Arrange
		let admin = UserAdmin::new();
		let data = record(json!({
			"username": "u".repeat(length),
			"password1": "pw",
			"password2": "pw",
		}));

		// Act
		let result = clean_submission(User::meta(), &admin, data, None);

		// Assert
		match result {
			Ok(cleaned) => {
				assert!(accepted);
				assert_eq!(cleaned["username"].as_str().map(|s| s.len()), Some(length));
			}
			Err(err) => {
				assert!(!accepted);
				assert!(err.to_string().contains("username: Ensure this value has at most 150"));
			}
		}
	}

	#[rstest]
	fn test_clean_submission_limits_email_fields_by_characters() {
		// Arrange
		let admin = ModelAdminConfig::for_model::<Email>();
		let long_sender = format!("{}@example.com", "a".repeat(250));
		let data = record(json!({
			"sender": long_sender,
			"recipients": ["b@example.com"],
			// multi-byte characters count once each
			"subject": "é".repeat(255),
		}));

		// Act
		let err = clean_submission(Email::meta(), &admin, data, None).unwrap_err();

		// Assert
		let message = err.to_string();
		assert!(message.contains("sender: Ensure this value has at most 254 characters (it has 262)."));
		assert!(!message.contains("subject"));
	}

	#[rstest]
	fn test_check_unique_rejects_taken_username() {
		// Arrange
		let rows = vec![
			record(json!({"id": 1, "username": "carol"})),
			record(json!({"id": 2, "username": "dave"})),
		];
		let new_user = record(json!({"username": "carol"}));

		// Act
		let err = check_unique(User::meta(), &new_user, &rows).unwrap_err();

		// Assert
		assert_eq!(
			err.to_string(),
			"Validation error: username: A user with that username already exists."
		);
	}

	#[rstest]
	#[case(json!({"id": 1, "username": "carol"}), true)]
	#[case(json!({"id": 1, "username": "erin"}), true)]
	#[case(json!({"id": 1, "username": "dave"}), false)]
	fn test_check_unique_skips_own_row(#[case] value: Value, #[case] accepted: bool) {
		// Arrange
		let rows = vec![
			record(json!({"id": 1, "username": "carol"})),
			record(json!({"id": 2, "username": "dave"})),
		];

		// Act
		let result = check_unique(User::meta(), &record(value), &rows);

		// Assert
		assert_eq!(result.is_ok(), accepted);
	}

	#[rstest]
	fn test_check_unique_ignores_models_without_unique_fields() {
		// Arrange
		let rows = vec![record(json!({"id": 1, "sender": "a@example.com"}))];

		// Act & Assert
		assert!(check_unique(Email::meta(), &record(json!({"sender": "a@example.com"})), &rows).is_ok());
	}

	#[rstest]
	#[tokio::test]
	async fn test_dashboard_respects_module_permissions() {
		// Arrange
		let site = AdminSite::new("Mail Admin");
		site.register::<User>(UserAdmin::new()).unwrap();
		site.register::<Email>(ModelAdminConfig::for_model::<Email>())
			.unwrap();
		let viewer = User::new("viewer")
			.with_staff(true)
			.with_permissions(vec!["mail.view_email"]);

		// Act
		let dashboard = Dashboard::build(&site, &viewer).await;

		// Assert
		assert_eq!(dashboard.site_name, "Mail Admin");
		assert_eq!(dashboard.apps.len(), 1);
		let mail = &dashboard.apps[0];
		assert_eq!(mail.app_label, "mail");
		assert_eq!(mail.models[0].admin_url, "/admin/mail/email/");
		assert_eq!(mail.models[0].verbose_name_plural, "Emails");
		assert_eq!(mail.models[0].add_url, None);
	}

	#[rstest]
	#[tokio::test]
	async fn test_dashboard_for_superuser_lists_both_apps() {
		// Arrange
		let site = AdminSite::new("Mail Admin");
		site.register::<User>(UserAdmin::new()).unwrap();
		site.register::<Email>(ModelAdminConfig::for_model::<Email>())
			.unwrap();

		// Act
		let dashboard = Dashboard::build(&site, &User::new_superuser("root")).await;

		// Assert
		let apps: Vec<_> = dashboard.apps.iter().map(|a| a.app_label.as_str()).collect();
		assert_eq!(apps, vec!["auth", "mail"]);
		assert_eq!(
			dashboard.apps[0].models[0].add_url.as_deref(),
			Some("/admin/auth/user/add/")
		);
	}
}
