//! # mail-admin
//!
//! Administrative interface for the mail application.
//!
//! - **site**: [`AdminSite`], the registry pairing entity types with controllers
//! - **model_admin**: the [`ModelAdmin`] trait and the default [`ModelAdminConfig`]
//! - **user_admin**: [`UserAdmin`], the built-in controller for the user model
//! - **views**: dashboard, change list and change form
//! - **router**: URL resolution and permission-checked dispatch
//! - **database**: the [`AdminDatabase`] storage seam
//!
//! ## Examples
//!
//! ```
//! use mail_admin::{AdminSite, ModelAdmin, ModelAdminConfig, UserAdmin};
//! use mail_models::{ActiveUser, Email, Model};
//!
//! let site = AdminSite::new("Mail Admin");
//! site.register::<ActiveUser>(UserAdmin::new()).unwrap();
//! site.register::<Email>(ModelAdminConfig::for_model::<Email>()).unwrap();
//!
//! let admin = site.get_model_admin(&ActiveUser::meta().model_id()).unwrap();
//! assert!(admin.as_any().downcast_ref::<UserAdmin>().is_some());
//! ```

pub mod database;
pub mod error;
pub mod model_admin;
pub mod router;
pub mod site;
pub mod user_admin;
pub mod views;

pub use database::{AdminDatabase, InMemoryDatabase};
pub use error::{AdminError, AdminResult};
pub use model_admin::{Fieldset, ModelAdmin, ModelAdminConfig, ModelAdminConfigBuilder, STR_FIELD};
pub use router::{AdminRequest, AdminResponse, AdminRoute, AdminRouter, Method};
pub use site::{AdminSite, DEFAULT_LIST_PER_PAGE, DEFAULT_URL_PREFIX, Registration};
pub use user_admin::UserAdmin;
pub use views::{ChangeForm, ChangeList, Dashboard, ListParams, check_unique, clean_submission};
