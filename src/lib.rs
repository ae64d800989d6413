//! # mail
//!
//! Server-side wiring of the mail application.
//!
//! The application defines two entities, the auth [`User`](models::User) and the
//! [`Email`](models::Email), and exposes both through an administrative interface.
//! This crate pairs each entity with its admin controller and builds the
//! [`AdminSite`](admin::AdminSite) from layered settings.
//!
//! ## Modules
//!
//! - **apps**: per-app wiring, currently the `mail` app's admin registrations
//! - **config**: settings, logging and admin site construction
//! - **admin**: re-exports of the admin subsystem
//! - **models**: re-exports of the entity definitions
//!
//! ## Example
//!
//! ```
//! use mail::config::{Settings, configure_admin};
//!
//! let site = configure_admin(&Settings::default()).unwrap();
//! assert_eq!(site.len(), 2);
//! ```

pub mod admin;
pub mod apps;
pub mod config;

pub mod models {
	pub use mail_models::*;
}

pub use config::{Settings, SettingsError, configure_admin};
