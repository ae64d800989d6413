//! Admin panel functionality
//!
//! Unified imports for the admin subsystem through the `mail::admin` namespace.
//!
//! ## Example
//!
//! ```rust
//! use mail::admin::*;
//! use mail::models::Email;
//!
//! let site = AdminSite::new("My Admin");
//! let email_admin = ModelAdminConfig::builder()
//!     .model::<Email>()
//!     .list_display(vec!["id", "sender", "subject"])
//!     .build()
//!     .unwrap();
//! site.register::<Email>(email_admin).unwrap();
//! ```

pub use mail_admin::*;
