//! # wpcf7
//!
//! The browser-side behaviour layer of Contact Form 7 forms, in Rust.
//!
//! Each form on a page gets a status state machine mirrored into its
//! `data-status` attribute, lifecycle events (`wpcf7submit`,
//! `wpcf7mailsent`, ...), AJAX submission and refill through the plugin's
//! REST API, and client-side validation against a server-supplied schema.
//!
//! ## Crates
//!
//! - [`conf`]: settings (API root, namespace, blocked/cached flags)
//! - [`dom`]: in-memory document, events and `FormData`
//! - [`api`]: REST request pipeline with middleware
//! - [`pages`]: form controllers and markup helpers
//!
//! ## Feature Flags
//!
//! - `full` (default) - everything
//! - `api` - the request pipeline without the form controllers
//! - `pages` - the form controllers (implies `api`)
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use wpcf7::prelude::*;
//!
//! let settings = Arc::new(Settings::from_json(r#"{ "api": { "root": "https://example.com/wp-json/" } }"#)?);
//! let app = Wpcf7::new(dom, settings);
//!
//! for form in app.init_all() {
//!     form.on(FormEvent::MailSent, |payload| {
//!         tracing::info!(?payload, "mail sent");
//!     });
//! }
//! ```

pub use wpcf7_conf as conf;
pub use wpcf7_dom as dom;

#[cfg(feature = "api")]
pub use wpcf7_api as api;

#[cfg(feature = "pages")]
pub use wpcf7_pages as pages;

pub use wpcf7_conf::{Settings, SettingsError};
pub use wpcf7_dom::{Document, Dom, FormData, FormValue, NodeId, Selector};

#[cfg(feature = "api")]
pub use wpcf7_api::{ApiError, ApiRequest, Middleware, Pipeline, Transport};

#[cfg(feature = "pages")]
pub use wpcf7_pages::{FormError, FormEvent, FormHandle, SchemaValidator, Status, Wpcf7};

/// Common imports.
pub mod prelude {
	pub use std::sync::Arc;

	pub use crate::{Document, Dom, FormData, FormValue, NodeId, Selector, Settings};

	#[cfg(feature = "api")]
	pub use crate::{ApiError, ApiRequest, Middleware, Pipeline, Transport};

	#[cfg(feature = "pages")]
	pub use crate::{FormError, FormEvent, FormHandle, SchemaValidator, Status, Wpcf7};

	#[cfg(feature = "pages")]
	pub use wpcf7_pages::{EventPayload, ValidateOptions};
}
