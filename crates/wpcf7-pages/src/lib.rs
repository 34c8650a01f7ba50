//! # wpcf7-pages
//!
//! Client-side behaviour of Contact Form 7 forms: the status state machine,
//! lifecycle events, AJAX submission and refill through the REST API,
//! client-side validation against a server-supplied schema, and the small
//! markup helpers (spinner, acceptance gating, character counters, ...).
//!
//! ## Bootstrapping
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wpcf7_conf::Settings;
//! use wpcf7_dom::{Document, Dom};
//! use wpcf7_pages::Wpcf7;
//!
//! # async fn run() {
//! let dom = Dom::new(Document::new());
//! let settings = Arc::new(Settings::new("https://example.com/wp-json/"));
//! let app = Wpcf7::new(dom, settings);
//!
//! let local = tokio::task::LocalSet::new();
//! local
//! 	.run_until(async {
//! 		for form in app.init_all() {
//! 			form.on(wpcf7_pages::FormEvent::MailSent, |_| println!("sent"));
//! 		}
//! 	})
//! 	.await;
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`status`]: status tokens and the `data-status` projection
//! - [`event`]: `wpcf7*` custom events and their payloads
//! - [`submit`] / [`reset`]: API round trips with their middleware
//! - [`validation`]: schema-driven validation passes and their markers
//! - [`helpers`]: markup helpers installed by [`init`]
//!
//! Everything is single-threaded: state lives in `Rc<RefCell<_>>` and async
//! work is spawned on the local executor.

pub mod app;
pub mod collect;
pub mod error;
pub mod event;
pub mod helpers;
pub mod init;
pub mod markers;
pub mod reflection;
pub mod refresh;
pub mod reset;
pub mod schema;
pub mod spawn;
pub mod state;
pub mod status;
pub mod submit;
pub mod validation;

pub use app::{Endpoint, FormContext, FormPipeline, Wpcf7};
pub use error::{FormError, Result};
pub use event::{
	EVENT_PREFIX, EventDetail, EventPayload, EventTarget, FormEvent, InputEntry, StatusChange, trigger,
};
pub use init::{init, init_all, load_schema};
pub use markers::{clear_response, error_id, remove_validation_error, set_validation_error};
pub use reflection::update_reflection;
pub use reset::{RefillMiddleware, reset, start_reset};
pub use schema::{FieldValidation, Rule, Schema, SchemaValidator, ValidateOptions, ValidatorError};
pub use spawn::LocalFuture;
pub use state::{FormHandle, FormState};
pub use status::{Status, set_status, set_status_silently};
pub use submit::{FeedbackMiddleware, FeedbackResponse, InvalidField, start_submit, submit};
pub use validation::validate;
