//! # wpcf7-api
//!
//! Request pipeline for the Contact Form 7 REST API.
//!
//! Requests are described by [`ApiRequest`], resolved against the API root
//! and namespace from [`wpcf7_conf::Settings`], passed through an ordered
//! stack of [`Middleware`] and sent by a [`Transport`].
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use std::sync::Arc;
//! use wpcf7_api::{ApiRequest, Pipeline};
//! use wpcf7_conf::Settings;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Arc::new(Settings::new("https://example.com/wp-json/").validated()?);
//! let pipeline: Pipeline<()> = Pipeline::builder(settings).build();
//! let schema = pipeline
//!     .fetch(ApiRequest::endpoint("contact-forms/42/feedback/schema"))
//!     .await?;
//! # let _ = schema;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`request`]: request descriptors
//! - [`response`]: raw responses
//! - [`middleware`]: handler and middleware traits
//! - [`pipeline`]: target resolution, header preparation and the pipeline
//! - [`transport`]: the transport seam and its reqwest implementation
//! - [`error`]: error taxonomy
//! - [`testing`]: scripted transport for tests

pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod testing;
pub mod transport;

pub use error::{ApiError, ErrorBody, TransportError};
pub use middleware::{ApiFuture, ApiResult, Handler, Middleware};
pub use pipeline::{Pipeline, PipelineBuilder, prepare_headers, resolve_url};
pub use request::{ApiBody, ApiRequest, ApiTarget, HttpRequest};
pub use response::HttpResponse;
pub use transport::{ReqwestTransport, Transport};
