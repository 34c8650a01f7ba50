//! Error types for form controllers.

use thiserror::Error;
use wpcf7_api::ApiError;

/// Errors returned by [`submit`](crate::submit::submit), [`reset`](crate::reset::reset)
/// and [`load_schema`](crate::init::load_schema).
#[derive(Debug, Error)]
pub enum FormError {
	/// The API request failed.
	#[error(transparent)]
	Api(#[from] ApiError),

	/// The API answered with a body that does not have the expected shape.
	#[error("unexpected {endpoint} response: {reason}")]
	UnexpectedResponse {
		/// Endpoint that answered.
		endpoint: &'static str,
		/// What was wrong.
		reason: String,
	},
}

/// Result alias for form controllers.
pub type Result<T> = std::result::Result<T, FormError>;
