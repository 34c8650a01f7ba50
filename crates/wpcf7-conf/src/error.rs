//! Settings errors.

use thiserror::Error;

/// Errors raised while loading or validating [`Settings`](crate::Settings).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("API root is not configured")]
	MissingApiRoot,

	#[error("Invalid API root '{root}': {reason}")]
	InvalidApiRoot { root: String, reason: String },

	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	Env {
		key: String,
		/// Length of the original value (the raw value is not echoed back)
		value_len: usize,
		error: String,
	},
}
