//! Pipeline error taxonomy.

use crate::response::HttpResponse;
use serde::Serialize;
use thiserror::Error;

/// Code of [`ApiError::Fetch`].
pub const FETCH_ERROR_CODE: &str = "fetch_error";
/// Message of [`ApiError::Fetch`].
pub const FETCH_ERROR_MESSAGE: &str = "You are probably offline.";
/// Code of [`ApiError::InvalidJson`].
pub const INVALID_JSON_CODE: &str = "invalid_json";
/// Message of [`ApiError::InvalidJson`].
pub const INVALID_JSON_MESSAGE: &str = "The response is not a valid JSON response.";

/// Errors surfaced by [`Pipeline::fetch`](crate::Pipeline::fetch).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
	/// The server could not be reached.
	#[error("{FETCH_ERROR_MESSAGE}")]
	Fetch,

	/// A 2xx response whose body is not JSON.
	#[error("{INVALID_JSON_MESSAGE}")]
	InvalidJson,

	/// A response outside the 2xx range, surfaced as-is.
	#[error("HTTP error: {}", .0.status)]
	Http(HttpResponse),
}

/// `{code, message}` shape of the transport and protocol errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
	/// Machine-readable code.
	pub code: String,
	/// Human-readable message.
	pub message: String,
}

impl ApiError {
	/// Machine-readable code (`fetch_error`, `invalid_json`, or the HTTP status).
	pub fn code(&self) -> String {
		match self {
			Self::Fetch => FETCH_ERROR_CODE.to_string(),
			Self::InvalidJson => INVALID_JSON_CODE.to_string(),
			Self::Http(response) => response.status.as_u16().to_string(),
		}
	}

	/// The `{code, message}` body; `None` for raw HTTP errors.
	pub fn body(&self) -> Option<ErrorBody> {
		match self {
			Self::Http(_) => None,
			other => Some(ErrorBody {
				code: other.code(),
				message: other.to_string(),
			}),
		}
	}

	/// The raw response of an HTTP error.
	pub fn response(&self) -> Option<&HttpResponse> {
		match self {
			Self::Http(response) => Some(response),
			_ => None,
		}
	}
}

/// Failure reported by a transport when no response was obtained.
#[derive(Debug, Clone, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl TransportError {
	/// Creates a transport error.
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}
