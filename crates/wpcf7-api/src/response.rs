//! Raw HTTP responses.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// A response as returned by a transport, before interpretation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
	/// Status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw body.
	pub body: Bytes,
}

impl HttpResponse {
	/// A response with the given status and body.
	pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: body.into(),
		}
	}

	/// A `200 OK` carrying `value` as JSON.
	pub fn json(value: &serde_json::Value) -> Self {
		Self::with_json(StatusCode::OK, value)
	}

	/// A response with `status` carrying `value` as JSON.
	pub fn with_json(status: StatusCode, value: &serde_json::Value) -> Self {
		let mut response = Self::new(status, value.to_string());
		response.headers.insert(
			http::header::CONTENT_TYPE,
			http::HeaderValue::from_static("application/json"),
		);
		response
	}

	/// `204 No Content`.
	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT, Bytes::new())
	}

	/// Whether the status is in `[200, 300)`.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}
}
