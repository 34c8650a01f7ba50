//! Request descriptors.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use wpcf7_dom::FormData;

/// Where a request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiTarget {
	/// Absolute URL, used verbatim.
	Url(String),
	/// Path appended to the API root.
	Path(String),
	/// Endpoint name joined to the namespace, then treated as a path.
	Endpoint(String),
	/// The current page.
	Page,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ApiBody {
	/// No body.
	#[default]
	Empty,
	/// Serialized as JSON with `Content-Type: application/json`.
	Json(serde_json::Value),
	/// Passed through as a multipart form submission.
	Form(FormData),
}

/// A request travelling through the pipeline.
///
/// `context` is an opaque passthrough for middleware: the transport never
/// looks at it.
#[derive(Debug, Clone)]
pub struct ApiRequest<C> {
	/// Target.
	pub target: ApiTarget,
	/// HTTP method.
	pub method: Method,
	/// Caller-supplied headers, merged over the defaults.
	pub headers: HeaderMap,
	/// Payload.
	pub body: ApiBody,
	/// Middleware passthrough.
	pub context: Option<C>,
}

impl<C> ApiRequest<C> {
	/// A GET request to `target`.
	pub fn new(target: ApiTarget) -> Self {
		Self {
			target,
			method: Method::GET,
			headers: HeaderMap::new(),
			body: ApiBody::Empty,
			context: None,
		}
	}

	/// A GET request to a namespaced endpoint (`contact-forms/1/refill`).
	pub fn endpoint(endpoint: impl Into<String>) -> Self {
		Self::new(ApiTarget::Endpoint(endpoint.into()))
	}

	/// A GET request to a root-relative path.
	pub fn path(path: impl Into<String>) -> Self {
		Self::new(ApiTarget::Path(path.into()))
	}

	/// A GET request to an absolute URL.
	pub fn url(url: impl Into<String>) -> Self {
		Self::new(ApiTarget::Url(url.into()))
	}

	/// Sets the method.
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	/// Adds a header. Invalid names or values are ignored.
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	/// Sets a JSON payload (`data`).
	pub fn json(mut self, data: serde_json::Value) -> Self {
		self.body = ApiBody::Json(data);
		self
	}

	/// Sets a multipart payload (`body: FormData`).
	pub fn form(mut self, data: FormData) -> Self {
		self.body = ApiBody::Form(data);
		self
	}

	/// Attaches the middleware passthrough.
	pub fn with_context(mut self, context: C) -> Self {
		self.context = Some(context);
		self
	}
}

/// A fully resolved request handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Final URL.
	pub url: String,
	/// Final headers.
	pub headers: HeaderMap,
	/// Payload.
	pub body: ApiBody,
}
