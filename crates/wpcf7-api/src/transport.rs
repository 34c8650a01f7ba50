//! HTTP transports.
//!
//! The pipeline never talks to the network directly: it hands a resolved
//! [`HttpRequest`] to a [`Transport`]. [`ReqwestTransport`] is the real one
//! (reqwest uses the browser `fetch` on wasm32), tests use
//! [`MockTransport`](crate::testing::MockTransport).

use crate::error::TransportError;
use crate::request::{ApiBody, HttpRequest};
use crate::response::HttpResponse;
use async_trait::async_trait;
use wpcf7_dom::{FormData, FormValue};

/// Sends resolved requests.
#[async_trait(?Send)]
pub trait Transport {
	/// Sends `request` and returns the raw response.
	///
	/// # Errors
	///
	/// Returns a [`TransportError`] when no response was obtained.
	async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	/// Creates a transport with a default client.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a transport around an existing client.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}
}

fn multipart_form(data: FormData) -> Result<reqwest::multipart::Form, TransportError> {
	let mut form = reqwest::multipart::Form::new();
	for (name, value) in data {
		form = match value {
			FormValue::Text(text) => form.text(name, text),
			FormValue::File(file) => {
				let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.name);
				if !file.content_type.is_empty() {
					part = part
						.mime_str(&file.content_type)
						.map_err(|e| TransportError::new(e.to_string()))?;
				}
				form.part(name, part)
			}
		};
	}
	Ok(form)
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
	async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let mut builder = self
			.client
			.request(request.method, &request.url)
			.headers(request.headers);
		builder = match request.body {
			ApiBody::Empty => builder,
			ApiBody::Json(value) => builder.body(value.to_string()),
			ApiBody::Form(data) => builder.multipart(multipart_form(data)?),
		};

		let response = builder
			.send()
			.await
			.map_err(|e| TransportError::new(e.to_string()))?;
		let status = response.status();
		let headers = response.headers().clone();
		let body = response
			.bytes()
			.await
			.map_err(|e| TransportError::new(e.to_string()))?;

		Ok(HttpResponse {
			status,
			headers,
			body,
		})
	}
}
