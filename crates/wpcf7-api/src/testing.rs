//! Test utilities.
//!
//! [`MockTransport`] answers requests from a queue of scripted outcomes,
//! falling back to per-URL routes, and records everything it was sent.
//!
//! ```
//! use std::rc::Rc;
//! use wpcf7_api::testing::MockTransport;
//! use wpcf7_api::HttpResponse;
//!
//! let transport = Rc::new(MockTransport::new());
//! transport.route("/refill", HttpResponse::json(&serde_json::json!({})));
//! transport.fail_next("connection refused");
//! assert!(transport.requests().is_empty());
//! ```

use crate::error::TransportError;
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::transport::Transport;
use async_trait::async_trait;
use http::StatusCode;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Scripted in-memory transport.
#[derive(Debug, Default)]
pub struct MockTransport {
	queue: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
	routes: RefCell<Vec<(String, HttpResponse)>>,
	requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
	/// Creates a transport with no scripted responses.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues `response` for the next request.
	pub fn respond(&self, response: HttpResponse) {
		self.queue.borrow_mut().push_back(Ok(response));
	}

	/// Queues a JSON `200 OK` for the next request.
	pub fn respond_json(&self, value: serde_json::Value) {
		self.respond(HttpResponse::json(&value));
	}

	/// Makes the next request fail without a response.
	pub fn fail_next(&self, message: &str) {
		self.queue
			.borrow_mut()
			.push_back(Err(TransportError::new(message)));
	}

	/// Answers every request whose URL ends with `suffix` (once the queue is
	/// empty). The most recently added matching route wins.
	pub fn route(&self, suffix: &str, response: HttpResponse) {
		self.routes.borrow_mut().push((suffix.to_string(), response));
	}

	/// Requests received so far.
	pub fn requests(&self) -> Vec<HttpRequest> {
		self.requests.borrow().clone()
	}

	/// The most recent request.
	pub fn last_request(&self) -> Option<HttpRequest> {
		self.requests.borrow().last().cloned()
	}

	/// Requests whose URL ends with `suffix`.
	pub fn requests_to(&self, suffix: &str) -> Vec<HttpRequest> {
		self.requests
			.borrow()
			.iter()
			.filter(|r| r.url.ends_with(suffix))
			.cloned()
			.collect()
	}
}

#[async_trait(?Send)]
impl Transport for MockTransport {
	async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let url = request.url.clone();
		self.requests.borrow_mut().push(request);

		if let Some(outcome) = self.queue.borrow_mut().pop_front() {
			return outcome;
		}
		let routed = self
			.routes
			.borrow()
			.iter()
			.rev()
			.find(|(suffix, _)| url.ends_with(suffix.as_str()))
			.map(|(_, response)| response.clone());
		Ok(routed.unwrap_or_else(|| HttpResponse::new(StatusCode::NOT_FOUND, "")))
	}
}
