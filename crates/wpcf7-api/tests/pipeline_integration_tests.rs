//! Pipeline integration tests against the scripted transport.

use async_trait::async_trait;
use http::{Method, StatusCode};
use rstest::{fixture, rstest};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use wpcf7_api::testing::MockTransport;
use wpcf7_api::{
	ApiBody, ApiError, ApiRequest, ApiResult, Handler, HttpResponse, Middleware, Pipeline,
};
use wpcf7_conf::Settings;
use wpcf7_dom::FormData;

type Log = Rc<RefCell<Vec<String>>>;

struct Named {
	label: &'static str,
	log: Log,
}

#[async_trait(?Send)]
impl Middleware<String> for Named {
	async fn process(&self, request: ApiRequest<String>, next: Rc<dyn Handler<String>>) -> ApiResult {
		let context = request.context.clone().unwrap_or_default();
		self.log
			.borrow_mut()
			.push(format!("{}:{}", self.label, context));
		next.handle(request).await
	}

	fn name(&self) -> &str {
		self.label
	}
}

struct Eager {
	log: Log,
}

#[async_trait(?Send)]
impl Middleware<String> for Eager {
	fn before(&self, request: &ApiRequest<String>) {
		let context = request.context.clone().unwrap_or_default();
		self.log.borrow_mut().push(format!("before:{context}"));
	}

	async fn process(&self, request: ApiRequest<String>, next: Rc<dyn Handler<String>>) -> ApiResult {
		self.log.borrow_mut().push("process".to_string());
		next.handle(request).await
	}
}

struct Offline;

#[async_trait(?Send)]
impl Middleware<String> for Offline {
	async fn process(&self, _request: ApiRequest<String>, _next: Rc<dyn Handler<String>>) -> ApiResult {
		Err(ApiError::Fetch)
	}
}

#[fixture]
fn transport() -> Rc<MockTransport> {
	Rc::new(MockTransport::new())
}

fn pipeline(transport: &Rc<MockTransport>) -> Pipeline<String> {
	let settings = Settings::new("https://example.com/wp-json/")
		.validated()
		.unwrap();
	Pipeline::builder(Arc::new(settings))
		.transport(transport.clone())
		.build()
}

#[rstest]
#[tokio::test]
async fn test_last_registered_middleware_runs_first(transport: Rc<MockTransport>) {
	let log: Log = Rc::default();
	let pipeline = pipeline(&transport);
	pipeline.use_middleware(Rc::new(Named { label: "first", log: log.clone() }));
	pipeline.use_middleware(Rc::new(Named { label: "second", log: log.clone() }));
	transport.respond_json(json!({ "ok": true }));

	let result = pipeline
		.fetch(ApiRequest::endpoint("contact-forms/1/refill").with_context("refill".to_string()))
		.await
		.unwrap();

	assert_eq!(result, Some(json!({ "ok": true })));
	assert_eq!(*log.borrow(), vec!["second:refill", "first:refill"]);
	assert_eq!(pipeline.middleware_names(), vec!["second", "first"]);
}

#[rstest]
#[tokio::test]
async fn test_middleware_short_circuit_skips_transport(transport: Rc<MockTransport>) {
	let pipeline = pipeline(&transport);
	pipeline.use_middleware(Rc::new(Offline));

	let err = pipeline.fetch(ApiRequest::path("anything")).await.unwrap_err();

	assert!(matches!(err, ApiError::Fetch));
	assert!(transport.requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_multipart_post_reaches_transport(transport: Rc<MockTransport>) {
	let pipeline = pipeline(&transport);
	transport.respond_json(json!({ "status": "mail_sent" }));
	let mut data = FormData::new();
	data.append("your-name", "Jane");

	pipeline
		.fetch(
			ApiRequest::endpoint("contact-forms/7/feedback")
				.method(Method::POST)
				.header("X-WP-Nonce", "secret")
				.form(data.clone()),
		)
		.await
		.unwrap();

	let sent = transport.last_request().unwrap();
	assert_eq!(sent.method, Method::POST);
	assert_eq!(
		sent.url,
		"https://example.com/wp-json/contact-form-7/v1/contact-forms/7/feedback"
	);
	assert!(sent.headers.get("x-wp-nonce").is_none());
	assert!(sent.headers.get("content-type").is_none());
	assert_eq!(sent.body, ApiBody::Form(data));
}

#[rstest]
#[tokio::test]
async fn test_no_content_yields_none(transport: Rc<MockTransport>) {
	let pipeline = pipeline(&transport);
	transport.respond(HttpResponse::no_content());

	let result = pipeline.fetch(ApiRequest::path("x")).await.unwrap();
	assert_eq!(result, None);
}

#[rstest]
#[tokio::test]
async fn test_unreachable_server_is_fetch_error(transport: Rc<MockTransport>) {
	let pipeline = pipeline(&transport);
	transport.fail_next("connection refused");

	let err = pipeline.fetch(ApiRequest::path("x")).await.unwrap_err();
	assert_eq!(err.code(), "fetch_error");
	assert_eq!(err.to_string(), "You are probably offline.");
}

#[rstest]
#[tokio::test]
async fn test_non_json_success_is_invalid_json(transport: Rc<MockTransport>) {
	let pipeline = pipeline(&transport);
	transport.respond(HttpResponse::new(StatusCode::OK, "<html></html>"));

	let err = pipeline.fetch(ApiRequest::path("x")).await.unwrap_err();
	assert_eq!(err.code(), "invalid_json");
}

#[rstest]
#[case(StatusCode::FOUND)]
#[case(StatusCode::BAD_REQUEST)]
#[case(StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn test_error_status_surfaces_raw_response(#[case] status: StatusCode) {
	let transport = Rc::new(MockTransport::new());
	let pipeline = pipeline(&transport);
	transport.respond(HttpResponse::with_json(status, &json!({ "code": "nope" })));

	let err = pipeline.fetch(ApiRequest::path("x")).await.unwrap_err();
	let response = err.response().unwrap();
	assert_eq!(response.status, status);
	assert_eq!(&response.body[..], br#"{"code":"nope"}"#);
}

#[rstest]
#[tokio::test]
async fn test_routes_answer_when_queue_is_empty(transport: Rc<MockTransport>) {
	let pipeline = pipeline(&transport);
	transport.route("/schema", HttpResponse::json(&json!({ "rules": [] })));

	let result = pipeline
		.fetch(ApiRequest::endpoint("contact-forms/7/feedback/schema"))
		.await
		.unwrap();
	assert_eq!(result, Some(json!({ "rules": [] })));
	assert_eq!(transport.requests_to("/schema").len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_start_runs_before_hooks_without_polling(transport: Rc<MockTransport>) {
	let log: Log = Rc::default();
	let pipeline = pipeline(&transport);
	pipeline.use_middleware(Rc::new(Eager { log: log.clone() }));
	transport.respond_json(json!({ "ok": true }));

	let pending = pipeline.start(ApiRequest::endpoint("contact-forms/1/refill").with_context("refill".to_string()));
	assert_eq!(*log.borrow(), vec!["before:refill"]);
	assert!(transport.requests().is_empty());

	let result = pending.await.unwrap();
	assert_eq!(result, Some(json!({ "ok": true })));
	assert_eq!(*log.borrow(), vec!["before:refill", "process"]);
	assert_eq!(transport.requests().len(), 1);
}
