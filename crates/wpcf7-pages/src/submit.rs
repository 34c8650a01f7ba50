//! Submission
//!
//! The native `submit` event never navigates: init prevents it and calls
//! [`start_submit`] instead, which posts the form to
//! `contact-forms/{id}/feedback` and applies the response.
//!
//! ## Sequence
//!
//! 1. [`FeedbackMiddleware`] clears the previous response, fires
//!    `wpcf7beforesubmit` and moves the form to `submitting`
//! 2. the status from the response is applied and the per-status event
//!    (`wpcf7invalid`, `wpcf7mailsent`, ...) fires, then `wpcf7submit`
//! 3. the posted data hash, the sent-mail reset, the invalid field markers
//!    and the response message are written to the page

use crate::app::{Endpoint, FormContext, Wpcf7};
use crate::error::{FormError, Result};
use crate::event::{EventDetail, EventTarget, FormEvent, trigger};
use crate::markers::{RESPONSE_OUTPUT_CLASS, clear_response, set_validation_error};
use crate::spawn::LocalFuture;
use crate::state::FormHandle;
use crate::status::set_status;
use async_trait::async_trait;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::rc::Rc;
use wpcf7_api::{ApiFuture, ApiRequest, ApiResult, Handler, Middleware};
use wpcf7_dom::{NodeId, Selector, el};

/// Hidden field receiving the hash of the accepted submission.
pub const POSTED_DATA_HASH_FIELD: &str = "_wpcf7_posted_data_hash";

/// Raw status after which the form is reset.
pub const MAIL_SENT: &str = "mail_sent";

/// One entry of `invalid_fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidField {
	/// Field name.
	pub field: String,
	/// Error message.
	pub message: String,
	/// Id of the control the message refers to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub idref: Option<String>,
	/// Server-side error id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_id: Option<String>,
}

/// Body of a feedback response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
	/// Raw server status (`mail_sent`, `validation_failed`, ...).
	#[serde(default)]
	pub status: String,
	/// Message shown in the response outputs.
	#[serde(default)]
	pub message: String,
	/// Hash written to the posted data hash field.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub posted_data_hash: Option<String>,
	/// Fields the server rejected.
	#[serde(default)]
	pub invalid_fields: Vec<InvalidField>,
	/// Fresh captcha images by field name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub captcha: Option<BTreeMap<String, String>>,
	/// Fresh quiz `(question, hashed answer)` pairs by field name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quiz: Option<BTreeMap<String, (String, String)>>,
	/// Everything else the server sent.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Runs the pre-request side effects of a feedback call.
pub struct FeedbackMiddleware;

#[async_trait(?Send)]
impl Middleware<FormContext> for FeedbackMiddleware {
	fn before(&self, request: &ApiRequest<FormContext>) {
		if let Some(context) = &request.context {
			let form = &context.form;
			clear_response(form);
			trigger(
				form.dom(),
				EventTarget::Node(form.node()),
				FormEvent::BeforeSubmit.name(),
				context.detail.to_value(),
			);
			set_status(form, "submitting");
		}
	}

	async fn process(
		&self,
		request: ApiRequest<FormContext>,
		next: Rc<dyn Handler<FormContext>>,
	) -> ApiResult {
		next.handle(request).await
	}

	fn name(&self) -> &str {
		"FeedbackMiddleware"
	}

	fn should_continue(&self, request: &ApiRequest<FormContext>) -> bool {
		request
			.context
			.as_ref()
			.is_some_and(|context| context.endpoint == Endpoint::Feedback)
	}
}

/// Starts a submission of `form`, optionally on behalf of the `submitter`
/// button.
///
/// The form data is captured and [`FeedbackMiddleware`] runs before this
/// returns. The returned future sends the request and applies the response.
/// With submission blocked in the settings, the response is cleared and
/// the form stays `submitting` without any request (`Ok(None)`).
pub fn start_submit(
	app: &Wpcf7,
	form: &FormHandle,
	submitter: Option<NodeId>,
) -> LocalFuture<Result<Option<FeedbackResponse>>> {
	if app.settings().blocked {
		clear_response(form);
		set_status(form, "submitting");
		tracing::warn!(form = form.id(), "submission blocked");
		let blocked: Result<Option<FeedbackResponse>> = Ok(None);
		return Box::pin(std::future::ready(blocked));
	}

	let mut data = form.form_data();
	if let Some(submitter) = submitter {
		let doc = form.dom().borrow();
		if let Some(name) = doc.control_name(submitter).filter(|name| !name.is_empty()) {
			data.append(name, doc.value(submitter));
		}
	}

	let detail = form.detail(data.clone());
	let request = ApiRequest::endpoint(Endpoint::Feedback.path(form.id()))
		.method(Method::POST)
		.form(data)
		.with_context(FormContext {
			endpoint: Endpoint::Feedback,
			form: form.clone(),
			detail: detail.clone(),
		});
	let pending = app.pipeline().start(request);
	Box::pin(finish_submit(app.clone(), form.clone(), detail, pending))
}

/// Submits `form`. See [`start_submit`].
///
/// # Errors
///
/// Returns [`FormError::Api`] when the request fails and
/// [`FormError::UnexpectedResponse`] when the body is empty or malformed.
/// Both are also logged.
pub async fn submit(
	app: &Wpcf7,
	form: &FormHandle,
	submitter: Option<NodeId>,
) -> Result<Option<FeedbackResponse>> {
	start_submit(app, form, submitter).await
}

async fn finish_submit(
	app: Wpcf7,
	form: FormHandle,
	mut detail: EventDetail,
	pending: ApiFuture,
) -> Result<Option<FeedbackResponse>> {
	let body = match pending.await {
		Ok(Some(body)) => body,
		Ok(None) => return Err(log_failure(&form, unexpected("empty body"))),
		Err(e) => return Err(log_failure(&form, e.into())),
	};
	let response: FeedbackResponse = serde_json::from_value(body.clone())
		.map_err(|e| log_failure(&form, unexpected(&e.to_string())))?;

	let status = set_status(&form, &response.status);
	detail.status = response.status.clone();
	detail.api_response = Some(body);
	let payload = detail.to_value();

	if let Some(event) = FormEvent::for_status(&status) {
		trigger(form.dom(), EventTarget::Node(form.node()), event.name(), payload.clone());
	}
	trigger(form.dom(), EventTarget::Node(form.node()), FormEvent::Submit.name(), payload);

	apply_response(&app, &form, &response).await;
	Ok(Some(response))
}

fn unexpected(reason: &str) -> FormError {
	FormError::UnexpectedResponse {
		endpoint: Endpoint::Feedback.name(),
		reason: reason.to_string(),
	}
}

fn log_failure(form: &FormHandle, error: FormError) -> FormError {
	tracing::error!(form = form.id(), error = %error, "submission failed");
	error
}

/// Writes the outcome of a feedback response to the page.
async fn apply_response(app: &Wpcf7, form: &FormHandle, response: &FeedbackResponse) {
	let dom = form.dom();
	let outputs_selector = Selector::class(RESPONSE_OUTPUT_CLASS);

	if let Some(hash) = response.posted_data_hash.as_deref().filter(|h| !h.is_empty()) {
		let mut doc = dom.borrow_mut();
		if let Some(input) = doc.query(form.node(), &Selector::attr_eq("name", POSTED_DATA_HASH_FIELD)) {
			doc.set_value(input, hash);
		}
	}

	if response.status == MAIL_SENT {
		let first_output = dom.borrow().query(form.node(), &outputs_selector);
		if let Some(output) = first_output {
			dom.focus(output);
		}
		dom.reset(form.node());
		form.state_mut().reset_on_mail_sent = true;
	}

	for invalid in &response.invalid_fields {
		set_validation_error(form, &invalid.field, &invalid.message, None);
	}

	let outputs = dom.borrow().query_all(form.node(), &outputs_selector);
	{
		let mut doc = dom.borrow_mut();
		for &output in &outputs {
			if let Err(e) = el("p").text(&response.message).build_into(&mut doc, output) {
				tracing::warn!(error = %e, "could not render response message");
			}
		}
	}

	let delay = app.settings().focus_delay();
	if !delay.is_zero() {
		futures_timer::Delay::new(delay).await;
	}
	for output in outputs {
		let connected = dom.borrow().is_connected(output);
		if connected {
			dom.focus(output);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_feedback_response_keeps_unknown_keys() {
		let body = json!({
			"contact_form_id": 12,
			"status": "validation_failed",
			"message": "One or more fields have an error.",
			"invalid_fields": [
				{ "field": "your-email", "message": "Invalid address", "idref": null, "error_id": "x-ve-your-email" }
			],
			"quiz": { "quiz-1": ["1+1?", "abc"] },
		});

		let response: FeedbackResponse = serde_json::from_value(body).unwrap();

		assert_eq!(response.status, "validation_failed");
		assert_eq!(response.invalid_fields.len(), 1);
		assert_eq!(response.invalid_fields[0].idref, None);
		assert_eq!(response.invalid_fields[0].error_id.as_deref(), Some("x-ve-your-email"));
		assert_eq!(
			response.quiz.unwrap().get("quiz-1"),
			Some(&("1+1?".to_string(), "abc".to_string()))
		);
		assert_eq!(response.extra.get("contact_form_id"), Some(&json!(12)));
		assert!(response.captcha.is_none());
	}

	#[rstest]
	fn test_minimal_response() {
		let response: FeedbackResponse = serde_json::from_value(json!({ "status": "spam" })).unwrap();
		assert_eq!(response.status, "spam");
		assert!(response.message.is_empty());
		assert!(response.invalid_fields.is_empty());
	}
}
