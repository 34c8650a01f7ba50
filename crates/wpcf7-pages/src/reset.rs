//! Refill after a native form reset.
//!
//! Resetting a form restores the control defaults locally; [`reset`] then
//! asks `contact-forms/{id}/refill` for fresh captcha and quiz values and
//! returns the form to `init`. Right after a successful send the status
//! stays `sent` instead, without a `wpcf7statuschanged`.

use crate::app::{Endpoint, FormContext, Wpcf7};
use crate::error::Result;
use crate::event::{EventDetail, EventTarget, FormEvent, trigger};
use crate::markers::clear_response;
use crate::spawn::LocalFuture;
use crate::state::FormHandle;
use crate::status::{set_status, set_status_silently};
use crate::submit::MAIL_SENT;
use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;
use wpcf7_api::{ApiFuture, ApiRequest, ApiResult, Handler, Middleware};

/// Clears the response and moves the form to `resetting` before a refill.
pub struct RefillMiddleware;

#[async_trait(?Send)]
impl Middleware<FormContext> for RefillMiddleware {
	fn before(&self, request: &ApiRequest<FormContext>) {
		if let Some(context) = &request.context {
			clear_response(&context.form);
			set_status(&context.form, "resetting");
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
		"RefillMiddleware"
	}

	fn should_continue(&self, request: &ApiRequest<FormContext>) -> bool {
		request
			.context
			.as_ref()
			.is_some_and(|context| context.endpoint == Endpoint::Refill)
	}
}

/// Starts a refill of `form`.
///
/// The field values are captured and [`RefillMiddleware`] runs before this
/// returns, so a `reset` listener can call it ahead of the native control
/// reset. The returned future sends the request and applies the response.
pub fn start_reset(app: &Wpcf7, form: &FormHandle) -> LocalFuture<Result<Option<Value>>> {
	let detail = form.detail(form.form_data());
	let request = ApiRequest::endpoint(Endpoint::Refill.path(form.id())).with_context(FormContext {
		endpoint: Endpoint::Refill,
		form: form.clone(),
		detail: detail.clone(),
	});
	let pending = app.pipeline().start(request);
	Box::pin(finish_reset(form.clone(), detail, pending))
}

async fn finish_reset(form: FormHandle, mut detail: EventDetail, pending: ApiFuture) -> Result<Option<Value>> {
	let response = pending.await.map_err(|e| {
		tracing::error!(form = form.id(), error = %e, "refill failed");
		e
	})?;

	let was_sent = std::mem::take(&mut form.state_mut().reset_on_mail_sent);
	if was_sent {
		set_status_silently(&form, MAIL_SENT);
	} else {
		set_status(&form, "init");
	}

	detail.api_response = response.clone();
	trigger(
		form.dom(),
		EventTarget::Node(form.node()),
		FormEvent::Reset.name(),
		detail.to_value(),
	);
	Ok(response)
}

/// Refills `form` and fires `wpcf7reset` with the response as `apiResponse`.
///
/// # Errors
///
/// Returns [`FormError::Api`](crate::FormError::Api) when the request fails;
/// the failure is also logged.
pub async fn reset(app: &Wpcf7, form: &FormHandle) -> Result<Option<Value>> {
	start_reset(app, form).await
}
