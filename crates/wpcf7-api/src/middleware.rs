//! Handler and middleware traits for API requests.
//!
//! ## Handler
//!
//! A [`Handler`] turns an [`ApiRequest`] into the parsed JSON result (or
//! `None` for `204 No Content`):
//!
//! ```rust
//! use wpcf7_api::{ApiRequest, ApiResult, Handler};
//! use async_trait::async_trait;
//!
//! struct Canned;
//!
//! #[async_trait(?Send)]
//! impl Handler<()> for Canned {
//!     async fn handle(&self, _request: ApiRequest<()>) -> ApiResult {
//!         Ok(Some(serde_json::json!({ "status": "mail_sent" })))
//!     }
//! }
//! ```
//!
//! ## Middleware
//!
//! A [`Middleware`] wraps the next handler. It may run side effects before
//! and after, rewrite the request, or answer without calling `next` at all.
//! Side effects that must be visible as soon as a request is issued go in
//! [`Middleware::before`], which runs synchronously when the pipeline starts
//! the request:
//!
//! ```rust
//! use wpcf7_api::{ApiRequest, ApiResult, Handler, Middleware};
//! use async_trait::async_trait;
//! use std::rc::Rc;
//!
//! struct Tagging;
//!
//! #[async_trait(?Send)]
//! impl Middleware<()> for Tagging {
//!     async fn process(&self, request: ApiRequest<()>, next: Rc<dyn Handler<()>>) -> ApiResult {
//!         next.handle(request.header("X-Tag", "1")).await
//!     }
//! }
//! ```
//!
//! Everything runs on the single UI thread, so the traits are `?Send` and
//! chains share handlers through `Rc`.

use crate::error::ApiError;
use crate::request::ApiRequest;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Outcome of a request: the parsed JSON body, `None` for an empty (204)
/// response, or an [`ApiError`].
pub type ApiResult = Result<Option<serde_json::Value>, ApiError>;

/// A started request, see [`Pipeline::start`](crate::Pipeline::start).
pub type ApiFuture = Pin<Box<dyn Future<Output = ApiResult>>>;

/// Processes a request into a result.
#[async_trait(?Send)]
pub trait Handler<C> {
	/// Handles the request.
	///
	/// # Errors
	///
	/// Returns an [`ApiError`] when the request fails.
	async fn handle(&self, request: ApiRequest<C>) -> ApiResult;
}

#[async_trait(?Send)]
impl<C: 'static, T: Handler<C> + ?Sized> Handler<C> for Rc<T> {
	async fn handle(&self, request: ApiRequest<C>) -> ApiResult {
		(**self).handle(request).await
	}
}

/// Wraps the rest of the chain.
#[async_trait(?Send)]
pub trait Middleware<C> {
	/// Synchronous side effects of issuing `request`.
	///
	/// Runs for every middleware of the composed chain, outermost first, when
	/// the request is started, before anything is awaited.
	fn before(&self, _request: &ApiRequest<C>) {}

	/// Processes a request, usually by delegating to `next`.
	///
	/// # Errors
	///
	/// Returns whatever error the middleware or `next` produces.
	async fn process(&self, request: ApiRequest<C>, next: Rc<dyn Handler<C>>) -> ApiResult;

	/// Name used in logs and introspection.
	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}

	/// Whether this middleware takes part in handling `request`.
	///
	/// Skipped middleware are left out of the composed chain entirely.
	fn should_continue(&self, _request: &ApiRequest<C>) -> bool {
		true
	}
}

/// One link of a composed chain: a middleware plus the handler it wraps.
pub(crate) struct ComposedHandler<C> {
	pub(crate) middleware: Rc<dyn Middleware<C>>,
	pub(crate) next: Rc<dyn Handler<C>>,
}

#[async_trait(?Send)]
impl<C: 'static> Handler<C> for ComposedHandler<C> {
	async fn handle(&self, request: ApiRequest<C>) -> ApiResult {
		self.middleware.process(request, self.next.clone()).await
	}
}

/// Composes `middlewares` (outermost first) around `terminal`.
pub(crate) fn compose<C: 'static>(
	middlewares: &[Rc<dyn Middleware<C>>],
	terminal: Rc<dyn Handler<C>>,
	request: &ApiRequest<C>,
) -> Rc<dyn Handler<C>> {
	let mut current = terminal;
	for middleware in middlewares
		.iter()
		.rev()
		.filter(|mw| mw.should_continue(request))
	{
		current = Rc::new(ComposedHandler {
			middleware: middleware.clone(),
			next: current,
		});
	}
	current
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::{Value, json};
	use std::cell::RefCell;

	struct EchoHandler;

	#[async_trait(?Send)]
	impl Handler<()> for EchoHandler {
		async fn handle(&self, request: ApiRequest<()>) -> ApiResult {
			let tags: Vec<String> = request
				.headers
				.get_all("x-tag")
				.iter()
				.filter_map(|v| v.to_str().ok().map(str::to_string))
				.collect();
			Ok(Some(json!({ "tags": tags })))
		}
	}

	struct Recording {
		label: &'static str,
		log: Rc<RefCell<Vec<String>>>,
	}

	#[async_trait(?Send)]
	impl Middleware<()> for Recording {
		async fn process(&self, request: ApiRequest<()>, next: Rc<dyn Handler<()>>) -> ApiResult {
			self.log.borrow_mut().push(format!("{}:before", self.label));
			let result = next.handle(request).await;
			self.log.borrow_mut().push(format!("{}:after", self.label));
			result
		}
	}

	struct ShortCircuit;

	#[async_trait(?Send)]
	impl Middleware<()> for ShortCircuit {
		async fn process(&self, _request: ApiRequest<()>, _next: Rc<dyn Handler<()>>) -> ApiResult {
			Ok(Some(Value::String("short".into())))
		}
	}

	struct Skipped;

	#[async_trait(?Send)]
	impl Middleware<()> for Skipped {
		async fn process(&self, _request: ApiRequest<()>, _next: Rc<dyn Handler<()>>) -> ApiResult {
			Err(ApiError::Fetch)
		}

		fn should_continue(&self, _request: &ApiRequest<()>) -> bool {
			false
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_compose_runs_outermost_first() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let middlewares: Vec<Rc<dyn Middleware<()>>> = vec![
			Rc::new(Recording { label: "outer", log: log.clone() }),
			Rc::new(Recording { label: "inner", log: log.clone() }),
		];
		let request = ApiRequest::path("x");
		let chain = compose(&middlewares, Rc::new(EchoHandler), &request);

		chain.handle(request).await.unwrap();

		assert_eq!(
			*log.borrow(),
			vec!["outer:before", "inner:before", "inner:after", "outer:after"]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_middleware_can_answer_without_next() {
		let middlewares: Vec<Rc<dyn Middleware<()>>> = vec![Rc::new(ShortCircuit)];
		let request = ApiRequest::path("x");
		let chain = compose(&middlewares, Rc::new(EchoHandler), &request);

		let result = chain.handle(request).await.unwrap();
		assert_eq!(result, Some(Value::String("short".into())));
	}

	#[rstest]
	#[tokio::test]
	async fn test_should_continue_false_is_skipped() {
		let middlewares: Vec<Rc<dyn Middleware<()>>> = vec![Rc::new(Skipped)];
		let request = ApiRequest::path("x");
		let chain = compose(&middlewares, Rc::new(EchoHandler), &request);

		assert!(chain.handle(request).await.is_ok());
	}
}
