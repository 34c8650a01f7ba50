//! Request pipeline.
//!
//! A [`Pipeline`] resolves request targets against the configured API root,
//! prepares headers, runs the request through the registered middleware and
//! finally through the transport, interpreting the response:
//!
//! | Transport outcome | Result |
//! |---|---|
//! | no response | `Err(ApiError::Fetch)` |
//! | status outside `[200, 300)` | `Err(ApiError::Http(response))` |
//! | `204 No Content` | `Ok(None)` |
//! | JSON body | `Ok(Some(value))` |
//! | anything else | `Err(ApiError::InvalidJson)` |
//!
//! Middleware registered later wraps everything registered before it, so
//! the last one registered runs first.

use crate::error::ApiError;
use crate::middleware::{ApiFuture, ApiResult, Handler, Middleware, compose};
use crate::request::{ApiBody, ApiRequest, ApiTarget, HttpRequest};
use crate::transport::{ReqwestTransport, Transport};
use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use wpcf7_conf::Settings;

/// Default `Accept` header.
pub const DEFAULT_ACCEPT: &str = "application/json, */*;q=0.1";

/// Header stripped from every request.
pub const NONCE_HEADER: &str = "x-wp-nonce";

/// Resolves a request target to a URL.
///
/// ```
/// use wpcf7_api::{ApiTarget, resolve_url};
/// use wpcf7_conf::Settings;
///
/// let settings = Settings::new("https://example.com/?rest_route=/");
/// assert_eq!(
///     resolve_url(&settings, &ApiTarget::Path("/forms?page=2".into())),
///     "https://example.com/?rest_route=/forms&page=2",
/// );
/// ```
pub fn resolve_url(settings: &Settings, target: &ApiTarget) -> String {
	match target {
		ApiTarget::Url(url) => url.clone(),
		ApiTarget::Page => settings.page_url.clone(),
		ApiTarget::Path(path) => join_root(&settings.api.root, path),
		ApiTarget::Endpoint(endpoint) => {
			let namespace = settings.api.namespace.as_str();
			let namespace = namespace.strip_prefix('/').unwrap_or(namespace);
			let namespace = namespace.strip_suffix('/').unwrap_or(namespace);
			let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
			let path = if endpoint.is_empty() {
				namespace.to_string()
			} else {
				format!("{namespace}/{endpoint}")
			};
			join_root(&settings.api.root, &path)
		}
	}
}

fn join_root(root: &str, path: &str) -> String {
	let path = if root.contains('?') {
		path.replacen('?', "&", 1)
	} else {
		path.to_string()
	};
	let path = path.strip_prefix('/').unwrap_or(&path);
	let separator = if root.ends_with('/') { "" } else { "/" };
	format!("{root}{separator}{path}")
}

/// Builds the final header set: defaults, caller headers over them, nonce
/// removed, JSON content type when the body is JSON.
pub fn prepare_headers(headers: &HeaderMap, body: &ApiBody) -> HeaderMap {
	let mut prepared = HeaderMap::new();
	prepared.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
	for name in headers.keys() {
		prepared.remove(name);
		for value in headers.get_all(name) {
			prepared.append(name.clone(), value.clone());
		}
	}
	prepared.remove(NONCE_HEADER);
	if matches!(body, ApiBody::Json(_)) {
		prepared.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	}
	prepared
}

/// Innermost handler: sends through the transport and interprets the response.
struct TransportHandler {
	settings: Arc<Settings>,
	transport: Rc<dyn Transport>,
}

#[async_trait(?Send)]
impl<C: 'static> Handler<C> for TransportHandler {
	async fn handle(&self, request: ApiRequest<C>) -> ApiResult {
		let url = resolve_url(&self.settings, &request.target);
		let headers = prepare_headers(&request.headers, &request.body);
		tracing::debug!(method = %request.method, url = %url, "sending api request");

		let response = self
			.transport
			.send(HttpRequest {
				method: request.method,
				url,
				headers,
				body: request.body,
			})
			.await
			.map_err(|e| {
				tracing::warn!(error = %e, "api request did not reach the server");
				ApiError::Fetch
			})?;

		if !response.is_success() {
			tracing::debug!(status = %response.status, "api request failed");
			return Err(ApiError::Http(response));
		}
		if response.status == StatusCode::NO_CONTENT {
			return Ok(None);
		}
		serde_json::from_slice(&response.body)
			.map(Some)
			.map_err(|_| ApiError::InvalidJson)
	}
}

/// The request pipeline.
///
/// Shared as `Rc<Pipeline<C>>` by every form on the page. Middleware can be
/// registered at any time; a request in flight keeps the chain it started
/// with.
pub struct Pipeline<C> {
	settings: Arc<Settings>,
	transport: Rc<dyn Transport>,
	/// Outermost first.
	middlewares: RefCell<Vec<Rc<dyn Middleware<C>>>>,
}

impl<C: 'static> Pipeline<C> {
	/// Creates a pipeline with no middleware.
	pub fn new(settings: Arc<Settings>, transport: Rc<dyn Transport>) -> Self {
		Self {
			settings,
			transport,
			middlewares: RefCell::new(Vec::new()),
		}
	}

	/// Starts a [`PipelineBuilder`].
	pub fn builder(settings: Arc<Settings>) -> PipelineBuilder<C> {
		PipelineBuilder::new(settings)
	}

	/// The settings requests are resolved against.
	pub fn settings(&self) -> &Arc<Settings> {
		&self.settings
	}

	/// Registers a middleware around the current chain.
	pub fn use_middleware(&self, middleware: Rc<dyn Middleware<C>>) {
		tracing::debug!(middleware = middleware.name(), "registering api middleware");
		self.middlewares.borrow_mut().insert(0, middleware);
	}

	/// Names of the registered middleware, outermost first.
	pub fn middleware_names(&self) -> Vec<String> {
		self.middlewares
			.borrow()
			.iter()
			.map(|mw| mw.name().to_string())
			.collect()
	}

	/// Resolves `target` against this pipeline's settings.
	pub fn resolve_url(&self, target: &ApiTarget) -> String {
		resolve_url(&self.settings, target)
	}

	/// Starts `request`: runs every [`Middleware::before`] hook of the chain
	/// right away and returns the rest of the request as a future.
	///
	/// The returned future does not borrow the pipeline, so it can be spawned.
	pub fn start(&self, request: ApiRequest<C>) -> ApiFuture {
		let middlewares: Vec<Rc<dyn Middleware<C>>> = self
			.middlewares
			.borrow()
			.iter()
			.filter(|mw| mw.should_continue(&request))
			.cloned()
			.collect();
		for middleware in &middlewares {
			middleware.before(&request);
		}

		let terminal: Rc<dyn Handler<C>> = Rc::new(TransportHandler {
			settings: self.settings.clone(),
			transport: self.transport.clone(),
		});
		let chain = compose(&middlewares, terminal, &request);
		Box::pin(async move { chain.handle(request).await })
	}

	/// Runs `request` through the middleware and the transport.
	///
	/// # Errors
	///
	/// See the module documentation for the error mapping.
	pub async fn fetch(&self, request: ApiRequest<C>) -> ApiResult {
		self.start(request).await
	}
}

#[async_trait(?Send)]
impl<C: 'static> Handler<C> for Pipeline<C> {
	async fn handle(&self, request: ApiRequest<C>) -> ApiResult {
		self.fetch(request).await
	}
}

/// Builder for [`Pipeline`].
pub struct PipelineBuilder<C> {
	settings: Arc<Settings>,
	transport: Option<Rc<dyn Transport>>,
	middlewares: Vec<Rc<dyn Middleware<C>>>,
}

impl<C: 'static> PipelineBuilder<C> {
	/// Creates a builder.
	pub fn new(settings: Arc<Settings>) -> Self {
		Self {
			settings,
			transport: None,
			middlewares: Vec::new(),
		}
	}

	/// Uses `transport` instead of [`ReqwestTransport`].
	pub fn transport(mut self, transport: Rc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Registers a middleware; later ones wrap earlier ones.
	pub fn middleware(mut self, middleware: Rc<dyn Middleware<C>>) -> Self {
		self.middlewares.insert(0, middleware);
		self
	}

	/// Builds the pipeline.
	pub fn build(self) -> Pipeline<C> {
		let transport = self
			.transport
			.unwrap_or_else(|| Rc::new(ReqwestTransport::new()));
		Pipeline {
			settings: self.settings,
			transport,
			middlewares: RefCell::new(self.middlewares),
		}
	}
}
