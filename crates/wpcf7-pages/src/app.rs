//! Page-level context shared by every form.

use crate::error::Result;
use crate::event::EventDetail;
use crate::reset::RefillMiddleware;
use crate::schema::{SchemaValidator, ValidateOptions};
use crate::state::FormHandle;
use crate::submit::{FeedbackMiddleware, FeedbackResponse};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use wpcf7_api::{Pipeline, ReqwestTransport, Transport};
use wpcf7_conf::Settings;
use wpcf7_dom::{Dom, NodeId};

/// API call a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
	/// `contact-forms/{id}/feedback`
	Feedback,
	/// `contact-forms/{id}/refill`
	Refill,
	/// `contact-forms/{id}/feedback/schema`
	Schema,
}

impl Endpoint {
	/// Endpoint path for form `id`, relative to the namespace.
	pub fn path(self, id: u64) -> String {
		match self {
			Self::Feedback => format!("contact-forms/{id}/feedback"),
			Self::Refill => format!("contact-forms/{id}/refill"),
			Self::Schema => format!("contact-forms/{id}/feedback/schema"),
		}
	}

	/// Short name used in logs and errors.
	pub fn name(self) -> &'static str {
		match self {
			Self::Feedback => "feedback",
			Self::Refill => "refill",
			Self::Schema => "schema",
		}
	}
}

/// Passthrough attached to form requests, read by the built-in middleware.
#[derive(Debug, Clone)]
pub struct FormContext {
	/// Which call this is.
	pub endpoint: Endpoint,
	/// The form issuing it.
	pub form: FormHandle,
	/// Detail snapshot taken before the request.
	pub detail: EventDetail,
}

/// Request pipeline carrying [`FormContext`].
pub type FormPipeline = Pipeline<FormContext>;

/// Everything the controllers need: the document, the settings, the
/// request pipeline and the optional schema validator.
///
/// Construct one per page. Cloning is cheap.
#[derive(Clone)]
pub struct Wpcf7 {
	dom: Dom,
	pipeline: Rc<FormPipeline>,
	validator: Option<Rc<dyn SchemaValidator>>,
	forms: Rc<RefCell<Vec<FormHandle>>>,
}

impl fmt::Debug for Wpcf7 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Wpcf7")
			.field("settings", self.settings())
			.field("middleware", &self.pipeline.middleware_names())
			.field("validator", &self.validator.is_some())
			.field("forms", &self.forms.borrow().len())
			.finish()
	}
}

impl Wpcf7 {
	/// Creates a context talking to the API over HTTP.
	pub fn new(dom: Dom, settings: Arc<Settings>) -> Self {
		Self::with_transport(dom, settings, Rc::new(ReqwestTransport::new()))
	}

	/// Creates a context with a custom transport.
	pub fn with_transport(dom: Dom, settings: Arc<Settings>, transport: Rc<dyn Transport>) -> Self {
		Self::from_pipeline(dom, Rc::new(Pipeline::new(settings, transport)))
	}

	/// Creates a context around an existing pipeline and registers the
	/// feedback and refill middleware on it.
	pub fn from_pipeline(dom: Dom, pipeline: Rc<FormPipeline>) -> Self {
		pipeline.use_middleware(Rc::new(FeedbackMiddleware));
		pipeline.use_middleware(Rc::new(RefillMiddleware));
		Self {
			dom,
			pipeline,
			validator: None,
			forms: Rc::default(),
		}
	}

	/// Sets the schema validator.
	pub fn with_validator(mut self, validator: Rc<dyn SchemaValidator>) -> Self {
		self.validator = Some(validator);
		self
	}

	/// The shared document.
	pub fn dom(&self) -> &Dom {
		&self.dom
	}

	/// The settings.
	pub fn settings(&self) -> &Arc<Settings> {
		self.pipeline.settings()
	}

	/// The request pipeline; embedders may register more middleware.
	pub fn pipeline(&self) -> &Rc<FormPipeline> {
		&self.pipeline
	}

	/// The schema validator.
	pub fn validator(&self) -> Option<&dyn SchemaValidator> {
		self.validator.as_deref()
	}

	/// The handle of an initialized form.
	pub fn form(&self, node: NodeId) -> Option<FormHandle> {
		self.forms
			.borrow()
			.iter()
			.find(|handle| handle.node() == node)
			.cloned()
	}

	/// Every initialized form.
	pub fn forms(&self) -> Vec<FormHandle> {
		self.forms.borrow().clone()
	}

	/// Tracks `handle`, replacing an earlier handle for the same node.
	pub(crate) fn register(&self, handle: FormHandle) {
		let mut forms = self.forms.borrow_mut();
		forms.retain(|existing| existing.node() != handle.node());
		forms.push(handle);
	}

	/// Initializes every `.wpcf7 > form` of the document.
	pub fn init_all(&self) -> Vec<FormHandle> {
		crate::init::init_all(self)
	}

	/// Initializes one form.
	pub fn init(&self, node: NodeId) -> FormHandle {
		crate::init::init(self, node)
	}

	/// Submits `form`. See [`submit`](crate::submit::submit).
	///
	/// # Errors
	///
	/// Returns a [`FormError`](crate::FormError) when the request fails.
	pub async fn submit(
		&self,
		form: &FormHandle,
		submitter: Option<NodeId>,
	) -> Result<Option<FeedbackResponse>> {
		crate::submit::submit(self, form, submitter).await
	}

	/// Refills `form`. See [`reset`](crate::reset::reset).
	///
	/// # Errors
	///
	/// Returns a [`FormError`](crate::FormError) when the request fails.
	pub async fn reset(&self, form: &FormHandle) -> Result<Option<serde_json::Value>> {
		crate::reset::reset(self, form).await
	}

	/// Validates `form` with the configured validator.
	pub fn validate(&self, form: &FormHandle, options: ValidateOptions) -> bool {
		crate::validation::validate(form, self.validator(), options)
	}
}
