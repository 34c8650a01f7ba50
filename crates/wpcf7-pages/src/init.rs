//! Form bootstrap
//!
//! [`init_all`] picks up every `.wpcf7 > form` of the page. [`init`] reads
//! the form's hidden fields into its state, installs the markup helpers,
//! wires the DOM listeners and starts loading the validation schema:
//!
//! | Event | Reaction |
//! |---|---|
//! | window `load` | native reset when the page came from a cache |
//! | `reset` | [`start_reset`] before the controls are restored |
//! | `submit` | default prevented, [`start_submit`] |
//! | `wpcf7submit`, `wpcf7reset` | captcha/quiz refresh |
//! | `change` in a `.wpcf7-form-control` | validation up to the changed control |
//!
//! The requests of submit and reset, and the schema load, run on the local
//! executor; their failures are logged.

use crate::app::{Endpoint, Wpcf7};
use crate::error::{FormError, Result};
use crate::event::FormEvent;
use crate::helpers;
use crate::markers::CONTROL_CLASS;
use crate::refresh::refresh_from_response;
use crate::reset::start_reset;
use crate::schema::{Schema, ValidateOptions};
use crate::spawn::spawn_local;
use crate::state::FormHandle;
use crate::submit::start_submit;
use wpcf7_api::ApiRequest;
use wpcf7_dom::{NodeId, Selector};

/// Class of the container wrapping each form.
pub const CONTAINER_CLASS: &str = "wpcf7";

/// Initializes every `.wpcf7 > form` and flips its container from `no-js`
/// to `js`.
pub fn init_all(app: &Wpcf7) -> Vec<FormHandle> {
	let nodes: Vec<NodeId> = {
		let doc = app.dom().borrow();
		doc.query_all(doc.root(), &Selector::tag("form"))
			.into_iter()
			.filter(|&form| doc.parent(form).is_some_and(|p| doc.has_class(p, CONTAINER_CLASS)))
			.collect()
	};

	nodes
		.into_iter()
		.map(|node| {
			let form = init(app, node);
			let parent = form.state().parent;
			if let Some(container) = parent {
				app.dom().borrow_mut().replace_class(container, "no-js", "js");
			}
			form
		})
		.collect()
}

/// Initializes one form.
///
/// Listeners spawn work on the local executor, so natively this must run
/// inside a tokio `LocalSet`.
pub fn init(app: &Wpcf7, node: NodeId) -> FormHandle {
	let form = FormHandle::new(app.dom().clone(), node);
	app.register(form.clone());

	helpers::install(&form);
	wire_listeners(app, &form);

	let (app_for_schema, form_for_schema) = (app.clone(), form.clone());
	spawn_local(async move {
		// Failures are logged by `load_schema`.
		let _ = load_schema(&app_for_schema, &form_for_schema).await;
	});

	tracing::debug!(form = form.id(), unit_tag = %form.unit_tag(), "form initialized");
	form
}

fn wire_listeners(app: &Wpcf7, form: &FormHandle) {
	let dom = form.dom();
	let node = form.node();
	let root = dom.borrow().root();

	let cached = app.settings().cached;
	dom.add_event_listener(root, "load", move |dom, _| {
		if cached {
			dom.reset(node);
		}
	});

	// Middleware runs inside the listener, so a reset sees the typed values.
	let (reset_app, reset_form) = (app.clone(), form.clone());
	dom.add_event_listener(node, "reset", move |_, _| {
		let pending = start_reset(&reset_app, &reset_form);
		spawn_local(async move {
			let _ = pending.await;
		});
	});

	let (submit_app, submit_form) = (app.clone(), form.clone());
	dom.add_event_listener(node, "submit", move |_, event| {
		event.prevent_default();
		let pending = start_submit(&submit_app, &submit_form, event.submitter());
		spawn_local(async move {
			let _ = pending.await;
		});
	});

	for event in [FormEvent::Submit, FormEvent::Reset] {
		let form = form.clone();
		dom.add_event_listener(node, &event.dom_name(), move |_, dom_event| {
			if let Some(response) = dom_event.detail().and_then(|d| d.get("apiResponse")) {
				refresh_from_response(&form, response);
			}
		});
	}

	let (validate_app, validate_form) = (app.clone(), form.clone());
	dom.add_event_listener(node, "change", move |dom, event| {
		let target = event.target();
		let in_control = dom
			.borrow()
			.closest(target, &Selector::class(CONTROL_CLASS))
			.is_some();
		if in_control {
			validate_app.validate(&validate_form, ValidateOptions::target(target));
		}
	});
}

/// Fetches the validation schema of `form` and stores it.
///
/// # Errors
///
/// Returns [`FormError::Api`] when the request fails and
/// [`FormError::UnexpectedResponse`] when the body is not a schema. Both
/// are also logged.
pub async fn load_schema(app: &Wpcf7, form: &FormHandle) -> Result<Schema> {
	let request = ApiRequest::endpoint(Endpoint::Schema.path(form.id()));
	let loaded = match app.pipeline().fetch(request).await {
		Ok(Some(body)) => serde_json::from_value::<Schema>(body).map_err(|e| FormError::UnexpectedResponse {
			endpoint: Endpoint::Schema.name(),
			reason: e.to_string(),
		}),
		Ok(None) => Err(FormError::UnexpectedResponse {
			endpoint: Endpoint::Schema.name(),
			reason: "empty body".to_string(),
		}),
		Err(e) => Err(e.into()),
	};

	match loaded {
		Ok(schema) => {
			tracing::debug!(form = form.id(), rules = schema.rules.len(), "schema loaded");
			form.set_schema(schema.clone());
			Ok(schema)
		}
		Err(e) => {
			tracing::error!(form = form.id(), error = %e, "schema load failed");
			Err(e)
		}
	}
}
