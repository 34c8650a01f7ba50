//! Per-form state and the handle controllers operate on.

use crate::event::{EventDetail, EventPayload, FormEvent};
use crate::schema::Schema;
use crate::status::Status;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use wpcf7_dom::{Document, Dom, FormData, NodeId, Selector};

/// Hidden field carrying the form id.
pub const ID_FIELD: &str = "_wpcf7";
/// Hidden field carrying the plugin version.
pub const VERSION_FIELD: &str = "_wpcf7_version";
/// Hidden field carrying the locale.
pub const LOCALE_FIELD: &str = "_wpcf7_locale";
/// Hidden field carrying the unit tag.
pub const UNIT_TAG_FIELD: &str = "_wpcf7_unit_tag";
/// Hidden field carrying the container post id.
pub const CONTAINER_POST_FIELD: &str = "_wpcf7_container_post";

/// State attached to one form element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
	/// Form id.
	pub id: u64,
	/// Current status.
	pub status: Status,
	/// Plugin version, passed through.
	pub plugin_version: String,
	/// Locale, passed through.
	pub locale: String,
	/// Unit tag distinguishing copies of the same form on one page.
	pub unit_tag: String,
	/// Post containing the form, 0 when absent.
	pub container_post_id: u64,
	/// Closest `.wpcf7` container.
	pub parent: Option<NodeId>,
	/// Validation schema, absent until loaded.
	pub schema: Option<Schema>,
	/// Set after a successful send, consumed by the next reset.
	pub reset_on_mail_sent: bool,
}

impl FormState {
	/// Reads the hidden fields and the server-rendered `data-status` of `form`.
	pub fn from_form(doc: &Document, form: NodeId) -> Self {
		let data = FormData::from_form(doc, form);
		let text = |name: &str| data.get_text(name).unwrap_or_default().to_string();
		let status = doc
			.attr(form, "data-status")
			.filter(|s| !s.trim().is_empty())
			.map(Status::from_raw)
			.unwrap_or_default();

		Self {
			id: abs_int(data.get_text(ID_FIELD)),
			status,
			plugin_version: text(VERSION_FIELD),
			locale: text(LOCALE_FIELD),
			unit_tag: text(UNIT_TAG_FIELD),
			container_post_id: abs_int(data.get_text(CONTAINER_POST_FIELD)),
			parent: doc.closest(form, &Selector::class("wpcf7")),
			schema: None,
			reset_on_mail_sent: false,
		}
	}
}

/// Absolute value of the leading integer of `raw`; 0 when there is none.
pub fn abs_int(raw: Option<&str>) -> u64 {
	let Some(raw) = raw else {
		return 0;
	};
	let raw = raw.trim_start();
	let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
	let end = digits
		.find(|c: char| !c.is_ascii_digit())
		.unwrap_or(digits.len());
	digits[..end].parse().unwrap_or(0)
}

/// Handle to an initialized form: the shared document, the form node and
/// its state.
///
/// Cloning is cheap and every clone sees the same state.
#[derive(Clone)]
pub struct FormHandle {
	dom: Dom,
	node: NodeId,
	state: Rc<RefCell<FormState>>,
}

impl fmt::Debug for FormHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("FormHandle");
		s.field("node", &self.node);
		if let Ok(state) = self.state.try_borrow() {
			s.field("id", &state.id).field("status", &state.status);
		}
		s.finish()
	}
}

impl FormHandle {
	/// Creates a handle, reading the initial state from the DOM.
	pub fn new(dom: Dom, node: NodeId) -> Self {
		let state = FormState::from_form(&dom.borrow(), node);
		Self::with_state(dom, node, state)
	}

	/// Creates a handle with an explicit state.
	pub fn with_state(dom: Dom, node: NodeId, state: FormState) -> Self {
		Self {
			dom,
			node,
			state: Rc::new(RefCell::new(state)),
		}
	}

	/// The shared document.
	pub fn dom(&self) -> &Dom {
		&self.dom
	}

	/// The form element.
	pub fn node(&self) -> NodeId {
		self.node
	}

	/// Borrows the state.
	pub fn state(&self) -> Ref<'_, FormState> {
		self.state.borrow()
	}

	/// Mutably borrows the state. Never hold this across an await or a
	/// listener call.
	pub fn state_mut(&self) -> RefMut<'_, FormState> {
		self.state.borrow_mut()
	}

	/// Form id.
	pub fn id(&self) -> u64 {
		self.state.borrow().id
	}

	/// Current status.
	pub fn status(&self) -> Status {
		self.state.borrow().status.clone()
	}

	/// Unit tag.
	pub fn unit_tag(&self) -> String {
		self.state.borrow().unit_tag.clone()
	}

	/// Clone of the loaded schema.
	pub fn schema(&self) -> Option<Schema> {
		self.state.borrow().schema.clone()
	}

	/// Stores a schema; the last write wins.
	pub fn set_schema(&self, schema: Schema) {
		self.state.borrow_mut().schema = Some(schema);
	}

	/// Whether the next reset keeps the sent status.
	pub fn reset_on_mail_sent(&self) -> bool {
		self.state.borrow().reset_on_mail_sent
	}

	/// Whether two handles share the same state.
	pub fn ptr_eq(&self, other: &FormHandle) -> bool {
		Rc::ptr_eq(&self.state, &other.state)
	}

	/// Collects every successful control of the form.
	pub fn form_data(&self) -> FormData {
		FormData::from_form(&self.dom.borrow(), self.node)
	}

	/// Snapshot of the state with `form_data` attached.
	pub fn detail(&self, form_data: FormData) -> EventDetail {
		EventDetail::snapshot(&self.state.borrow(), form_data)
	}

	/// Subscribes to a lifecycle event of this form.
	///
	/// ```
	/// use std::cell::Cell;
	/// use std::rc::Rc;
	/// use wpcf7_dom::{Document, Dom, el};
	/// use wpcf7_pages::{FormEvent, FormHandle, set_status};
	///
	/// let mut doc = Document::new();
	/// let root = doc.root();
	/// let form = el("form").build_into(&mut doc, root).unwrap();
	/// let handle = FormHandle::new(Dom::new(doc), form);
	///
	/// let changes = Rc::new(Cell::new(0));
	/// let counter = changes.clone();
	/// handle.on(FormEvent::StatusChanged, move |_| counter.set(counter.get() + 1));
	///
	/// set_status(&handle, "submitting");
	/// set_status(&handle, "submitting");
	/// assert_eq!(changes.get(), 1);
	/// ```
	pub fn on<F>(&self, event: FormEvent, callback: F)
	where
		F: Fn(&EventPayload) + 'static,
	{
		self.dom
			.add_event_listener(self.node, &event.dom_name(), move |_, dom_event| {
				let Some(detail) = dom_event.detail() else {
					return;
				};
				match EventPayload::decode(event, detail) {
					Some(payload) => callback(&payload),
					None => tracing::warn!(event = event.name(), "undecodable event detail"),
				}
			});
	}
}
