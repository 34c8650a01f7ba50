//! Shared document handle and event dispatch
//!
//! [`Dom`] is the single-threaded handle every component holds. Listener
//! callbacks receive the handle and may mutate the document freely: no
//! borrow of the document or of the listener table is held while a
//! listener runs.

use crate::document::Document;
use crate::node::NodeId;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

/// Event listener callback.
pub type Listener = Rc<dyn Fn(&Dom, &Event)>;

/// A dispatched event.
#[derive(Debug)]
pub struct Event {
	name: String,
	target: NodeId,
	bubbles: bool,
	detail: Option<serde_json::Value>,
	submitter: Option<NodeId>,
	current_target: Cell<NodeId>,
	default_prevented: Cell<bool>,
	propagation_stopped: Cell<bool>,
}

impl Event {
	/// A bubbling event with no detail.
	pub fn new(name: impl Into<String>, target: NodeId) -> Self {
		Self {
			name: name.into(),
			target,
			bubbles: true,
			detail: None,
			submitter: None,
			current_target: Cell::new(target),
			default_prevented: Cell::new(false),
			propagation_stopped: Cell::new(false),
		}
	}

	/// A bubbling `CustomEvent` carrying `detail`.
	pub fn custom(name: impl Into<String>, target: NodeId, detail: serde_json::Value) -> Self {
		Self {
			detail: Some(detail),
			..Self::new(name, target)
		}
	}

	/// Disables bubbling.
	pub fn non_bubbling(mut self) -> Self {
		self.bubbles = false;
		self
	}

	/// Sets the submitter of a `submit` event.
	pub fn with_submitter(mut self, submitter: Option<NodeId>) -> Self {
		self.submitter = submitter;
		self
	}

	/// Event type.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Node the event was dispatched on.
	pub fn target(&self) -> NodeId {
		self.target
	}

	/// Node whose listener is currently running.
	pub fn current_target(&self) -> NodeId {
		self.current_target.get()
	}

	/// Whether the event propagates to ancestors.
	pub fn bubbles(&self) -> bool {
		self.bubbles
	}

	/// `CustomEvent.detail`.
	pub fn detail(&self) -> Option<&serde_json::Value> {
		self.detail.as_ref()
	}

	/// `SubmitEvent.submitter`.
	pub fn submitter(&self) -> Option<NodeId> {
		self.submitter
	}

	/// `preventDefault()`.
	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	/// Whether `preventDefault()` was called.
	pub fn default_prevented(&self) -> bool {
		self.default_prevented.get()
	}

	/// `stopPropagation()`.
	pub fn stop_propagation(&self) {
		self.propagation_stopped.set(true);
	}
}

#[derive(Default)]
struct Listeners {
	by_node: HashMap<(NodeId, String), Vec<Listener>>,
}

/// Shared, single-threaded handle to a document and its listeners.
#[derive(Clone, Default)]
pub struct Dom {
	document: Rc<RefCell<Document>>,
	listeners: Rc<RefCell<Listeners>>,
}

impl std::fmt::Debug for Dom {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dom")
			.field("nodes", &self.document.try_borrow().map(|d| d.descendants(d.root()).len()).ok())
			.finish()
	}
}

impl Dom {
	/// Wraps a document.
	pub fn new(document: Document) -> Self {
		Self {
			document: Rc::new(RefCell::new(document)),
			listeners: Rc::default(),
		}
	}

	/// Immutable access to the document.
	pub fn borrow(&self) -> Ref<'_, Document> {
		self.document.borrow()
	}

	/// Mutable access to the document.
	pub fn borrow_mut(&self) -> RefMut<'_, Document> {
		self.document.borrow_mut()
	}

	/// Whether two handles point at the same document.
	pub fn ptr_eq(&self, other: &Dom) -> bool {
		Rc::ptr_eq(&self.document, &other.document)
	}

	/// `addEventListener(name, listener)`.
	pub fn add_event_listener<F>(&self, node: NodeId, name: &str, listener: F)
	where
		F: Fn(&Dom, &Event) + 'static,
	{
		self.listeners
			.borrow_mut()
			.by_node
			.entry((node, name.to_string()))
			.or_default()
			.push(Rc::new(listener));
	}

	/// Number of listeners registered for `name` on `node`.
	pub fn listener_count(&self, node: NodeId, name: &str) -> usize {
		self.listeners
			.borrow()
			.by_node
			.get(&(node, name.to_string()))
			.map(Vec::len)
			.unwrap_or(0)
	}

	/// Dispatches an event along the target's ancestor path.
	///
	/// Returns `false` when a listener called `prevent_default`.
	pub fn dispatch_event(&self, event: Event) -> bool {
		let path = {
			let doc = self.borrow();
			let mut path = vec![event.target];
			if event.bubbles {
				let mut current = doc.parent(event.target);
				while let Some(node) = current {
					path.push(node);
					current = doc.parent(node);
				}
			}
			path
		};

		for node in path {
			let snapshot: Vec<Listener> = self
				.listeners
				.borrow()
				.by_node
				.get(&(node, event.name.clone()))
				.cloned()
				.unwrap_or_default();
			event.current_target.set(node);
			for listener in snapshot {
				listener(self, &event);
			}
			if event.propagation_stopped.get() {
				break;
			}
		}
		!event.default_prevented()
	}

	/// Fires `submit` on a form. Returns `false` when a listener prevented
	/// the native navigation.
	pub fn submit(&self, form: NodeId, submitter: Option<NodeId>) -> bool {
		self.dispatch_event(Event::new("submit", form).with_submitter(submitter))
	}

	/// `HTMLFormElement.reset()`: fires `reset`, then restores control
	/// defaults unless the event was cancelled.
	pub fn reset(&self, form: NodeId) {
		if self.dispatch_event(Event::new("reset", form)) {
			self.borrow_mut().reset_controls(form);
		}
	}

	/// Fires a bubbling `change` on a control.
	pub fn change(&self, node: NodeId) {
		self.dispatch_event(Event::new("change", node));
	}

	/// Fires a bubbling `keyup` on a control.
	pub fn keyup(&self, node: NodeId) {
		self.dispatch_event(Event::new("keyup", node));
	}

	/// Fires the window `load` event (listeners registered on the document node).
	pub fn fire_load(&self) {
		let root = self.borrow().root();
		self.dispatch_event(Event::new("load", root).non_bubbling());
	}

	/// `element.focus()`: moves focus and fires a non-bubbling `focus`.
	pub fn focus(&self, node: NodeId) {
		self.borrow_mut().set_active_element(Some(node));
		self.dispatch_event(Event::new("focus", node).non_bubbling());
	}

	/// Fires a bubbling `click`.
	pub fn click(&self, node: NodeId) {
		self.dispatch_event(Event::new("click", node));
	}
}
