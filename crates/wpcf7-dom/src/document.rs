//! Arena document: tree structure, attributes, classes and control state.

use crate::error::{DomError, Result};
use crate::node::{ElementData, FileEntry, Node, NodeId, NodeKind};
use crate::selector::Selector;

/// An HTML document held in an index arena.
///
/// Nodes are never freed; removing a node only detaches it from its
/// parent, so a stale [`NodeId`] keeps resolving to the detached subtree.
#[derive(Debug, Clone)]
pub struct Document {
	nodes: Vec<Node>,
	root: NodeId,
	active_element: Option<NodeId>,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self {
			nodes: vec![Node::new(NodeKind::Document)],
			root: NodeId(0),
			active_element: None,
		}
	}

	/// The document node.
	pub fn root(&self) -> NodeId {
		self.root
	}

	fn node(&self, id: NodeId) -> Result<&Node> {
		self.nodes.get(id.0).ok_or(DomError::NodeNotFound(id))
	}

	fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
		self.nodes.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
	}

	pub(crate) fn element(&self, id: NodeId) -> Option<&ElementData> {
		match self.nodes.get(id.0).map(|n| &n.kind) {
			Some(NodeKind::Element(data)) => Some(data),
			_ => None,
		}
	}

	pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
		match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
			Some(NodeKind::Element(data)) => Some(data),
			_ => None,
		}
	}

	// ------------------------------------------------------------------
	// Tree
	// ------------------------------------------------------------------

	/// Creates a detached element.
	pub fn create_element(&mut self, tag: &str) -> NodeId {
		self.push(NodeKind::Element(ElementData::new(tag)))
	}

	/// Creates a detached text node.
	pub fn create_text(&mut self, text: &str) -> NodeId {
		self.push(NodeKind::Text(text.to_string()))
	}

	pub(crate) fn create_with(&mut self, data: ElementData) -> NodeId {
		self.push(NodeKind::Element(data))
	}

	fn push(&mut self, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(Node::new(kind));
		id
	}

	/// Whether `id` is an element node.
	pub fn is_element(&self, id: NodeId) -> bool {
		self.element(id).is_some()
	}

	/// Parent of a node.
	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.nodes.get(id.0).and_then(|n| n.parent)
	}

	/// Direct children of a node.
	pub fn children(&self, id: NodeId) -> &[NodeId] {
		self.nodes
			.get(id.0)
			.map(|n| n.children.as_slice())
			.unwrap_or(&[])
	}

	/// Appends `child` as the last child of `parent`, detaching it first.
	pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
		self.check_insertion(parent, child)?;
		self.detach(child)?;
		self.node_mut(parent)?.children.push(child);
		self.node_mut(child)?.parent = Some(parent);
		Ok(())
	}

	/// Inserts `node` right after `reference` (`insertAdjacent*('afterend')`).
	pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<()> {
		let parent = self
			.parent(reference)
			.ok_or(DomError::Detached(reference))?;
		self.check_insertion(parent, node)?;
		self.detach(node)?;
		let siblings = &mut self.node_mut(parent)?.children;
		let position = siblings
			.iter()
			.position(|&c| c == reference)
			.map(|p| p + 1)
			.unwrap_or(siblings.len());
		siblings.insert(position, node);
		self.node_mut(node)?.parent = Some(parent);
		Ok(())
	}

	/// Detaches a node from its parent (`Element.remove()`).
	pub fn remove(&mut self, id: NodeId) -> Result<()> {
		self.detach(id)?;
		if self
			.active_element
			.is_some_and(|active| self.contains(id, active))
		{
			self.active_element = None;
		}
		Ok(())
	}

	/// Removes every child of a node.
	pub fn clear_children(&mut self, id: NodeId) -> Result<()> {
		let children = std::mem::take(&mut self.node_mut(id)?.children);
		for child in children {
			self.node_mut(child)?.parent = None;
		}
		Ok(())
	}

	fn detach(&mut self, id: NodeId) -> Result<()> {
		if let Some(parent) = self.node(id)?.parent {
			self.node_mut(parent)?.children.retain(|&c| c != id);
			self.node_mut(id)?.parent = None;
		}
		Ok(())
	}

	fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<()> {
		self.node(parent)?;
		self.node(child)?;
		if child == self.root || self.contains(child, parent) {
			return Err(DomError::HierarchyRequest { parent, child });
		}
		if matches!(self.node(parent)?.kind, NodeKind::Text(_)) {
			return Err(DomError::NotAnElement(parent));
		}
		Ok(())
	}

	/// Inclusive containment (`Node.contains`).
	pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
		let mut current = Some(node);
		while let Some(id) = current {
			if id == ancestor {
				return true;
			}
			current = self.parent(id);
		}
		false
	}

	/// Whether the node is attached to the document.
	pub fn is_connected(&self, id: NodeId) -> bool {
		self.contains(self.root, id)
	}

	/// Descendants in document order, excluding `id` itself.
	pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
		while let Some(next) = stack.pop() {
			out.push(next);
			stack.extend(self.children(next).iter().rev().copied());
		}
		out
	}

	/// `scope.querySelectorAll(selector)`.
	pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
		self.descendants(scope)
			.into_iter()
			.filter(|&id| self.matches(id, selector))
			.collect()
	}

	/// `scope.querySelector(selector)`.
	pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
		self.descendants(scope)
			.into_iter()
			.find(|&id| self.matches(id, selector))
	}

	/// `element.matches(selector)`.
	pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
		self.element(id).is_some_and(|e| selector.matches(e))
	}

	/// `element.closest(selector)`: the node itself or its nearest matching ancestor.
	pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
		let mut current = Some(id);
		while let Some(node) = current {
			if self.matches(node, selector) {
				return Some(node);
			}
			current = self.parent(node);
		}
		None
	}

	/// `document.getElementById(id)`.
	pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
		self.query(self.root, &Selector::id(id))
	}

	// ------------------------------------------------------------------
	// Attributes and classes
	// ------------------------------------------------------------------

	/// Lowercase tag name, empty for non-elements.
	pub fn tag_name(&self, id: NodeId) -> &str {
		self.element(id).map(|e| e.tag.as_str()).unwrap_or("")
	}

	/// Attribute value.
	pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
		self.element(id).and_then(|e| e.attr(name))
	}

	/// Whether the attribute is present.
	pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
		self.attr(id, name).is_some()
	}

	/// Sets an attribute. Ignored on non-elements.
	pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
		if let Some(element) = self.element_mut(id) {
			element.set_attr(name, value);
		}
	}

	/// Removes an attribute. Ignored on non-elements.
	pub fn remove_attr(&mut self, id: NodeId, name: &str) {
		if let Some(element) = self.element_mut(id) {
			element.remove_attr(name);
		}
	}

	/// `element.dataset[key]` where `key` is already in attribute form
	/// (`under-validation` reads `data-under-validation`).
	pub fn data(&self, id: NodeId, key: &str) -> Option<&str> {
		self.attr(id, &format!("data-{key}"))
	}

	/// Class tokens in attribute order.
	pub fn classes(&self, id: NodeId) -> Vec<String> {
		self.element(id).map(|e| e.classes()).unwrap_or_default()
	}

	/// `classList.contains`.
	pub fn has_class(&self, id: NodeId, class_name: &str) -> bool {
		self.element(id).is_some_and(|e| e.has_class(class_name))
	}

	/// `classList.add`. Adding an existing token is a no-op.
	pub fn add_class(&mut self, id: NodeId, class_name: &str) {
		if let Some(element) = self.element_mut(id) {
			let mut classes = element.classes();
			if !classes.iter().any(|c| c == class_name) {
				classes.push(class_name.to_string());
				element.set_classes(&classes);
			}
		}
	}

	/// `classList.remove`.
	pub fn remove_class(&mut self, id: NodeId, class_name: &str) {
		if let Some(element) = self.element_mut(id) {
			let mut classes = element.classes();
			let before = classes.len();
			classes.retain(|c| c != class_name);
			if classes.len() != before {
				element.set_classes(&classes);
			}
		}
	}

	/// `classList.replace`: swaps in place when `old` is present.
	pub fn replace_class(&mut self, id: NodeId, old: &str, new: &str) -> bool {
		let Some(element) = self.element_mut(id) else {
			return false;
		};
		let mut classes = element.classes();
		let Some(position) = classes.iter().position(|c| c == old) else {
			return false;
		};
		if classes.iter().any(|c| c == new) {
			classes.remove(position);
		} else {
			classes[position] = new.to_string();
		}
		element.set_classes(&classes);
		true
	}

	// ------------------------------------------------------------------
	// Text
	// ------------------------------------------------------------------

	/// Concatenated text of the subtree.
	pub fn text_content(&self, id: NodeId) -> String {
		if let Some(Node {
			kind: NodeKind::Text(text),
			..
		}) = self.nodes.get(id.0)
		{
			return text.clone();
		}
		self.descendants(id)
			.into_iter()
			.filter_map(|d| match &self.nodes[d.0].kind {
				NodeKind::Text(text) => Some(text.as_str()),
				_ => None,
			})
			.collect()
	}

	/// Replaces all children with a single text node (none for empty text).
	pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
		self.clear_children(id)?;
		if !text.is_empty() {
			let node = self.create_text(text);
			self.append_child(id, node)?;
		}
		Ok(())
	}

	/// `insertAdjacentText('beforeend', text)`.
	pub fn append_text(&mut self, id: NodeId, text: &str) -> Result<NodeId> {
		let node = self.create_text(text);
		self.append_child(id, node)?;
		Ok(node)
	}

	// ------------------------------------------------------------------
	// Form controls
	// ------------------------------------------------------------------

	/// The control `type` (`text`, `checkbox`, `select-multiple`, …).
	pub fn control_type(&self, id: NodeId) -> String {
		self.element(id).map(|e| e.control_type()).unwrap_or_default()
	}

	/// The control's `name` attribute.
	pub fn control_name(&self, id: NodeId) -> Option<&str> {
		self.attr(id, "name").filter(|n| !n.is_empty())
	}

	/// Current value. For checkable inputs without a value this is `"on"`;
	/// for selects it is the first selected option's value.
	pub fn value(&self, id: NodeId) -> String {
		let Some(element) = self.element(id) else {
			return String::new();
		};
		match element.control_type().as_str() {
			"checkbox" | "radio" => element.attr("value").unwrap_or("on").to_string(),
			"select-one" | "select-multiple" => self
				.selected_options(id)
				.first()
				.map(|&o| self.option_value(o))
				.unwrap_or_default(),
			_ => match element.tag.as_str() {
				"option" => self.option_value(id),
				_ => element.value.clone(),
			},
		}
	}

	/// Sets the live value of a control.
	///
	/// Hidden and button-like inputs are in "default" value mode: the value
	/// is their `value` attribute, so it survives a form reset.
	pub fn set_value(&mut self, id: NodeId, value: &str) {
		if let Some(element) = self.element_mut(id) {
			match element.control_type().as_str() {
				"checkbox" | "radio" => element.set_attr("value", value),
				"hidden" | "submit" | "button" | "reset" | "image" => {
					element.set_attr("value", value);
					element.value = value.to_string();
					element.default_value = value.to_string();
				}
				_ => element.value = value.to_string(),
			}
		}
	}

	/// The value restored by a form reset.
	pub fn default_value(&self, id: NodeId) -> String {
		self.element(id)
			.map(|e| e.default_value.clone())
			.unwrap_or_default()
	}

	/// Sets the value restored by a form reset.
	pub fn set_default_value(&mut self, id: NodeId, value: &str) {
		if let Some(element) = self.element_mut(id) {
			element.default_value = value.to_string();
		}
	}

	/// Checkedness of a checkbox or radio.
	pub fn checked(&self, id: NodeId) -> bool {
		self.element(id).is_some_and(|e| e.checked)
	}

	/// Sets checkedness; checking a radio unchecks same-named radios in its form.
	pub fn set_checked(&mut self, id: NodeId, checked: bool) {
		let radio_name = match self.element(id) {
			Some(e) if checked && e.control_type() == "radio" => e.attr("name").map(str::to_string),
			_ => None,
		};
		if let Some(name) = radio_name {
			let scope = self
				.closest(id, &Selector::tag("form"))
				.unwrap_or(self.root);
			let group = Selector::tag("input")
				.and(Selector::attr_eq("type", "radio"))
				.and(Selector::attr_eq("name", name));
			for other in self.query_all(scope, &group) {
				if let Some(element) = self.element_mut(other) {
					element.checked = false;
				}
			}
		}
		if let Some(element) = self.element_mut(id) {
			element.checked = checked;
		}
	}

	/// `:disabled` for a control (the `disabled` attribute).
	pub fn is_disabled(&self, id: NodeId) -> bool {
		self.has_attr(id, "disabled")
	}

	/// Toggles the `disabled` attribute.
	pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
		if disabled {
			self.set_attr(id, "disabled", "disabled");
		} else {
			self.remove_attr(id, "disabled");
		}
	}

	/// `<option>` descendants of a select.
	pub fn options(&self, select: NodeId) -> Vec<NodeId> {
		self.query_all(select, &Selector::tag("option"))
	}

	/// Selected options. A single select with nothing explicitly selected
	/// reports its first option, as browsers do.
	pub fn selected_options(&self, select: NodeId) -> Vec<NodeId> {
		let options = self.options(select);
		let selected: Vec<NodeId> = options
			.iter()
			.copied()
			.filter(|&o| self.element(o).is_some_and(|e| e.selected))
			.collect();
		if selected.is_empty() && self.control_type(select) == "select-one" {
			return options.into_iter().take(1).collect();
		}
		selected
	}

	/// Selects or deselects an option; single selects keep at most one.
	pub fn set_selected(&mut self, option: NodeId, selected: bool) {
		if selected {
			if let Some(select) = self.closest(option, &Selector::tag("select")) {
				if self.control_type(select) == "select-one" {
					for other in self.options(select) {
						if let Some(element) = self.element_mut(other) {
							element.selected = false;
						}
					}
				}
			}
		}
		if let Some(element) = self.element_mut(option) {
			element.selected = selected;
		}
	}

	/// Value of an `<option>`: its `value` attribute, else its text.
	pub fn option_value(&self, option: NodeId) -> String {
		self.attr(option, "value")
			.map(str::to_string)
			.unwrap_or_else(|| self.text_content(option))
	}

	/// Files chosen in a file input.
	pub fn files(&self, id: NodeId) -> &[FileEntry] {
		self.element(id).map(|e| e.files.as_slice()).unwrap_or(&[])
	}

	/// Replaces the chosen files of a file input.
	pub fn set_files(&mut self, id: NodeId, files: Vec<FileEntry>) {
		if let Some(element) = self.element_mut(id) {
			element.files = files;
		}
	}

	/// Message set by `setCustomValidity`, empty when valid.
	pub fn custom_validity(&self, id: NodeId) -> &str {
		self.element(id)
			.map(|e| e.custom_validity.as_str())
			.unwrap_or("")
	}

	/// `setCustomValidity`. Only form controls carry a validity message.
	pub fn set_custom_validity(&mut self, id: NodeId, message: &str) {
		if let Some(element) = self.element_mut(id) {
			if matches!(element.tag.as_str(), "input" | "select" | "textarea" | "button") {
				element.custom_validity = message.to_string();
			}
		}
	}

	/// Whether the element supports `setCustomValidity`.
	pub fn supports_validity(&self, id: NodeId) -> bool {
		matches!(
			self.tag_name(id),
			"input" | "select" | "textarea" | "button"
		)
	}

	/// Restores every control in the form to its default state
	/// (the effect of `HTMLFormElement.reset()` after the `reset` event).
	pub fn reset_controls(&mut self, form: NodeId) {
		for id in self.descendants(form) {
			if let Some(element) = self.element_mut(id) {
				match element.tag.as_str() {
					"input" | "textarea" => {
						element.value = element.default_value.clone();
						element.checked = element.default_checked;
						element.files.clear();
						element.custom_validity.clear();
					}
					"select" => element.custom_validity.clear(),
					"option" => element.selected = element.default_selected,
					_ => {}
				}
			}
		}
	}

	// ------------------------------------------------------------------
	// Focus
	// ------------------------------------------------------------------

	/// `document.activeElement`.
	pub fn active_element(&self) -> Option<NodeId> {
		self.active_element
	}

	pub(crate) fn set_active_element(&mut self, id: Option<NodeId>) {
		self.active_element = id;
	}
}
