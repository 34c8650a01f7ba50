//! Fluent element builder
//!
//! Builds detached element trees that are then inserted into a
//! [`Document`]. Markup attributes given here also seed the control
//! defaults used by form reset (`value`, `checked`, `selected`).
//!
//! ## Example
//!
//! ```
//! use wpcf7_dom::{Document, Selector, el};
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let form = el("form")
//!     .child(el("input").name("your-name").value("Jane"))
//!     .build_into(&mut doc, root)
//!     .unwrap();
//! let input = doc.query(form, &Selector::tag("input")).unwrap();
//! assert_eq!(doc.value(input), "Jane");
//! ```

use crate::document::Document;
use crate::error::Result;
use crate::node::{ElementData, FileEntry, NodeId};

enum Child {
	Element(ElementBuilder),
	Text(String),
}

/// HTML element builder with fluent API.
pub struct ElementBuilder {
	data: ElementData,
	children: Vec<Child>,
}

/// Starts a builder for `tag`.
pub fn el(tag: &str) -> ElementBuilder {
	ElementBuilder::new(tag)
}

impl ElementBuilder {
	/// Creates a builder for `tag`.
	pub fn new(tag: &str) -> Self {
		Self {
			data: ElementData::new(tag),
			children: Vec::new(),
		}
	}

	/// Sets an attribute.
	pub fn attr(mut self, name: &str, value: &str) -> Self {
		self.data.set_attr(name, value);
		self
	}

	/// Adds class tokens (space separated).
	pub fn class(mut self, class: &str) -> Self {
		let mut classes = self.data.classes();
		for token in class.split_whitespace() {
			if !classes.iter().any(|c| c == token) {
				classes.push(token.to_string());
			}
		}
		self.data.set_classes(&classes);
		self
	}

	/// Sets the `id` attribute.
	pub fn id(self, id: &str) -> Self {
		self.attr("id", id)
	}

	/// Sets the `name` attribute.
	pub fn name(self, name: &str) -> Self {
		self.attr("name", name)
	}

	/// Sets the `type` attribute.
	pub fn input_type(self, input_type: &str) -> Self {
		self.attr("type", input_type)
	}

	/// Sets the `value` attribute, which is also the reset default.
	pub fn value(mut self, value: &str) -> Self {
		self.data.set_attr("value", value);
		self.data.value = value.to_string();
		self.data.default_value = value.to_string();
		self
	}

	/// Sets the `checked` attribute.
	pub fn checked(mut self, checked: bool) -> Self {
		if checked {
			self.data.set_attr("checked", "checked");
		} else {
			self.data.remove_attr("checked");
		}
		self.data.checked = checked;
		self.data.default_checked = checked;
		self
	}

	/// Sets the `selected` attribute of an option.
	pub fn selected(mut self, selected: bool) -> Self {
		if selected {
			self.data.set_attr("selected", "selected");
		} else {
			self.data.remove_attr("selected");
		}
		self.data.selected = selected;
		self.data.default_selected = selected;
		self
	}

	/// Sets the `disabled` attribute.
	pub fn disabled(self, disabled: bool) -> Self {
		if disabled {
			self.attr("disabled", "disabled")
		} else {
			self
		}
	}

	/// Adds a chosen file (file inputs only).
	pub fn file(mut self, file: FileEntry) -> Self {
		self.data.files.push(file);
		self
	}

	/// Appends a text child. For `<textarea>` this is the initial value.
	pub fn text(mut self, text: &str) -> Self {
		if self.data.tag == "textarea" {
			self.data.value.push_str(text);
			self.data.default_value.push_str(text);
		}
		self.children.push(Child::Text(text.to_string()));
		self
	}

	/// Appends an element child.
	pub fn child(mut self, child: ElementBuilder) -> Self {
		self.children.push(Child::Element(child));
		self
	}

	/// Builds a detached tree and returns its root.
	pub fn build(self, doc: &mut Document) -> Result<NodeId> {
		let ElementBuilder { data, children } = self;
		let id = doc.create_with(data);
		for child in children {
			let node = match child {
				Child::Element(builder) => builder.build(doc)?,
				Child::Text(text) => doc.create_text(&text),
			};
			doc.append_child(id, node)?;
		}
		Ok(id)
	}

	/// Builds the tree and appends it to `parent`.
	pub fn build_into(self, doc: &mut Document, parent: NodeId) -> Result<NodeId> {
		let id = self.build(doc)?;
		doc.append_child(parent, id)?;
		Ok(id)
	}
}
