//! Node storage for the arena document.

use serde::{Deserialize, Serialize};

/// Index of a node inside a [`Document`](crate::Document) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
	/// Returns the raw arena index.
	pub fn index(self) -> usize {
		self.0
	}
}

impl std::fmt::Display for NodeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A file selected in an `<input type="file">`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
	/// File name as reported by the browser.
	pub name: String,
	/// MIME type.
	#[serde(rename = "type", default)]
	pub content_type: String,
	/// Raw contents.
	#[serde(skip)]
	pub bytes: Vec<u8>,
}

impl FileEntry {
	/// Creates a file entry.
	pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
		Self {
			name: name.into(),
			content_type: content_type.into(),
			bytes,
		}
	}
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
	Document,
	Element(ElementData),
	Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
	pub(crate) parent: Option<NodeId>,
	pub(crate) children: Vec<NodeId>,
	pub(crate) kind: NodeKind,
}

impl Node {
	pub(crate) fn new(kind: NodeKind) -> Self {
		Self {
			parent: None,
			children: Vec::new(),
			kind,
		}
	}
}

/// Element state: markup attributes plus the live control state that
/// browsers keep outside the attribute map.
#[derive(Debug, Clone, Default)]
pub(crate) struct ElementData {
	pub(crate) tag: String,
	pub(crate) attrs: Vec<(String, String)>,
	pub(crate) value: String,
	pub(crate) default_value: String,
	pub(crate) checked: bool,
	pub(crate) default_checked: bool,
	pub(crate) selected: bool,
	pub(crate) default_selected: bool,
	pub(crate) files: Vec<FileEntry>,
	pub(crate) custom_validity: String,
}

impl ElementData {
	pub(crate) fn new(tag: &str) -> Self {
		Self {
			tag: tag.to_ascii_lowercase(),
			..Self::default()
		}
	}

	pub(crate) fn attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	pub(crate) fn set_attr(&mut self, name: &str, value: &str) {
		match self.attrs.iter_mut().find(|(key, _)| key == name) {
			Some((_, existing)) => *existing = value.to_string(),
			None => self.attrs.push((name.to_string(), value.to_string())),
		}
	}

	pub(crate) fn remove_attr(&mut self, name: &str) {
		self.attrs.retain(|(key, _)| key != name);
	}

	pub(crate) fn classes(&self) -> Vec<String> {
		self.attr("class")
			.map(|value| value.split_whitespace().map(ToOwned::to_owned).collect())
			.unwrap_or_default()
	}

	pub(crate) fn has_class(&self, class_name: &str) -> bool {
		self.attr("class")
			.map(|classes| classes.split_whitespace().any(|c| c == class_name))
			.unwrap_or(false)
	}

	pub(crate) fn set_classes(&mut self, classes: &[String]) {
		if classes.is_empty() {
			self.remove_attr("class");
		} else {
			self.set_attr("class", &classes.join(" "));
		}
	}

	/// The `type` IDL value of a form control.
	pub(crate) fn control_type(&self) -> String {
		match self.tag.as_str() {
			"input" => {
				let raw = self.attr("type").unwrap_or("text").to_ascii_lowercase();
				if raw.is_empty() { "text".to_string() } else { raw }
			}
			"select" => {
				if self.attr("multiple").is_some() {
					"select-multiple".to_string()
				} else {
					"select-one".to_string()
				}
			}
			"textarea" => "textarea".to_string(),
			"button" => self
				.attr("type")
				.map(|t| t.to_ascii_lowercase())
				.unwrap_or_else(|| "submit".to_string()),
			_ => String::new(),
		}
	}
}
