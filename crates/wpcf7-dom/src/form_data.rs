//! `FormData` construction from form controls.

use crate::document::Document;
use crate::node::{FileEntry, NodeId};
use crate::selector::Selector;
use serde::{Deserialize, Serialize};

/// A single entry value: text or a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
	/// Plain string value.
	Text(String),
	/// Uploaded file.
	File(FileEntry),
}

impl FormValue {
	/// Display text: the string itself, or the file name.
	pub fn as_text(&self) -> &str {
		match self {
			Self::Text(text) => text,
			Self::File(file) => &file.name,
		}
	}
}

impl From<&str> for FormValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for FormValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<FileEntry> for FormValue {
	fn from(value: FileEntry) -> Self {
		Self::File(value)
	}
}

/// Ordered multimap of form entries, serialized as `[[name, value], …]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
	entries: Vec<(String, FormValue)>,
}

impl FormData {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// `new FormData(form)`: every enabled, named, successful control of the form.
	pub fn from_form(doc: &Document, form: NodeId) -> Self {
		let mut data = Self::new();
		for control in doc.query_all(form, &Selector::form_controls()) {
			data.append_control(doc, control);
		}
		data
	}

	/// Appends the entries contributed by one control, following the
	/// submission rules per control type. Disabled and unnamed controls
	/// contribute nothing, as do button-like inputs.
	pub fn append_control(&mut self, doc: &Document, control: NodeId) {
		if doc.is_disabled(control) {
			return;
		}
		let Some(name) = doc.control_name(control) else {
			return;
		};
		let name = name.to_string();
		match doc.control_type(control).as_str() {
			"button" | "image" | "reset" | "submit" => {}
			"checkbox" | "radio" => {
				if doc.checked(control) {
					self.append(name, doc.value(control));
				}
			}
			"select-multiple" => {
				for option in doc.selected_options(control) {
					self.append(name.clone(), doc.option_value(option));
				}
			}
			"select-one" => {
				if let Some(&option) = doc.selected_options(control).first() {
					self.append(name, doc.option_value(option));
				}
			}
			"file" => {
				for file in doc.files(control) {
					self.append(name.clone(), file.clone());
				}
			}
			_ => self.append(name, doc.value(control)),
		}
	}

	/// Appends an entry.
	pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
		self.entries.push((name.into(), value.into()));
	}

	/// First value for `name`.
	pub fn get(&self, name: &str) -> Option<&FormValue> {
		self.entries
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value)
	}

	/// First value for `name` as text.
	pub fn get_text(&self, name: &str) -> Option<&str> {
		self.get(name).map(FormValue::as_text)
	}

	/// All values for `name`, in order.
	pub fn get_all(&self, name: &str) -> Vec<&FormValue> {
		self.entries
			.iter()
			.filter(|(key, _)| key == name)
			.map(|(_, value)| value)
			.collect()
	}

	/// Whether any entry has `name`.
	pub fn has(&self, name: &str) -> bool {
		self.entries.iter().any(|(key, _)| key == name)
	}

	/// Entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether there are no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<'a> IntoIterator for &'a FormData {
	type Item = &'a (String, FormValue);
	type IntoIter = std::slice::Iter<'a, (String, FormValue)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

impl IntoIterator for FormData {
	type Item = (String, FormValue);
	type IntoIter = std::vec::IntoIter<(String, FormValue)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}
