//! Reflection outputs mirroring the valid values of a field.
//!
//! `[data-reflection-of="field"]` is either an `<output>` showing the first
//! valid value (or its `data-default` text), or a container whose generated
//! `<output>` children are rebuilt on every pass. A container's
//! `<output data-default>` placeholder is never removed: it is shown when
//! there are no valid values and hidden otherwise.

use crate::state::FormHandle;
use wpcf7_dom::{FormValue, Selector, el};

/// Updates every reflection of `field` with `valid_inputs`.
pub fn update_reflection(form: &FormHandle, field: &str, valid_inputs: &[FormValue]) {
	let mut doc = form.dom().borrow_mut();
	let reflections = doc.query_all(form.node(), &Selector::attr_eq("data-reflection-of", field));

	for reflection in reflections {
		if doc.tag_name(reflection) == "output" {
			let text = match valid_inputs.first() {
				Some(value) => value.as_text().to_string(),
				None => doc.data(reflection, "default").unwrap_or_default().to_string(),
			};
			let _ = doc.set_text_content(reflection, &text);
			continue;
		}

		for output in doc.query_all(reflection, &Selector::tag("output")) {
			if doc.has_attr(output, "data-default") {
				if valid_inputs.is_empty() {
					doc.remove_attr(output, "hidden");
				} else {
					doc.set_attr(output, "hidden", "hidden");
				}
			} else {
				let _ = doc.remove(output);
			}
		}

		for value in valid_inputs {
			let built = el("output")
				.name(field)
				.text(value.as_text())
				.build_into(&mut doc, reflection);
			if let Err(e) = built {
				tracing::warn!(field, error = %e, "could not append reflection output");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use wpcf7_dom::{Document, Dom, FileEntry, NodeId};

	fn setup() -> (FormHandle, NodeId, NodeId) {
		let mut doc = Document::new();
		let root = doc.root();
		let form = el("form").build_into(&mut doc, root).unwrap();
		let single = el("output")
			.attr("data-reflection-of", "size")
			.attr("data-default", "Pick a size")
			.build_into(&mut doc, form)
			.unwrap();
		let list = el("div")
			.attr("data-reflection-of", "size")
			.child(el("output").attr("data-default", "").attr("hidden", "hidden").text("None yet"))
			.build_into(&mut doc, form)
			.unwrap();
		(FormHandle::new(Dom::new(doc), form), single, list)
	}

	fn outputs(form: &FormHandle, list: NodeId) -> Vec<(String, bool)> {
		let doc = form.dom().borrow();
		doc.query_all(list, &Selector::tag("output"))
			.into_iter()
			.map(|o| (doc.text_content(o), doc.has_attr(o, "hidden")))
			.collect()
	}

	#[rstest]
	fn test_values_are_reflected() {
		let (form, single, list) = setup();
		let values = vec![
			FormValue::from("M"),
			FormValue::from(FileEntry::new("brochure.pdf", "application/pdf", vec![])),
		];

		update_reflection(&form, "size", &values);

		assert_eq!(form.dom().borrow().text_content(single), "M");
		assert_eq!(
			outputs(&form, list),
			vec![
				("None yet".to_string(), true),
				("M".to_string(), false),
				("brochure.pdf".to_string(), false),
			]
		);
	}

	#[rstest]
	fn test_empty_restores_placeholder_once() {
		let (form, single, list) = setup();
		update_reflection(&form, "size", &[FormValue::from("L")]);

		update_reflection(&form, "size", &[]);
		update_reflection(&form, "size", &[]);

		assert_eq!(form.dom().borrow().text_content(single), "Pick a size");
		assert_eq!(outputs(&form, list), vec![("None yet".to_string(), false)]);
	}
}
