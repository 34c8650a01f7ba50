//! Inline validation error markers
//!
//! A marker is a `<span class="wpcf7-not-valid-tip">` appended to every
//! field wrap of the field, plus the accessibility wiring on the wrap's
//! controls:
//!
//! - `[aria-invalid]` elements become `aria-invalid="true"`
//! - controls get the `wpcf7-not-valid` class and a custom validity message
//! - controls point at the tip through `aria-describedby`, except file
//!   inputs (tip id appended to `aria-labelledby`) and `fieldset`/`span`
//!   groups (the attribute goes on their inner inputs)
//! - inside `.use-floating-validation-tip`, the tip hides when the control
//!   gains focus or the tip is clicked
//!
//! The tip id comes from [`error_id`] so the same field always gets the same id.

use crate::state::FormHandle;
use crate::status::Status;
use wpcf7_dom::{Document, NodeId, Selector, el};

/// Class of field wraps.
pub const WRAP_CLASS: &str = "wpcf7-form-control-wrap";
/// Class of form controls.
pub const CONTROL_CLASS: &str = "wpcf7-form-control";
/// Class of error tips.
pub const TIP_CLASS: &str = "wpcf7-not-valid-tip";
/// Class added to invalid controls.
pub const NOT_VALID_CLASS: &str = "wpcf7-not-valid";
/// Class of response output regions.
pub const RESPONSE_OUTPUT_CLASS: &str = "wpcf7-response-output";
/// Class enabling floating tips.
pub const FLOATING_TIP_CLASS: &str = "use-floating-validation-tip";

/// Id of the error tip of `field` in the form instance `unit_tag`.
///
/// Every character outside `[0-9a-zA-Z_-]` is dropped.
///
/// ```
/// use wpcf7_pages::error_id;
///
/// assert_eq!(error_id("wpcf7-f12-o1", "your-email"), "wpcf7-f12-o1-ve-your-email");
/// assert_eq!(error_id("wpcf7-f12-o1", "menu[]"), "wpcf7-f12-o1-ve-menu");
/// ```
pub fn error_id(unit_tag: &str, field: &str) -> String {
	format!("{unit_tag}-ve-{field}")
		.chars()
		.filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
		.collect()
}

/// Field wraps of `field`.
pub fn wrap_selector(field: &str) -> Selector {
	Selector::class(WRAP_CLASS).and(Selector::attr_eq("data-name", field))
}

fn is_group(doc: &Document, control: NodeId) -> bool {
	matches!(doc.tag_name(control), "fieldset" | "span")
}

/// Renders an error marker for `field` in every matching wrap of `scope`
/// (the form when `None`).
///
/// While the form is validating, wraps not marked `data-under-validation`
/// are left alone.
pub fn set_validation_error(form: &FormHandle, field: &str, message: &str, scope: Option<NodeId>) {
	let id = error_id(&form.unit_tag(), field);
	let validating = form.status() == Status::Validating;
	let scope = scope.unwrap_or(form.node());
	let mut floating: Vec<(NodeId, NodeId)> = Vec::new();

	{
		let mut doc = form.dom().borrow_mut();
		for wrap in doc.query_all(scope, &wrap_selector(field)) {
			if validating && !doc.has_attr(wrap, "data-under-validation") {
				continue;
			}

			let tip = match el("span")
				.class(TIP_CLASS)
				.id(&id)
				.text(message)
				.build_into(&mut doc, wrap)
			{
				Ok(tip) => tip,
				Err(e) => {
					tracing::warn!(field, error = %e, "could not attach validation tip");
					continue;
				}
			};

			for node in doc.query_all(wrap, &Selector::attr("aria-invalid")) {
				doc.set_attr(node, "aria-invalid", "true");
			}

			for control in doc.query_all(wrap, &Selector::class(CONTROL_CLASS)) {
				doc.add_class(control, NOT_VALID_CLASS);

				if doc.control_type(control) == "file" {
					let labelled_by = match doc.attr(control, "aria-labelledby") {
						Some(existing) if !existing.is_empty() => format!("{existing} {id}"),
						_ => id.clone(),
					};
					doc.set_attr(control, "aria-labelledby", &labelled_by);
					doc.remove_attr(control, "aria-describedby");
				} else if is_group(&doc, control) {
					for input in doc.query_all(control, &Selector::tag("input")) {
						doc.set_attr(input, "aria-describedby", &id);
					}
				} else {
					doc.set_attr(control, "aria-describedby", &id);
				}

				if doc.supports_validity(control) {
					doc.set_custom_validity(control, message);
				}

				if doc.closest(control, &Selector::class(FLOATING_TIP_CLASS)).is_some() {
					floating.push((control, tip));
				}
			}
		}
	}

	for (control, tip) in floating {
		form.dom().add_event_listener(control, "focus", move |dom, _| {
			dom.borrow_mut().set_attr(tip, "style", "display: none");
		});
		form.dom().add_event_listener(tip, "click", move |dom, _| {
			dom.borrow_mut().set_attr(tip, "style", "display: none");
		});
	}
}

/// Removes the error marker of `field` from every wrap in the form.
pub fn remove_validation_error(form: &FormHandle, field: &str) {
	let id = error_id(&form.unit_tag(), field);
	let mut doc = form.dom().borrow_mut();

	for wrap in doc.query_all(form.node(), &wrap_selector(field)) {
		if let Some(tip) = doc.query(wrap, &Selector::class(TIP_CLASS)) {
			let _ = doc.remove(tip);
		}

		for node in doc.query_all(wrap, &Selector::attr("aria-invalid")) {
			doc.set_attr(node, "aria-invalid", "false");
		}

		for control in doc.query_all(wrap, &Selector::class(CONTROL_CLASS)) {
			if is_group(&doc, control) {
				for input in doc.query_all(control, &Selector::tag("input")) {
					doc.remove_attr(input, "aria-describedby");
				}
			}

			if doc.attr(control, "type") == Some("file") {
				if let Some(labelled_by) = doc.attr(control, "aria-labelledby") {
					let kept = labelled_by
						.split(' ')
						.filter(|token| *token != id)
						.collect::<Vec<_>>()
						.join(" ");
					doc.set_attr(control, "aria-labelledby", &kept);
				}
			}

			doc.remove_attr(control, "aria-describedby");
			doc.remove_class(control, NOT_VALID_CLASS);
			if doc.supports_validity(control) {
				doc.set_custom_validity(control, "");
			}
		}
	}
}

/// Clears every field marker and empties the response outputs.
pub fn clear_response(form: &FormHandle) {
	let fields: Vec<String> = {
		let doc = form.dom().borrow();
		doc.query_all(form.node(), &Selector::class(WRAP_CLASS))
			.into_iter()
			.filter_map(|wrap| doc.data(wrap, "name").map(str::to_string))
			.filter(|name| !name.is_empty())
			.collect()
	};
	for field in &fields {
		remove_validation_error(form, field);
	}

	let mut doc = form.dom().borrow_mut();
	for output in doc.query_all(form.node(), &Selector::class(RESPONSE_OUTPUT_CLASS)) {
		let _ = doc.clear_children(output);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::status::set_status;
	use rstest::{fixture, rstest};
	use wpcf7_dom::{Dom, ElementBuilder};

	fn wrap(name: &str, control: ElementBuilder) -> ElementBuilder {
		el("span").class(WRAP_CLASS).attr("data-name", name).child(control)
	}

	#[fixture]
	fn form() -> FormHandle {
		let mut doc = wpcf7_dom::Document::new();
		let root = doc.root();
		let node = el("form")
			.child(el("input").input_type("hidden").name("_wpcf7_unit_tag").value("wpcf7-f1-o1"))
			.child(wrap(
				"your-email",
				el("input")
					.class(CONTROL_CLASS)
					.name("your-email")
					.attr("aria-invalid", "false"),
			))
			.child(wrap(
				"cv",
				el("input")
					.input_type("file")
					.class(CONTROL_CLASS)
					.name("cv")
					.attr("aria-labelledby", "cv-label"),
			))
			.child(wrap(
				"menu",
				el("span")
					.class(CONTROL_CLASS)
					.child(el("input").input_type("checkbox").name("menu[]").value("a"))
					.child(el("input").input_type("checkbox").name("menu[]").value("b")),
			))
			.child(el("div").class(RESPONSE_OUTPUT_CLASS).text("Old message"))
			.build_into(&mut doc, root)
			.unwrap();
		FormHandle::new(Dom::new(doc), node)
	}

	fn control(form: &FormHandle, name: &str) -> NodeId {
		form.dom()
			.borrow()
			.query(form.node(), &Selector::attr_eq("name", name))
			.unwrap()
	}

	#[rstest]
	fn test_set_marks_text_control(form: FormHandle) {
		set_validation_error(&form, "your-email", "Invalid email", None);

		let input = control(&form, "your-email");
		let doc = form.dom().borrow();
		let tip = doc.get_element_by_id("wpcf7-f1-o1-ve-your-email").unwrap();
		assert!(doc.has_class(tip, TIP_CLASS));
		assert_eq!(doc.text_content(tip), "Invalid email");
		assert_eq!(doc.attr(input, "aria-invalid"), Some("true"));
		assert_eq!(doc.attr(input, "aria-describedby"), Some("wpcf7-f1-o1-ve-your-email"));
		assert!(doc.has_class(input, NOT_VALID_CLASS));
		assert_eq!(doc.custom_validity(input), "Invalid email");
	}

	#[rstest]
	fn test_file_control_uses_labelledby(form: FormHandle) {
		set_validation_error(&form, "cv", "Too large", None);
		let input = control(&form, "cv");
		{
			let doc = form.dom().borrow();
			assert_eq!(doc.attr(input, "aria-labelledby"), Some("cv-label wpcf7-f1-o1-ve-cv"));
			assert!(!doc.has_attr(input, "aria-describedby"));
		}

		remove_validation_error(&form, "cv");
		let doc = form.dom().borrow();
		assert_eq!(doc.attr(input, "aria-labelledby"), Some("cv-label"));
		assert!(!doc.has_class(input, NOT_VALID_CLASS));
	}

	#[rstest]
	fn test_group_control_describes_inner_inputs(form: FormHandle) {
		set_validation_error(&form, "menu", "Pick one", None);
		{
			let doc = form.dom().borrow();
			let inputs = doc.query_all(form.node(), &Selector::attr_eq("name", "menu[]"));
			assert_eq!(inputs.len(), 2);
			for input in inputs {
				assert_eq!(doc.attr(input, "aria-describedby"), Some("wpcf7-f1-o1-ve-menu"));
			}
		}

		remove_validation_error(&form, "menu");
		let doc = form.dom().borrow();
		for input in doc.query_all(form.node(), &Selector::attr_eq("name", "menu[]")) {
			assert!(!doc.has_attr(input, "aria-describedby"));
		}
	}

	#[rstest]
	fn test_validating_skips_wraps_not_under_validation(form: FormHandle) {
		set_status(&form, "validating");
		set_validation_error(&form, "your-email", "Invalid email", None);
		assert!(form.dom().borrow().get_element_by_id("wpcf7-f1-o1-ve-your-email").is_none());

		let wrap = {
			let doc = form.dom().borrow();
			doc.query(form.node(), &wrap_selector("your-email")).unwrap()
		};
		form.dom().borrow_mut().set_attr(wrap, "data-under-validation", "1");
		set_validation_error(&form, "your-email", "Invalid email", None);
		assert!(form.dom().borrow().get_element_by_id("wpcf7-f1-o1-ve-your-email").is_some());
	}

	#[rstest]
	fn test_clear_response(form: FormHandle) {
		set_validation_error(&form, "your-email", "Invalid email", None);
		set_validation_error(&form, "cv", "Too large", None);

		clear_response(&form);

		let doc = form.dom().borrow();
		assert!(doc.query(form.node(), &Selector::class(TIP_CLASS)).is_none());
		assert!(doc.query(form.node(), &Selector::class(NOT_VALID_CLASS)).is_none());
		let output = doc.query(form.node(), &Selector::class(RESPONSE_OUTPUT_CLASS)).unwrap();
		assert_eq!(doc.text_content(output), "");
		let input = doc.query(form.node(), &Selector::attr_eq("name", "your-email")).unwrap();
		assert_eq!(doc.attr(input, "aria-invalid"), Some("false"));
	}

	#[rstest]
	fn test_floating_tip_hides_on_focus() {
		let mut doc = wpcf7_dom::Document::new();
		let root = doc.root();
		let node = el("form")
			.class(FLOATING_TIP_CLASS)
			.child(wrap("n", el("input").class(CONTROL_CLASS).name("n")))
			.build_into(&mut doc, root)
			.unwrap();
		let form = FormHandle::new(Dom::new(doc), node);

		set_validation_error(&form, "n", "Required", None);
		let input = control(&form, "n");
		form.dom().focus(input);

		let doc = form.dom().borrow();
		let tip = doc.query(node, &Selector::class(TIP_CLASS)).unwrap();
		assert_eq!(doc.attr(tip, "style"), Some("display: none"));
	}

	#[rstest]
	#[case("wpcf7-f1-o1", "your name", "wpcf7-f1-o1-ve-yourname")]
	#[case("", "x", "-ve-x")]
	#[case("wpcf7-f1-o1", "a.b[c]", "wpcf7-f1-o1-ve-abc")]
	fn test_error_id(#[case] unit_tag: &str, #[case] field: &str, #[case] expected: &str) {
		assert_eq!(error_id(unit_tag, field), expected);
	}
}
