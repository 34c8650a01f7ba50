//! Markup helpers installed when a form is initialized.
//!
//! Each helper decorates or wires up one kind of form-tag markup:
//!
//! - `.has-spinner`: a `<span class="wpcf7-spinner">` after the element
//! - `.wpcf7-file`: linked to its single `<label>` through `aria-labelledby`
//! - `.wpcf7-exclusive-checkbox`: checking one box unchecks its siblings
//! - `.has-free-text`: the free-text input follows its checkbox or radio
//! - `.wpcf7-validates-as-url`: schemeless host names get `http://`
//! - `.wpcf7-acceptance`: the submit buttons wait for consent
//! - `.wpcf7-character-count`: a live counter for the targeted control

use crate::event::FormEvent;
use crate::state::{FormHandle, abs_int};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use wpcf7_dom::{Document, Dom, NodeId, Selector, el};

/// Prefix of generated label ids.
pub const LABEL_ID_PREFIX: &str = "cf7-a11y-label-";

static LABEL_COUNTER: AtomicU64 = AtomicU64::new(0);

static URL_SCHEME: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9.+-]*:").expect("valid scheme pattern"));

/// Installs every helper on `form`.
pub fn install(form: &FormHandle) {
	insert_spinners(form);
	link_file_labels(form);
	exclusive_checkbox(form);
	free_text(form);
	url_inputs(form);
	acceptance(form);
	character_count(form);
}

fn checkbox_named(name: &str) -> Selector {
	Selector::tag("input")
		.and(Selector::attr_eq("type", "checkbox"))
		.and(Selector::attr_eq("name", name))
}

/// Inserts a spinner after every `.has-spinner` element.
pub fn insert_spinners(form: &FormHandle) {
	let mut doc = form.dom().borrow_mut();
	for node in doc.query_all(form.node(), &Selector::class("has-spinner")) {
		let inserted = el("span")
			.class("wpcf7-spinner")
			.build(&mut doc)
			.and_then(|spinner| doc.insert_after(node, spinner));
		if let Err(e) = inserted {
			tracing::warn!(error = %e, "could not insert spinner");
		}
	}
}

fn next_label_id(doc: &Document) -> String {
	loop {
		let n = LABEL_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
		let id = format!("{LABEL_ID_PREFIX}{n}");
		if doc.get_element_by_id(&id).is_none() {
			return id;
		}
	}
}

/// Points each unlabelled `.wpcf7-file` with an id at its only `<label>`,
/// giving the label an id first when it has none.
pub fn link_file_labels(form: &FormHandle) {
	let mut doc = form.dom().borrow_mut();
	for field in doc.query_all(form.node(), &Selector::class("wpcf7-file")) {
		if doc.attr(field, "aria-labelledby").is_some_and(|v| !v.is_empty()) {
			continue;
		}
		let Some(id) = doc.attr(field, "id").filter(|id| !id.is_empty()).map(str::to_string) else {
			continue;
		};

		let labels = doc.query_all(form.node(), &Selector::tag("label").and(Selector::attr_eq("for", id)));
		let &[label] = labels.as_slice() else {
			continue;
		};
		let existing = doc.attr(label, "id").filter(|id| !id.is_empty()).map(str::to_string);
		let label_id = match existing {
			Some(existing) => existing,
			None => {
				let generated = next_label_id(&doc);
				doc.set_attr(label, "id", &generated);
				generated
			}
		};
		doc.set_attr(field, "aria-labelledby", &label_id);
	}
}

/// Unchecks the other boxes of the same name when one is changed.
pub fn exclusive_checkbox(form: &FormHandle) {
	let groups = form
		.dom()
		.borrow()
		.query_all(form.node(), &Selector::class("wpcf7-exclusive-checkbox"));
	let form_node = form.node();

	for group in groups {
		form.dom().add_event_listener(group, "change", move |dom, event| {
			let target = event.target();
			let mut doc = dom.borrow_mut();
			let Some(name) = doc.attr(target, "name").map(str::to_string) else {
				return;
			};
			for other in doc.query_all(form_node, &checkbox_named(&name)) {
				if other != target {
					doc.set_checked(other, false);
				}
			}
		});
	}
}

/// Keeps each free-text input enabled only while its option is checked,
/// focusing it when the option gets checked.
pub fn free_text(form: &FormHandle) {
	let pairs: Vec<(NodeId, NodeId)> = {
		let doc = form.dom().borrow();
		let option = Selector::tag("input")
			.and(Selector::attr_eq("type", "checkbox").or(Selector::attr_eq("type", "radio")));
		let text = Selector::tag("input").and(Selector::class("wpcf7-free-text"));

		doc.query_all(form.node(), &Selector::class("has-free-text"))
			.into_iter()
			.filter_map(|item| Some((doc.query(item, &text)?, doc.query(item, &option)?)))
			.collect()
	};
	{
		let mut doc = form.dom().borrow_mut();
		for &(text, option) in &pairs {
			let checked = doc.checked(option);
			doc.set_disabled(text, !checked);
		}
	}

	for (text, option) in pairs {
		form.dom().add_event_listener(form.node(), "change", move |dom, event| {
			let checked = dom.borrow().checked(option);
			dom.borrow_mut().set_disabled(text, !checked);
			if event.target() == option && checked {
				dom.focus(text);
			}
		});
	}
}

/// Trims `raw`, and prefixes schemeless values that look like a host name
/// with `http://`.
///
/// ```
/// use wpcf7_pages::helpers::normalize_url;
///
/// assert_eq!(normalize_url(" example.com "), "http://example.com");
/// assert_eq!(normalize_url("//example.com/a"), "http://example.com/a");
/// assert_eq!(normalize_url("mailto:me@example.com"), "mailto:me@example.com");
/// assert_eq!(normalize_url("localhost"), "localhost");
/// ```
pub fn normalize_url(raw: &str) -> String {
	let value = raw.trim();
	if value.is_empty() || URL_SCHEME.is_match(value) || !value.contains('.') {
		return value.to_string();
	}
	format!("http://{}", value.trim_start_matches('/'))
}

/// Normalizes `.wpcf7-validates-as-url` values on change.
pub fn url_inputs(form: &FormHandle) {
	let inputs = form
		.dom()
		.borrow()
		.query_all(form.node(), &Selector::class("wpcf7-validates-as-url"));

	for input in inputs {
		form.dom().add_event_listener(input, "change", move |dom, _| {
			let mut doc = dom.borrow_mut();
			let normalized = normalize_url(&doc.value(input));
			doc.set_value(input, &normalized);
		});
	}
}

/// Whether every required acceptance of `form` is satisfied.
fn acceptances_satisfied(doc: &Document, form: NodeId) -> bool {
	let checkbox = Selector::tag("input").and(Selector::attr_eq("type", "checkbox"));
	doc.query_all(form, &Selector::class("wpcf7-acceptance"))
		.into_iter()
		.filter(|&acceptance| !doc.has_class(acceptance, "optional"))
		.all(|acceptance| {
			let Some(input) = doc.query(acceptance, &checkbox) else {
				return true;
			};
			doc.checked(input) != doc.has_class(acceptance, "invert")
		})
}

fn update_submit_buttons(dom: &Dom, form: NodeId) {
	let mut doc = dom.borrow_mut();
	let enabled = acceptances_satisfied(&doc, form);
	for button in doc.query_all(form, &Selector::class("wpcf7-submit")) {
		doc.set_disabled(button, !enabled);
	}
}

/// Disables `.wpcf7-submit` until the required acceptances are given.
/// Forms validating acceptance server-side are left alone.
pub fn acceptance(form: &FormHandle) {
	let node = form.node();
	{
		let doc = form.dom().borrow();
		if doc.query(node, &Selector::class("wpcf7-acceptance")).is_none()
			|| doc.has_class(node, "wpcf7-acceptance-as-validation")
		{
			return;
		}
	}

	update_submit_buttons(form.dom(), node);
	form.dom()
		.add_event_listener(node, "change", move |dom, _| update_submit_buttons(dom, node));
	form.dom().add_event_listener(node, &FormEvent::Reset.dom_name(), move |dom, _| {
		update_submit_buttons(dom, node)
	});
}

fn update_count(doc: &mut Document, counter: NodeId, control: NodeId) {
	let starting = abs_int(doc.attr(counter, "data-starting-value"));
	let maximum = abs_int(doc.attr(counter, "data-maximum-value"));
	let minimum = abs_int(doc.attr(counter, "data-minimum-value"));
	let length = doc.value(control).chars().count() as i64;

	let count = if doc.has_class(counter, "down") {
		starting as i64 - length
	} else {
		length
	};
	let count = count.to_string();
	doc.set_attr(counter, "data-current-value", &count);
	let _ = doc.set_text_content(counter, &count);

	if maximum > 0 && (maximum as i64) < length {
		doc.add_class(counter, "too-long");
	} else {
		doc.remove_class(counter, "too-long");
	}
	if minimum > 0 && length < minimum as i64 {
		doc.add_class(counter, "too-short");
	} else {
		doc.remove_class(counter, "too-short");
	}
}

/// Counters of `form` with the control each one tracks.
fn counters(doc: &Document, form: NodeId) -> Vec<(NodeId, NodeId)> {
	doc.query_all(form, &Selector::class("wpcf7-character-count"))
		.into_iter()
		.filter_map(|counter| {
			let name = doc.attr(counter, "data-target-name")?;
			let control = doc.query(form, &Selector::attr_eq("name", name))?;
			Some((counter, control))
		})
		.collect()
}

/// Restores each counted control to its default value and recounts.
fn refresh_counters(dom: &Dom, form: NodeId) -> Vec<(NodeId, NodeId)> {
	let mut doc = dom.borrow_mut();
	let pairs = counters(&doc, form);
	for &(counter, control) in &pairs {
		let default = doc.default_value(control);
		doc.set_value(control, &default);
		update_count(&mut doc, counter, control);
	}
	pairs
}

/// Keeps `.wpcf7-character-count` elements in sync with their control.
pub fn character_count(form: &FormHandle) {
	let node = form.node();
	for (counter, control) in refresh_counters(form.dom(), node) {
		form.dom().add_event_listener(control, "keyup", move |dom, _| {
			update_count(&mut dom.borrow_mut(), counter, control);
		});
	}
	form.dom().add_event_listener(node, &FormEvent::Reset.dom_name(), move |dom, _| {
		refresh_counters(dom, node);
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use wpcf7_dom::ElementBuilder;

	fn handle(form: ElementBuilder) -> FormHandle {
		let mut doc = Document::new();
		let root = doc.root();
		let node = form.build_into(&mut doc, root).unwrap();
		FormHandle::new(Dom::new(doc), node)
	}

	fn find(form: &FormHandle, selector: &Selector) -> NodeId {
		form.dom().borrow().query(form.node(), selector).unwrap()
	}

	#[rstest]
	fn test_spinner_follows_marked_element() {
		let form = handle(el("form").child(el("input").class("has-spinner").input_type("submit")).child(el("p")));
		insert_spinners(&form);

		let doc = form.dom().borrow();
		let children = doc.children(form.node());
		assert_eq!(children.len(), 3);
		assert!(doc.has_class(children[1], "wpcf7-spinner"));
		assert_eq!(doc.tag_name(children[2]), "p");
	}

	#[rstest]
	fn test_file_label_linking() {
		let form = handle(
			el("form")
				.child(el("label").attr("for", "cv").text("CV"))
				.child(el("input").input_type("file").class("wpcf7-file").id("cv"))
				.child(el("label").id("photo-label").attr("for", "photo"))
				.child(el("input").input_type("file").class("wpcf7-file").id("photo"))
				.child(el("label").attr("for", "dup"))
				.child(el("label").attr("for", "dup"))
				.child(el("input").input_type("file").class("wpcf7-file").id("dup")),
		);
		link_file_labels(&form);

		let doc = form.dom().borrow();
		let cv = doc.get_element_by_id("cv").unwrap();
		let generated = doc.attr(cv, "aria-labelledby").unwrap();
		assert!(generated.starts_with(LABEL_ID_PREFIX));
		assert!(doc.get_element_by_id(generated).is_some());

		let photo = doc.get_element_by_id("photo").unwrap();
		assert_eq!(doc.attr(photo, "aria-labelledby"), Some("photo-label"));

		let dup = doc.get_element_by_id("dup").unwrap();
		assert_eq!(doc.attr(dup, "aria-labelledby"), None);
	}

	#[rstest]
	fn test_exclusive_checkbox() {
		let form = handle(
			el("form").child(
				el("span")
					.class("wpcf7-exclusive-checkbox")
					.child(el("input").input_type("checkbox").name("pick").value("a").checked(true))
					.child(el("input").input_type("checkbox").name("pick").value("b")),
			),
		);
		exclusive_checkbox(&form);
		let b = find(&form, &Selector::attr_eq("value", "b"));
		let a = find(&form, &Selector::attr_eq("value", "a"));

		form.dom().borrow_mut().set_checked(b, true);
		form.dom().change(b);

		let doc = form.dom().borrow();
		assert!(doc.checked(b));
		assert!(!doc.checked(a));
	}

	#[rstest]
	fn test_free_text_follows_option() {
		let form = handle(
			el("form").child(
				el("span")
					.class("has-free-text")
					.child(el("input").input_type("radio").name("how").value("Other"))
					.child(el("input").class("wpcf7-free-text").name("_wpcf7_free_text_how")),
			),
		);
		free_text(&form);
		let option = find(&form, &Selector::attr_eq("type", "radio"));
		let text = find(&form, &Selector::class("wpcf7-free-text"));
		assert!(form.dom().borrow().is_disabled(text));

		form.dom().borrow_mut().set_checked(option, true);
		form.dom().change(option);

		let doc = form.dom().borrow();
		assert!(!doc.is_disabled(text));
		assert_eq!(doc.active_element(), Some(text));
	}

	#[rstest]
	#[case("example.com", "http://example.com")]
	#[case("  https://example.com ", "https://example.com")]
	#[case("///example.com", "http://example.com")]
	#[case("HTTP://EXAMPLE.COM", "HTTP://EXAMPLE.COM")]
	#[case("intranet", "intranet")]
	#[case("   ", "")]
	fn test_normalize_url(#[case] raw: &str, #[case] expected: &str) {
		assert_eq!(normalize_url(raw), expected);
	}

	#[rstest]
	fn test_url_input_normalized_on_change() {
		let form = handle(el("form").child(el("input").class("wpcf7-validates-as-url").name("site").value(" example.org")));
		url_inputs(&form);
		let input = find(&form, &Selector::attr_eq("name", "site"));

		form.dom().change(input);

		assert_eq!(form.dom().borrow().value(input), "http://example.org");
	}

	fn acceptance_form(classes: &[&str], checked: bool) -> FormHandle {
		let mut acceptance = el("span").class("wpcf7-acceptance");
		for class in classes {
			acceptance = acceptance.class(class);
		}
		handle(
			el("form")
				.child(acceptance.child(el("input").input_type("checkbox").name("consent").value("1").checked(checked)))
				.child(el("input").input_type("submit").class("wpcf7-submit")),
		)
	}

	#[rstest]
	#[case(&[], false, true)]
	#[case(&[], true, false)]
	#[case(&["invert"], true, true)]
	#[case(&["invert"], false, false)]
	#[case(&["optional"], false, false)]
	fn test_acceptance_gates_submit(#[case] classes: &[&str], #[case] checked: bool, #[case] disabled: bool) {
		let form = acceptance_form(classes, checked);
		acceptance(&form);
		let button = find(&form, &Selector::class("wpcf7-submit"));
		assert_eq!(form.dom().borrow().is_disabled(button), disabled);
	}

	#[rstest]
	fn test_acceptance_reevaluated_on_change() {
		let form = acceptance_form(&[], false);
		acceptance(&form);
		let button = find(&form, &Selector::class("wpcf7-submit"));
		let consent = find(&form, &Selector::attr_eq("name", "consent"));

		form.dom().borrow_mut().set_checked(consent, true);
		form.dom().change(consent);

		assert!(!form.dom().borrow().is_disabled(button));
	}

	#[rstest]
	fn test_acceptance_as_validation_is_left_alone() {
		let form = handle(
			el("form")
				.class("wpcf7-acceptance-as-validation")
				.child(el("span").class("wpcf7-acceptance").child(el("input").input_type("checkbox").name("c")))
				.child(el("input").input_type("submit").class("wpcf7-submit")),
		);
		acceptance(&form);
		let button = find(&form, &Selector::class("wpcf7-submit"));
		assert!(!form.dom().borrow().is_disabled(button));
	}

	#[rstest]
	fn test_character_count_down() {
		let form = handle(
			el("form")
				.child(el("textarea").name("msg").text("hi"))
				.child(
					el("span")
						.class("wpcf7-character-count")
						.class("down")
						.attr("data-target-name", "msg")
						.attr("data-starting-value", "5")
						.attr("data-maximum-value", "5")
						.attr("data-minimum-value", "3"),
				),
		);
		character_count(&form);
		let counter = find(&form, &Selector::class("wpcf7-character-count"));
		let control = find(&form, &Selector::attr_eq("name", "msg"));
		{
			let doc = form.dom().borrow();
			assert_eq!(doc.attr(counter, "data-current-value"), Some("3"));
			assert!(doc.has_class(counter, "too-short"));
		}

		form.dom().borrow_mut().set_value(control, "too long!");
		form.dom().keyup(control);

		let doc = form.dom().borrow();
		assert_eq!(doc.text_content(counter), "-4");
		assert!(doc.has_class(counter, "too-long"));
		assert!(!doc.has_class(counter, "too-short"));
	}
}
