//! Property tests for status normalization and transitions.

use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use wpcf7_dom::{Document, Dom, FormData, el};
use wpcf7_pages::{EventDetail, FormEvent, FormHandle, FormState, Status, set_status};

fn form() -> FormHandle {
	let mut doc = Document::new();
	let root = doc.root();
	let node = el("form").build_into(&mut doc, root).unwrap();
	FormHandle::new(Dom::new(doc), node)
}

fn is_slug_token(token: &str) -> bool {
	token
		.strip_prefix("custom-")
		.is_some_and(|slug| {
			!slug.is_empty()
				&& !slug.starts_with('-')
				&& !slug.ends_with('-')
				&& !slug.contains("--")
				&& slug.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase() || c == '-')
		})
}

proptest! {
	#[test]
	fn prop_every_status_is_a_valid_token(raw in ".{0,40}") {
		let status = Status::from_raw(&raw);
		if status.is_custom() {
			prop_assert!(is_slug_token(status.as_str()), "bad token {:?} from {:?}", status.as_str(), raw);
		} else {
			prop_assert!(Status::CANONICAL.contains(&status.as_str()));
		}
	}

	#[test]
	fn prop_canonical_tokens_are_fixed_points(raw in "[ -~]{0,40}") {
		let once = Status::from_raw(&raw);
		let twice = Status::from_raw(once.as_str());
		if once.is_custom() {
			// A custom token normalizes again under the prefix.
			prop_assert!(twice.as_str().starts_with("custom-custom-"));
		} else {
			prop_assert_eq!(once, twice);
		}
	}

	#[test]
	fn prop_set_status_twice_notifies_once(raw in "[a-z_ -]{0,20}") {
		let form = form();
		let changes = Rc::new(Cell::new(0));
		let counter = changes.clone();
		form.on(FormEvent::StatusChanged, move |_| counter.set(counter.get() + 1));

		let first = set_status(&form, &raw);
		let second = set_status(&form, &raw);

		prop_assert_eq!(&first, &second);
		prop_assert_eq!(changes.get(), usize::from(first != Status::Init));
		let doc = form.dom().borrow();
		prop_assert_eq!(doc.attr(form.node(), "data-status"), Some(first.as_str()));
		prop_assert!(doc.has_class(form.node(), first.as_str()));
	}

	#[test]
	fn prop_private_fields_never_reach_inputs(
		entries in proptest::collection::vec(("_?[a-z]{1,8}", "[a-z0-9]{0,8}"), 0..12),
	) {
		let mut data = FormData::new();
		for (name, value) in &entries {
			data.append(name.as_str(), value.as_str());
		}

		let detail = EventDetail::snapshot(&FormState::default(), data);

		let expected: Vec<&str> = entries
			.iter()
			.map(|(name, _)| name.as_str())
			.filter(|name| !name.starts_with('_'))
			.collect();
		let names: Vec<&str> = detail.inputs.iter().map(|input| input.name.as_str()).collect();
		prop_assert_eq!(names, expected);
		prop_assert_eq!(detail.form_data.len(), entries.len());
	}
}
