//! Field-scoped data collection for validation passes.

use crate::markers::WRAP_CLASS;
use wpcf7_dom::{Document, FormData, NodeId, Selector};

/// Attribute marking wraps taking part in the running validation pass.
pub const UNDER_VALIDATION_ATTR: &str = "data-under-validation";

/// Class of regions excluded from validation.
pub const NOVALIDATE_CLASS: &str = "novalidate";

/// Data and field names gathered by [`collect_scoped`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
	/// Successful controls of the visited wraps.
	pub data: FormData,
	/// `data-name` of every visited wrap, in document order.
	pub fields: Vec<String>,
}

fn validatable_controls() -> Selector {
	Selector::tag("input")
		.or(Selector::tag("textarea"))
		.or(Selector::tag("select"))
}

/// Walks the field wraps of `scope` outside `.novalidate` regions,
/// collecting their controls and marking named wraps as under validation.
/// With a `target`, the walk stops after the named wrap containing it.
pub fn collect_scoped(doc: &mut Document, scope: NodeId, target: Option<NodeId>) -> Collected {
	let mut collected = Collected::default();
	let novalidate = Selector::class(NOVALIDATE_CLASS);
	let controls = validatable_controls();

	for wrap in doc.query_all(scope, &Selector::class(WRAP_CLASS)) {
		if doc.closest(wrap, &novalidate).is_some() {
			continue;
		}

		for control in doc.query_all(wrap, &controls) {
			collected.data.append_control(doc, control);
		}

		let Some(name) = doc.data(wrap, "name").filter(|n| !n.is_empty()) else {
			continue;
		};
		collected.fields.push(name.to_string());
		doc.set_attr(wrap, UNDER_VALIDATION_ATTR, "1");

		if target.is_some_and(|t| doc.contains(wrap, t)) {
			break;
		}
	}
	collected
}

/// Removes every under-validation marker in `scope`.
pub fn clear_under_validation(doc: &mut Document, scope: NodeId) {
	for wrap in doc.query_all(scope, &Selector::attr(UNDER_VALIDATION_ATTR)) {
		doc.remove_attr(wrap, UNDER_VALIDATION_ATTR);
	}
}
