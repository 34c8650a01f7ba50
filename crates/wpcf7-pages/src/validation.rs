//! Client-side validation
//!
//! A pass collects the fields in scope (up to the changed control), narrows
//! the schema to them, and hands both to the [`SchemaValidator`]. Each field
//! in the verdict gets its markers and reflections refreshed.
//!
//! While the pass runs the form is `validating` and the visited wraps carry
//! `data-under-validation`. Both are undone when the pass ends, whatever
//! the validator did.

use crate::collect::{NOVALIDATE_CLASS, clear_under_validation, collect_scoped};
use crate::markers::{WRAP_CLASS, remove_validation_error, set_validation_error};
use crate::reflection::update_reflection;
use crate::schema::{SchemaValidator, ValidateOptions};
use crate::state::FormHandle;
use crate::status::{Status, transition};
use wpcf7_dom::{NodeId, Selector};

/// Restores the previous status and clears the under-validation markers
/// when dropped.
struct PassGuard<'a> {
	form: &'a FormHandle,
	prev: Status,
}

impl Drop for PassGuard<'_> {
	fn drop(&mut self) {
		transition(self.form, self.prev.clone(), true);
		clear_under_validation(&mut self.form.dom().borrow_mut(), self.form.node());
	}
}

/// Whether `target` may trigger a pass on `form`.
fn accepts_target(form: &FormHandle, target: NodeId) -> bool {
	let doc = form.dom().borrow();
	doc.contains(form.node(), target)
		&& doc
			.closest(target, &Selector::class(WRAP_CLASS).and(Selector::attr("data-name")))
			.is_some()
		&& doc.closest(target, &Selector::class(NOVALIDATE_CLASS)).is_none()
}

/// Runs a validation pass. Returns `false` when nothing ran: no schema has
/// been loaded yet, or the target is outside the form, outside a named
/// field wrap or inside a `.novalidate` region.
///
/// Without a validator the pass still walks the fields and cycles the
/// status, leaving markers untouched.
pub fn validate(
	form: &FormHandle,
	validator: Option<&dyn SchemaValidator>,
	options: ValidateOptions,
) -> bool {
	let Some(schema) = form.schema() else {
		return false;
	};
	if let Some(target) = options.target {
		if !accepts_target(form, target) {
			return false;
		}
	}

	let scope = options.scope.unwrap_or(form.node());
	let collected = collect_scoped(&mut form.dom().borrow_mut(), scope, options.target);
	let schema = schema.for_fields(&collected.fields);

	let prev = form.status();
	transition(form, Status::Validating, true);
	let _guard = PassGuard { form, prev };

	let Some(validator) = validator else {
		return true;
	};
	let results = match validator.validate(&schema, &collected.data, &options) {
		Ok(results) => results,
		Err(e) => {
			tracing::warn!(form = form.id(), error = %e, "schema validator failed");
			return true;
		}
	};

	for (field, verdict) in results {
		remove_validation_error(form, &field);
		if let Some(error) = &verdict.error {
			set_validation_error(form, &field, error, Some(scope));
		}
		update_reflection(form, &field, &verdict.valid_inputs);
	}
	true
}
