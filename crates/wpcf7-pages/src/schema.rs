//! Validation schema and the validator seam.
//!
//! The schema is served by `contact-forms/{id}/feedback/schema` and is
//! opaque here except for the `field` of each rule, which is used to narrow
//! the schema to the fields being validated. Evaluating rules is the job of
//! a [`SchemaValidator`] supplied by the embedder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use wpcf7_dom::{FormData, FormValue, NodeId};

/// Server-supplied validation schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
	/// Rules, each bound to one field.
	#[serde(default)]
	pub rules: Vec<Rule>,
	/// Everything else the server sent (version, locale, messages, …).
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// One validation rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
	/// Field the rule applies to.
	#[serde(default)]
	pub field: String,
	/// Rule body, passed to the validator untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl Rule {
	/// A rule for `field` with no further properties.
	pub fn new(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			extra: Map::new(),
		}
	}
}

impl Schema {
	/// A copy keeping only the rules whose field is in `fields`.
	pub fn for_fields(&self, fields: &[String]) -> Schema {
		Schema {
			rules: self
				.rules
				.iter()
				.filter(|rule| fields.iter().any(|f| *f == rule.field))
				.cloned()
				.collect(),
			extra: self.extra.clone(),
		}
	}
}

/// Options of a validation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
	/// Control that triggered the pass; the walk stops after its wrap.
	pub target: Option<NodeId>,
	/// Subtree to validate, the form when unset.
	pub scope: Option<NodeId>,
}

impl ValidateOptions {
	/// Validates the whole form.
	pub fn all() -> Self {
		Self::default()
	}

	/// Validates up to the wrap containing `target`.
	pub fn target(target: NodeId) -> Self {
		Self {
			target: Some(target),
			scope: None,
		}
	}

	/// Restricts the pass to `scope`.
	pub fn with_scope(mut self, scope: NodeId) -> Self {
		self.scope = Some(scope);
		self
	}
}

/// Verdict for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
	/// Error message; `None` when the field passed the evaluated rules.
	#[serde(default)]
	pub error: Option<String>,
	/// Values that passed, mirrored into reflection outputs.
	#[serde(default)]
	pub valid_inputs: Vec<FormValue>,
}

impl FieldValidation {
	/// A passing field.
	pub fn valid(inputs: Vec<FormValue>) -> Self {
		Self {
			error: None,
			valid_inputs: inputs,
		}
	}

	/// A failing field.
	pub fn invalid(message: impl Into<String>) -> Self {
		Self {
			error: Some(message.into()),
			valid_inputs: Vec::new(),
		}
	}
}

/// A validator that could not produce a verdict.
#[derive(Debug, Clone, Error)]
pub enum ValidatorError {
	/// The schema could not be interpreted.
	#[error("invalid schema: {0}")]
	InvalidSchema(String),

	/// Evaluation failed.
	#[error("validation failed: {0}")]
	Failed(String),
}

/// Evaluates a schema against collected form data.
///
/// Results are ordered; each entry names a field and its verdict.
pub trait SchemaValidator {
	/// Validates `data` against `schema`.
	///
	/// # Errors
	///
	/// Returns a [`ValidatorError`] when no verdict could be produced. Field
	/// errors are part of the `Ok` value, not errors.
	fn validate(
		&self,
		schema: &Schema,
		data: &FormData,
		options: &ValidateOptions,
	) -> Result<Vec<(String, FieldValidation)>, ValidatorError>;
}

impl<F> SchemaValidator for F
where
	F: Fn(&Schema, &FormData, &ValidateOptions) -> Result<Vec<(String, FieldValidation)>, ValidatorError>,
{
	fn validate(
		&self,
		schema: &Schema,
		data: &FormData,
		options: &ValidateOptions,
	) -> Result<Vec<(String, FieldValidation)>, ValidatorError> {
		self(schema, data, options)
	}
}
