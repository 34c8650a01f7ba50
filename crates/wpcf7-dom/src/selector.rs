//! Element predicates used in place of CSS selector strings.
//!
//! The behaviour layer only ever needs a handful of selector shapes
//! (`.class`, `[attr]`, `[attr="value"]`, `tag`, and their compounds), so
//! they are expressed as a small enum instead of a selector parser.
//!
//! ```
//! use wpcf7_dom::Selector;
//!
//! // .wpcf7-form-control-wrap[data-name="your-email"]
//! let wrap = Selector::class("wpcf7-form-control-wrap").and(Selector::attr_eq("data-name", "your-email"));
//! # let _ = wrap;
//! ```

use crate::node::ElementData;

/// A predicate over elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
	/// Matches every element.
	Any,
	/// `tag`
	Tag(String),
	/// `.class`
	Class(String),
	/// `#id`
	Id(String),
	/// `[name]`
	Attr(String),
	/// `[name="value"]`
	AttrEq(String, String),
	/// All inner selectors match.
	And(Vec<Selector>),
	/// Any inner selector matches.
	Or(Vec<Selector>),
	/// Inner selector does not match.
	Not(Box<Selector>),
}

impl Selector {
	/// `tag`
	pub fn tag(tag: impl Into<String>) -> Self {
		Self::Tag(tag.into().to_ascii_lowercase())
	}

	/// `.class`
	pub fn class(class: impl Into<String>) -> Self {
		Self::Class(class.into())
	}

	/// `#id`
	pub fn id(id: impl Into<String>) -> Self {
		Self::Id(id.into())
	}

	/// `[name]`
	pub fn attr(name: impl Into<String>) -> Self {
		Self::Attr(name.into())
	}

	/// `[name="value"]`
	pub fn attr_eq(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self::AttrEq(name.into(), value.into())
	}

	/// Compound selector: both must match.
	pub fn and(self, other: Selector) -> Self {
		match self {
			Self::And(mut inner) => {
				inner.push(other);
				Self::And(inner)
			}
			this => Self::And(vec![this, other]),
		}
	}

	/// Selector list: either may match.
	pub fn or(self, other: Selector) -> Self {
		match self {
			Self::Or(mut inner) => {
				inner.push(other);
				Self::Or(inner)
			}
			this => Self::Or(vec![this, other]),
		}
	}

	/// Negation.
	pub fn negate(self) -> Self {
		Self::Not(Box::new(self))
	}

	/// `input, textarea, select`
	pub fn form_controls() -> Self {
		Self::tag("input")
			.or(Self::tag("textarea"))
			.or(Self::tag("select"))
	}

	pub(crate) fn matches(&self, element: &ElementData) -> bool {
		match self {
			Self::Any => true,
			Self::Tag(tag) => element.tag == *tag,
			Self::Class(class) => element.has_class(class),
			Self::Id(id) => element.attr("id") == Some(id.as_str()),
			Self::Attr(name) => element.attr(name).is_some(),
			Self::AttrEq(name, value) => element.attr(name) == Some(value.as_str()),
			Self::And(inner) => inner.iter().all(|s| s.matches(element)),
			Self::Or(inner) => inner.iter().any(|s| s.matches(element)),
			Self::Not(inner) => !inner.matches(element),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn element(tag: &str, attrs: &[(&str, &str)]) -> ElementData {
		let mut data = ElementData::new(tag);
		for (k, v) in attrs {
			data.set_attr(k, v);
		}
		data
	}

	#[rstest]
	#[case(Selector::tag("INPUT"), true)]
	#[case(Selector::class("wpcf7-form-control"), true)]
	#[case(Selector::class("wpcf7"), false)]
	#[case(Selector::attr("name"), true)]
	#[case(Selector::attr_eq("name", "your-name"), true)]
	#[case(Selector::attr_eq("name", "your-email"), false)]
	#[case(Selector::tag("input").and(Selector::class("nope")), false)]
	#[case(Selector::tag("select").or(Selector::tag("input")), true)]
	#[case(Selector::class("nope").negate(), true)]
	fn test_selector_matches(#[case] selector: Selector, #[case] expected: bool) {
		let input = element(
			"input",
			&[("class", "wpcf7-form-control wpcf7-text"), ("name", "your-name")],
		);
		assert_eq!(selector.matches(&input), expected);
	}

	#[rstest]
	fn test_and_flattens() {
		let selector = Selector::tag("a").and(Selector::class("b")).and(Selector::attr("c"));
		assert!(matches!(selector, Selector::And(ref inner) if inner.len() == 3));
	}
}
