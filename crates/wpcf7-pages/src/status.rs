//! Form status lifecycle
//!
//! Every form carries exactly one [`Status`]. The state lives in
//! [`FormState`](crate::state::FormState); the `data-status` attribute and
//! the matching class on the form element are projections written on every
//! transition so stylesheets and automation can read them.
//!
//! Raw server codes are mapped onto canonical tokens, anything unknown is
//! normalized into a `custom-<slug>` token:
//!
//! ```
//! use wpcf7_pages::Status;
//!
//! assert_eq!(Status::from_raw("mail_sent"), Status::Sent);
//! assert_eq!(Status::from_raw("payment_required").as_str(), "payment-required");
//! assert_eq!(Status::from_raw("Awaiting Moderation!").as_str(), "custom-awaiting-moderation");
//! ```

use crate::event::{EventTarget, FormEvent, trigger};
use crate::state::FormHandle;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Prefix of normalized unknown statuses.
pub const CUSTOM_PREFIX: &str = "custom-";

/// Slug used when an unknown status has no alphanumeric characters.
pub const UNKNOWN_SLUG: &str = "unknown";

/// Public status token of a form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Status {
	/// Freshly loaded or reset.
	#[default]
	Init,
	/// Server-side validation failed.
	Invalid,
	/// A required acceptance checkbox is unchecked.
	Unaccepted,
	/// Rejected as spam.
	Spam,
	/// Submission aborted by the server.
	Aborted,
	/// Mail sent.
	Sent,
	/// Mail could not be sent.
	Failed,
	/// Request in flight.
	Submitting,
	/// Refill in flight.
	Resetting,
	/// Client-side validation running.
	Validating,
	/// Payment required before the mail is sent.
	PaymentRequired,
	/// Any other server status, holding the full `custom-…` token.
	Custom(String),
}

impl Status {
	/// Canonical tokens, in declaration order.
	pub const CANONICAL: [&'static str; 11] = [
		"init",
		"invalid",
		"unaccepted",
		"spam",
		"aborted",
		"sent",
		"failed",
		"submitting",
		"resetting",
		"validating",
		"payment-required",
	];

	/// Maps a raw server status (or a canonical token) to a status.
	pub fn from_raw(raw: &str) -> Self {
		match raw {
			"init" => Self::Init,
			"validation_failed" | "invalid" => Self::Invalid,
			"acceptance_missing" | "unaccepted" => Self::Unaccepted,
			"spam" => Self::Spam,
			"aborted" => Self::Aborted,
			"mail_sent" | "sent" => Self::Sent,
			"mail_failed" | "failed" => Self::Failed,
			"submitting" => Self::Submitting,
			"resetting" => Self::Resetting,
			"validating" => Self::Validating,
			"payment_required" | "payment-required" => Self::PaymentRequired,
			other => Self::Custom(format!("{CUSTOM_PREFIX}{}", custom_slug(other))),
		}
	}

	/// The token written to `data-status` and the class list.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Init => "init",
			Self::Invalid => "invalid",
			Self::Unaccepted => "unaccepted",
			Self::Spam => "spam",
			Self::Aborted => "aborted",
			Self::Sent => "sent",
			Self::Failed => "failed",
			Self::Submitting => "submitting",
			Self::Resetting => "resetting",
			Self::Validating => "validating",
			Self::PaymentRequired => "payment-required",
			Self::Custom(token) => token,
		}
	}

	/// Whether this is a normalized unknown status.
	pub fn is_custom(&self) -> bool {
		matches!(self, Self::Custom(_))
	}
}

/// Runs of non-alphanumeric characters become single hyphens, the result is
/// lowercased and never empty.
fn custom_slug(raw: &str) -> String {
	let slug = raw
		.split(|c: char| !c.is_ascii_alphanumeric())
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join("-")
		.to_ascii_lowercase();
	if slug.is_empty() {
		UNKNOWN_SLUG.to_string()
	} else {
		slug
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for Status {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for Status {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		if raw.starts_with(CUSTOM_PREFIX) {
			return Ok(Self::Custom(raw));
		}
		Ok(Self::from_raw(&raw))
	}
}

/// Transitions the form to `raw` and emits `wpcf7statuschanged` when the
/// token changed. Returns the new status.
pub fn set_status(form: &FormHandle, raw: &str) -> Status {
	transition(form, Status::from_raw(raw), true)
}

/// Like [`set_status`] but without `wpcf7statuschanged`. Used when restoring
/// the sent status after the post-send reset.
pub fn set_status_silently(form: &FormHandle, raw: &str) -> Status {
	transition(form, Status::from_raw(raw), false)
}

pub(crate) fn transition(form: &FormHandle, next: Status, notify: bool) -> Status {
	let prev = std::mem::replace(&mut form.state_mut().status, next.clone());

	{
		let mut doc = form.dom().borrow_mut();
		doc.set_attr(form.node(), "data-status", next.as_str());
		doc.add_class(form.node(), next.as_str());
		if prev != next {
			doc.remove_class(form.node(), prev.as_str());
		}
	}

	if prev != next {
		tracing::debug!(form = form.id(), from = %prev, to = %next, "form status changed");
		if notify {
			let detail = serde_json::json!({ "status": next, "prevStatus": prev });
			trigger(
				form.dom(),
				EventTarget::Node(form.node()),
				FormEvent::StatusChanged.name(),
				detail,
			);
		}
	}
	next
}
