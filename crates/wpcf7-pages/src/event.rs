//! Lifecycle events
//!
//! Controllers talk to the outside world only through bubbling custom
//! events named `wpcf7<name>` dispatched on the form. The detail payload is
//! an [`EventDetail`] serialized in camelCase, or a [`StatusChange`] for
//! `wpcf7statuschanged`.
//!
//! Rust embedders can subscribe with [`FormHandle::on`](crate::FormHandle::on),
//! which listens to the same DOM events and hands over the typed payload.

use crate::state::FormState;
use crate::status::Status;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wpcf7_dom::{Dom, Event, FormData, FormValue, NodeId, Selector};

/// Prefix of every lifecycle event name.
pub const EVENT_PREFIX: &str = "wpcf7";

/// Where to dispatch an event.
#[derive(Debug, Clone, Copy)]
pub enum EventTarget<'a> {
	/// A node.
	Node(NodeId),
	/// The first element matching a selector.
	Selector(&'a Selector),
}

/// Dispatches a bubbling `wpcf7<name>` custom event carrying `detail`.
///
/// Listeners run synchronously. A selector matching nothing is logged and
/// ignored.
pub fn trigger(dom: &Dom, target: EventTarget<'_>, name: &str, detail: Value) {
	let node = match target {
		EventTarget::Node(node) => node,
		EventTarget::Selector(selector) => {
			let doc = dom.borrow();
			match doc.query(doc.root(), selector) {
				Some(node) => node,
				None => {
					tracing::warn!(event = name, "event target not found");
					return;
				}
			}
		}
	};
	dom.dispatch_event(Event::custom(format!("{EVENT_PREFIX}{name}"), node, detail));
}

/// Lifecycle events emitted by the controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormEvent {
	/// Before the feedback request is sent.
	BeforeSubmit,
	/// After every feedback response.
	Submit,
	/// Server validation failed.
	Invalid,
	/// Acceptance missing.
	Unaccepted,
	/// Spam.
	Spam,
	/// Aborted.
	Aborted,
	/// Mail sent.
	MailSent,
	/// Mail failed.
	MailFailed,
	/// Refill completed.
	Reset,
	/// Status token changed.
	StatusChanged,
}

impl FormEvent {
	/// Event name without the prefix.
	pub fn name(self) -> &'static str {
		match self {
			Self::BeforeSubmit => "beforesubmit",
			Self::Submit => "submit",
			Self::Invalid => "invalid",
			Self::Unaccepted => "unaccepted",
			Self::Spam => "spam",
			Self::Aborted => "aborted",
			Self::MailSent => "mailsent",
			Self::MailFailed => "mailfailed",
			Self::Reset => "reset",
			Self::StatusChanged => "statuschanged",
		}
	}

	/// Full DOM event name, e.g. `wpcf7mailsent`.
	pub fn dom_name(self) -> String {
		format!("{EVENT_PREFIX}{}", self.name())
	}

	/// The event emitted after a feedback response with this status, if any.
	pub fn for_status(status: &Status) -> Option<Self> {
		match status {
			Status::Invalid => Some(Self::Invalid),
			Status::Unaccepted => Some(Self::Unaccepted),
			Status::Spam => Some(Self::Spam),
			Status::Aborted => Some(Self::Aborted),
			Status::Sent => Some(Self::MailSent),
			Status::Failed => Some(Self::MailFailed),
			_ => None,
		}
	}
}

/// One `{name, value}` entry of [`EventDetail::inputs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEntry {
	/// Field name.
	pub name: String,
	/// Field value.
	pub value: FormValue,
}

/// Payload of the submit/reset lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
	/// Form id.
	pub contact_form_id: u64,
	/// Plugin version from the hidden field.
	pub plugin_version: String,
	/// Locale from the hidden field.
	pub contact_form_locale: String,
	/// Unit tag of this form instance.
	pub unit_tag: String,
	/// Post containing the form, 0 when unknown.
	pub container_post_id: u64,
	/// Status at snapshot time, replaced by the raw server status once a
	/// response arrived.
	pub status: String,
	/// Public entries of `form_data` (names starting with `_` left out).
	pub inputs: Vec<InputEntry>,
	/// Everything that was submitted.
	pub form_data: FormData,
	/// Parsed API response.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub api_response: Option<Value>,
}

impl EventDetail {
	/// Snapshots the form state together with the collected data.
	pub fn snapshot(state: &FormState, form_data: FormData) -> Self {
		let inputs = form_data
			.iter()
			.filter(|(name, _)| !name.starts_with('_'))
			.map(|(name, value)| InputEntry {
				name: name.to_string(),
				value: value.clone(),
			})
			.collect();
		Self {
			contact_form_id: state.id,
			plugin_version: state.plugin_version.clone(),
			contact_form_locale: state.locale.clone(),
			unit_tag: state.unit_tag.clone(),
			container_post_id: state.container_post_id,
			status: state.status.to_string(),
			inputs,
			form_data,
			api_response: None,
		}
	}

	/// JSON form of the detail; serializing these plain types cannot fail.
	pub fn to_value(&self) -> Value {
		serde_json::to_value(self).unwrap_or(Value::Null)
	}
}

/// Payload of `wpcf7statuschanged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
	/// New status.
	pub status: Status,
	/// Previous status.
	pub prev_status: Status,
}

/// Typed payload handed to [`FormHandle::on`](crate::FormHandle::on) callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
	/// Submit/reset lifecycle detail.
	Detail(Box<EventDetail>),
	/// Status transition.
	StatusChanged(StatusChange),
}

impl EventPayload {
	/// Decodes the detail of a `wpcf7…` DOM event.
	pub fn decode(event: FormEvent, detail: &Value) -> Option<Self> {
		match event {
			FormEvent::StatusChanged => serde_json::from_value(detail.clone())
				.ok()
				.map(Self::StatusChanged),
			_ => serde_json::from_value(detail.clone())
				.ok()
				.map(|d| Self::Detail(Box::new(d))),
		}
	}

	/// The detail, for lifecycle events.
	pub fn detail(&self) -> Option<&EventDetail> {
		match self {
			Self::Detail(detail) => Some(detail),
			Self::StatusChanged(_) => None,
		}
	}
}
