//! Runtime settings
//!
//! The CMS prints an inline `wpcf7` object on every page carrying the REST
//! API root, the route namespace and a couple of behaviour flags. That
//! object is parsed once at start-up into [`Settings`] and shared read-only
//! (`Arc<Settings>`) with every component that needs it.
//!
//! ```
//! use wpcf7_conf::Settings;
//!
//! let settings = Settings::from_json(r#"{
//!     "api": { "root": "https://example.com/wp-json/", "namespace": "contact-form-7/v1" },
//!     "cached": "1"
//! }"#).unwrap();
//! assert!(settings.cached);
//! assert!(!settings.blocked);
//! ```

use crate::env::parse_bool;
use crate::error::SettingsError;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Default REST namespace of the feedback API.
pub const DEFAULT_NAMESPACE: &str = "contact-form-7/v1";

/// Delay before focus moves to the response output after a submission.
pub const DEFAULT_FOCUS_DELAY_MS: u64 = 1000;

/// REST API location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
	/// API root URL, e.g. `https://example.com/wp-json/` or
	/// `https://example.com/?rest_route=/`.
	pub root: String,
	/// Route namespace joined in front of endpoint names.
	pub namespace: String,
}

impl Default for ApiSettings {
	fn default() -> Self {
		Self {
			root: String::new(),
			namespace: DEFAULT_NAMESPACE.to_string(),
		}
	}
}

/// Behaviour layer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// API location.
	pub api: ApiSettings,
	/// Administratively blocks every submission.
	#[serde(deserialize_with = "loose_bool")]
	pub blocked: bool,
	/// The page came from a full-page cache; forms are reset on load.
	#[serde(deserialize_with = "loose_bool")]
	pub cached: bool,
	/// Milliseconds before focus moves to the response output.
	#[serde(rename = "focusDelay", alias = "focus_delay_ms")]
	pub focus_delay_ms: u64,
	/// URL of the current page, used when a request names no target.
	#[serde(rename = "pageUrl", alias = "page_url")]
	pub page_url: String,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			api: ApiSettings::default(),
			blocked: false,
			cached: false,
			focus_delay_ms: DEFAULT_FOCUS_DELAY_MS,
			page_url: String::new(),
		}
	}
}

impl Settings {
	/// Creates settings for an API root with default flags.
	pub fn new(root: impl Into<String>) -> Self {
		Self {
			api: ApiSettings {
				root: root.into(),
				..ApiSettings::default()
			},
			..Self::default()
		}
	}

	/// Parses the inline `wpcf7` object and validates it.
	pub fn from_json(json: &str) -> Result<Self, SettingsError> {
		let settings: Self = serde_json::from_str(json)?;
		settings.validated()
	}

	/// Sets the namespace.
	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.api.namespace = namespace.into();
		self
	}

	/// Sets the blocked flag.
	pub fn with_blocked(mut self, blocked: bool) -> Self {
		self.blocked = blocked;
		self
	}

	/// Sets the cached flag.
	pub fn with_cached(mut self, cached: bool) -> Self {
		self.cached = cached;
		self
	}

	/// Sets the focus delay.
	pub fn with_focus_delay(mut self, delay: Duration) -> Self {
		self.focus_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
		self
	}

	/// Sets the current page URL.
	pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
		self.page_url = url.into();
		self
	}

	/// Focus delay as a [`Duration`].
	pub fn focus_delay(&self) -> Duration {
		Duration::from_millis(self.focus_delay_ms)
	}

	/// Checks the API root and normalizes it to end with `/` (unless it
	/// carries a query string, as `?rest_route=/` roots do).
	pub fn validated(mut self) -> Result<Self, SettingsError> {
		let root = self.api.root.trim();
		if root.is_empty() {
			return Err(SettingsError::MissingApiRoot);
		}
		if !root.starts_with('/') {
			url::Url::parse(root).map_err(|e| SettingsError::InvalidApiRoot {
				root: root.to_string(),
				reason: e.to_string(),
			})?;
		}
		let mut root = root.to_string();
		if !root.contains('?') && !root.ends_with('/') {
			root.push('/');
		}
		self.api.root = root;
		Ok(self)
	}
}

/// Accepts `true`/`false`, numbers and the `"1"`/`"0"`/`"yes"` strings the
/// CMS emits for flags.
fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Loose {
		Bool(bool),
		Int(i64),
		Text(String),
	}

	match Loose::deserialize(deserializer)? {
		Loose::Bool(b) => Ok(b),
		Loose::Int(n) => Ok(n != 0),
		Loose::Text(s) if s.trim().is_empty() => Ok(false),
		Loose::Text(s) => parse_bool(&s).map_err(serde::de::Error::custom),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let settings = Settings::default();
		assert_eq!(settings.api.namespace, DEFAULT_NAMESPACE);
		assert_eq!(settings.focus_delay(), Duration::from_millis(1000));
		assert!(!settings.blocked);
	}

	#[rstest]
	#[case(r#"true"#, true)]
	#[case(r#"1"#, true)]
	#[case(r#"0"#, false)]
	#[case(r#""1""#, true)]
	#[case(r#""""#, false)]
	#[case(r#""off""#, false)]
	fn test_loose_flags(#[case] raw: &str, #[case] expected: bool) {
		let json = format!(r#"{{"api":{{"root":"https://example.com/wp-json/"}},"blocked":{raw}}}"#);
		let settings = Settings::from_json(&json).unwrap();
		assert_eq!(settings.blocked, expected);
	}

	#[rstest]
	#[case("https://example.com/wp-json", "https://example.com/wp-json/")]
	#[case("https://example.com/?rest_route=/", "https://example.com/?rest_route=/")]
	#[case("/wp-json/", "/wp-json/")]
	fn test_root_normalization(#[case] root: &str, #[case] expected: &str) {
		let settings = Settings::new(root).validated().unwrap();
		assert_eq!(settings.api.root, expected);
	}

	#[rstest]
	fn test_missing_root_is_rejected() {
		let err = Settings::from_json("{}").unwrap_err();
		assert!(matches!(err, SettingsError::MissingApiRoot));
	}

	#[rstest]
	fn test_invalid_root_is_rejected() {
		let err = Settings::new("not a url").validated().unwrap_err();
		assert!(matches!(err, SettingsError::InvalidApiRoot { .. }));
	}
}
