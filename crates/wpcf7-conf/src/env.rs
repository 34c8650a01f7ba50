//! Environment variable source
//!
//! Native embedders (test harnesses, server-side renderers) configure the
//! layer through `WPCF7_*` variables instead of the inline page object.

use crate::error::SettingsError;
use crate::settings::Settings;
use std::env;

/// Default variable prefix.
pub const ENV_PREFIX: &str = "WPCF7_";

/// Parses the boolean spellings accepted for flags.
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		other => Err(format!("'{}' is not a boolean", other)),
	}
}

/// Reads settings from prefixed environment variables
/// (`API_ROOT`, `API_NAMESPACE`, `BLOCKED`, `CACHED`, `FOCUS_DELAY_MS`, `PAGE_URL`).
#[derive(Debug, Clone)]
pub struct EnvSource {
	prefix: String,
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl EnvSource {
	/// Uses the [`ENV_PREFIX`] prefix.
	pub fn new() -> Self {
		Self {
			prefix: ENV_PREFIX.to_string(),
		}
	}

	/// Uses a custom prefix.
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	fn var(&self, key: &str) -> Option<(String, String)> {
		let full_key = format!("{}{}", self.prefix, key);
		env::var(&full_key).ok().map(|value| (full_key, value))
	}

	/// Overlays the variables that are set onto `base`, then validates.
	pub fn load_into(&self, mut base: Settings) -> Result<Settings, SettingsError> {
		if let Some((_, root)) = self.var("API_ROOT") {
			base.api.root = root;
		}
		if let Some((_, namespace)) = self.var("API_NAMESPACE") {
			base.api.namespace = namespace;
		}
		if let Some((key, value)) = self.var("BLOCKED") {
			base.blocked = parse_flag(key, &value)?;
		}
		if let Some((key, value)) = self.var("CACHED") {
			base.cached = parse_flag(key, &value)?;
		}
		if let Some((key, value)) = self.var("FOCUS_DELAY_MS") {
			base.focus_delay_ms = value.trim().parse().map_err(|e: std::num::ParseIntError| {
				SettingsError::Env {
					key,
					value_len: value.len(),
					error: e.to_string(),
				}
			})?;
		}
		if let Some((_, url)) = self.var("PAGE_URL") {
			base.page_url = url;
		}
		base.validated()
	}

	/// Loads settings from the environment on top of the defaults.
	pub fn load(&self) -> Result<Settings, SettingsError> {
		self.load_into(Settings::default())
	}
}

fn parse_flag(key: String, value: &str) -> Result<bool, SettingsError> {
	parse_bool(value).map_err(|error| SettingsError::Env {
		key,
		value_len: value.len(),
		error,
	})
}

impl Settings {
	/// Loads settings from `WPCF7_*` environment variables.
	pub fn from_env() -> Result<Self, SettingsError> {
		EnvSource::new().load()
	}
}
