//! # wpcf7-conf
//!
//! Settings for the wpcf7 form behaviour layer.
//!
//! Settings are constructed once at application start (from the inline
//! page object via [`Settings::from_json`], from the environment via
//! [`Settings::from_env`], or programmatically) and are read-only
//! afterwards. Components receive them as `Arc<Settings>`.
//!
//! ## Module Organization
//!
//! - [`settings`]: the settings struct and JSON source
//! - [`env`]: `WPCF7_*` environment variable source
//! - [`error`]: load/validation errors

pub mod env;
pub mod error;
pub mod settings;

pub use env::{ENV_PREFIX, EnvSource, parse_bool};
pub use error::SettingsError;
pub use settings::{ApiSettings, DEFAULT_FOCUS_DELAY_MS, DEFAULT_NAMESPACE, Settings};
