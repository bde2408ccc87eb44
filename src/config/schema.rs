//! Configuration schema definitions.
//!
//! `SanitySettings` is the resolved, immutable view every layer reads. The
//! surrounding `ServiceConfig` only exists for the demo server binary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;
use crate::config::validation::parse_flag;

/// Key that switches every check off before individual overrides apply.
pub const DISABLE_ALL: &str = "disable_all";
pub const CHECK_FORM: &str = "check_form";
pub const CHECK_PARAMS: &str = "check_params";
pub const CHECK_PATH: &str = "check_path";
pub const ASCII_SAFE_REDIRECTS: &str = "ascii_safe_redirects";
/// Sub option of the form check.
pub const ASSUME_FORM_ON_BLANK: &str = "check_form.assume_form_on_blank";

/// A raw configuration value as found in a host settings map.
///
/// Host settings usually mix native booleans with strings that came from an
/// ini or env source, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::Text(value)
    }
}

/// Which sanity checks are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SanitySettings {
    /// Validate the multipart boundary of POST form submissions.
    pub check_form: bool,

    /// Validate that the query string decodes as UTF-8.
    pub check_params: bool,

    /// Validate that the request path decodes as UTF-8.
    pub check_path: bool,

    /// Percent-encode non-ASCII `Location` headers on the way out.
    pub ascii_safe_redirects: bool,

    /// Treat a POST without a `Content-Type` as `multipart/form-data`.
    pub assume_form_on_blank: bool,
}

impl Default for SanitySettings {
    fn default() -> Self {
        Self {
            check_form: true,
            check_params: true,
            check_path: true,
            ascii_safe_redirects: true,
            assume_form_on_blank: false,
        }
    }
}

impl SanitySettings {
    /// Settings with every check switched off.
    pub fn disabled() -> Self {
        let mut settings = Self::default();
        settings.all_off();
        settings
    }

    /// Switch every check off. `assume_form_on_blank` is left alone since it
    /// only refines the form check.
    pub fn all_off(&mut self) {
        self.check_form = false;
        self.check_params = false;
        self.check_path = false;
        self.ascii_safe_redirects = false;
    }

    /// Resolve settings from a flat key/value map.
    ///
    /// `disable_all` is applied first, then each individual key overrides
    /// its flag. Missing keys keep their defaults.
    pub fn resolve(settings: &HashMap<String, FlagValue>) -> Result<Self, ConfigError> {
        Self::resolve_with(|key| settings.get(key))
    }

    /// Resolve settings from a host-wide map where this crate's keys live
    /// under `prefix` (e.g. `"sanity."` for `sanity.check_form`).
    pub fn resolve_prefixed(
        settings: &HashMap<String, FlagValue>,
        prefix: &str,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with(|key| settings.get(&format!("{prefix}{key}")))
    }

    fn resolve_with<'a, F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<&'a FlagValue>,
    {
        let mut resolved = Self::default();

        if let Some(value) = lookup(DISABLE_ALL) {
            if parse_flag(DISABLE_ALL, value)? {
                resolved.all_off();
            }
        }

        let fields: [(&str, &mut bool); 5] = [
            (CHECK_FORM, &mut resolved.check_form),
            (CHECK_PARAMS, &mut resolved.check_params),
            (CHECK_PATH, &mut resolved.check_path),
            (ASCII_SAFE_REDIRECTS, &mut resolved.ascii_safe_redirects),
            (ASSUME_FORM_ON_BLANK, &mut resolved.assume_form_on_blank),
        ];
        for (key, flag) in fields {
            if let Some(value) = lookup(key) {
                *flag = parse_flag(key, value)?;
            }
        }

        Ok(resolved)
    }

    /// Whether any request-side check is enabled.
    pub fn ingress_required(&self) -> bool {
        self.check_form || self.check_params || self.check_path
    }

    /// Whether any response-side check is enabled.
    pub fn egress_required(&self) -> bool {
        self.ascii_safe_redirects
    }
}

/// Full configuration for the demo server.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub listener: ListenerConfig,
    pub observability: ObservabilityConfig,
    pub sanity: SanitySettings,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "request_sanity=debug,tower_http=debug".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
