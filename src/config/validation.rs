//! Boolean flag validation.
//!
//! Only the spellings below are accepted. Anything else is a configuration
//! mistake and fails startup instead of silently disabling a check.

use crate::config::loader::ConfigError;
use crate::config::schema::FlagValue;

/// Parse a flag value as a boolean.
///
/// Accepts native booleans and the case-insensitive strings `true`, `false`,
/// `1` and `0`, ignoring surrounding whitespace.
pub fn parse_flag(key: &str, value: &FlagValue) -> Result<bool, ConfigError> {
    match value {
        FlagValue::Bool(flag) => Ok(*flag),
        FlagValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                key: key.to_string(),
                value: text.clone(),
            }),
        },
    }
}
