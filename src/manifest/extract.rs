//! Pin extraction: pure functions over supplied manifest text.

use thiserror::Error;

use super::locator::ManifestLocator;

/// Failures to locate a well-formed pin in manifest text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The locator did not match anything in the manifest.
    #[error("manifest does not contain the pin locator")]
    PinNotFound,

    /// The pin was located but its value is malformed for this target.
    #[error("located pin '{0}' is malformed")]
    InvalidPinFormat(String),
}

/// Extract the currently pinned version from `text`.
pub fn extract(text: &str, locator: &ManifestLocator) -> Result<String, ExtractError> {
    match locator {
        ManifestLocator::TextPattern {
            pattern,
            numeric_major,
        } => {
            let caps = pattern.captures(text).ok_or(ExtractError::PinNotFound)?;
            let value = caps
                .get(1)
                .ok_or(ExtractError::PinNotFound)?
                .as_str()
                .to_string();
            if *numeric_major && !has_numeric_major(&value) {
                return Err(ExtractError::InvalidPinFormat(value));
            }
            Ok(value)
        }
        ManifestLocator::KeyPath { keys, package } => {
            let doc: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|_| ExtractError::PinNotFound)?;
            let leaf = traverse(&doc, keys)
                .and_then(serde_yaml::Value::as_str)
                .ok_or(ExtractError::PinNotFound)?;
            leaf.strip_prefix(&format!("{package}@"))
                .map(str::to_string)
                .ok_or(ExtractError::PinNotFound)
        }
    }
}

fn has_numeric_major(value: &str) -> bool {
    value
        .trim_start_matches('v')
        .split('.')
        .next()
        .is_some_and(|major| major.parse::<u64>().is_ok())
}

fn traverse<'a>(doc: &'a serde_yaml::Value, keys: &[String]) -> Option<&'a serde_yaml::Value> {
    let mut current = doc;
    for key in keys {
        current = current.get(key.as_str())?;
    }
    Some(current)
}
