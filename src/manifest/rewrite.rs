//! Pin rewriting with a minimal-diff preference.
//!
//! Two-tier strategy, kept deliberately: a literal in-place substitution
//! whenever the located occurrence is textually unique, falling back to a
//! structural re-serialization only when the shortcut is not safe. The
//! fallback may alter incidental formatting; the shortcut never does.

use super::extract::ExtractError;
use super::locator::ManifestLocator;

/// Produce new manifest text with the pinned value changed from
/// `previous` to `target` and nothing else.
///
/// The caller has already decided the roll is warranted; `previous` is the
/// value a prior [`super::extract`] returned for the same text.
pub fn rewrite(
    text: &str,
    locator: &ManifestLocator,
    previous: &str,
    target: &str,
) -> Result<String, ExtractError> {
    match locator {
        ManifestLocator::TextPattern { pattern, .. } => {
            let caps = pattern.captures(text).ok_or(ExtractError::PinNotFound)?;
            let pin = caps.get(1).ok_or(ExtractError::PinNotFound)?;
            let mut out = String::with_capacity(text.len() + target.len());
            out.push_str(&text[..pin.start()]);
            out.push_str(target);
            out.push_str(&text[pin.end()..]);
            Ok(out)
        }
        ManifestLocator::KeyPath { keys, package } => {
            let literal = format!("{package}@{previous}");
            if text.matches(&literal).count() == 1 {
                return Ok(text.replacen(&literal, &format!("{package}@{target}"), 1));
            }

            // Degraded path: re-parse and re-serialize the whole document.
            let mut doc: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|_| ExtractError::PinNotFound)?;
            set_leaf(&mut doc, keys, format!("{package}@{target}"))?;
            serde_yaml::to_string(&doc).map_err(|_| ExtractError::PinNotFound)
        }
    }
}

fn set_leaf(
    doc: &mut serde_yaml::Value,
    keys: &[String],
    value: String,
) -> Result<(), ExtractError> {
    let mut current = doc;
    for key in keys {
        current = current
            .get_mut(key.as_str())
            .ok_or(ExtractError::PinNotFound)?;
    }
    *current = serde_yaml::Value::String(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::extract::extract;
    use super::*;

    const DEPS: &str = "vars = {\n  'chromium_version':\n    '96.0.4664.4',\n  'node_version':\n    'v16.13.0',\n}\n";

    fn deps_locator(key: &str) -> ManifestLocator {
        ManifestLocator::numeric_text(&format!(r"'{key}':\n\s+'([^']+)',"))
    }

    #[test]
    fn test_rewrites_only_the_pin() {
        let locator = deps_locator("chromium_version");
        let out = rewrite(DEPS, &locator, "96.0.4664.4", "96.0.4664.10").unwrap();
        assert_eq!(out, DEPS.replace("96.0.4664.4", "96.0.4664.10"));
        // The sibling pin is untouched.
        assert!(out.contains("'v16.13.0',"));
    }

    #[test]
    fn test_round_trips_through_extract() {
        let locator = deps_locator("node_version");
        let out = rewrite(DEPS, &locator, "v16.13.0", "v16.14.2").unwrap();
        assert_eq!(extract(&out, &locator).unwrap(), "v16.14.2");
    }

    #[test]
    fn test_missing_pin_is_not_found() {
        let result = rewrite(DEPS, &deps_locator("boto_version"), "1", "2");
        assert_eq!(result, Err(ExtractError::PinNotFound));
    }

    #[test]
    fn test_key_path_single_occurrence_is_byte_minimal() {
        let yaml = "# build config - do not reformat\norbs:\n  node:    electron/node-orb@1.2.3   # pinned\n";
        let locator = ManifestLocator::key_path(&["orbs", "node"], "electron/node-orb");
        let out = rewrite(yaml, &locator, "1.2.3", "1.3.0").unwrap();
        // Literal substitution leaves the odd spacing and comments alone.
        assert_eq!(
            out,
            "# build config - do not reformat\norbs:\n  node:    electron/node-orb@1.3.0   # pinned\n"
        );
    }

    #[test]
    fn test_key_path_duplicate_occurrence_reserializes() {
        // The same composite value appears twice, so the literal shortcut
        // is ambiguous and the structural path must be taken.
        let yaml = "orbs:\n  node: electron/node-orb@1.2.3\nanchors:\n  copy: electron/node-orb@1.2.3\n";
        let locator = ManifestLocator::key_path(&["orbs", "node"], "electron/node-orb");
        let out = rewrite(yaml, &locator, "1.2.3", "1.3.0").unwrap();
        assert_eq!(
            extract(&out, &locator).unwrap(),
            "1.3.0",
            "located key must carry the new version"
        );
        // Only the located key changes; the copy keeps the old version.
        assert!(out.contains("electron/node-orb@1.2.3"));
    }

    #[test]
    fn test_key_path_missing_level_fails() {
        let yaml = "orbs:\n  node: electron/node-orb@1.2.3\n";
        let locator = ManifestLocator::key_path(&["workflows", "node"], "electron/node-orb");
        // No occurrence of the literal and no such key path.
        let result = rewrite(yaml, &locator, "9.9.9", "1.3.0");
        assert_eq!(result, Err(ExtractError::PinNotFound));
    }
}
