//! Target-specific strategies for finding a pin inside manifest text.

use regex::Regex;

/// How a target's pinned value is located within its manifest file.
///
/// Locators are static configuration, constructed once per process; an
/// invalid pattern is a programming error and panics at startup.
#[derive(Debug, Clone)]
pub enum ManifestLocator {
    /// A regular expression with exactly one capture group around the pin.
    /// When `numeric_major` is set, the first dotted component of the
    /// captured value (after an optional `v` prefix) must parse as a
    /// number; a commit-hash pin in a slot that expects a release version
    /// is malformed, not missing.
    TextPattern {
        pattern: Regex,
        numeric_major: bool,
    },

    /// An ordered key path into a YAML mapping whose leaf value follows
    /// the `"<package>@<version>"` convention.
    KeyPath {
        keys: Vec<String>,
        package: String,
    },
}

impl ManifestLocator {
    /// A text pattern whose pin is an opaque reference (tag, digest pair).
    #[must_use]
    pub fn text(pattern: &str) -> Self {
        Self::TextPattern {
            pattern: Regex::new(pattern).expect("invalid pin locator pattern"),
            numeric_major: false,
        }
    }

    /// A text pattern whose pin must carry a numeric major version.
    #[must_use]
    pub fn numeric_text(pattern: &str) -> Self {
        Self::TextPattern {
            pattern: Regex::new(pattern).expect("invalid pin locator pattern"),
            numeric_major: true,
        }
    }

    /// A key path into a structured document, ending in `<package>@<version>`.
    #[must_use]
    pub fn key_path(keys: &[&str], package: &str) -> Self {
        Self::KeyPath {
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
            package: package.to_string(),
        }
    }
}
