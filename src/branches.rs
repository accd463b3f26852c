//! Selection of the release branches a target rolls against.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Release branches look like `24-x-y`, or `4-0-x` in the legacy
    /// per-minor naming.
    static ref RELEASE_BRANCH: Regex = Regex::new(r"^(\d+)-(?:\d+-x|x-y)$").unwrap();
}

/// Number of major release lines that receive automatic rolls.
pub const NUM_SUPPORTED_LINES: usize = 3;

/// Pick the currently supported release branches out of `names`: the
/// newest branch of each major line, for the last `keep` lines.
#[must_use]
pub fn supported_release_branches(names: &[String], keep: usize) -> Vec<String> {
    let mut release: Vec<&String> = names
        .iter()
        .filter(|name| RELEASE_BRANCH.is_match(name))
        .collect();
    release.sort_by_key(|name| segments(name));

    // Sorted ascending, so the last write per major wins.
    let mut per_major: BTreeMap<u64, String> = BTreeMap::new();
    for name in release {
        if let Some(major) = segments(name).first() {
            per_major.insert(*major, name.clone());
        }
    }

    let mut supported: Vec<String> = per_major.into_values().collect();
    if supported.len() > keep {
        supported.drain(..supported.len() - keep);
    }
    supported
}

/// Branch-name segments as numbers, with `x`/`y` sorting above any digit.
fn segments(name: &str) -> Vec<u64> {
    name.split('-')
        .map(|part| part.parse::<u64>().unwrap_or(u64::MAX))
        .collect()
}
