//! Pull-request title/body generation and the original-version marker.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{DiffLinkStyle, RollTarget};

lazy_static! {
    /// Marker line recording the version a PR started its life rolling
    /// from, kept inside an HTML comment so it survives body rewrites.
    static ref ORIGINAL_VERSION: Regex = Regex::new(r"(?m)^Original-Version: (\S+)").unwrap();
}

/// Generated pull-request text.
#[derive(Debug, Clone)]
pub struct PrText {
    pub title: String,
    pub body: String,
}

/// Recover the version a roll PR started from, even after its title and
/// body have been rewritten by later incremental updates.
#[must_use]
pub fn original_version(body: &str) -> Option<String> {
    ORIGINAL_VERSION
        .captures(body)
        .map(|caps| caps[1].to_string())
}

/// Title and body for a roll PR moving `previous` to `new_version`.
#[must_use]
pub fn pr_text(target: &RollTarget, previous: &str, new_version: &str, base: &str) -> PrText {
    let title = format!("{} to {} ({})", target.title_prefix(), new_version, base);

    let mut body = format!("Updating {} to {}.\n\n", target.name, new_version);
    match &target.diff_link {
        DiffLinkStyle::Gitiles { base: url } => {
            body.push_str(&format!(
                "See [all changes in {previous}..{new_version}]({url}/+log/{previous}..{new_version}?n=10000&pretty=fuller)\n\n",
            ));
        }
        DiffLinkStyle::Compare { repo } => {
            body.push_str(&format!(
                "See [all changes in {previous}..{new_version}](https://github.com/{repo}/compare/{previous}...{new_version})\n\n",
            ));
        }
        DiffLinkStyle::None => {}
    }
    body.push_str(&format!(
        "<!--\nOriginal-Version: {previous}\n-->\n\nNotes: Updated {} to {}.",
        target.name, new_version
    ));

    PrText { title, body }
}
