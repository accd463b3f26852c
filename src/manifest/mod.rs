//! Locating, extracting, and rewriting pinned values in manifest files.

mod extract;
mod locator;
mod rewrite;

pub use extract::{extract, ExtractError};
pub use locator::ManifestLocator;
pub use rewrite::rewrite;
