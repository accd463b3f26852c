//! Roll execution: ref lifecycle, pull-request reconciliation, label
//! classification, and the per-target orchestrator.

pub mod labels;
pub mod orchestrator;
pub mod pr_text;
pub mod reconcile;
pub mod refs;

pub use orchestrator::{roll_target, PinUpdate, RollOutcome, RunSummary};
