//! The upstream candidate-version boundary.
//!
//! Discovery of new upstream versions (release feeds, tag lists, container
//! registries) happens outside this crate. The orchestrator only ever
//! consumes a single candidate string per target through this trait.

use async_trait::async_trait;

use crate::config::RollTarget;

/// Supplies the latest upstream version a target could roll to.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn candidate(&self, target: &RollTarget) -> anyhow::Result<String>;
}

/// A fixed candidate, supplied on the command line or by a test.
pub struct FixedCandidate(pub String);

#[async_trait]
impl CandidateSource for FixedCandidate {
    async fn candidate(&self, _target: &RollTarget) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}
