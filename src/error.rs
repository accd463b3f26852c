//! Crate-level error taxonomy.

use thiserror::Error;

use crate::github::HostError;
use crate::manifest::ExtractError;
use crate::version::VersionError;

/// Errors surfaced while rolling a pin.
///
/// Everything except [`RollError::UpstreamUnavailable`] and
/// [`RollError::RunFailed`] is a per-branch condition: the orchestrator
/// records it against the branch and continues with the next one.
#[derive(Debug, Error)]
pub enum RollError {
    /// The manifest does not contain a recognizable, well-formed pin.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A pinned or candidate value is not comparable under the target's scheme.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// A repository-host operation failed.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Candidate-version discovery failed; there is nothing to compare
    /// against, so the whole run for this target is aborted.
    #[error("upstream lookup for '{target}' failed: {reason}")]
    UpstreamUnavailable { target: String, reason: String },

    /// Raised once by the orchestrator after every branch was attempted.
    #[error("{failed} of {attempted} branch rolls failed - see logs for details")]
    RunFailed { failed: usize, attempted: usize },
}

/// Type alias for roll results.
pub type Result<T> = std::result::Result<T, RollError>;
