//! Roll orchestration core library.
//!
//! This crate keeps pinned upstream versions (a browser engine, a runtime,
//! a CI orb, a container image) in repository manifest files up to date:
//! it extracts the currently pinned value, decides whether a newer upstream
//! candidate warrants a change, rewrites the manifest with a minimal diff,
//! and reconciles the change against exactly one open pull request per
//! (target, base branch) pair.
//!
//! Upstream version discovery and the transport that triggers a roll are
//! external collaborators; the orchestrator consumes a candidate version
//! string through the [`upstream::CandidateSource`] boundary and performs
//! all repository mutations through the [`github::RepoHost`] operation set.

pub mod branches;
pub mod config;
pub mod error;
pub mod github;
pub mod manifest;
pub mod rolls;
pub mod upstream;
pub mod version;

// Re-export commonly used types
pub use config::RollTarget;
pub use error::{Result, RollError};
pub use rolls::{roll_target, PinUpdate, RollOutcome, RunSummary};
