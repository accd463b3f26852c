//! Version comparison schemes and the roll gate.
//!
//! Pure and deterministic: given the same (current, candidate, policy)
//! triple the answer never changes, and nothing here performs I/O.

use thiserror::Error;

/// A pinned or candidate value that cannot be ordered under the target's
/// comparison scheme.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("'{0}' is not a comparable version")]
    InvalidPinFormat(String),
}

/// How two pinned values of a target are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Dotted numeric components compared left to right, e.g. the
    /// four-part `96.0.4664.4` browser-engine form.
    DottedNumeric,
    /// Full semantic-version ordering, e.g. runtime releases.
    Semver,
    /// No ordering at all - any textual change warrants a roll (image
    /// tag/digest pairs).
    Changed,
}

/// Decides when an upstream candidate warrants replacing the current pin.
#[derive(Debug, Clone)]
pub struct RollPolicy {
    pub scheme: Scheme,
    /// Decline candidates on odd-numbered major lines (LTS-only rolling).
    pub even_major_only: bool,
    /// Extra major lines admitted beyond the pin's own line, supplied by
    /// the caller once an upcoming line enters its support window.
    pub extra_majors: Vec<u64>,
}

impl RollPolicy {
    #[must_use]
    pub fn dotted() -> Self {
        Self {
            scheme: Scheme::DottedNumeric,
            even_major_only: false,
            extra_majors: Vec::new(),
        }
    }

    #[must_use]
    pub fn semver() -> Self {
        Self {
            scheme: Scheme::Semver,
            even_major_only: false,
            extra_majors: Vec::new(),
        }
    }

    /// Semver ordering restricted to even-numbered (LTS) major lines.
    #[must_use]
    pub fn lts_only() -> Self {
        Self {
            scheme: Scheme::Semver,
            even_major_only: true,
            extra_majors: Vec::new(),
        }
    }

    #[must_use]
    pub fn changed() -> Self {
        Self {
            scheme: Scheme::Changed,
            even_major_only: false,
            extra_majors: Vec::new(),
        }
    }

    /// Admit an additional major line (head-branch support-window opt-in).
    #[must_use]
    pub fn with_extra_major(mut self, major: u64) -> Self {
        self.extra_majors.push(major);
        self
    }
}

/// The size of a version bump, for pull-request classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bump {
    Patch,
    Minor,
    Major,
}

/// Decide whether `candidate` warrants replacing `current`.
pub fn should_roll(
    current: &str,
    candidate: &str,
    policy: &RollPolicy,
) -> Result<bool, VersionError> {
    match policy.scheme {
        Scheme::Changed => Ok(current != candidate),
        Scheme::DottedNumeric => Ok(parse_dotted(candidate)? > parse_dotted(current)?),
        Scheme::Semver => {
            let current = parse_semver(current)?;
            let candidate = parse_semver(candidate)?;
            if !major_allowed(current.major, candidate.major, policy) {
                return Ok(false);
            }
            Ok(candidate > current)
        }
    }
}

/// Classify the jump between two semantic versions.
pub fn bump_kind(previous: &str, target: &str) -> Result<Bump, VersionError> {
    let previous = parse_semver(previous)?;
    let target = parse_semver(target)?;
    if previous.major != target.major {
        Ok(Bump::Major)
    } else if previous.minor != target.minor {
        Ok(Bump::Minor)
    } else {
        Ok(Bump::Patch)
    }
}

fn major_allowed(current_major: u64, candidate_major: u64, policy: &RollPolicy) -> bool {
    if policy.even_major_only && candidate_major % 2 != 0 {
        return false;
    }
    candidate_major == current_major || policy.extra_majors.contains(&candidate_major)
}

fn parse_dotted(value: &str) -> Result<Vec<u64>, VersionError> {
    value
        .split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| VersionError::InvalidPinFormat(value.to_string()))
        })
        .collect()
}

fn parse_semver(value: &str) -> Result<semver::Version, VersionError> {
    semver::Version::parse(value.trim_start_matches('v'))
        .map_err(|_| VersionError::InvalidPinFormat(value.to_string()))
}
