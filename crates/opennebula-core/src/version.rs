//! Remote release versions.
//!
//! OpenNebula reports its release through `one.system.version` as a plain
//! string such as `6.8.0`, `6.10.0.1` or `7.0.0-rc1`. [`VersionInfo`] is the
//! parsed, totally ordered form of that string and is what downstream
//! resource code consults to gate features on the remote release.

use std::cmp::Ordering;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic version of the remote OpenNebula release.
///
/// Equality and ordering ignore build metadata. A pre-release sorts before
/// the release with the same numeric segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionInfo {
    /// Major release number.
    pub major: u64,
    /// Minor release number.
    pub minor: u64,
    /// Patch release number.
    pub patch: u64,
    /// Numeric segments after the patch number (`6.10.0.1` carries `[1]`).
    pub extra: Vec<u64>,
    /// Pre-release label without the leading `-`; empty for a release.
    pub pre: Prerelease,
    /// Build metadata without the leading `+`; empty when absent.
    pub build: BuildMetadata,
}

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// The input was empty after trimming.
    #[error("empty version string")]
    Empty,

    /// The input does not look like `major[.minor[.patch]]...`.
    #[error("invalid version format: {0} (expected major.minor.patch)")]
    InvalidFormat(String),

    /// A numeric segment could not be parsed.
    #[error("invalid version segment '{segment}': {source}")]
    InvalidNumber {
        /// The offending segment.
        segment: String,
        /// Underlying integer parse failure.
        source: ParseIntError,
    },

    /// The pre-release label is not a SemVer pre-release.
    #[error("invalid pre-release label '{label}': {reason}")]
    InvalidPreRelease {
        /// Label as reported.
        label: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The build metadata is not SemVer build metadata.
    #[error("invalid build metadata '{label}': {reason}")]
    InvalidBuild {
        /// Metadata as reported.
        label: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl VersionInfo {
    /// Creates a release version without pre-release or build metadata.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            extra: Vec::new(),
            pre: Prerelease::EMPTY,
            build: BuildMetadata::EMPTY,
        }
    }

    /// Attach a pre-release label.
    #[must_use]
    pub fn with_pre(mut self, pre: Prerelease) -> Self {
        self.pre = pre;
        self
    }

    /// Parse a version such as `6.8.0`, `v6.8`, `6.10.0.1` or `7.0.0-rc1+git`.
    ///
    /// Missing minor or patch segments default to zero.
    ///
    /// # Errors
    ///
    /// Returns a [`VersionParseError`] if the string is not a version.
    pub fn parse(s: &str) -> Result<Self, VersionParseError> {
        s.parse()
    }

    /// Whether this is a pre-release.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Whether this version is at least `major.minor.patch`.
    ///
    /// A pre-release of exactly `major.minor.patch` does not qualify.
    #[must_use]
    pub fn is_at_least(&self, major: u64, minor: u64, patch: u64) -> bool {
        *self >= Self::new(major, minor, patch)
    }

    /// Checks if this version is newer than another.
    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Checks if this version is compatible with another version.
    ///
    /// Major version must match and the minor version of `other` must be
    /// greater than or equal to ours.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.major == other.major && other.minor >= self.minor
    }

    fn numeric_segments(&self) -> impl Iterator<Item = u64> + '_ {
        [self.major, self.minor, self.patch]
            .into_iter()
            .chain(self.extra.iter().copied())
    }

    fn cmp_numeric(&self, other: &Self) -> Ordering {
        let len = self.extra.len().max(other.extra.len());
        let mut lhs = self.numeric_segments();
        let mut rhs = other.numeric_segments();
        // Three core segments plus the longer tail; the shorter side pads with zero.
        for _ in 0..len.saturating_add(3) {
            let ord = lhs.next().unwrap_or(0).cmp(&rhs.next().unwrap_or(0));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for segment in &self.extra {
            write!(f, ".{segment}")?;
        }
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl PartialEq for VersionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionInfo {}

impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        // An empty pre-release sorts after every non-empty one.
        self.cmp_numeric(other).then_with(|| self.pre.cmp(&other.pre))
    }
}

impl FromStr for VersionInfo {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }
        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let (rest, build) = match body.split_once('+') {
            Some((rest, build)) => (rest, Some(build)),
            None => (body, None),
        };

        let core_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (core, tail) = rest.split_at(core_end);

        // `6.8.0-rc1` and `6.8.0rc1` both carry a pre-release.
        let pre = if tail.is_empty() {
            None
        } else if let Some(label) = tail.strip_prefix('-') {
            Some(label)
        } else if tail.starts_with(|c: char| c.is_ascii_alphabetic()) {
            Some(tail)
        } else {
            return Err(VersionParseError::InvalidFormat(s.to_owned()));
        };

        if core.is_empty() || core.starts_with('.') || core.ends_with('.') {
            return Err(VersionParseError::InvalidFormat(s.to_owned()));
        }

        let mut segments = Vec::new();
        for segment in core.split('.') {
            if segment.is_empty() {
                return Err(VersionParseError::InvalidFormat(s.to_owned()));
            }
            let value = segment
                .parse::<u64>()
                .map_err(|source| VersionParseError::InvalidNumber {
                    segment: segment.to_owned(),
                    source,
                })?;
            segments.push(value);
        }

        let pre = match pre {
            None => Prerelease::EMPTY,
            Some(label) => parse_pre(label)?,
        };
        let build = match build {
            None => BuildMetadata::EMPTY,
            Some(label) => parse_build(label)?,
        };

        let mut numbers = segments.into_iter();
        Ok(Self {
            major: numbers.next().unwrap_or(0),
            minor: numbers.next().unwrap_or(0),
            patch: numbers.next().unwrap_or(0),
            extra: numbers.collect(),
            pre,
            build,
        })
    }
}

impl TryFrom<String> for VersionInfo {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionInfo> for String {
    fn from(value: VersionInfo) -> Self {
        value.to_string()
    }
}

// `Prerelease::new("")` and `BuildMetadata::new("")` succeed as EMPTY, so a
// bare `-` or `+` is rejected here.
fn parse_pre(label: &str) -> Result<Prerelease, VersionParseError> {
    let invalid = |reason: String| VersionParseError::InvalidPreRelease {
        label: label.to_owned(),
        reason,
    };
    if label.is_empty() {
        return Err(invalid("empty label".to_owned()));
    }
    Prerelease::new(label).map_err(|e| invalid(e.to_string()))
}

fn parse_build(label: &str) -> Result<BuildMetadata, VersionParseError> {
    let invalid = |reason: String| VersionParseError::InvalidBuild {
        label: label.to_owned(),
        reason,
    };
    if label.is_empty() {
        return Err(invalid("empty metadata".to_owned()));
    }
    BuildMetadata::new(label).map_err(|e| invalid(e.to_string()))
}
