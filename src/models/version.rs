use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Largest value allowed for any version component.
const MAX_COMPONENT: u32 = 999;

/// A strict `major.minor.patch` version.
///
/// Parsed from strings matching `^\d+\.\d+\.\d+$` (a leading `v` is stripped
/// first). Components are capped at 999. Ordering is lexicographic over
/// (major, minor, patch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemanticVersion {
    pub const ZERO: SemanticVersion = SemanticVersion {
        major: 0,
        minor: 0,
        patch: 0,
    };

    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// True when both versions share the same `major.minor` line.
    pub fn same_minor_line(&self, other: &SemanticVersion) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ImportError::InvalidVersionFormat(s.to_string());

        let clean = s.strip_prefix('v').unwrap_or(s);
        let mut parts = clean.split('.');

        let component = |part: Option<&str>| -> Result<u32, ImportError> {
            let part = part.ok_or_else(invalid)?;
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let value: u32 = part.parse().map_err(|_| invalid())?;
            if value > MAX_COMPONENT {
                return Err(invalid());
            }
            Ok(value)
        };

        let major = component(parts.next())?;
        let minor = component(parts.next())?;
        let patch = component(parts.next())?;

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

/// Classification of a version transition, derived and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionChange {
    Major,
    Minor,
    Patch,
    Same,
}

impl VersionChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Same => "same",
        }
    }
}

/// Classify the change from `old` to `new`.
///
/// Precedence is strictly major > minor > patch: any inequality in major wins,
/// even a downgrade. A transition that changes major and minor is `Major` only.
pub fn classify(old: SemanticVersion, new: SemanticVersion) -> VersionChange {
    if old == new {
        VersionChange::Same
    } else if new.major != old.major {
        VersionChange::Major
    } else if new.minor != old.minor {
        VersionChange::Minor
    } else {
        VersionChange::Patch
    }
}
