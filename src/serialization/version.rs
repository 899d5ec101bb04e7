//! Versions used to gate member-level rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A `major.minor` version.
///
/// Ordering compares `major` first, then `minor`. The empty version `0.0`
/// means "unspecified": version-gated rules apply regardless when the active
/// version is empty.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Version {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
}

impl Version {
    /// Create a version.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The empty (unspecified) version.
    pub const fn empty() -> Self {
        Self::new(0, 0)
    }

    /// Returns true for the empty version.
    pub const fn is_empty(&self) -> bool {
        self.major == 0 && self.minor == 0
    }
}

impl From<u32> for Version {
    fn from(major: u32) -> Self {
        Self::new(major, 0)
    }
}

impl From<(u32, u32)> for Version {
    fn from((major, minor): (u32, u32)) -> Self {
        Self::new(major, minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = Error;

    /// Parses `"3"` or `"3.1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::custom(format!("invalid version {:?}", s));
        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, "0"),
        };
        Ok(Self::new(
            major.parse().map_err(|_| invalid())?,
            minor.parse().map_err(|_| invalid())?,
        ))
    }
}
