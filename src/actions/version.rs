// src/actions/version.rs

//! Semantic versions as found in package manifests.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ReleasedagError;
use crate::types::BumpKind;

static SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    )
    .expect("semver regex is valid")
});

/// `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
    pub build: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
            build: None,
        }
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    /// Next version of the given class.
    ///
    /// Build metadata is always dropped. A prerelease of the target version
    /// is promoted to that release (`1.2.0-rc.1` bumped minor is `1.2.0`),
    /// any other prerelease tag is dropped after incrementing. Fails with
    /// [`ReleasedagError::InvalidInput`] when the incremented component would
    /// not fit in a `u64`.
    pub fn bump(&self, kind: BumpKind) -> Result<Version, ReleasedagError> {
        let pre = self.is_prerelease();
        let next = match kind {
            BumpKind::Major if pre && self.minor == 0 && self.patch == 0 => {
                Version::new(self.major, 0, 0)
            }
            BumpKind::Major => Version::new(self.increment(self.major, kind)?, 0, 0),
            BumpKind::Minor if pre && self.patch == 0 => Version::new(self.major, self.minor, 0),
            BumpKind::Minor => Version::new(self.major, self.increment(self.minor, kind)?, 0),
            BumpKind::Patch if pre => Version::new(self.major, self.minor, self.patch),
            BumpKind::Patch => {
                Version::new(self.major, self.minor, self.increment(self.patch, kind)?)
            }
        };
        Ok(next)
    }

    fn increment(&self, component: u64, kind: BumpKind) -> Result<u64, ReleasedagError> {
        component.checked_add(1).ok_or_else(|| {
            ReleasedagError::InvalidInput(format!(
                "version component overflow: cannot apply a {kind} bump to {self}"
            ))
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ReleasedagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReleasedagError::InvalidInput(format!("invalid version number - {s}"));

        let caps = SEMVER_RE.captures(s.trim()).ok_or_else(invalid)?;
        let number = |idx: usize| -> Result<u64, ReleasedagError> {
            caps.get(idx)
                .ok_or_else(invalid)?
                .as_str()
                .parse()
                .map_err(|_| invalid())
        };

        Ok(Version {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            pre: caps.get(4).map(|m| m.as_str().to_string()),
            build: caps.get(5).map(|m| m.as_str().to_string()),
        })
    }
}
