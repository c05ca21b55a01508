//! Host framework version check.

use std::fmt;

use crate::error::{TimberError, TimberResult};

/// Oldest framework release exposing the hooks and naming helpers we rely on
pub const MINIMUM_FRAMEWORK_VERSION: FrameworkVersion = FrameworkVersion::new(1, 12, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameworkVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FrameworkVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `major[.minor[.patch]]`, ignoring any pre-release or build suffix.
    pub fn parse(version: &str) -> TimberResult<Self> {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let core = trimmed
            .split(['-', '+'])
            .next()
            .unwrap_or_default();

        let mut parts = core.split('.');
        let mut component = |name: &str, required: bool| -> TimberResult<u64> {
            match parts.next() {
                Some(part) => part.parse::<u64>().map_err(|_| {
                    TimberError::invalid_version(format!(
                        "{name} component {part:?} of {version:?} is not a number"
                    ))
                }),
                None if required => Err(TimberError::invalid_version(format!(
                    "{version:?} has no {name} component"
                ))),
                None => Ok(0),
            }
        };

        let major = component("major", true)?;
        let minor = component("minor", false)?;
        let patch = component("patch", false)?;

        if parts.next().is_some() {
            return Err(TimberError::invalid_version(format!(
                "{version:?} has too many components"
            )));
        }

        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for FrameworkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Fail unless `version` is at least [`MINIMUM_FRAMEWORK_VERSION`].
pub fn ensure_compatible(version: &str) -> TimberResult<FrameworkVersion> {
    let parsed = FrameworkVersion::parse(version)?;
    if parsed < MINIMUM_FRAMEWORK_VERSION {
        return Err(TimberError::IncompatibleFramework {
            found: version.to_string(),
            required: format!(
                "{}.{}",
                MINIMUM_FRAMEWORK_VERSION.major, MINIMUM_FRAMEWORK_VERSION.minor
            ),
        });
    }
    Ok(parsed)
}
