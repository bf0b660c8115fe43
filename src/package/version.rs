//! Package versions.
//!
//! A version is `major.minor[.patch[.revision]][-prerelease][+metadata]`.
//! Missing patch normalizes to 0 and a zero revision is dropped, so `1.0`,
//! `1.0.0` and `1.0.0.0` are the same version and all display as `1.0.0`.
//! Prerelease and metadata are validated by `semver`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version};

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct PackageVersion {
    version: Version,
    revision: u64,
}

impl PackageVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            version: Version::new(major, minor, patch),
            revision: 0,
        }
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }

    /// Dot-joined prerelease label, e.g. `beta.2`.
    pub fn release(&self) -> Option<&str> {
        (!self.version.pre.is_empty()).then(|| self.version.pre.as_str())
    }

    /// Build metadata. Ignored by equality and ordering.
    pub fn metadata(&self) -> Option<&str> {
        (!self.version.build.is_empty()).then(|| self.version.build.as_str())
    }

    /// Normalized form with build metadata appended.
    pub fn to_full_string(&self) -> String {
        match self.metadata() {
            Some(metadata) => format!("{}+{}", self, metadata),
            None => self.to_string(),
        }
    }
}

fn invalid(input: &str) -> Error {
    Error::InvalidVersion {
        input: input.to_string(),
    }
}

impl FromStr for PackageVersion {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();

        let (rest, build) = match trimmed.split_once('+') {
            Some((_, "")) => return Err(invalid(input)),
            Some((rest, build)) => (rest, BuildMetadata::new(build).map_err(|_| invalid(input))?),
            None => (trimmed, BuildMetadata::EMPTY),
        };
        let (core, pre) = match rest.split_once('-') {
            Some((_, "")) => return Err(invalid(input)),
            Some((core, pre)) => (core, Prerelease::new(pre).map_err(|_| invalid(input))?),
            None => (rest, Prerelease::EMPTY),
        };

        let numbers = core
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid(input));
                }
                part.parse::<u64>().map_err(|_| invalid(input))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if !(2..=4).contains(&numbers.len()) {
            return Err(invalid(input));
        }

        let component = |i: usize| numbers.get(i).copied().unwrap_or(0);
        Ok(Self {
            version: Version {
                major: component(0),
                minor: component(1),
                patch: component(2),
                pre,
                build,
            },
            revision: component(3),
        })
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.version;
        write!(f, "{}.{}.{}", v.major, v.minor, v.patch)?;
        if self.revision > 0 {
            write!(f, ".{}", self.revision)?;
        }
        if let Some(release) = self.release() {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

/// Numeric identifiers numerically and before alphanumeric ones; alphanumeric
/// identifiers ignoring ASCII case.
fn compare_labels(a: &Prerelease, b: &Prerelease) -> Ordering {
    let mut left = a.as_str().split('.');
    let mut right = b.as_str().split('.');
    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()),
            },
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.version, &other.version);
        (a.major, a.minor, a.patch, self.revision)
            .cmp(&(b.major, b.minor, b.patch, other.revision))
            // A release sorts after all of its prereleases.
            .then_with(|| match (a.pre.is_empty(), b.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => compare_labels(&a.pre, &b.pre),
            })
            // Labels differing only in case are distinct versions.
            .then_with(|| a.pre.as_str().cmp(b.pre.as_str()))
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let v = &self.version;
        (v.major, v.minor, v.patch, self.revision).hash(state);
        v.pre.as_str().hash(state);
    }
}
