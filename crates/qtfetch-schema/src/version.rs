//! Dotted SDK versions and the compact codes derived from them.
//!
//! A release such as `5.15.2` appears in the repository in two condensed
//! forms: the directory `qt5_5152` and the package prefix `qt.qt5.5152.`.
//! Manifest entries carry the full release string (`5.15.2-0-202011130601`),
//! from which the dotted part is recovered with [`QtVersion::from_release`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a version string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The string is not three dot-separated decimal components.
    #[error("Invalid version '{0}': expected three dotted numbers like \"6.2.0\"")]
    Malformed(String),
}

/// Every release the repository is known to publish, oldest first.
pub const KNOWN_VERSIONS: &[&str] = &[
    "5.9.0", "5.9.1", "5.9.2", "5.9.3", "5.9.4", "5.9.5", "5.9.6", "5.9.7", "5.9.8", "5.9.9",
    "5.10.0", "5.10.1", "5.11.0", "5.11.1", "5.11.2", "5.11.3", "5.12.0", "5.12.1", "5.12.2",
    "5.12.3", "5.12.4", "5.12.5", "5.12.6", "5.12.7", "5.12.8", "5.12.9", "5.12.10", "5.12.11",
    "5.13.0", "5.13.1", "5.13.2", "5.14.0", "5.14.1", "5.14.2", "5.15.0", "5.15.1", "5.15.2",
    "6.0.0", "6.0.1", "6.0.2", "6.0.3", "6.0.4", "6.1.0", "6.1.1", "6.1.2", "6.2.0",
];

/// A `major.minor.patch` SDK release.
///
/// Ordering follows the numeric components, so `5.9.0 < 5.10.0`.
///
/// # Example
///
/// ```
/// use qtfetch_schema::QtVersion;
///
/// let v: QtVersion = "5.12.10".parse().unwrap();
/// assert_eq!(v.compact(), "51210");
/// assert_eq!(v.family(), "qt5_51210");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QtVersion {
    /// Major version; selects the package naming scheme.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl QtVersion {
    /// Create a version from its components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Recover the dotted version from a manifest release string.
    ///
    /// Release strings append a build suffix after the first `-`
    /// (`6.2.0-0-202107051001`); only the leading dotted part is parsed.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Malformed`] if the leading part is not a valid
    /// dotted version.
    pub fn from_release(release: &str) -> Result<Self, VersionError> {
        let dotted = release.split('-').next().unwrap_or(release);
        dotted
            .parse()
            .map_err(|_| VersionError::Malformed(release.to_string()))
    }

    /// The components concatenated without separators (`5.15.2` -> `5152`).
    ///
    /// This is the form used in repository directory names.
    pub fn compact(&self) -> String {
        format!("{}{}{}", self.major, self.minor, self.patch)
    }

    /// Candidate compact codes as they may appear inside package names.
    ///
    /// The plain concatenation comes first, followed by a form with minor and
    /// patch padded to two digits. Callers pick whichever one the manifest's
    /// own package names use.
    pub fn compact_candidates(&self) -> Vec<String> {
        let plain = self.compact();
        let padded = format!("{}{:02}{:02}", self.major, self.minor, self.patch);
        if padded == plain {
            vec![plain]
        } else {
            vec![plain, padded]
        }
    }

    /// Repository subdirectory for this release (`qt5_5152`).
    pub fn family(&self) -> String {
        format!("qt{}_{}", self.major, self.compact())
    }

    /// Returns `true` if this release is listed in [`KNOWN_VERSIONS`].
    pub fn is_known(&self) -> bool {
        known_versions().contains(self)
    }
}

impl FromStr for QtVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || VersionError::Malformed(s.to_string());

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(malformed());
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            // u32::from_str accepts a leading '+', the repository never does
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            *slot = part.parse().map_err(|_| malformed())?;
        }

        let [major, minor, patch] = numbers;
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for QtVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl serde::Serialize for QtVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for QtVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// All known releases, parsed and in ascending order.
pub fn known_versions() -> Vec<QtVersion> {
    let mut versions: Vec<QtVersion> = KNOWN_VERSIONS
        .iter()
        .filter_map(|v| v.parse().ok())
        .collect();
    versions.sort();
    versions
}
