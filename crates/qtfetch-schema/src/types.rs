//! Manifest records and resolution results.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// A package identifier as it appears in a manifest (`qt.qt5.5152.gcc_64`).
///
/// Names are kept byte-for-byte: they are path segments of archive URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    /// Create a new package name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for PackageName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PackageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PackageName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A single `PackageUpdate` from a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Unique identifier within the manifest.
    pub name: PackageName,
    /// Human readable title.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Release string shared by every entry of one release (`5.15.2-0-202011130601`).
    pub version: String,
    /// Publication date as written in the manifest.
    pub release_date: String,
    /// Installed for its architecture whether or not it was selected.
    pub default: bool,
    /// Names of packages that must come along when this one is selected.
    pub auto_depend_on: Vec<PackageName>,
    /// Installer script reference; carried through, never executed.
    pub script: String,
    /// Archive filenames that make up this package, in manifest order,
    /// each stored exactly as the listing spells it.
    pub downloadable_archives: Vec<String>,
    /// Package-level checksum field.
    pub sha1: String,
}

/// A parsed and validated `Updates.xml`.
///
/// Constructed once per fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Always [`crate::APPLICATION_NAME`] once validated.
    pub application_name: String,
    /// Always [`crate::APPLICATION_VERSION`] once validated.
    pub application_version: String,
    /// Always [`crate::CHECKSUM`] once validated.
    pub checksum: String,
    /// Package entries in document order.
    pub packages: Vec<PackageRecord>,
}

impl Manifest {
    /// Look up a package by exact name.
    pub fn find(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// A single downloadable archive, ready for the downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArchive {
    /// Filename as stored in the manifest.
    pub filename: String,
    /// Absolute download URL.
    pub url: String,
    /// URL of the published SHA1 digest for this archive (`<url>.sha1`).
    pub sha1_url: String,
}

/// A package and the archives it expands to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    /// Package name from the manifest.
    pub name: PackageName,
    /// Release string from the manifest.
    pub version: String,
    /// Archives in manifest order; empty for umbrella packages.
    pub archives: Vec<ResolvedArchive>,
}

impl ResolvedPackage {
    /// Iterate over the archive URLs of this package.
    pub fn archive_urls(&self) -> impl Iterator<Item = &str> {
        self.archives.iter().map(|a| a.url.as_str())
    }
}
