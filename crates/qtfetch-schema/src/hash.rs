//! SHA1 digests published alongside repository archives.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors produced while validating a digest string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The hex string does not have the expected number of characters.
    #[error("Invalid SHA1 digest: expected 40 hex characters, got {len} in '{value}'")]
    Length {
        /// Number of characters found.
        len: usize,
        /// The rejected input.
        value: String,
    },

    /// The string contains characters outside `[0-9a-fA-F]`.
    #[error("Invalid SHA1 digest: contains non-hex characters in '{0}'")]
    NotHex(String),
}

/// A validated SHA1 digest (40 hex characters).
///
/// The repository publishes SHA1 checksums next to every archive; the
/// downloader compares them against the bytes it received. Input is
/// normalized to lowercase so comparisons with `hex::encode` output are
/// direct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha1Hash(String);

impl Sha1Hash {
    /// Create a new `Sha1Hash`, validating the input.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the input is not exactly 40 ASCII hex
    /// characters.
    pub fn new(s: impl AsRef<str>) -> Result<Self, HashError> {
        let hex = s.as_ref().trim();

        if hex.len() != 40 {
            return Err(HashError::Length {
                len: hex.len(),
                value: hex.to_string(),
            });
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::NotHex(hex.to_string()));
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Read the digest from the body of a published `.sha1` file.
    ///
    /// Only the first whitespace-separated token counts; some files append
    /// the archive name after the digest.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file is empty or its first token is not
    /// a valid digest.
    pub fn from_checksum_file(contents: &str) -> Result<Self, HashError> {
        Self::new(contents.split_whitespace().next().unwrap_or_default())
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Sha1Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha1Hash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Sha1Hash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_lowercase() {
        let hash = Sha1Hash::new("DA39A3EE5E6B4B0D3255BFEF95601890AFD80709").unwrap();
        assert_eq!(hash.as_str(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Sha1Hash::new("abc").unwrap_err();
        assert!(matches!(err, HashError::Length { len: 3, .. }));
    }

    #[test]
    fn rejects_non_hex() {
        let err = Sha1Hash::new("zz39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap_err();
        assert!(matches!(err, HashError::NotHex(_)));
    }

    #[test]
    fn reads_checksum_files() {
        let bare = Sha1Hash::from_checksum_file("da39a3ee5e6b4b0d3255bfef95601890afd80709\n").unwrap();
        let named =
            Sha1Hash::from_checksum_file("DA39A3EE5E6B4B0D3255BFEF95601890AFD80709  qtbase.7z\n")
                .unwrap();
        assert_eq!(bare, named);

        let err = Sha1Hash::from_checksum_file("  \n").unwrap_err();
        assert!(matches!(err, HashError::Length { len: 0, .. }));
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<Sha1Hash, _> =
            serde_json::from_str("\"da39a3ee5e6b4b0d3255bfef95601890afd80709\"");
        assert!(ok.is_ok());
        let bad: Result<Sha1Hash, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
