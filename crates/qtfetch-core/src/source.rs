//! Where manifest documents come from.
//!
//! [`ManifestSource`] is the seam between resolution and the network.
//! [`HttpManifestSource`] talks to a Qt online repository; tests and callers
//! with their own storage plug in anything else that can produce the raw
//! text of an `Updates.xml` for a target.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use qtfetch_schema::Target;

use crate::scheme;

/// Repository used when none is configured.
pub const DEFAULT_REPOSITORY: &str = "https://download.qt.io/online/qtsdkrepository";

/// Manifest file name inside a release directory.
pub const MANIFEST_FILE: &str = "Updates.xml";

/// Errors that can occur while retrieving a manifest.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport-level failure.
    #[cfg(feature = "network")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The repository answered with an error other than "not found".
    #[error("Unexpected HTTP status {status} for {url}")]
    Status {
        /// Status code received.
        status: u16,
        /// URL that was requested.
        url: String,
    },

    /// The configured repository is not an absolute http(s) URL.
    #[error("Invalid repository URL: {0}")]
    InvalidRepository(String),
}

/// Manifest text plus the directory it was fetched from.
///
/// Archive URLs are built relative to `base_url`, so the two always travel
/// together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawManifest {
    /// Release directory URL, no trailing slash.
    pub base_url: String,
    /// Raw `Updates.xml` contents.
    pub document: String,
}

/// Something that can produce the manifest for a target.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Retrieve the manifest for `target`.
    ///
    /// Returns `Ok(None)` when the repository does not publish this
    /// combination, whether that is known up front or discovered from a
    /// "not found" answer.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures and unexpected responses.
    async fn fetch(&self, target: &Target) -> Result<Option<RawManifest>, SourceError>;
}

/// Release directory for a target under `repository`.
///
/// Returns `None` for combinations no known naming scheme publishes.
pub fn repository_base(repository: &str, target: &Target) -> Option<String> {
    if !scheme::is_supported(target.os, target.platform, &target.version) {
        return None;
    }

    Some(format!(
        "{}/{}/{}/{}",
        repository.trim_end_matches('/'),
        target.os.repository_dir(),
        target.platform,
        target.version.family()
    ))
}

/// Fetches manifests from a Qt online repository over HTTP.
#[cfg(feature = "network")]
#[derive(Debug, Clone)]
pub struct HttpManifestSource {
    client: reqwest::Client,
    repository: String,
}

#[cfg(feature = "network")]
impl HttpManifestSource {
    /// Create a source for `repository`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRepository`] unless `repository` is an
    /// absolute http(s) URL.
    pub fn new(
        client: reqwest::Client,
        repository: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let repository = repository.into();
        if !crate::archive::is_valid_url(&repository) {
            return Err(SourceError::InvalidRepository(repository));
        }
        Ok(Self { client, repository })
    }

    /// Create a source for [`DEFAULT_REPOSITORY`].
    pub fn with_default_repository(client: reqwest::Client) -> Self {
        Self {
            client,
            repository: DEFAULT_REPOSITORY.to_string(),
        }
    }

    /// Repository root this source reads from.
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

#[cfg(feature = "network")]
#[async_trait]
impl ManifestSource for HttpManifestSource {
    async fn fetch(&self, target: &Target) -> Result<Option<RawManifest>, SourceError> {
        let Some(base_url) = repository_base(&self.repository, target) else {
            tracing::debug!("No repository layout for {target}");
            return Ok(None);
        };

        let url = format!("{base_url}/{MANIFEST_FILE}");
        tracing::debug!("Fetching {url}");

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("{url} not published");
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(SourceError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }

        let document = resp.text().await?;
        Ok(Some(RawManifest { base_url, document }))
    }
}

/// Serves fixed documents, keyed by target.
///
/// Base URLs are laid out exactly as [`repository_base`] would lay them out
/// under the given repository, so resolved archive URLs look real.
#[derive(Debug, Default)]
pub struct StaticManifestSource {
    repository: String,
    documents: HashMap<Target, String>,
}

impl StaticManifestSource {
    /// Create an empty source whose base URLs live under `repository`.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            documents: HashMap::new(),
        }
    }

    /// Register the document served for `target`.
    pub fn insert(&mut self, target: Target, document: impl Into<String>) -> &mut Self {
        self.documents.insert(target, document.into());
        self
    }
}

#[async_trait]
impl ManifestSource for StaticManifestSource {
    async fn fetch(&self, target: &Target) -> Result<Option<RawManifest>, SourceError> {
        let Some(base_url) = repository_base(&self.repository, target) else {
            return Ok(None);
        };
        Ok(self.documents.get(target).map(|document| RawManifest {
            base_url,
            document: document.clone(),
        }))
    }
}
