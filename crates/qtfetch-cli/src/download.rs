//! Archive download, verification and extraction.
//!
//! Each archive's SHA1 is read from the digest file published beside it and
//! checked while the archive streams to disk. A package's archives are
//! staged in a temporary directory inside the install root, extracted
//! there, and only committed into the root once every one of them
//! verified and extracted.

use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use qtfetch_schema::{HashError, ResolvedPackage, Sha1Hash};

use crate::extract::{self, ExtractError};

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unusable checksum at {url}: {source}")]
    Checksum {
        url: String,
        #[source]
        source: HashError,
    },

    #[error("Hash mismatch for {filename}: expected {expected}, got {actual}")]
    HashMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to extract {filename}: {source}")]
    Extract {
        filename: String,
        #[source]
        source: ExtractError,
    },

    #[error("Refusing to write archive with unsafe filename '{0}'")]
    UnsafeFilename(String),
}

/// Result of installing one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Installed {
    /// Files placed under the install root.
    pub files: usize,
    /// Archive bytes downloaded.
    pub bytes: u64,
}

/// Fetch the published digest at `sha1_url`.
pub async fn fetch_checksum(client: &Client, sha1_url: &str) -> Result<Sha1Hash, DownloadError> {
    let body = client
        .get(sha1_url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    Sha1Hash::from_checksum_file(&body).map_err(|source| DownloadError::Checksum {
        url: sha1_url.to_string(),
        source,
    })
}

/// Download `url` to `dest`, returning the number of bytes written.
///
/// The file is removed again if its SHA1 does not match `expected`.
pub async fn download_and_verify(
    client: &Client,
    url: &str,
    dest: &Path,
    expected: &Sha1Hash,
) -> Result<u64, DownloadError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?
        .error_for_status()?;

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha1::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;
    }

    file.flush().await?;
    let actual = hex::encode(hasher.finalize());

    if actual != expected.as_str() {
        tokio::fs::remove_file(dest).await.ok();
        return Err(DownloadError::HashMismatch {
            filename: crate::filename_from_url(url).to_string(),
            expected: expected.to_string(),
            actual,
        });
    }

    tracing::debug!("Verified {url} ({downloaded} bytes)");
    Ok(downloaded)
}

/// Download, verify and extract every archive of `package` into `root`.
///
/// Nothing under `root` changes unless all archives verified and
/// extracted. Files the package replaces are only deleted once the new
/// ones are in place.
pub async fn install_package(
    client: &Client,
    package: &ResolvedPackage,
    root: &Path,
) -> Result<Installed, DownloadError> {
    for archive in &package.archives {
        if !is_safe_filename(&archive.filename) {
            return Err(DownloadError::UnsafeFilename(archive.filename.clone()));
        }
    }

    tokio::fs::create_dir_all(root).await?;
    let staging = tempfile::Builder::new()
        .prefix(".qtfetch-")
        .tempdir_in(root)?;
    let downloads = staging.path().join("archives");
    let tree = staging.path().join("tree");
    tokio::fs::create_dir_all(&downloads).await?;
    tokio::fs::create_dir_all(&tree).await?;

    let mut bytes = 0;
    for archive in &package.archives {
        let expected = fetch_checksum(client, &archive.sha1_url).await?;
        let dest = downloads.join(&archive.filename);
        bytes += download_and_verify(client, &archive.url, &dest, &expected).await?;
    }

    for archive in &package.archives {
        let path = downloads.join(&archive.filename);
        let into = tree.clone();
        tokio::task::spawn_blocking(move || extract::extract_7z(&path, &into))
            .await
            .map_err(std::io::Error::other)?
            .map_err(|source| DownloadError::Extract {
                filename: archive.filename.clone(),
                source,
            })?;
        tracing::debug!("Extracted {}", archive.filename);
    }

    let backup = staging.path().join("replaced");
    let dest = root.to_path_buf();
    let files = tokio::task::spawn_blocking(move || extract::commit_tree(&tree, &dest, &backup))
        .await
        .map_err(std::io::Error::other)??;

    Ok(Installed { files, bytes })
}

fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}
