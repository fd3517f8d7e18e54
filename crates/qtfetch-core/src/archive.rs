//! Archive URL construction.
//!
//! A package's archives live at `<base>/<package>/<version><filename>`.
//! The version and filename are joined with no separator; published
//! filenames already start with the build tag's own separator
//! (`5.15.2-0-202011130601qtbase-Linux-...7z`). Each archive's SHA1 is
//! published beside it at the same URL plus [`CHECKSUM_SUFFIX`].

use qtfetch_schema::{PackageRecord, ResolvedArchive, ResolvedPackage};

use crate::resolver::ResolveError;

/// Download URL of one archive.
pub fn archive_url(base_url: &str, package: &str, version: &str, filename: &str) -> String {
    format!(
        "{}/{package}/{version}{filename}",
        base_url.trim_end_matches('/')
    )
}

/// Appended to an archive URL to get its published SHA1 digest.
pub const CHECKSUM_SUFFIX: &str = ".sha1";

/// URL of the digest file published for `archive_url`.
pub fn checksum_url(archive_url: &str) -> String {
    format!("{archive_url}{CHECKSUM_SUFFIX}")
}

/// Recover the archive filename from a URL built by [`archive_url`].
///
/// Returns `None` if `url` does not belong to `package` under `base_url`.
pub fn archive_filename<'u>(url: &'u str, base_url: &str, package: &PackageRecord) -> Option<&'u str> {
    let prefix = format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        package.name,
        package.version
    );
    url.strip_prefix(prefix.as_str()).filter(|f| !f.is_empty())
}

/// Returns `true` for absolute http(s) URLs with a host.
pub fn is_valid_url(candidate: &str) -> bool {
    url::Url::parse(candidate)
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

/// Expand a package's archive listing into downloadable archives.
///
/// Filenames are used exactly as stored. Packages without archives
/// (umbrellas, categories) expand to an empty list.
///
/// # Errors
///
/// Returns [`ResolveError::MalformedArchive`] if an entry is empty or is
/// not a bare filename.
pub fn expand(base_url: &str, package: &PackageRecord) -> Result<ResolvedPackage, ResolveError> {
    let malformed = |reason: String| ResolveError::MalformedArchive {
        package: package.name.to_string(),
        reason,
    };

    let mut archives = Vec::with_capacity(package.downloadable_archives.len());

    for (index, filename) in package.downloadable_archives.iter().enumerate() {
        if filename.is_empty() {
            return Err(malformed(format!("archive #{index} has no filename")));
        }
        if filename.contains(['/', '\\']) || filename.chars().any(char::is_whitespace) {
            return Err(malformed(format!("'{filename}' is not a bare filename")));
        }

        let url = archive_url(base_url, &package.name, &package.version, filename);
        archives.push(ResolvedArchive {
            filename: filename.clone(),
            sha1_url: checksum_url(&url),
            url,
        });
    }

    Ok(ResolvedPackage {
        name: package.name.clone(),
        version: package.version.clone(),
        archives,
    })
}
