//! Package resolution engine for the Qt SDK online repository.
//!
//! Given a host OS, a target platform and a release, this crate fetches the
//! repository's `Updates.xml`, validates it, and resolves requested modules
//! to the exact set of archive URLs that make up an installation. Nothing is
//! downloaded or extracted here.
//!
//! ```no_run
//! # async fn demo() -> qtfetch_core::Result<()> {
//! use qtfetch_core::{HttpManifestSource, fetch_archive_xml, fetch_package_infos};
//! use qtfetch_schema::{HostOs, Platform, Target};
//!
//! let source = HttpManifestSource::with_default_repository(reqwest::Client::new());
//! let target = Target::new(HostOs::Linux, Platform::Desktop, "6.2.0".parse().unwrap());
//!
//! if let Some(fetched) = fetch_archive_xml(&source, &target).await? {
//!     let packages = fetch_package_infos(&fetched.base_url, &fetched.manifest, &["qtcharts"])?;
//!     for url in packages.iter().flat_map(|p| p.archive_urls()) {
//!         println!("{url}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod scheme;
pub mod source;

pub use error::{Error, Result};
pub use parser::ManifestError;
pub use resolver::{ModuleResolver, ResolveError};
pub use scheme::{DetectedScheme, NamingScheme, SchemeError};
#[cfg(feature = "network")]
pub use source::HttpManifestSource;
pub use source::{DEFAULT_REPOSITORY, ManifestSource, RawManifest, SourceError, StaticManifestSource};

use qtfetch_schema::{Manifest, PackageRecord, QtVersion, ResolvedPackage, Target};

/// User Agent string for repository requests
pub const USER_AGENT: &str = concat!("qtfetch-core/", env!("CARGO_PKG_VERSION"));

/// A validated manifest and the directory its archives live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedManifest {
    /// Release directory URL, no trailing slash.
    pub base_url: String,
    /// Parsed manifest.
    pub manifest: Manifest,
}

/// Releases this tool knows how to install, in ascending order.
pub fn fetch_versions() -> Vec<QtVersion> {
    qtfetch_schema::known_versions()
}

/// Fetch and validate the manifest for `target`.
///
/// Returns `Ok(None)` when the repository does not publish this
/// combination of host, platform and release.
///
/// # Errors
///
/// Returns [`Error::Source`] if retrieval fails and [`Error::Manifest`] if
/// the document is malformed or fails validation.
pub async fn fetch_archive_xml<S>(source: &S, target: &Target) -> Result<Option<FetchedManifest>>
where
    S: ManifestSource + ?Sized,
{
    let Some(raw) = source.fetch(target).await? else {
        tracing::debug!("{target} is not published");
        return Ok(None);
    };

    let manifest = parser::parse(&raw.document)?;
    Ok(Some(FetchedManifest {
        base_url: raw.base_url,
        manifest,
    }))
}

/// Resolve `modules` for the manifest's default architecture and expand
/// every resulting package into its archives.
///
/// The output is in manifest order and identical for identical inputs.
///
/// # Errors
///
/// Returns [`ResolveError::UnknownModule`] if a module matches nothing,
/// [`ResolveError::MalformedArchive`] if an archive listing is unusable, and
/// scheme or architecture errors if the manifest cannot be interpreted.
pub fn fetch_package_infos<S: AsRef<str>>(
    base_url: &str,
    manifest: &Manifest,
    modules: &[S],
) -> std::result::Result<Vec<ResolvedPackage>, ResolveError> {
    let resolver = ModuleResolver::new(manifest)?;
    expand_all(base_url, resolver.resolve(modules)?)
}

/// Like [`fetch_package_infos`], for an explicitly chosen architecture.
///
/// # Errors
///
/// As [`fetch_package_infos`], plus [`ResolveError::UnknownArchitecture`]
/// if `arch` is not published.
pub fn fetch_package_infos_for_arch<S: AsRef<str>>(
    base_url: &str,
    manifest: &Manifest,
    arch: &str,
    modules: &[S],
) -> std::result::Result<Vec<ResolvedPackage>, ResolveError> {
    let resolver = ModuleResolver::with_arch(manifest, arch)?;
    expand_all(base_url, resolver.resolve(modules)?)
}

fn expand_all(
    base_url: &str,
    packages: Vec<&PackageRecord>,
) -> std::result::Result<Vec<ResolvedPackage>, ResolveError> {
    packages
        .into_iter()
        .map(|p| archive::expand(base_url, p))
        .collect()
}
