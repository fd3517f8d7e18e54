use anyhow::{Context, Result, bail};
use qtfetch_core::{
    FetchedManifest, HttpManifestSource, ModuleResolver, fetch_archive_xml,
    fetch_package_infos_for_arch,
};
use qtfetch_schema::{ResolvedPackage, Target};
use serde::Serialize;

use crate::TargetArgs;

/// Everything a command needs to know about one resolved request.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub os: qtfetch_schema::HostOs,
    pub platform: qtfetch_schema::Platform,
    pub version: qtfetch_schema::QtVersion,
    pub arch: String,
    pub base_url: String,
    pub packages: Vec<ResolvedPackage>,
}

impl Resolution {
    pub fn target(&self) -> Target {
        Target::new(self.os, self.platform, self.version)
    }

    /// Packages that actually carry archives.
    pub fn downloadable(&self) -> impl Iterator<Item = &ResolvedPackage> {
        self.packages.iter().filter(|p| !p.archives.is_empty())
    }

    pub fn archive_count(&self) -> usize {
        self.packages.iter().map(|p| p.archives.len()).sum()
    }
}

/// Fetch and validate the manifest for `target` from `repository`.
///
/// Unknown releases and unpublished combinations are errors here, unlike in
/// the library, because there is nothing useful to do with them.
pub async fn fetch_manifest(repository: &str, target: &Target) -> Result<FetchedManifest> {
    if !target.version.is_known() {
        bail!(
            "Unknown Qt version {}; run 'qtfetch versions' for the supported list",
            target.version
        );
    }

    let source = HttpManifestSource::new(reqwest::Client::new(), repository)
        .with_context(|| format!("Invalid repository '{repository}'"))?;

    let fetched = fetch_archive_xml(&source, target)
        .await
        .with_context(|| format!("Failed to load the package list for {target}"))?;

    match fetched {
        Some(fetched) => Ok(fetched),
        None => bail!(
            "The repository does not support {}/{} for Qt {}",
            target.os,
            target.platform,
            target.version
        ),
    }
}

/// Build a resolver honoring an optional `--arch` override.
pub fn resolver<'m>(fetched: &'m FetchedManifest, arch: Option<&str>) -> Result<ModuleResolver<'m>> {
    let resolver = match arch {
        Some(arch) => ModuleResolver::with_arch(&fetched.manifest, arch)?,
        None => ModuleResolver::new(&fetched.manifest)?,
    };
    Ok(resolver)
}

/// Fetch, resolve and expand a request.
pub async fn resolve(repository: &str, args: &TargetArgs, modules: &[String]) -> Result<Resolution> {
    let target = args.target()?;
    let fetched = fetch_manifest(repository, &target).await?;
    let resolver = resolver(&fetched, args.arch.as_deref())?;

    tracing::info!(
        "Resolving {} module(s) for {target} ({})",
        modules.len(),
        resolver.arch()
    );

    let arch = resolver.arch().to_string();
    let packages =
        fetch_package_infos_for_arch(&fetched.base_url, &fetched.manifest, &arch, modules)?;

    Ok(Resolution {
        os: target.os,
        platform: target.platform,
        version: target.version,
        arch,
        base_url: fetched.base_url.clone(),
        packages,
    })
}
