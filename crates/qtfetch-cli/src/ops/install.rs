use std::path::Path;

use futures::StreamExt;
use qtfetch_schema::{PackageName, ResolvedPackage};
use reqwest::Client;

use crate::download::{self, DownloadError, Installed};

/// What happened to one package.
#[derive(Debug)]
pub struct PackageOutcome {
    pub name: PackageName,
    pub result: Result<Installed, DownloadError>,
}

/// Install every package that has archives into `root`, up to `jobs` at a
/// time. Outcomes come back in input order; a failed package does not stop
/// the others.
pub async fn install_all(
    client: &Client,
    packages: &[ResolvedPackage],
    root: &Path,
    jobs: usize,
) -> Vec<PackageOutcome> {
    let mut outcomes: Vec<(usize, PackageOutcome)> = futures::stream::iter(
        packages
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.archives.is_empty()),
    )
    .map(|(index, package)| async move {
        tracing::info!(
            "Downloading {} ({} archives)",
            package.name,
            package.archives.len()
        );
        let result = download::install_package(client, package, root).await;
        if let Err(e) = &result {
            tracing::warn!("{} failed: {e}", package.name);
        }
        (
            index,
            PackageOutcome {
                name: package.name.clone(),
                result,
            },
        )
    })
    .buffer_unordered(jobs.max(1))
    .collect()
    .await;

    outcomes.sort_by_key(|(index, _)| *index);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}
