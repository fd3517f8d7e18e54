//! Install command

use std::path::Path;
use std::time::Instant;

use anyhow::{Result, bail};
use crossterm::style::Stylize;

use crate::TargetArgs;
use crate::ops::{install::install_all, resolve::resolve};
use crate::ui::list;

/// Resolve a release, then download, verify and extract its archives into
/// `<output>/<version>/`.
pub async fn install(
    repository: &str,
    args: &TargetArgs,
    modules: &[String],
    output: &Path,
    jobs: u16,
    dry_run: bool,
) -> Result<()> {
    let start = Instant::now();
    let resolution = resolve(repository, args, modules).await?;
    let root = output.join(resolution.version.to_string());

    list::print_title(&format!("Qt {}", resolution.version), &resolution.target().to_string());
    list::print_field("arch", &resolution.arch);
    list::print_field("repository", &resolution.base_url);
    list::print_field("output", &root.display().to_string());
    println!();

    if dry_run {
        for package in resolution.downloadable() {
            list::print_package_row(&package.name, package.archives.len(), None);
            for url in package.archive_urls() {
                println!("      {}", url.dark_grey());
            }
        }
        list::print_footer("DRY RUN", resolution.archive_count(), start.elapsed());
        return Ok(());
    }

    let client = reqwest::Client::new();
    let outcomes = install_all(&client, &resolution.packages, &root, usize::from(jobs)).await;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(installed) => list::print_result_row(&outcome.name, Ok(installed.bytes)),
            Err(e) => {
                failed += 1;
                list::print_result_row(&outcome.name, Err(&e.to_string()));
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} packages failed to install", outcomes.len());
    }

    list::print_footer("INSTALL", outcomes.len(), start.elapsed());
    Ok(())
}
