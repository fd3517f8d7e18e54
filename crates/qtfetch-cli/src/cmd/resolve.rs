//! Resolve command

use anyhow::{Context, Result};

use crate::TargetArgs;
use crate::ops::resolve::resolve as resolve_request;

/// Print the resolution of a request as pretty JSON on stdout.
pub async fn resolve(repository: &str, args: &TargetArgs, modules: &[String]) -> Result<()> {
    let resolution = resolve_request(repository, args, modules).await?;
    let json = serde_json::to_string_pretty(&resolution).context("Failed to encode resolution")?;
    println!("{json}");
    Ok(())
}
