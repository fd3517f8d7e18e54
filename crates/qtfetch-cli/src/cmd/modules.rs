//! Modules command

use anyhow::Result;
use crossterm::style::Stylize;

use crate::TargetArgs;
use crate::ops::resolve::{fetch_manifest, resolver};
use crate::ui::list;

/// List the modules and architectures a release publishes.
pub async fn modules(repository: &str, args: &TargetArgs) -> Result<()> {
    let start = std::time::Instant::now();
    let target = args.target()?;
    let fetched = fetch_manifest(repository, &target).await?;
    let resolver = resolver(&fetched, args.arch.as_deref())?;

    let architectures = resolver.available_architectures();
    let modules = resolver.available_modules();

    list::print_title(&format!("Qt {}", target.version), &target.to_string());
    list::print_field("arch", resolver.arch());
    list::print_field("available", &architectures.join(", "));
    println!();

    if modules.is_empty() {
        list::print_info("No optional modules for this architecture");
    }
    for module in &modules {
        println!("  {}", module.as_str().white());
    }

    list::print_footer("MODULES", modules.len(), start.elapsed());
    Ok(())
}
