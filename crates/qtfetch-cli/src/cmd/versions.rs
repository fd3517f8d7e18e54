//! Versions command

use crossterm::style::Stylize;
use qtfetch_core::fetch_versions;

/// Print the known releases, one major version per line.
pub fn versions() {
    let start = std::time::Instant::now();
    let versions = fetch_versions();

    println!();
    for major in [5, 6] {
        let line: Vec<String> = versions
            .iter()
            .filter(|v| v.major == major)
            .map(ToString::to_string)
            .collect();
        if !line.is_empty() {
            println!("  {} {}", format!("qt{major}").white().bold(), line.join("  "));
        }
    }

    crate::ui::list::print_footer("VERSIONS", versions.len(), start.elapsed());
}
