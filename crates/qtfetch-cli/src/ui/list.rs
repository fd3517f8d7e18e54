//! Column-aligned rows for command output.

use crossterm::style::Stylize;

use super::theme::{Theme, format_size};

/// Print a title line (`qt.qt6.620 linux/desktop 6.2.0`).
pub fn print_title(title: &str, detail: &str) {
    let theme = Theme::default();
    println!();
    println!(
        "  {} {}",
        title.white().bold(),
        detail.with(theme.colors.version)
    );
    println!();
}

/// Print a `label  value` pair.
pub fn print_field(label: &str, value: &str) {
    let lw = Theme::default().layout.label_width;
    println!("  {label:<lw$}{value}");
}

/// Print one package row with an archive count and optional size.
pub fn print_package_row(name: &str, archives: usize, size: Option<u64>) {
    let theme = Theme::default();
    let name_part = format!("{name:<width$}", width = theme.layout.name_width);
    let size_part = size.map(format_size).unwrap_or_default();

    println!(
        "  {} {:>3} archives {:>10}",
        name_part.with(theme.colors.package_name),
        archives,
        size_part.with(theme.colors.secondary)
    );
}

/// Print the outcome of installing one package.
pub fn print_result_row(name: &str, outcome: Result<u64, &str>) {
    let theme = Theme::default();
    let name_part = format!("{name:<width$}", width = theme.layout.name_width);

    match outcome {
        Ok(bytes) => println!(
            "  {} {} {}",
            theme.icons.success.with(theme.colors.success),
            name_part.with(theme.colors.package_name),
            format_size(bytes).with(theme.colors.secondary)
        ),
        Err(reason) => println!(
            "  {} {} {}",
            theme.icons.failure.with(theme.colors.error),
            name_part.with(theme.colors.package_name),
            reason.with(theme.colors.error)
        ),
    }
}

/// Print an informational line.
pub fn print_info(message: &str) {
    let theme = Theme::default();
    println!("  {} {message}", theme.icons.info.blue());
}

/// Footer: standardized summary
pub fn print_footer(operation: &str, count: usize, elapsed: std::time::Duration) {
    println!();
    println!(
        "{operation} COMPLETE {count}, elapsed {:.2}s",
        elapsed.as_secs_f64()
    );
}
