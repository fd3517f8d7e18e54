//! Colors, column widths and icons.

use crossterm::style::Color;

/// Color scheme for output rows
#[derive(Debug, Clone, Copy)]
pub struct Colors {
    /// Package names (primary content)
    pub package_name: Color,
    /// Target and version details in titles
    pub version: Color,
    /// Sizes, URLs and other secondary info
    pub secondary: Color,
    /// Success states
    pub success: Color,
    /// Error states
    pub error: Color,
}

/// Column widths
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Width of the package name column
    pub name_width: usize,
    /// Width of the label column in `label  value` pairs
    pub label_width: usize,
}

/// Status icons
#[derive(Debug, Clone, Copy)]
pub struct Icons {
    /// Package installed
    pub success: &'static str,
    /// Package failed
    pub failure: &'static str,
    /// Informational note
    pub info: &'static str,
}

/// Default theme for qtfetch output
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Colors for different UI elements
    pub colors: Colors,
    /// Table layout constants
    pub layout: Layout,
    /// Status icons
    pub icons: Icons,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: Colors {
                package_name: Color::White,
                version: Color::DarkGrey,
                secondary: Color::DarkGrey,
                success: Color::Green,
                error: Color::Red,
            },
            layout: Layout {
                name_width: 44,
                label_width: 12,
            },
            icons: Icons {
                success: "+",
                failure: "x",
                info: "i",
            },
        }
    }
}

/// Human readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for &next in &UNITS[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }
    format!("{size:.1} {unit}")
}
