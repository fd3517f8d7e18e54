//! qtfetch - Qt SDK package downloader
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Resolves the packages of a Qt SDK release from the online repository,
//! downloads their archives, verifies them against the published SHA1
//! digests and extracts them into a local directory.
//!
//! # Directory Layout
//!
//! ```text
//! <output>/
//! └── 6.2.0/                          # archives extract here
//!     ├── .qtfetch-XXXXXX/            # per-package staging, removed afterwards
//!     └── ...                         # archive contents (gcc_64/bin, ...)
//! ```

pub mod cmd;
pub mod download;
pub mod extract;
pub mod ops;
pub mod ui;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use qtfetch_core::DEFAULT_REPOSITORY;
use qtfetch_schema::{HostOs, Platform, QtVersion, Target};

/// User Agent string (re-exported from qtfetch_core)
pub use qtfetch_core::USER_AGENT;

/// Extract the filename from a URL.
///
/// # Example
///
/// ```
/// use qtfetch_cli::filename_from_url;
///
/// assert_eq!(filename_from_url("https://example.com/path/to/file.7z"), "file.7z");
/// assert_eq!(filename_from_url(""), "");
/// ```
pub fn filename_from_url(url: &str) -> &str {
    url.split('/').next_back().unwrap_or("")
}

#[derive(Debug, Parser)]
#[command(name = "qtfetch")]
#[command(author, version, about = "qtfetch - download prebuilt Qt SDK packages")]
pub struct Cli {
    /// Show what would happen without making changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Root of the Qt online repository
    #[arg(
        long,
        global = true,
        env = "QTFETCH_REPOSITORY",
        default_value = DEFAULT_REPOSITORY
    )]
    pub repository: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Host, platform and release selection shared by most commands.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Host operating system (windows, linux, mac) [default: this machine]
    #[arg(long)]
    pub os: Option<HostOs>,

    /// Target platform (desktop, winrt, android, ios)
    #[arg(long, default_value_t = Platform::Desktop)]
    pub platform: Platform,

    /// Qt release, e.g. 6.2.0
    #[arg(long = "version", value_name = "VERSION")]
    pub qt_version: QtVersion,

    /// Architecture to resolve for instead of the release's default
    #[arg(long)]
    pub arch: Option<String>,
}

impl TargetArgs {
    /// Build the target, falling back to the running host's OS.
    pub fn target(&self) -> anyhow::Result<Target> {
        let os = self
            .os
            .or_else(HostOs::current)
            .ok_or_else(|| anyhow::anyhow!("Cannot detect host OS, pass --os"))?;
        Ok(Target::new(os, self.platform, self.qt_version))
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download, verify and extract a release and its modules
    Install {
        #[command(flatten)]
        target: TargetArgs,
        /// Modules to add, repeatable or comma-separated (qtcharts,qtquick3d)
        #[arg(short, long, value_delimiter = ',')]
        modules: Vec<String>,
        /// Directory the release is placed under
        #[arg(short, long, default_value = "qt")]
        output: PathBuf,
        /// Packages downloaded concurrently
        #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
        jobs: u16,
    },
    /// Print the resolved packages and archive URLs as JSON
    Resolve {
        #[command(flatten)]
        target: TargetArgs,
        /// Modules to add, repeatable or comma-separated
        #[arg(short, long, value_delimiter = ',')]
        modules: Vec<String>,
    },
    /// List modules available for a release
    Modules {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List known releases
    Versions,
}
