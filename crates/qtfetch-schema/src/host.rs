//! Host operating systems and SDK platforms.
//!
//! The repository is laid out by host first (`linux_x64`, `mac_x64`, ...)
//! and by target platform second (`desktop`, `android`, ...). A [`Target`]
//! bundles both with the requested SDK version.

use crate::version::QtVersion;

/// Operating system the SDK is installed on.
///
/// # Example
///
/// ```
/// use qtfetch_schema::HostOs;
///
/// let os: HostOs = "linux".parse().unwrap();
/// assert_eq!(os.repository_dir(), "linux_x64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    /// Microsoft Windows.
    Windows,
    /// Linux distributions.
    Linux,
    /// macOS.
    Mac,
}

impl HostOs {
    /// Every supported host, in repository order.
    pub const ALL: [Self; 3] = [Self::Windows, Self::Linux, Self::Mac];

    /// Get the host this binary runs on, if it is one the repository serves.
    pub fn current() -> Option<Self> {
        match std::env::consts::OS {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::Mac),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Mac => "mac",
        }
    }

    /// Top-level repository directory holding this host's SDK builds.
    pub fn repository_dir(&self) -> &'static str {
        match self {
            Self::Windows => "windows_x86",
            Self::Linux => "linux_x64",
            Self::Mac => "mac_x64",
        }
    }
}

impl std::fmt::Display for HostOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HostOs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "mac" | "macos" | "darwin" => Ok(Self::Mac),
            _ => Err(format!(
                "Unknown operating system: {s} (expected windows, linux or mac)"
            )),
        }
    }
}

/// Platform the SDK builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Native desktop builds for the host.
    Desktop,
    /// Universal Windows Platform builds (Windows hosts only).
    Winrt,
    /// Android cross builds.
    Android,
    /// iOS cross builds (mac hosts only).
    Ios,
}

impl Platform {
    /// Every platform, in repository order.
    pub const ALL: [Self; 4] = [Self::Desktop, Self::Winrt, Self::Android, Self::Ios];

    /// Convert to string representation, which is also the repository directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Winrt => "winrt",
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "winrt" => Ok(Self::Winrt),
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            _ => Err(format!(
                "Unknown platform: {s} (expected desktop, winrt, android or ios)"
            )),
        }
    }
}

/// A fully specified request: which host, which platform, which release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    /// Host operating system.
    pub os: HostOs,
    /// Target platform.
    pub platform: Platform,
    /// SDK release.
    pub version: QtVersion,
}

impl Target {
    /// Create a new target.
    pub fn new(os: HostOs, platform: Platform, version: QtVersion) -> Self {
        Self {
            os,
            platform,
            version,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} {}", self.os, self.platform, self.version)
    }
}
