//! Package naming schemes, keyed by major version.
//!
//! Major 5 names modules `qt.qt5.<compact>.<module>`; major 6 moves the
//! add-on modules under an extra `addons.` segment
//! (`qt.qt6.<compact>.addons.<module>`). Which platforms a major version
//! ships for lives in the same table, so a manifest or target with an
//! unlisted major version is rejected instead of guessed at.

use qtfetch_schema::{HostOs, Manifest, Platform, QtVersion};

/// Rules for one major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingScheme {
    /// Major version these rules apply to.
    pub major: u32,
    /// Segments tried between the prefix and a module name, in order.
    pub module_infixes: &'static [&'static str],
    /// Whether the repository publishes winrt builds for this major.
    pub winrt: bool,
}

const SCHEMES: &[NamingScheme] = &[
    NamingScheme {
        major: 5,
        module_infixes: &[""],
        winrt: true,
    },
    NamingScheme {
        major: 6,
        module_infixes: &["", "addons."],
        winrt: false,
    },
];

impl NamingScheme {
    /// Look up the rules for a major version.
    pub fn for_major(major: u32) -> Option<&'static Self> {
        SCHEMES.iter().find(|s| s.major == major)
    }

    /// Returns `true` if the repository publishes `platform` builds for `os`
    /// under this major version.
    pub fn supports(&self, os: HostOs, platform: Platform) -> bool {
        match platform {
            Platform::Desktop | Platform::Android => true,
            Platform::Ios => os == HostOs::Mac,
            Platform::Winrt => os == HostOs::Windows && self.winrt,
        }
    }

    /// Package name prefix for a compact version code (`qt.qt5.5152.`).
    pub fn prefix(&self, compact: &str) -> String {
        format!("qt.qt{}.{compact}.", self.major)
    }
}

/// Returns `true` if some known scheme publishes this combination.
///
/// Unknown major versions are never supported.
pub fn is_supported(os: HostOs, platform: Platform, version: &QtVersion) -> bool {
    NamingScheme::for_major(version.major).is_some_and(|s| s.supports(os, platform))
}

/// The scheme a particular manifest uses, with its concrete prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedScheme {
    /// Rules for the manifest's major version.
    pub scheme: &'static NamingScheme,
    /// Release the manifest describes.
    pub version: QtVersion,
    /// Compact code as it appears in the manifest's package names.
    pub compact: String,
    /// Full package prefix, including the trailing dot.
    pub prefix: String,
}

impl DetectedScheme {
    /// Candidate package names for a module: `(umbrella, arch_variant)` per infix.
    pub fn module_candidates(&self, module: &str, arch: &str) -> Vec<(String, String)> {
        self.scheme
            .module_infixes
            .iter()
            .map(|infix| {
                let umbrella = format!("{}{infix}{module}", self.prefix);
                let variant = format!("{umbrella}.{arch}");
                (umbrella, variant)
            })
            .collect()
    }
}

/// Errors produced while detecting a manifest's naming scheme.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemeError {
    /// No entry's name matches a compact code derived from its own Version.
    #[error("Cannot derive the compact version code from any package in the manifest")]
    UnderivableVersionCode,

    /// The manifest describes a major version with no naming rules.
    #[error("Unsupported major version {0}: no package naming scheme is known for it")]
    UnsupportedMajor(u32),
}

/// Work out which naming scheme and compact code a manifest uses.
///
/// Every entry's Version field is turned back into a dotted release and
/// checked against the entry's own name. The first entry that matches fixes
/// the scheme; entries that match nothing are logged so odd manifests show up
/// during testing.
///
/// # Errors
///
/// Returns [`SchemeError::UnderivableVersionCode`] if no entry matches, or
/// [`SchemeError::UnsupportedMajor`] if the derived major version has no
/// rules.
pub fn detect(manifest: &Manifest) -> Result<DetectedScheme, SchemeError> {
    let mut detected: Option<(QtVersion, String)> = None;

    for package in &manifest.packages {
        let Ok(version) = QtVersion::from_release(&package.version) else {
            tracing::warn!(
                "Package '{}' has unparseable version '{}'",
                package.name,
                package.version
            );
            continue;
        };

        let matched = version.compact_candidates().into_iter().find(|compact| {
            let prefix = format!("qt.qt{}.{compact}", version.major);
            package.name.as_str() == prefix
                || package.name.starts_with(&format!("{prefix}."))
        });

        let Some(compact) = matched else {
            tracing::warn!(
                "Cannot derive compact version code for '{}' from version '{}'",
                package.name,
                package.version
            );
            continue;
        };

        if let Some((first, first_compact)) = &detected {
            if *first != version || *first_compact != compact {
                tracing::warn!(
                    "Package '{}' belongs to release {version}, manifest is {first}",
                    package.name
                );
            }
        } else {
            detected = Some((version, compact));
        }
    }

    let (version, compact) = detected.ok_or(SchemeError::UnderivableVersionCode)?;
    let scheme = NamingScheme::for_major(version.major)
        .ok_or(SchemeError::UnsupportedMajor(version.major))?;

    tracing::debug!("Detected naming scheme qt{} with code {compact}", scheme.major);

    Ok(DetectedScheme {
        scheme,
        version,
        prefix: scheme.prefix(&compact),
        compact,
    })
}
