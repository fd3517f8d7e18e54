//! Module resolution.
//!
//! Turns a list of requested module names into the closed set of packages
//! that must be installed: the architecture's default packages, every
//! package matching a requested module, and everything those pull in via
//! `AutoDependOn`. The result is always in manifest order.

use std::collections::{BTreeSet, HashSet, VecDeque};

use thiserror::Error;

use qtfetch_schema::{Manifest, PackageRecord};

use crate::scheme::{self, DetectedScheme, SchemeError};

/// Errors that can occur while resolving modules to packages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The manifest's naming scheme could not be determined.
    #[error(transparent)]
    Scheme(#[from] SchemeError),

    /// No default architecture package exists under the detected prefix.
    #[error("No default architecture found for packages under '{prefix}'")]
    NoArchitecture {
        /// Package prefix that was searched.
        prefix: String,
    },

    /// An explicitly requested architecture is not published.
    #[error("Unknown architecture '{arch}' (available: {})", .available.join(", "))]
    UnknownArchitecture {
        /// Requested architecture.
        arch: String,
        /// Architectures the manifest does publish.
        available: Vec<String>,
    },

    /// One or more requested modules match nothing in the manifest.
    #[error("Unknown module(s) for this release: {}", .modules.join(", "))]
    UnknownModule {
        /// Every unmatched module, sorted.
        modules: Vec<String>,
    },

    /// A package's archive listing cannot be expanded into downloads.
    #[error("Malformed archive listing for {package}: {reason}")]
    MalformedArchive {
        /// Offending package.
        package: String,
        /// What is wrong with the listing.
        reason: String,
    },
}

/// Resolves module requests against one manifest.
///
/// Construction settles the naming scheme and architecture; resolving is
/// then a pure function of the requested modules.
#[derive(Debug)]
pub struct ModuleResolver<'m> {
    manifest: &'m Manifest,
    scheme: DetectedScheme,
    arch: String,
}

impl<'m> ModuleResolver<'m> {
    /// Create a resolver using the manifest's default architecture.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Scheme`] if the naming scheme cannot be
    /// detected, or [`ResolveError::NoArchitecture`] if no default
    /// architecture package exists.
    pub fn new(manifest: &'m Manifest) -> Result<Self, ResolveError> {
        let scheme = scheme::detect(manifest)?;
        let arch = default_architecture(manifest, &scheme).ok_or_else(|| {
            ResolveError::NoArchitecture {
                prefix: scheme.prefix.clone(),
            }
        })?;

        tracing::debug!("Using architecture {arch} for {}", scheme.prefix);
        Ok(Self {
            manifest,
            scheme,
            arch,
        })
    }

    /// Create a resolver for an explicitly chosen architecture.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Scheme`] if the naming scheme cannot be
    /// detected, or [`ResolveError::UnknownArchitecture`] if the manifest
    /// has no `<prefix><arch>` package.
    pub fn with_arch(manifest: &'m Manifest, arch: &str) -> Result<Self, ResolveError> {
        let scheme = scheme::detect(manifest)?;
        let available = architectures(manifest, &scheme)
            .map(|(arch, _)| arch.to_string())
            .collect::<Vec<_>>();

        if !available.iter().any(|a| a == arch) {
            return Err(ResolveError::UnknownArchitecture {
                arch: arch.to_string(),
                available,
            });
        }

        Ok(Self {
            manifest,
            scheme,
            arch: arch.to_string(),
        })
    }

    /// Architecture packages are resolved for (`gcc_64`, `win64_msvc2019_64`, ...).
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Naming scheme detected for the manifest.
    pub fn scheme(&self) -> &DetectedScheme {
        &self.scheme
    }

    /// Every architecture the manifest publishes, in manifest order.
    pub fn available_architectures(&self) -> Vec<String> {
        architectures(self.manifest, &self.scheme)
            .map(|(arch, _)| arch.to_string())
            .collect()
    }

    /// Default packages for the architecture, in manifest order.
    pub fn defaults(&self) -> impl Iterator<Item = &'m PackageRecord> + '_ {
        let manifest: &'m Manifest = self.manifest;
        let own = format!("{}{}", self.scheme.prefix, self.arch);
        let suffix = format!(".{}", self.arch);
        manifest
            .packages
            .iter()
            .filter(move |p| p.default && (p.name == own.as_str() || p.name.ends_with(&suffix)))
    }

    /// Module names that can be requested for the architecture, sorted.
    pub fn available_modules(&self) -> Vec<String> {
        let suffix = format!(".{}", self.arch);
        let mut modules = BTreeSet::new();

        for package in &self.manifest.packages {
            let Some(middle) = package
                .name
                .strip_prefix(self.scheme.prefix.as_str())
                .and_then(|rest| rest.strip_suffix(suffix.as_str()))
            else {
                continue;
            };

            let found = self
                .scheme
                .scheme
                .module_infixes
                .iter()
                .filter_map(|infix| middle.strip_prefix(*infix))
                .filter(|module| !module.is_empty() && !module.contains('.'))
                .filter(|module| self.matching_pair(module).is_some());
            modules.extend(found.map(str::to_string));
        }

        modules.into_iter().collect()
    }

    /// Umbrella and architecture variant of `module`, from the first infix
    /// under which both are published.
    fn matching_pair(&self, module: &str) -> Option<(&'m PackageRecord, &'m PackageRecord)> {
        let manifest: &'m Manifest = self.manifest;
        self.scheme
            .module_candidates(module, &self.arch)
            .into_iter()
            .find_map(|(umbrella, variant)| {
                Some((manifest.find(&umbrella)?, manifest.find(&variant)?))
            })
    }

    /// Resolve `modules` into the packages to install.
    ///
    /// A module matches when both its umbrella and its architecture variant
    /// exist under the same infix of the scheme; a category or architecture
    /// name therefore never counts as a module. Dependency names that do not
    /// exist in the manifest are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownModule`] listing every module that
    /// matched nothing.
    pub fn resolve<S: AsRef<str>>(
        &self,
        modules: &[S],
    ) -> Result<Vec<&'m PackageRecord>, ResolveError> {
        let manifest: &'m Manifest = self.manifest;
        let mut selected: HashSet<&'m str> = HashSet::new();
        let mut queue: VecDeque<&'m PackageRecord> = VecDeque::new();

        for package in self.defaults() {
            if selected.insert(package.name.as_str()) {
                queue.push_back(package);
            }
        }

        let mut unknown = BTreeSet::new();
        for module in modules {
            let module = module.as_ref().trim();
            let Some((umbrella, variant)) = self.matching_pair(module) else {
                unknown.insert(module.to_string());
                continue;
            };

            for package in [umbrella, variant] {
                if selected.insert(package.name.as_str()) {
                    queue.push_back(package);
                }
            }
        }

        if !unknown.is_empty() {
            return Err(ResolveError::UnknownModule {
                modules: unknown.into_iter().collect(),
            });
        }

        while let Some(package) = queue.pop_front() {
            for dependency in &package.auto_depend_on {
                match manifest.find(dependency) {
                    Some(found) => {
                        if selected.insert(found.name.as_str()) {
                            queue.push_back(found);
                        }
                    }
                    None => tracing::debug!(
                        "Skipping dependency {dependency} of {}: not in manifest",
                        package.name
                    ),
                }
            }
        }

        let resolved: Vec<_> = manifest
            .packages
            .iter()
            .filter(|p| selected.contains(p.name.as_str()))
            .collect();

        tracing::debug!(
            "Resolved {} module(s) to {} package(s)",
            modules.len(),
            resolved.len()
        );
        Ok(resolved)
    }
}

/// Architecture packages: one segment below the prefix and carrying archives.
fn architectures<'m>(
    manifest: &'m Manifest,
    scheme: &DetectedScheme,
) -> impl Iterator<Item = (&'m str, &'m PackageRecord)> {
    let prefix = scheme.prefix.clone();
    manifest.packages.iter().filter_map(move |p| {
        let arch = p.name.strip_prefix(prefix.as_str())?;
        (!arch.is_empty() && !arch.contains('.') && !p.downloadable_archives.is_empty())
            .then_some((arch, p))
    })
}

fn default_architecture(manifest: &Manifest, scheme: &DetectedScheme) -> Option<String> {
    let candidates: Vec<_> = architectures(manifest, scheme).collect();

    let chosen = match candidates.iter().find(|(_, p)| p.default) {
        Some((arch, _)) => Some(*arch),
        // a lone architecture needs no default flag
        None if candidates.len() == 1 => candidates.first().map(|(arch, _)| *arch),
        None => None,
    };

    chosen.map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtfetch_schema::PackageName;

    fn record(name: &str, default: bool, deps: &[&str], archives: usize) -> PackageRecord {
        PackageRecord {
            name: name.into(),
            display_name: String::new(),
            description: String::new(),
            version: "6.2.0-0-202107051001".into(),
            release_date: "2021-07-05".into(),
            default,
            auto_depend_on: deps.iter().copied().map(PackageName::from).collect(),
            script: String::new(),
            downloadable_archives: (0..archives).map(|i| format!("{i}.7z")).collect(),
            sha1: String::new(),
        }
    }

    fn manifest(packages: Vec<PackageRecord>) -> Manifest {
        Manifest {
            application_name: "{AnyApplication}".into(),
            application_version: "1.0.0".into(),
            checksum: "true".into(),
            packages,
        }
    }

    fn sample() -> Manifest {
        manifest(vec![
            record("qt.qt6.620", false, &[], 0),
            record("qt.qt6.620.gcc_64", true, &["qt.qt6.620", "qt.license.thirdparty"], 3),
            record("qt.qt6.620.qtquick3d", false, &["qt.qt6.620.qtshadertools"], 0),
            record("qt.qt6.620.qtquick3d.gcc_64", false, &["qt.qt6.620.qtquick3d"], 1),
            record("qt.qt6.620.qtshadertools", false, &[], 0),
            record("qt.qt6.620.qtshadertools.gcc_64", false, &[], 1),
            record("qt.qt6.620.addons", false, &[], 0),
            record("qt.qt6.620.addons.qtcharts", false, &[], 0),
            record("qt.qt6.620.addons.qtcharts.gcc_64", false, &["qt.qt6.620.addons.qtcharts"], 1),
            record("qt.qt6.620.wasm_32", false, &[], 2),
        ])
    }

    fn names(packages: &[&PackageRecord]) -> Vec<String> {
        packages.iter().map(|p| p.name.to_string()).collect()
    }

    #[test]
    fn picks_default_architecture() {
        let m = sample();
        let resolver = ModuleResolver::new(&m).unwrap();
        assert_eq!(resolver.arch(), "gcc_64");
        assert_eq!(resolver.available_architectures(), ["gcc_64", "wasm_32"]);
    }

    #[test]
    fn no_modules_yields_defaults_and_their_dependencies() {
        let m = sample();
        let resolved = ModuleResolver::new(&m).unwrap().resolve::<&str>(&[]).unwrap();
        assert_eq!(names(&resolved), ["qt.qt6.620", "qt.qt6.620.gcc_64"]);
    }

    #[test]
    fn follows_auto_depend_on_forward_only() {
        let m = sample();
        let resolved = ModuleResolver::new(&m)
            .unwrap()
            .resolve(&["qtquick3d"])
            .unwrap();
        assert_eq!(
            names(&resolved),
            [
                "qt.qt6.620",
                "qt.qt6.620.gcc_64",
                "qt.qt6.620.qtquick3d",
                "qt.qt6.620.qtquick3d.gcc_64",
                "qt.qt6.620.qtshadertools",
            ]
        );
    }

    #[test]
    fn matches_addon_modules() {
        let m = sample();
        let resolved = ModuleResolver::new(&m)
            .unwrap()
            .resolve(&["qtcharts"])
            .unwrap();
        assert!(names(&resolved).contains(&"qt.qt6.620.addons.qtcharts.gcc_64".to_string()));
    }

    #[test]
    fn reports_every_unknown_module() {
        let m = sample();
        let err = ModuleResolver::new(&m)
            .unwrap()
            .resolve(&["qtwebkit", "qtcharts", "qcharts", "qtwebkit"])
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownModule {
                modules: vec!["qcharts".into(), "qtwebkit".into()]
            }
        );
    }

    #[test]
    fn categories_and_architectures_are_not_modules() {
        let m = sample();
        let resolver = ModuleResolver::new(&m).unwrap();

        for request in ["addons", "gcc_64", "wasm_32"] {
            assert_eq!(
                resolver.resolve(&[request]).unwrap_err(),
                ResolveError::UnknownModule {
                    modules: vec![request.into()]
                }
            );
        }
    }

    #[test]
    fn module_needs_umbrella_and_variant() {
        let m = manifest(vec![
            record("qt.qt6.620.gcc_64", true, &[], 1),
            // variant only
            record("qt.qt6.620.qtlottie.gcc_64", false, &[], 1),
            // umbrella only
            record("qt.qt6.620.qtsvg", false, &[], 0),
            // pair split across infixes
            record("qt.qt6.620.addons.qtwebsockets", false, &[], 0),
            record("qt.qt6.620.qtwebsockets.gcc_64", false, &[], 1),
        ]);
        let resolver = ModuleResolver::new(&m).unwrap();

        let err = resolver
            .resolve(&["qtlottie", "qtsvg", "qtwebsockets"])
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownModule {
                modules: vec!["qtlottie".into(), "qtsvg".into(), "qtwebsockets".into()]
            }
        );
        assert!(resolver.available_modules().is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let m = sample();
        let resolver = ModuleResolver::new(&m).unwrap();
        let first = resolver.resolve(&["qtcharts", "qtquick3d"]).unwrap();
        let second = resolver.resolve(&["qtquick3d", "qtcharts", "qtcharts"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn explicit_architecture() {
        let m = sample();
        let resolver = ModuleResolver::with_arch(&m, "wasm_32").unwrap();
        let resolved = resolver.resolve::<&str>(&[]).unwrap();
        assert!(resolved.is_empty());

        let err = ModuleResolver::with_arch(&m, "msvc2019_64").unwrap_err();
        assert!(matches!(err, ResolveError::UnknownArchitecture { .. }));
    }

    #[test]
    fn lists_available_modules() {
        let m = sample();
        let resolver = ModuleResolver::new(&m).unwrap();
        assert_eq!(
            resolver.available_modules(),
            ["qtcharts", "qtquick3d", "qtshadertools"]
        );
    }

    #[test]
    fn missing_default_architecture() {
        let m = manifest(vec![
            record("qt.qt6.620.gcc_64", false, &[], 1),
            record("qt.qt6.620.wasm_32", false, &[], 1),
        ]);
        let err = ModuleResolver::new(&m).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoArchitecture {
                prefix: "qt.qt6.620.".into()
            }
        );
    }
}
