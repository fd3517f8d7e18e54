use std::path::Path;
use std::process::{Command, Output};

use mockito::{Mock, ServerGuard};
use sha1::{Digest, Sha1};
use tempfile::TempDir;

const QT6_620: &str =
    include_str!("../../qtfetch-core/tests/fixtures/linux_x64/desktop/qt6_620/Updates.xml");
const MANIFEST_PATH: &str = "/linux_x64/desktop/qt6_620/Updates.xml";

/// Test context with a mock repository and a scratch output directory
struct TestContext {
    server: ServerGuard,
    output: TempDir,
    mocks: Vec<Mock>,
}

impl TestContext {
    fn new() -> Self {
        let mut server = mockito::Server::new();
        let manifest = server
            .mock("GET", MANIFEST_PATH)
            .with_status(200)
            .with_body(QT6_620)
            .create();

        Self {
            server,
            output: TempDir::new().expect("failed to create temp dir"),
            mocks: vec![manifest],
        }
    }

    /// Serve every archive of the release and its published `.sha1`.
    ///
    /// Each archive is a 7z holding `gcc_64/lib/<filename>.txt`. The
    /// `tamper` archive is served with a body that does not match its
    /// digest.
    fn serve_archives(&mut self, tamper: Option<&str>) {
        let manifest = qtfetch_core::parser::parse(QT6_620).unwrap();
        let base_url = format!("{}/linux_x64/desktop/qt6_620", self.server.url());
        let modules = qtfetch_core::ModuleResolver::new(&manifest)
            .unwrap()
            .available_modules();
        let packages = qtfetch_core::fetch_package_infos(&base_url, &manifest, &modules).unwrap();

        for archive in packages.iter().flat_map(|p| &p.archives) {
            let body = seven_zip(&archive.filename);
            let digest = hex::encode(Sha1::digest(&body));
            let served = if tamper == Some(archive.filename.as_str()) {
                b"tampered".to_vec()
            } else {
                body
            };

            let path = archive.url.strip_prefix(&self.server.url()).unwrap().to_string();
            let mock = self.server.mock("GET", path.as_str()).with_body(served).create();
            self.mocks.push(mock);

            let path = archive.sha1_url.strip_prefix(&self.server.url()).unwrap().to_string();
            let mock = self.server.mock("GET", path.as_str()).with_body(digest).create();
            self.mocks.push(mock);
        }
    }

    fn qtfetch(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_qtfetch"));
        cmd.env("QTFETCH_REPOSITORY", self.server.url());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.qtfetch().args(args).output().expect("failed to run qtfetch")
    }

    fn out_dir(&self) -> &Path {
        self.output.path()
    }
}

/// A 7z archive with a single `gcc_64/lib/<filename>.txt` entry.
fn seven_zip(filename: &str) -> Vec<u8> {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("content");
    std::fs::create_dir_all(content.join("gcc_64/lib")).unwrap();
    std::fs::write(content.join(format!("gcc_64/lib/{filename}.txt")), filename).unwrap();

    let archive = dir.path().join("archive.7z");
    sevenz_rust2::compress_to_path(&content, &archive).unwrap();
    std::fs::read(archive).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const TARGET: [&str; 6] = ["--os", "linux", "--platform", "desktop", "--version", "6.2.0"];

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage:"));
}

#[test]
fn test_versions_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["versions"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("5.15.2"));
    assert!(stdout.contains("6.2.0"));
    assert!(stdout.contains("VERSIONS COMPLETE"));
}

#[test]
fn test_bad_os_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["resolve", "--os", "beos", "--platform", "desktop", "--version", "6.2.0"]);
    assert!(!output.status.success());
}

#[test]
fn test_bad_platform_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["resolve", "--os", "linux", "--platform", "dektop", "--version", "6.2.0"]);
    assert!(!output.status.success());
}

#[test]
fn test_unknown_version_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["resolve", "--os", "linux", "--platform", "desktop", "--version", "5.15.3"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown Qt version 5.15.3"));
}

#[test]
fn test_malformed_version_fails() {
    let ctx = TestContext::new();
    for version in ["5.9.a", "5.110", "6.-1,2"] {
        let output = ctx.run(&["resolve", "--os", "linux", "--version", version]);
        assert!(!output.status.success(), "{version}");
    }
}

#[test]
fn test_unknown_module_fails() {
    let ctx = TestContext::new();
    let mut args = vec!["resolve"];
    args.extend(TARGET);
    args.extend(["--modules", "qtcharts,qcharts"]);

    let output = ctx.run(&args);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("qcharts"));
}

#[test]
fn test_unsupported_combination_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["resolve", "--os", "linux", "--platform", "ios", "--version", "6.2.0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does not support linux/ios"));
}

#[test]
fn test_resolve_prints_json() {
    let ctx = TestContext::new();
    let mut args = vec!["resolve"];
    args.extend(TARGET);
    args.extend(["-m", "qtcharts", "-m", "qtnetworkauth,qtquick3d"]);

    let output = ctx.run(&args);
    assert!(output.status.success(), "{}", stderr(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["arch"], "gcc_64");
    let packages = json["packages"].as_array().unwrap();
    assert_eq!(packages.len(), 9);

    let urls: usize = packages
        .iter()
        .map(|p| p["archives"].as_array().unwrap().len())
        .sum();
    assert_eq!(urls, 11);
}

#[test]
fn test_modules_command() {
    let ctx = TestContext::new();
    let mut args = vec!["modules"];
    args.extend(TARGET);

    let output = ctx.run(&args);
    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    for module in ["qt5compat", "qtcharts", "qtquick3d", "qtshadertools"] {
        assert!(stdout.contains(module), "{module}");
    }
}

#[test]
fn test_install_dry_run_writes_nothing() {
    let ctx = TestContext::new();
    let out = ctx.out_dir().join("qt");
    let mut args = vec!["install", "--dry-run", "--output", out.to_str().unwrap()];
    args.extend(TARGET);
    args.extend(["--modules", "qtcharts"]);

    let output = ctx.run(&args);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("DRY RUN COMPLETE 9"));
    assert!(!out.exists());
}

#[test]
fn test_install_downloads_verifies_and_extracts() {
    let mut ctx = TestContext::new();
    ctx.serve_archives(None);
    let out = ctx.out_dir().join("qt");
    let mut args = vec!["install", "--output", out.to_str().unwrap(), "--jobs", "2"];
    args.extend(TARGET);
    args.extend(["--modules", "qtcharts,qtquick3d"]);

    let output = ctx.run(&args);
    assert!(output.status.success(), "{}", stderr(&output));

    let release = out.join("6.2.0");
    let lib = release.join("gcc_64").join("lib");
    let charts = lib.join("qtcharts-Linux-RHEL_8_2-GCC-Linux-RHEL_8_2-X86_64.7z.txt");
    assert_eq!(
        std::fs::read_to_string(charts).unwrap(),
        "qtcharts-Linux-RHEL_8_2-GCC-Linux-RHEL_8_2-X86_64.7z"
    );
    // 8 gcc_64 archives, qtcharts and qtquick3d
    assert_eq!(std::fs::read_dir(&lib).unwrap().count(), 10);

    // raw archives and staging directories are gone
    let top: Vec<String> = std::fs::read_dir(&release)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(top, ["gcc_64"]);
}

#[test]
fn test_install_hash_mismatch_fails() {
    let mut ctx = TestContext::new();
    ctx.serve_archives(Some("qtcharts-Linux-RHEL_8_2-GCC-Linux-RHEL_8_2-X86_64.7z"));
    let out = ctx.out_dir().join("qt");
    let mut args = vec!["install", "--output", out.to_str().unwrap()];
    args.extend(TARGET);
    args.extend(["--modules", "qtcharts"]);

    let output = ctx.run(&args);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to install"));

    let lib = out.join("6.2.0").join("gcc_64").join("lib");
    assert!(lib.join("qtbase-Linux-RHEL_8_2-GCC-Linux-RHEL_8_2-X86_64.7z.txt").exists());
    assert!(!lib.join("qtcharts-Linux-RHEL_8_2-GCC-Linux-RHEL_8_2-X86_64.7z.txt").exists());
}

#[test]
fn test_resolve_lists_checksum_urls() {
    let ctx = TestContext::new();
    let mut args = vec!["resolve"];
    args.extend(TARGET);
    args.extend(["-m", "qtcharts"]);

    let output = ctx.run(&args);
    assert!(output.status.success(), "{}", stderr(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for package in json["packages"].as_array().unwrap() {
        for archive in package["archives"].as_array().unwrap() {
            let url = archive["url"].as_str().unwrap();
            assert_eq!(archive["sha1_url"].as_str().unwrap(), format!("{url}.sha1"));
        }
    }
}

#[test]
fn test_category_is_not_a_module() {
    let ctx = TestContext::new();
    let mut args = vec!["resolve"];
    args.extend(TARGET);
    args.extend(["--modules", "addons"]);

    let output = ctx.run(&args);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("addons"));
}
