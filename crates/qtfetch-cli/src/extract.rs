//! 7z extraction and committing extracted trees into an install root.
//!
//! Extraction always happens inside a staging directory. [`commit_tree`]
//! then moves the staged files into place; files it displaces are kept in a
//! backup directory until every staged file has landed, and are put back if
//! any move fails.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use sevenz_rust2::Password;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Archive entry '{0}' would land outside the install root")]
    UnsafeEntry(String),
}

/// Extract a 7z archive into `dest_dir`.
///
/// Entries with absolute paths or `..` components are refused and the
/// extraction fails.
pub fn extract_7z(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(dest_dir)?;
    let rejected = RefCell::new(None);

    sevenz_rust2::decompress_with_extract_fn_and_password(
        File::open(archive_path)?,
        dest_dir,
        Password::empty(),
        |entry, reader, dest| {
            if !is_contained(entry.name()) {
                rejected.borrow_mut().get_or_insert_with(|| entry.name().to_string());
                return Ok(true);
            }
            tracing::trace!("Extracting {}", entry.name());
            sevenz_rust2::default_entry_extract_fn(entry, reader, dest)
        },
    )
    .map_err(|e| ExtractError::Archive(format!("{}: {e}", archive_path.display())))?;

    match rejected.into_inner() {
        Some(name) => Err(ExtractError::UnsafeEntry(name)),
        None => Ok(()),
    }
}

fn is_contained(entry: &str) -> bool {
    Path::new(entry)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[derive(Debug, Default)]
struct Journal {
    created_dirs: Vec<PathBuf>,
    displaced: Vec<(PathBuf, PathBuf)>,
    placed: Vec<PathBuf>,
}

impl Journal {
    fn undo(self) {
        for path in self.placed.iter().rev() {
            fs::remove_file(path).ok();
        }
        for (original, aside) in self.displaced.iter().rev() {
            if let Err(e) = fs::rename(aside, original) {
                tracing::warn!("Could not restore {}: {e}", original.display());
            }
        }
        for dir in self.created_dirs.iter().rev() {
            fs::remove_dir(dir).ok();
        }
    }
}

/// Move every file under `staged` to the same relative path under `dest`.
///
/// Existing files are moved into `backup` first and only become garbage
/// once the whole tree is in place. On failure everything placed so far is
/// removed and the displaced files are restored. Returns the number of
/// files placed.
pub fn commit_tree(staged: &Path, dest: &Path, backup: &Path) -> io::Result<usize> {
    let entries = WalkDir::new(staged)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    fs::create_dir_all(dest)?;
    let mut journal = Journal::default();

    match place_all(&entries, staged, dest, backup, &mut journal) {
        Ok(()) => Ok(journal.placed.len()),
        Err(e) => {
            journal.undo();
            Err(e)
        }
    }
}

fn place_all(
    entries: &[walkdir::DirEntry],
    staged: &Path,
    dest: &Path,
    backup: &Path,
    journal: &mut Journal,
) -> io::Result<()> {
    for entry in entries {
        let relative = entry
            .path()
            .strip_prefix(staged)
            .map_err(io::Error::other)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            match fs::create_dir(&target) {
                Ok(()) => journal.created_dirs.push(target),
                // shared with other packages
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && target.is_dir() => {}
                Err(e) => return Err(e),
            }
            continue;
        }

        if fs::symlink_metadata(&target).is_ok() {
            let aside = backup.join(relative);
            if let Some(parent) = aside.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&target, &aside)?;
            journal.displaced.push((target.clone(), aside));
        }

        fs::rename(entry.path(), &target)?;
        journal.placed.push(target);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn read(root: &Path, relative: &str) -> String {
        fs::read_to_string(root.join(relative)).unwrap()
    }

    #[test]
    fn extracts_archive_contents() {
        let dir = tempdir().unwrap();
        let content = dir.path().join("content");
        write(&content, "6.2.0/gcc_64/bin/qmake", "qmake");
        write(&content, "6.2.0/gcc_64/lib/libQt6Core.so.6", "core");

        let archive = dir.path().join("qtbase.7z");
        sevenz_rust2::compress_to_path(&content, &archive).unwrap();

        let out = dir.path().join("out");
        extract_7z(&archive, &out).unwrap();
        assert_eq!(read(&out, "6.2.0/gcc_64/bin/qmake"), "qmake");
        assert_eq!(read(&out, "6.2.0/gcc_64/lib/libQt6Core.so.6"), "core");
    }

    #[test]
    fn garbage_is_an_archive_error() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("broken.7z");
        fs::write(&archive, "not a 7z archive").unwrap();

        let err = extract_7z(&archive, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, ExtractError::Archive(_)));
    }

    #[test]
    fn entry_containment() {
        assert!(is_contained("6.2.0/gcc_64/bin/qmake"));
        assert!(is_contained("./6.2.0/gcc_64"));
        assert!(!is_contained("../6.2.0"));
        assert!(!is_contained("6.2.0/../../etc/passwd"));
        assert!(!is_contained("/etc/passwd"));
    }

    #[test]
    fn commit_merges_and_replaces() {
        let dir = tempdir().unwrap();
        let (staged, dest, backup) = (
            dir.path().join("staged"),
            dir.path().join("dest"),
            dir.path().join("backup"),
        );
        write(&dest, "gcc_64/bin/qmake", "old");
        write(&dest, "gcc_64/bin/moc", "kept");
        write(&staged, "gcc_64/bin/qmake", "new");
        write(&staged, "gcc_64/lib/libQt6Charts.so.6", "charts");

        assert_eq!(commit_tree(&staged, &dest, &backup).unwrap(), 2);
        assert_eq!(read(&dest, "gcc_64/bin/qmake"), "new");
        assert_eq!(read(&dest, "gcc_64/bin/moc"), "kept");
        assert_eq!(read(&dest, "gcc_64/lib/libQt6Charts.so.6"), "charts");
        assert_eq!(read(&backup, "gcc_64/bin/qmake"), "old");
    }

    #[test]
    fn failed_commit_restores_previous_install() {
        let dir = tempdir().unwrap();
        let (staged, dest, backup) = (
            dir.path().join("staged"),
            dir.path().join("dest"),
            dir.path().join("backup"),
        );
        write(&dest, "gcc_64/bin/qmake", "old");
        // a file where the staged tree needs a directory
        write(&dest, "gcc_64/lib", "in the way");
        write(&staged, "gcc_64/bin/qmake", "new");
        write(&staged, "gcc_64/bin/uic", "uic");
        write(&staged, "gcc_64/lib/libQt6Core.so.6", "core");

        assert!(commit_tree(&staged, &dest, &backup).is_err());
        assert_eq!(read(&dest, "gcc_64/bin/qmake"), "old");
        assert!(!dest.join("gcc_64/bin/uic").exists());
        assert_eq!(read(&dest, "gcc_64/lib"), "in the way");
    }
}
