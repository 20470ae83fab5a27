//! Capability-based filesystem helpers built on `cap-std` and `camino`.
//!
//! Paths supplied by operators (database files, word lists) are resolved
//! against an ambient directory handle, and all further access goes
//! through that handle.
#![forbid(unsafe_code)]

use std::io::{self, Read};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open the directory containing `path` and return it with the file name.
///
/// # Errors
/// Fails when `path` has no file name or the parent cannot be opened.
pub fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let (base, relative) = split_base_dir(parent)?;
    let dir = if relative.as_str().is_empty() {
        base
    } else {
        base.open_dir(&relative)?
    };
    Ok((dir, file_name))
}

/// Read a whole UTF-8 text file.
///
/// # Errors
/// Fails when the file cannot be opened or is not valid UTF-8.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_parent_dir(path)?;
    let mut file = dir.open(&name)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Report whether `path` is a regular file rather than a directory or
/// other entry.
///
/// # Errors
/// Fails with [`io::ErrorKind::NotFound`] when the path or its parent does
/// not exist, and with the underlying error when it cannot be inspected.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    dir.metadata(&name).map(|meta| meta.is_file())
}

/// Create every missing ancestor directory of `path`.
///
/// # Errors
/// Fails when a directory cannot be created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (base, relative) = split_base_dir(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Split a directory path into an ambient base handle and a relative
/// remainder that can be resolved through it.
fn split_base_dir(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_dir = dir.as_std_path();
    let (base, relative) = match std_dir.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(format!("{prefix}{}", std::path::MAIN_SEPARATOR));
            let relative = dir
                .strip_prefix(&base)
                .or_else(|_| dir.strip_prefix(prefix))
                .map_err(|_| io::Error::other(format!("cannot strip prefix from {dir}")))?
                .to_owned();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = dir
                .strip_prefix(&base)
                .map_err(|_| io::Error::other(format!("cannot strip root from {dir}")))?
                .to_owned();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), dir.to_owned()),
    };
    let handle = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((handle, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn utf8(dir: &TempDir, relative: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(relative)).expect("utf8 temp path")
    }

    #[rstest]
    fn creates_nested_parents(temp_dir: TempDir) {
        let target = utf8(&temp_dir, "a/b/c/words.txt");
        ensure_parent_dir(&target).expect("create parents");
        assert!(temp_dir.path().join("a/b/c").is_dir());
        ensure_parent_dir(&target).expect("idempotent");
    }

    #[rstest]
    fn reads_file_contents(temp_dir: TempDir) {
        let target = utf8(&temp_dir, "words.txt");
        fs::write(target.as_std_path(), "rats\nstar\n").expect("write file");
        assert_eq!(read_to_string(&target).expect("read"), "rats\nstar\n");
    }

    #[rstest]
    fn distinguishes_files_from_directories(temp_dir: TempDir) {
        let present = utf8(&temp_dir, "present.txt");
        fs::write(present.as_std_path(), "").expect("write file");
        fs::create_dir(temp_dir.path().join("nested")).expect("create dir");
        assert!(file_is_file(&present).expect("stat"));
        assert!(!file_is_file(&utf8(&temp_dir, "nested")).expect("stat"));
    }

    #[rstest]
    fn missing_paths_report_not_found(temp_dir: TempDir) {
        let err = file_is_file(&utf8(&temp_dir, "absent.txt")).expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn bare_file_names_need_no_parent() {
        ensure_parent_dir(Utf8Path::new("letterbox.db")).expect("no-op");
    }
}
