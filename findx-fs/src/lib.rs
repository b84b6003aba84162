//! Capability-based file access for the FindX command-line tools.
//!
//! Paths are UTF-8 (`camino`) and every open goes through `cap-std` with
//! ambient authority, so callers never touch `std::fs` directly.
#![forbid(unsafe_code)]

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Return whether `path` is a regular file.
///
/// A missing file or parent directory surfaces as an
/// [`io::ErrorKind::NotFound`] error.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    dir.metadata(name).map(|meta| meta.is_file())
}

/// Open the directory holding `path` and return it with the file name.
fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &str)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use std::io::{Read, Write};
    use tempfile::TempDir;

    #[fixture]
    fn workdir() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        (dir, root)
    }

    #[rstest]
    fn reads_file_contents(workdir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workdir;
        let path = root.join("reports.json");
        let mut file = std::fs::File::create(&path).expect("create file");
        file.write_all(b"[]").expect("write file");

        let mut contents = String::new();
        open_utf8_file(&path)
            .expect("open file")
            .read_to_string(&mut contents)
            .expect("read file");
        assert_eq!(contents, "[]");
        assert!(file_is_file(&path).expect("stat file"));
    }

    #[rstest]
    fn missing_file_is_not_found(workdir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workdir;
        let path = root.join("absent.json");
        let err = file_is_file(&path).expect_err("missing file should error");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(open_utf8_file(&path).is_err());
    }

    #[rstest]
    fn directories_are_not_files(workdir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workdir;
        let nested = root.join("nested");
        std::fs::create_dir(&nested).expect("create dir");
        assert!(!file_is_file(&nested).expect("stat dir"));
    }

    #[rstest]
    fn missing_parent_is_not_found(workdir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workdir;
        let err = file_is_file(&root.join("nope").join("reports.json"))
            .expect_err("missing parent should error");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
