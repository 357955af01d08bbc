use std::path::Path;

use crate::error::Error;

/// File access the parser and resolver need from the host.
///
/// The host may back this with a remote agent; nothing here assumes more than
/// reading a whole file and asking whether a path exists.
pub trait Workspace {
    fn read_to_string(&self, path: &Path) -> Result<String, Error>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool {
        self.exists(path)
    }
}

/// [`Workspace`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWorkspace;

impl Workspace for LocalWorkspace {
    fn read_to_string(&self, path: &Path) -> Result<String, Error> {
        let bytes = std::fs::read(path).map_err(|source| Error::io(path, source))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Absolute in the Doxyfile sense: a leading `/`, or a drive letter followed
/// by a backslash and at least one more character.
pub fn is_absolute(reference: &str) -> bool {
    if reference.starts_with('/') {
        return true;
    }
    let bytes = reference.as_bytes();
    bytes.len() > 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_unix_and_drive_letter_paths() {
        for (path, expected) in [
            ("doc", false),
            ("/usr", true),
            ("abcd123", false),
            ("/foo/bar", true),
            ("/etc/passwd", true),
            ("Doxyfile", false),
            ("src", false),
            ("C:\\docs", true),
            ("c:\\x", true),
            ("C:\\", false),
            ("C:docs", false),
            ("1:\\docs", false),
        ] {
            assert_eq!(is_absolute(path), expected, "for path: {path}");
        }
    }

    #[test]
    fn local_workspace_reports_missing_file_as_io() {
        let err = LocalWorkspace
            .read_to_string(Path::new("/definitely/not/here/Doxyfile"))
            .expect_err("missing file should fail");
        assert_eq!(err.kind(), crate::ErrorKind::Io);
    }

    #[test]
    fn local_workspace_reads_latin1_bytes_lossily() {
        let dir = tempfile::TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("Doxyfile");
        std::fs::write(&path, b"# Auteur: Ren\xe9\nHTML_OUTPUT = api\n").expect("write");

        let text = LocalWorkspace.read_to_string(&path).expect("read should succeed");
        assert_eq!(text, "# Auteur: Ren\u{fffd}\nHTML_OUTPUT = api\n");
    }
}
