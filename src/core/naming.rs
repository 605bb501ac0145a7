//! Collision-free artifact file names
//!
//! A logical name such as `test.dat` expands to the candidates `test.dat`,
//! `test-1.dat`, `test-2.dat`, ... Each candidate is claimed with an atomic
//! create-if-absent, so two writers sharing a directory can never overwrite
//! each other's files.
//!
//! [`ArtifactDir`] holds the target directory open (a directory file
//! descriptor on unix), so files keep landing in the same directory even if it
//! is renamed while the writer is alive.

use super::error::{Result, TreeLogError};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Upper bound on candidates tried before giving up
pub const MAX_NAME_ATTEMPTS: usize = 100_000;

/// Infinite sequence `name`, `stem-1.ext`, `stem-2.ext`, ...
#[derive(Debug, Clone)]
pub struct NameSequence {
    stem: String,
    ext: String,
    next: usize,
}

impl NameSequence {
    pub fn new(name: &str) -> Self {
        let (stem, ext) = split_extension(name);
        Self {
            stem: stem.to_string(),
            ext: ext.to_string(),
            next: 0,
        }
    }

    fn candidate(&self, index: usize) -> String {
        if index == 0 {
            format!("{}{}", self.stem, self.ext)
        } else {
            format!("{}-{}{}", self.stem, index, self.ext)
        }
    }
}

impl Iterator for NameSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let name = self.candidate(self.next);
        self.next += 1;
        Some(name)
    }
}

/// Split off the extension of the final path component, keeping its dot.
///
/// Leading dots belong to the stem, so `.bashrc` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let base_start = name.rfind('/').map_or(0, |i| i + 1);
    let base = &name[base_start..];
    let dots = base.len() - base.trim_start_matches('.').len();
    match base[dots..].rfind('.') {
        Some(i) => name.split_at(base_start + dots + i),
        None => (name, ""),
    }
}

/// Directory that artifacts are created in.
#[derive(Debug)]
pub struct ArtifactDir {
    path: PathBuf,
    #[cfg(unix)]
    fd: std::os::fd::OwnedFd,
}

impl ArtifactDir {
    /// Create `path` (and parents) if needed and hold it open.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path).map_err(|e| {
            TreeLogError::io_operation(
                "creating artifact directory",
                path.display().to_string(),
                e,
            )
        })?;
        #[cfg(unix)]
        {
            use rustix::fs::{Mode, OFlags};
            let fd = rustix::fs::open(
                path.as_path(),
                OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC,
                Mode::empty(),
            )
            .map_err(|e| {
                TreeLogError::io_operation(
                    "opening artifact directory",
                    path.display().to_string(),
                    e.into(),
                )
            })?;
            Ok(Self { path, fd })
        }
        #[cfg(not(unix))]
        {
            Ok(Self { path })
        }
    }

    /// The path the directory had when it was opened.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically create `name`, failing if anything already exists there.
    pub fn create_new(&self, name: &str) -> io::Result<File> {
        #[cfg(unix)]
        {
            use rustix::fs::{Mode, OFlags};
            let fd = rustix::fs::openat(
                &self.fd,
                name,
                OFlags::RDWR | OFlags::CREATE | OFlags::EXCL | OFlags::CLOEXEC,
                Mode::from_raw_mode(0o666),
            )?;
            Ok(File::from(fd))
        }
        #[cfg(not(unix))]
        {
            fs::OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(self.path.join(name))
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        #[cfg(unix)]
        {
            rustix::fs::statat(&self.fd, name, rustix::fs::AtFlags::SYMLINK_NOFOLLOW).is_ok()
        }
        #[cfg(not(unix))]
        {
            self.path.join(name).exists()
        }
    }

    pub fn remove(&self, name: &str) -> io::Result<()> {
        #[cfg(unix)]
        {
            rustix::fs::unlinkat(&self.fd, name, rustix::fs::AtFlags::empty())?;
            Ok(())
        }
        #[cfg(not(unix))]
        {
            fs::remove_file(self.path.join(name))
        }
    }

    /// Claim the first name from `names` that does not exist yet.
    ///
    /// Existing names are skipped. A permission error counts as a collision
    /// only if the candidate really exists (some platforms report one for a
    /// clashing directory); otherwise it propagates.
    pub fn create_first_unused(
        &self,
        logical_name: &str,
        names: &mut dyn Iterator<Item = String>,
    ) -> Result<(String, File)> {
        let mut attempts = 0;
        for candidate in names.take(MAX_NAME_ATTEMPTS) {
            attempts += 1;
            match self.create_new(&candidate) {
                Ok(file) => return Ok((candidate, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::debug!(name = %candidate, "artifact name taken, trying next");
                    super::metrics::metrics().record_collision();
                }
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied && self.exists(&candidate) => {
                    tracing::debug!(name = %candidate, "artifact name blocked, trying next");
                    super::metrics::metrics().record_collision();
                }
                Err(e) => {
                    return Err(TreeLogError::io_operation(
                        "creating artifact",
                        format!("cannot create '{}' in {}", candidate, self.path.display()),
                        e,
                    ))
                }
            }
        }
        Err(TreeLogError::names_exhausted(logical_name, attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sequence() {
        let names: Vec<String> = NameSequence::new("test.dat").take(4).collect();
        assert_eq!(names, ["test.dat", "test-1.dat", "test-2.dat", "test-3.dat"]);
    }

    #[test]
    fn test_sequence_without_extension() {
        let names: Vec<String> = NameSequence::new("test").take(2).collect();
        assert_eq!(names, ["test", "test-1"]);
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("..x.y"), ("..x", ".y"));
        assert_eq!(split_extension("dir.d/file"), ("dir.d/file", ""));
        assert_eq!(split_extension("dir/file.txt"), ("dir/file", ".txt"));
        assert_eq!(split_extension(""), ("", ""));
    }

    #[test]
    fn test_create_first_unused_three_times() {
        let tmp = tempdir().unwrap();
        let dir = ArtifactDir::open(tmp.path()).unwrap();
        let mut claimed = Vec::new();
        for _ in 0..3 {
            let (name, _file) = dir
                .create_first_unused("test.dat", &mut NameSequence::new("test.dat"))
                .unwrap();
            claimed.push(name);
        }
        assert_eq!(claimed, ["test.dat", "test-1.dat", "test-2.dat"]);
    }

    #[test]
    fn test_directory_clash_is_skipped() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("x.dat")).unwrap();
        let dir = ArtifactDir::open(tmp.path()).unwrap();
        let (name, _) = dir
            .create_first_unused("x.dat", &mut NameSequence::new("x.dat"))
            .unwrap();
        assert_eq!(name, "x-1.dat");
    }

    #[test]
    fn test_exhausted() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("only"), b"").unwrap();
        let dir = ArtifactDir::open(tmp.path()).unwrap();
        let err = dir
            .create_first_unused("only", &mut std::iter::repeat("only".to_string()).take(5))
            .unwrap_err();
        assert!(matches!(err, TreeLogError::NamesExhausted { attempts: 5, .. }));
    }

    #[test]
    fn test_remove() {
        let tmp = tempdir().unwrap();
        let dir = ArtifactDir::open(tmp.path().join("nested/out")).unwrap();
        drop(dir.create_new("a").unwrap());
        assert!(dir.exists("a"));
        dir.remove("a").unwrap();
        assert!(!dir.exists("a"));
    }

    #[cfg(unix)]
    #[test]
    fn test_moved_directory_keeps_receiving_files() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        let dir = ArtifactDir::open(&a).unwrap();
        fs::rename(&a, &b).unwrap();
        fs::create_dir(&a).unwrap();
        drop(dir.create_new("dat").unwrap());
        assert!(b.join("dat").exists());
        assert_eq!(fs::read_dir(&a).unwrap().count(), 0);
    }
}
