//! Directory-backed artifact backend

use crate::core::{
    metrics, ArtifactBody, ArtifactDir, ArtifactSpec, ContextDepth, Level, Log, Message,
    NameSequence, ReadBackFile, Result, TreeLogError,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Logical names whose sequences are remembered between artifacts
pub const NAME_CACHE_SIZE: usize = 32;

/// Persists every artifact as a file and ignores everything else.
///
/// Each artifact gets the first unused name derived from its logical name
/// (`out.bin`, `out-1.bin`, ...), claimed with an atomic exclusive create. Two
/// `DataLog`s sharing a directory therefore never overwrite each other.
/// Context titles are not used, but a pop or recontext with nothing open is
/// still rejected.
///
/// # Example
///
/// ```no_run
/// use treelog::{ArtifactSpec, DataLog, Level, Log};
///
/// let log = DataLog::new("artifacts").unwrap();
/// log.open(&ArtifactSpec::binary("out.bin"), Level::Info, &mut |f| {
///     f.write_all(b"abc")?;
///     Ok(())
/// })
/// .unwrap();
/// ```
pub struct DataLog {
    dir: ArtifactDir,
    names: Mutex<VecDeque<(String, NameSequence)>>,
    depth: ContextDepth,
}

impl DataLog {
    /// Write artifacts into `path`, creating it if needed.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            dir: ArtifactDir::open(path)?,
            names: Mutex::new(VecDeque::with_capacity(NAME_CACHE_SIZE)),
            depth: ContextDepth::new(),
        })
    }

    /// The directory path as given at construction.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Claim a fresh file for `logical_name`.
    fn claim(&self, logical_name: &str) -> Result<(String, File)> {
        let mut names = self.names.lock();
        let mut sequence = match names.iter().position(|(name, _)| name == logical_name) {
            Some(index) => names.remove(index).map(|(_, seq)| seq),
            None => None,
        }
        .unwrap_or_else(|| NameSequence::new(logical_name));

        let claimed = self.dir.create_first_unused(logical_name, &mut sequence);
        names.push_front((logical_name.to_string(), sequence));
        names.truncate(NAME_CACHE_SIZE);
        claimed
    }

    /// Claim a name and let `fill` write the file, removing it on failure.
    fn persist(
        &self,
        logical_name: &str,
        fill: impl FnOnce(&mut ReadBackFile<File>) -> Result<()>,
    ) -> Result<String> {
        let (name, file) = self.claim(logical_name)?;
        let mut handle = ReadBackFile::new(file);
        let written = fill(&mut handle).and_then(|()| Ok(handle.flush()?));
        drop(handle);

        if let Err(e) = written {
            tracing::debug!(name = %name, error = %e, "removing partially written artifact");
            return match self.dir.remove(&name) {
                Ok(()) => Err(e),
                Err(remove_err) => Err(TreeLogError::io_operation(
                    "removing partial artifact",
                    format!("'{}' in {} after: {}", name, self.path().display(), e),
                    remove_err,
                )),
            };
        }

        metrics().record_artifact();
        tracing::debug!(
            logical = logical_name,
            name = %name,
            dir = %self.path().display(),
            "artifact written"
        );
        Ok(name)
    }
}

impl std::fmt::Debug for DataLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLog")
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}

impl Log for DataLog {
    fn push_context(&self, _title: &str) -> Result<()> {
        self.depth.push();
        Ok(())
    }

    fn pop_context(&self) -> Result<()> {
        self.depth.pop()
    }

    fn recontext(&self, _title: &str) -> Result<()> {
        self.depth.recontext()
    }

    fn write(&self, message: &Message, _level: Level) -> Result<()> {
        if let Message::Data(data) = message {
            self.persist(&data.name, |file| Ok(file.write_all(&data.payload)?))?;
        }
        Ok(())
    }

    fn open(&self, spec: &ArtifactSpec, _level: Level, body: ArtifactBody<'_>) -> Result<()> {
        self.persist(&spec.name, |file| body(file))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "data"
    }
}
