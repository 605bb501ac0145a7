//! Writable handles handed to artifact producers
//!
//! A backend's `open` passes one of these to the caller's body. The extra
//! capabilities on top of [`Write`] let decorators such as the tee decide how
//! to duplicate a stream the producer only writes once.

use super::error::{Result, TreeLogError};
use super::message::FileMode;
use std::io::{self, Read, Seek, SeekFrom, Write};
use tempfile::SpooledTempFile;

/// Bytes kept in memory before a spooled buffer rolls over to disk
pub const SPOOL_LIMIT: usize = 1 << 20;

/// Callback that produces an artifact's content.
pub type ArtifactBody<'a> = &'a mut dyn FnMut(&mut dyn ArtifactFile) -> Result<()>;

/// A writable artifact sink.
pub trait ArtifactFile: Write {
    /// True if everything written is thrown away.
    fn is_discard(&self) -> bool {
        false
    }

    /// True if [`ArtifactFile::read_back`] can recover what was written.
    fn supports_read_back(&self) -> bool {
        false
    }

    /// Return every byte written so far; later writes keep appending.
    fn read_back(&mut self) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "artifact handle does not support read-back",
        ))
    }
}

/// Sink that accepts and drops all bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardFile;

impl Write for DiscardFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ArtifactFile for DiscardFile {
    fn is_discard(&self) -> bool {
        true
    }
}

/// Seekable handle whose content can be read back after writing.
#[derive(Debug)]
pub struct ReadBackFile<F> {
    inner: F,
}

impl<F: Read + Write + Seek> ReadBackFile<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Write> Write for ReadBackFile<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<F: Read + Write + Seek> ArtifactFile for ReadBackFile<F> {
    fn supports_read_back(&self) -> bool {
        true
    }

    fn read_back(&mut self) -> io::Result<Vec<u8>> {
        self.inner.flush()?;
        self.inner.seek(SeekFrom::Start(0))?;
        let mut data = Vec::new();
        self.inner.read_to_end(&mut data)?;
        self.inner.seek(SeekFrom::End(0))?;
        Ok(data)
    }
}

/// Memory buffer that spills to a temporary file past [`SPOOL_LIMIT`].
pub type SpooledFile = ReadBackFile<SpooledTempFile>;

impl SpooledFile {
    pub fn spooled() -> Self {
        ReadBackFile::new(SpooledTempFile::new(SPOOL_LIMIT))
    }
}

/// Forward-only handle around any writer.
#[derive(Debug)]
pub struct WriteOnlyFile<W> {
    inner: W,
}

impl<W: Write> WriteOnlyFile<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for WriteOnlyFile<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> ArtifactFile for WriteOnlyFile<W> {}

/// Checks that a text-mode artifact stays valid UTF-8 across chunk boundaries.
pub(crate) struct ModeCheck<'a> {
    inner: &'a mut dyn ArtifactFile,
    mode: FileMode,
    pending: Vec<u8>,
    valid: bool,
}

impl<'a> ModeCheck<'a> {
    pub(crate) fn new(inner: &'a mut dyn ArtifactFile, mode: FileMode) -> Self {
        Self {
            inner,
            mode,
            pending: Vec::new(),
            valid: true,
        }
    }

    fn check(&mut self, bytes: &[u8]) {
        if self.mode != FileMode::Text || !self.valid {
            return;
        }
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.clear(),
            Err(e) if e.error_len().is_some() => {
                self.valid = false;
                self.pending.clear();
            }
            // incomplete trailing sequence, wait for the rest
            Err(e) => {
                self.pending.drain(..e.valid_up_to());
            }
        }
    }

    pub(crate) fn finish(self, name: &str) -> Result<()> {
        if self.valid && self.pending.is_empty() {
            Ok(())
        } else {
            Err(TreeLogError::invalid_text(name))
        }
    }
}

impl Write for ModeCheck<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.check(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_spooled_read_back_then_append() {
        let mut file = SpooledFile::spooled();
        file.write_all(b"abc").unwrap();
        assert_eq!(file.read_back().unwrap(), b"abc");
        file.write_all(b"def").unwrap();
        assert_eq!(file.read_back().unwrap(), b"abcdef");
    }

    #[test]
    fn test_spooled_rolls_over_past_limit() {
        let mut file = SpooledFile::spooled();
        let chunk = vec![7u8; SPOOL_LIMIT + 10];
        file.write_all(&chunk).unwrap();
        assert_eq!(file.read_back().unwrap().len(), SPOOL_LIMIT + 10);
    }

    #[test]
    fn test_write_only_has_no_read_back() {
        let mut file = WriteOnlyFile::new(Vec::new());
        file.write_all(b"x").unwrap();
        assert!(!file.supports_read_back());
        assert!(file.read_back().is_err());
        assert_eq!(file.into_inner(), b"x");
    }

    #[test]
    fn test_discard() {
        let mut file = DiscardFile;
        assert_eq!(file.write(b"12345").unwrap(), 5);
        assert!(file.is_discard());
    }

    #[test]
    fn test_mode_check_split_code_point() {
        let mut sink = ReadBackFile::new(Cursor::new(Vec::new()));
        let mut check = ModeCheck::new(&mut sink, FileMode::Text);
        let snowman = "\u{2603}".as_bytes();
        check.write_all(&snowman[..1]).unwrap();
        check.write_all(&snowman[1..]).unwrap();
        assert!(check.finish("t.txt").is_ok());
    }

    #[test]
    fn test_mode_check_rejects_invalid_text() {
        let mut sink = DiscardFile;
        let mut check = ModeCheck::new(&mut sink, FileMode::Text);
        check.write_all(&[0xff, 0xfe]).unwrap();
        assert!(matches!(check.finish("t.txt"), Err(TreeLogError::InvalidText { .. })));

        let mut sink = DiscardFile;
        let mut check = ModeCheck::new(&mut sink, FileMode::Binary);
        check.write_all(&[0xff, 0xfe]).unwrap();
        assert!(check.finish("t.bin").is_ok());
    }
}
