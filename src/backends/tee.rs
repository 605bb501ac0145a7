//! Fan-out decorator

use super::NullLog;
use crate::core::{
    ArtifactBody, ArtifactFile, ArtifactSpec, Level, Log, Message, Result, SpooledFile,
};
use std::sync::Arc;

/// Forwards every operation to two backends.
///
/// More than two sinks are built by nesting, see [`TeeLog::chain`]. Both
/// backends see every operation even if the first one fails; the first error
/// is returned.
///
/// Artifacts are produced once but delivered byte-identical to both sides:
/// a side that discards is skipped, otherwise the producer writes into a
/// handle that can be read back and the bytes are copied to the other handle
/// afterwards. If neither side can read back, the producer writes into a
/// spooled buffer that is copied to both.
pub struct TeeLog {
    first: Arc<dyn Log>,
    second: Arc<dyn Log>,
}

impl TeeLog {
    pub fn new(first: Arc<dyn Log>, second: Arc<dyn Log>) -> Self {
        Self { first, second }
    }

    /// Combine any number of backends: none gives a null backend, one is
    /// returned as is, more are tee'd pairwise.
    pub fn chain(logs: impl IntoIterator<Item = Arc<dyn Log>>) -> Arc<dyn Log> {
        logs.into_iter()
            .reduce(|acc, log| Arc::new(TeeLog::new(acc, log)) as Arc<dyn Log>)
            .unwrap_or_else(|| Arc::new(NullLog::new()))
    }

    fn both(&self, op: impl Fn(&dyn Log) -> Result<()>) -> Result<()> {
        let first = op(self.first.as_ref());
        let second = op(self.second.as_ref());
        first.and(second)
    }
}

/// Run `body` once and deliver what it wrote to both handles.
fn fan_out(
    a: &mut dyn ArtifactFile,
    b: &mut dyn ArtifactFile,
    body: ArtifactBody<'_>,
) -> Result<()> {
    if a.is_discard() {
        return body(b);
    }
    if b.is_discard() {
        return body(a);
    }
    if a.supports_read_back() {
        body(a)?;
        let data = a.read_back()?;
        b.write_all(&data)?;
    } else if b.supports_read_back() {
        body(b)?;
        let data = b.read_back()?;
        a.write_all(&data)?;
    } else {
        let mut spool = SpooledFile::spooled();
        body(&mut spool)?;
        let data = spool.read_back()?;
        a.write_all(&data)?;
        b.write_all(&data)?;
    }
    Ok(())
}

impl Log for TeeLog {
    fn push_context(&self, title: &str) -> Result<()> {
        self.both(|log| log.push_context(title))
    }

    fn pop_context(&self) -> Result<()> {
        self.both(|log| log.pop_context())
    }

    fn recontext(&self, title: &str) -> Result<()> {
        self.both(|log| log.recontext(title))
    }

    fn write(&self, message: &Message, level: Level) -> Result<()> {
        self.both(|log| log.write(message, level))
    }

    fn open(&self, spec: &ArtifactSpec, level: Level, body: ArtifactBody<'_>) -> Result<()> {
        let second = &self.second;
        self.first.open(spec, level, &mut |a: &mut dyn ArtifactFile| {
            second.open(spec, level, &mut |b: &mut dyn ArtifactFile| {
                fan_out(&mut *a, b, &mut *body)
            })
        })
    }

    fn flush(&self) -> Result<()> {
        self.both(|log| log.flush())
    }

    fn name(&self) -> &str {
        "tee"
    }
}
