//! The capability surface every backend implements

use super::{
    artifact::{ArtifactBody, ArtifactFile, SpooledFile},
    error::Result,
    level::Level,
    message::{ArtifactSpec, Message},
};

/// A tree-structured log sink.
///
/// Context operations are structural: every `push_context` is matched by
/// exactly one `pop_context`, and `recontext` swaps the innermost title in a
/// single step. Popping or recontexting with no open context fails with
/// [`TreeLogError::EmptyContextStack`](super::TreeLogError::EmptyContextStack).
/// Titles and messages may be any string, including empty or multi-line.
///
/// Methods take `&self` so that code running inside [`Log::open`] may log to
/// the same backend. A backend shared between threads is only as ordered as
/// the callers make it; no operation here synchronizes a sequence of calls.
pub trait Log: Send + Sync {
    fn push_context(&self, title: &str) -> Result<()>;

    fn pop_context(&self) -> Result<()>;

    fn recontext(&self, title: &str) -> Result<()>;

    fn write(&self, message: &Message, level: Level) -> Result<()>;

    /// Publish an artifact whose content `body` writes into the given handle.
    ///
    /// Once `body` returns, the backend emits the equivalent of writing the
    /// artifact as a data message at `level`. The default buffers the content,
    /// keeps a context named after the artifact open while `body` runs, and
    /// then calls [`Log::write`] with the captured bytes.
    fn open(&self, spec: &ArtifactSpec, level: Level, body: ArtifactBody<'_>) -> Result<()> {
        buffered_open(self, spec, level, body)
    }

    /// Finalize any open resources.
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Default artifact handling: spool, pop, then write a data message.
pub fn buffered_open<L: Log + ?Sized>(
    log: &L,
    spec: &ArtifactSpec,
    level: Level,
    body: ArtifactBody<'_>,
) -> Result<()> {
    log.push_context(&spec.name)?;
    let mut file = SpooledFile::spooled();
    let captured = body(&mut file).and_then(|()| Ok(file.read_back()?));
    let popped = log.pop_context();
    let payload = captured?;
    popped?;
    log.write(&Message::Data(spec.to_data(payload)), level)
}

/// Run `body` against a handle that throws everything away.
pub fn discard_open(body: ArtifactBody<'_>) -> Result<()> {
    let mut sink = super::artifact::DiscardFile;
    body(&mut sink as &mut dyn ArtifactFile)
}
