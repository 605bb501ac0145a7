//! Backend that discards everything

use crate::core::{
    discard_open, ArtifactBody, ArtifactSpec, ContextDepth, Level, Log, Message, Result,
};

/// Drops every context change, message and artifact.
///
/// Artifact bodies still run, against a handle that discards what they write,
/// so producers never need to check whether logging is enabled. Only the
/// context depth is kept, to reject a pop or recontext with nothing open.
#[derive(Debug, Default)]
pub struct NullLog {
    depth: ContextDepth,
}

impl NullLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Log for NullLog {
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

    fn write(&self, _message: &Message, _level: Level) -> Result<()> {
        Ok(())
    }

    fn open(&self, _spec: &ArtifactSpec, _level: Level, body: ArtifactBody<'_>) -> Result<()> {
        discard_open(body)
    }

    fn name(&self) -> &str {
        "null"
    }
}
