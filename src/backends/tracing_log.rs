//! Bridge into the `tracing` ecosystem

use crate::core::{ContextStack, Level, Log, Message, Result};
use parking_lot::Mutex;

/// Target attached to every event this backend emits
pub const TRACING_TARGET: &str = "treelog";

/// Forwards messages as `tracing` events carrying the context path.
///
/// Levels map as debug to `DEBUG`, info and user to `INFO`, warning to `WARN`
/// and error to `ERROR`. Artifacts are reported by their summary line.
#[derive(Debug, Default)]
pub struct TracingLog {
    stack: Mutex<ContextStack>,
}

impl TracingLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Log for TracingLog {
    fn push_context(&self, title: &str) -> Result<()> {
        self.stack.lock().push(title);
        Ok(())
    }

    fn pop_context(&self) -> Result<()> {
        self.stack.lock().pop()?;
        Ok(())
    }

    fn recontext(&self, title: &str) -> Result<()> {
        self.stack.lock().recontext(title)
    }

    fn write(&self, message: &Message, level: Level) -> Result<()> {
        let path = self.stack.lock().path();
        match level {
            Level::Debug => tracing::debug!(target: TRACING_TARGET, path = %path, "{}", message),
            Level::Info | Level::User => {
                tracing::info!(target: TRACING_TARGET, path = %path, "{}", message)
            }
            Level::Warning => tracing::warn!(target: TRACING_TARGET, path = %path, "{}", message),
            Level::Error => tracing::error!(target: TRACING_TARGET, path = %path, "{}", message),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
