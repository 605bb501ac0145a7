//! Level-gating decorator

use crate::core::{discard_open, ArtifactBody, ArtifactSpec, Level, Log, Message, Result};
use std::sync::Arc;

/// Forwards to an inner backend, suppressing messages outside a level range.
///
/// Context operations always pass through, so filtering never changes the
/// nesting the inner backend sees. A filtered artifact still opens its context
/// while the body runs, so messages logged from inside keep the `name >`
/// segment; only the artifact itself is discarded. Both bounds are inclusive; an absent bound
/// does not constrain that side.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use treelog::{FilterLog, Level, NullLog};
///
/// let filter = FilterLog::new(Arc::new(NullLog::new()))
///     .with_min_level(Level::Info)
///     .with_max_level(Level::Warning);
/// assert!(filter.passes(Level::User));
/// assert!(!filter.passes(Level::Error));
/// ```
pub struct FilterLog {
    inner: Arc<dyn Log>,
    min_level: Option<Level>,
    max_level: Option<Level>,
}

impl FilterLog {
    pub fn new(inner: Arc<dyn Log>) -> Self {
        Self {
            inner,
            min_level: None,
            max_level: None,
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }

    #[must_use]
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = Some(level);
        self
    }

    pub fn min_level(&self) -> Option<Level> {
        self.min_level
    }

    pub fn max_level(&self) -> Option<Level> {
        self.max_level
    }

    /// True if messages at `level` reach the inner backend.
    pub fn passes(&self, level: Level) -> bool {
        self.min_level.map_or(true, |min| level >= min)
            && self.max_level.map_or(true, |max| level <= max)
    }
}

impl Log for FilterLog {
    fn push_context(&self, title: &str) -> Result<()> {
        self.inner.push_context(title)
    }

    fn pop_context(&self) -> Result<()> {
        self.inner.pop_context()
    }

    fn recontext(&self, title: &str) -> Result<()> {
        self.inner.recontext(title)
    }

    fn write(&self, message: &Message, level: Level) -> Result<()> {
        if self.passes(level) {
            self.inner.write(message, level)
        } else {
            Ok(())
        }
    }

    fn open(&self, spec: &ArtifactSpec, level: Level, body: ArtifactBody<'_>) -> Result<()> {
        if self.passes(level) {
            self.inner.open(spec, level, body)
        } else {
            self.inner.push_context(&spec.name)?;
            let result = discard_open(body);
            let popped = self.inner.pop_context();
            result.and(popped)
        }
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        "filter"
    }
}
