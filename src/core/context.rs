//! Context bookkeeping
//!
//! This module provides:
//! - `ContextStack`: the list of open titles a rendering backend keeps
//! - `ContextDepth`: a bare counter for backends that never render titles
//! - `ContextGuard`: RAII guard that pops its context on every exit path

use super::error::{Result, TreeLogError};
use super::log::Log;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Separator between titles in a rendered context path
pub const PATH_SEPARATOR: &str = " > ";

/// Ordered stack of open context titles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStack {
    titles: Vec<String>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self { titles: Vec::new() }
    }

    pub fn push(&mut self, title: &str) {
        self.titles.push(title.to_string());
    }

    pub fn pop(&mut self) -> Result<String> {
        self.titles
            .pop()
            .ok_or_else(|| TreeLogError::empty_stack("popcontext"))
    }

    pub fn recontext(&mut self, title: &str) -> Result<()> {
        let last = self
            .titles
            .last_mut()
            .ok_or_else(|| TreeLogError::empty_stack("recontext"))?;
        title.clone_into(last);
        Ok(())
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn depth(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Titles joined by `" > "`
    pub fn path(&self) -> String {
        self.titles.join(PATH_SEPARATOR)
    }

    /// The current path followed by `message`, as text backends print it
    pub fn render(&self, message: &impl fmt::Display) -> String {
        let mut line = String::new();
        for title in &self.titles {
            line.push_str(title);
            line.push_str(PATH_SEPARATOR);
        }
        line.push_str(&message.to_string());
        line
    }
}

impl fmt::Display for ContextStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Number of open contexts, for backends that only need to reject misuse.
#[derive(Debug, Default)]
pub struct ContextDepth(AtomicUsize);

impl ContextDepth {
    pub const fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    pub fn push(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pop(&self) -> Result<()> {
        self.0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |depth| {
                depth.checked_sub(1)
            })
            .map(|_| ())
            .map_err(|_| TreeLogError::empty_stack("popcontext"))
    }

    /// Fails unless a context is open.
    pub fn recontext(&self) -> Result<()> {
        if self.get() == 0 {
            return Err(TreeLogError::empty_stack("recontext"));
        }
        Ok(())
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Open context on a log, popped when the guard goes away.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use treelog::{ContextGuard, RecordLog, Log};
///
/// let record = Arc::new(RecordLog::new(false));
/// {
///     let step = ContextGuard::enter(record.clone(), "step 0").unwrap();
///     step.recontext("step 1").unwrap();
/// }
/// assert_eq!(record.trace().len(), 3);
/// ```
pub struct ContextGuard {
    log: Arc<dyn Log>,
    open: bool,
}

impl ContextGuard {
    /// Push `title` on `log` and return the guard that pops it.
    pub fn enter(log: Arc<dyn Log>, title: &str) -> Result<Self> {
        log.push_context(title)?;
        Ok(Self { log, open: true })
    }

    /// Retitle the context this guard holds.
    pub fn recontext(&self, title: &str) -> Result<()> {
        self.log.recontext(title)
    }

    /// The log this context was opened on.
    pub fn log(&self) -> &Arc<dyn Log> {
        &self.log
    }

    /// Pop now and surface any error instead of reporting it from `drop`.
    pub fn close(mut self) -> Result<()> {
        self.open = false;
        self.log.pop_context()
    }
}

impl fmt::Debug for ContextGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextGuard")
            .field("log", &self.log.name())
            .field("open", &self.open)
            .finish()
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.log.pop_context() {
                tracing::warn!(backend = self.log.name(), error = %e, "failed to pop context on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_path() {
        let mut stack = ContextStack::new();
        assert_eq!(stack.path(), "");
        stack.push("solve");
        stack.push("iteration 3");
        assert_eq!(stack.path(), "solve > iteration 3");
        assert_eq!(stack.render(&"residual"), "solve > iteration 3 > residual");
    }

    #[test]
    fn test_stack_recontext_keeps_depth() {
        let mut stack = ContextStack::new();
        stack.push("loop 1");
        stack.recontext("loop 2").unwrap();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.path(), "loop 2");
        assert_eq!(stack.pop().unwrap(), "loop 2");
    }

    #[test]
    fn test_stack_empty_titles_are_valid() {
        let mut stack = ContextStack::new();
        stack.push("");
        assert_eq!(stack.render(&"x"), " > x");
    }

    #[test]
    fn test_stack_misuse() {
        let mut stack = ContextStack::new();
        assert!(stack.pop().unwrap_err().is_structural());
        assert!(stack.recontext("x").unwrap_err().is_structural());
    }

    #[test]
    fn test_depth_counter() {
        let depth = ContextDepth::new();
        assert!(depth.pop().unwrap_err().is_structural());
        assert!(depth.recontext().unwrap_err().is_structural());
        depth.push();
        depth.push();
        depth.recontext().unwrap();
        depth.pop().unwrap();
        assert_eq!(depth.get(), 1);
        depth.pop().unwrap();
        assert!(depth.pop().is_err());
        assert_eq!(depth.get(), 0);
    }
}
