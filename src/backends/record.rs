//! Recording backend and trace replay
//!
//! [`RecordLog`] captures operations as a [`Trace`] instead of rendering them.
//! A trace is plain data: it can be cloned, saved to disk, loaded in another
//! process and replayed into any backend with [`Trace::replay`].

use crate::core::{current, metrics, with_log, Level, Log, Message, Result, TreeLogError};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

/// One captured operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    Push(String),
    Recontext(String),
    Pop,
    Write(Message, Level),
}

/// Ordered list of captured operations.
///
/// Artifacts appear as `Write` events carrying the full payload, so a trace
/// never refers to files or handles outside itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    events: Vec<Event>,
}

impl Trace {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Re-issue every event against `target`, in order.
    ///
    /// Artifacts are re-materialized as data writes, which every backend
    /// persists or renders like a freshly opened artifact. The first error
    /// from `target` stops the replay.
    pub fn replay(&self, target: &dyn Log) -> Result<()> {
        for event in &self.events {
            match event {
                Event::Push(title) => target.push_context(title)?,
                Event::Recontext(title) => target.recontext(title)?,
                Event::Pop => target.pop_context()?,
                Event::Write(message, level) => target.write(message, *level)?,
            }
            metrics().record_replayed(1);
        }
        Ok(())
    }

    /// Replay into the backend that is current on this thread.
    pub fn replay_current(&self) -> Result<()> {
        self.replay(current().as_ref())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TreeLogError::malformed_trace(e.to_string()))
    }

    /// Write the trace as JSON, gzip-compressed if `path` ends in `.gz`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            TreeLogError::io_operation(
                "saving trace",
                format!("Failed to create {}", path.display()),
                e,
            )
        })?;
        let writer = BufWriter::new(file);
        if is_gzip(path) {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            serde_json::to_writer(&mut encoder, self)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = writer;
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Read a trace written by [`Trace::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            TreeLogError::io_operation(
                "loading trace",
                format!("Failed to open {}", path.display()),
                e,
            )
        })?;
        let mut reader: Box<dyn Read> = if is_gzip(path) {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        let mut json = Vec::new();
        reader.read_to_end(&mut json).map_err(|e| {
            TreeLogError::io_operation(
                "loading trace",
                format!("Failed to read {}", path.display()),
                e,
            )
        })?;
        serde_json::from_slice(&json).map_err(|e| TreeLogError::malformed_trace(e.to_string()))
    }
}

impl From<Vec<Event>> for Trace {
    fn from(events: Vec<Event>) -> Self {
        Self::new(events)
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

#[derive(Debug, Default)]
struct RecordState {
    events: Vec<Event>,
    depth: usize,
}

impl RecordState {
    fn push(&mut self, title: &str, simplify: bool) {
        self.depth += 1;
        if simplify && matches!(self.events.last(), Some(Event::Pop)) {
            self.events.pop();
            self.events.push(Event::Recontext(title.to_string()));
        } else {
            self.events.push(Event::Push(title.to_string()));
        }
    }

    fn recontext(&mut self, title: &str, simplify: bool) -> Result<()> {
        if self.depth == 0 {
            return Err(TreeLogError::empty_stack("recontext"));
        }
        match self.events.last_mut() {
            Some(Event::Push(last) | Event::Recontext(last)) if simplify => {
                title.clone_into(last);
            }
            _ => self.events.push(Event::Recontext(title.to_string())),
        }
        Ok(())
    }

    fn pop(&mut self, simplify: bool) -> Result<()> {
        if self.depth == 0 {
            return Err(TreeLogError::empty_stack("popcontext"));
        }
        self.depth -= 1;
        if simplify {
            match self.events.last() {
                Some(Event::Push(_)) => {
                    self.events.pop();
                    return Ok(());
                }
                Some(Event::Recontext(_)) => {
                    self.events.pop();
                }
                _ => {}
            }
        }
        self.events.push(Event::Pop);
        Ok(())
    }
}

/// Captures operations into a [`Trace`].
///
/// With `simplify` set, the trace is compressed as it grows: a pop followed by
/// a push becomes a single recontext, a recontext directly after a push or
/// recontext replaces its title, and a context closed with nothing inside
/// leaves no events at all. Rendered output is the same either way for traces
/// without empty contexts.
///
/// # Example
///
/// ```
/// use treelog::{Log, RecordLog};
///
/// let record = RecordLog::new(true);
/// record.push_context("loop").unwrap();
/// record.recontext("loop 1").unwrap();
/// record.pop_context().unwrap();
/// assert!(record.trace().is_empty());
/// ```
#[derive(Debug)]
pub struct RecordLog {
    simplify: bool,
    state: Mutex<RecordState>,
}

impl RecordLog {
    pub fn new(simplify: bool) -> Self {
        Self {
            simplify,
            state: Mutex::new(RecordState::default()),
        }
    }

    pub fn simplify(&self) -> bool {
        self.simplify
    }

    /// Snapshot of everything captured so far.
    pub fn trace(&self) -> Trace {
        Trace::new(self.state.lock().events.clone())
    }

    /// Take the captured trace, leaving the recorder empty.
    ///
    /// The open-context depth is kept, so a recorder drained halfway through
    /// a context still accepts the matching pop.
    pub fn take_trace(&self) -> Trace {
        Trace::new(std::mem::take(&mut self.state.lock().events))
    }

    /// Number of contexts currently open.
    pub fn depth(&self) -> usize {
        self.state.lock().depth
    }
}

impl Default for RecordLog {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Log for RecordLog {
    fn push_context(&self, title: &str) -> Result<()> {
        self.state.lock().push(title, self.simplify);
        Ok(())
    }

    fn pop_context(&self) -> Result<()> {
        self.state.lock().pop(self.simplify)
    }

    fn recontext(&self, title: &str) -> Result<()> {
        self.state.lock().recontext(title, self.simplify)
    }

    fn write(&self, message: &Message, level: Level) -> Result<()> {
        self.state
            .lock()
            .events
            .push(Event::Write(message.clone(), level));
        Ok(())
    }

    fn name(&self) -> &str {
        "record"
    }
}

/// Record everything `f` logs into a trace, with `simplify` as given.
pub fn record<R>(simplify: bool, f: impl FnOnce() -> R) -> (R, Trace) {
    let recorder = Arc::new(RecordLog::new(simplify));
    let result = with_log(recorder.clone(), f);
    (result, recorder.take_trace())
}
