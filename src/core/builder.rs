//! Fluent composition of backend stacks

use super::{error::Result, level::Level, log::Log};
use crate::backends::{DataLog, FilterLog, RecordLog, TeeLog, TextLog};
use std::path::PathBuf;
use std::sync::Arc;

enum Sink {
    Stdout,
    Stderr,
    DataDir(PathBuf),
    Record(Arc<RecordLog>),
    Backend(Arc<dyn Log>),
}

/// Builds a backend from a list of sinks and optional level bounds.
///
/// Sinks are combined in the order they were added: one sink is used as is,
/// several are tee'd, none gives a null backend. A level bound wraps the
/// result in a [`FilterLog`].
///
/// # Example
///
/// ```
/// use treelog::{Level, LogBuilder};
///
/// let builder = LogBuilder::new().stderr().record(true).min_level(Level::Info);
/// let recorder = builder.recorder().unwrap();
/// let log = builder.build().unwrap();
///
/// treelog::with_log(log, || treelog::info("hello").unwrap());
/// assert_eq!(recorder.trace().len(), 1);
/// ```
#[derive(Default)]
pub struct LogBuilder {
    sinks: Vec<Sink>,
    min_level: Option<Level>,
    max_level: Option<Level>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain text sink on stdout
    #[must_use = "builder methods return a new value"]
    pub fn stdout(mut self) -> Self {
        self.sinks.push(Sink::Stdout);
        self
    }

    /// Add a plain text sink on stderr
    #[must_use = "builder methods return a new value"]
    pub fn stderr(mut self) -> Self {
        self.sinks.push(Sink::Stderr);
        self
    }

    /// Persist artifacts into `path`; the directory is opened by [`build`](Self::build).
    #[must_use = "builder methods return a new value"]
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sinks.push(Sink::DataDir(path.into()));
        self
    }

    /// Add a recorder; fetch it with [`recorder`](Self::recorder) before building.
    #[must_use = "builder methods return a new value"]
    pub fn record(mut self, simplify: bool) -> Self {
        self.sinks
            .push(Sink::Record(Arc::new(RecordLog::new(simplify))));
        self
    }

    /// Add an already constructed backend
    #[must_use = "builder methods return a new value"]
    pub fn backend(mut self, log: Arc<dyn Log>) -> Self {
        self.sinks.push(Sink::Backend(log));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_level(mut self, level: Level) -> Self {
        self.max_level = Some(level);
        self
    }

    /// The most recently added recorder, if any.
    pub fn recorder(&self) -> Option<Arc<RecordLog>> {
        self.sinks.iter().rev().find_map(|sink| match sink {
            Sink::Record(record) => Some(record.clone()),
            _ => None,
        })
    }

    pub fn build(self) -> Result<Arc<dyn Log>> {
        let mut logs: Vec<Arc<dyn Log>> = Vec::with_capacity(self.sinks.len());
        for sink in self.sinks {
            let log: Arc<dyn Log> = match sink {
                Sink::Stdout => Arc::new(TextLog::stdout()),
                Sink::Stderr => Arc::new(TextLog::stderr()),
                Sink::DataDir(path) => Arc::new(DataLog::new(path)?),
                Sink::Record(record) => record,
                Sink::Backend(log) => log,
            };
            logs.push(log);
        }
        let log = TeeLog::chain(logs);

        if self.min_level.is_none() && self.max_level.is_none() {
            return Ok(log);
        }
        let mut filter = FilterLog::new(log);
        if let Some(level) = self.min_level {
            filter = filter.with_min_level(level);
        }
        if let Some(level) = self.max_level {
            filter = filter.with_max_level(level);
        }
        Ok(Arc::new(filter))
    }
}
