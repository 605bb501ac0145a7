//! # treelog
//!
//! Hierarchical logging: messages and named data artifacts are written inside
//! nested contexts (`solve > iteration 3 > residual`), and a pluggable backend
//! decides what the tree turns into.
//!
//! ## Features
//!
//! - **Contexts**: push, pop and retitle a stack of titles, with guards and
//!   iterator adapters that always pop
//! - **Artifacts**: stream binary or text payloads once, deliver them to every
//!   sink byte for byte
//! - **Backends**: text, directory of files, `tracing` bridge, null, level
//!   filter, tee and recorder
//! - **Record and replay**: capture a run as a plain trace, save it, and
//!   replay it later into any backend
//!
//! ## Example
//!
//! ```
//! use std::io::Write;
//! use std::sync::Arc;
//! use treelog::{RecordLog, TextLog};
//!
//! let record = Arc::new(RecordLog::new(true));
//! treelog::with_log(record.clone(), || -> treelog::Result<()> {
//!     let _ctx = treelog::context("my context")?;
//!     treelog::info("hello")?;
//!     treelog::info_file("test.dat", "wb", |f| {
//!         f.write_all(b"12345")?;
//!         Ok(())
//!     })
//! })
//! .unwrap();
//!
//! let text = TextLog::new(Vec::new());
//! record.trace().replay(&text).unwrap();
//! assert_eq!(
//!     String::from_utf8(text.into_inner()).unwrap(),
//!     "my context > hello\nmy context > test.dat [5 bytes]\n"
//! );
//! ```
//!
//! ## Threads
//!
//! The current backend is tracked per thread. Backends are `Send + Sync` and
//! may be shared, but operations from several threads on one backend
//! interleave in whatever order the callers produce them.

pub mod backends;
pub mod core;
pub mod iter;
pub mod macros;

pub mod prelude {
    pub use crate::backends::{DataLog, FilterLog, NullLog, RecordLog, TeeLog, TextLog, Trace};
    pub use crate::core::{
        ArtifactFile, ArtifactSpec, ContextGuard, Data, FileMode, Level, Log, LogBuilder,
        LogScope, Message, Result, TreeLogError,
    };
    pub use crate::iter::{ContextIter, ContextIterExt};
}

pub use backends::{
    record, DataLog, Event, FilterLog, NullLog, RecordLog, TeeLog, TextLog, Trace, TracingLog,
};
pub use core::{
    add, buffered_open, context, current, data, data_with_type, debug, debug_data, debug_file,
    disable, discard_open, error, error_data, error_file, file, info, info_data, info_file,
    metrics, open_file, set, user, user_data, user_file, warning, warning_data, warning_file,
    with_context, with_log, write, ArtifactBody, ArtifactFile, ArtifactSpec, ContextDepth,
    ContextGuard, ContextStack, Data, DiscardFile, FileMode, Level, Log, LogBuilder, LogMetrics,
    LogScope, Message, ReadBackFile, Result, SpooledFile, TimestampFormat, TreeLogError,
    WriteOnlyFile,
};
pub use iter::{ContextIter, ContextIterExt};
