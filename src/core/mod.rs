//! Core tree logging types and traits

pub mod artifact;
pub mod builder;
pub mod context;
pub mod error;
pub mod level;
pub mod log;
pub mod message;
pub mod metrics;
pub mod naming;
pub mod state;
pub mod timestamp;

pub use artifact::{
    ArtifactBody, ArtifactFile, DiscardFile, ReadBackFile, SpooledFile, WriteOnlyFile, SPOOL_LIMIT,
};
pub use builder::LogBuilder;
pub use context::{ContextDepth, ContextGuard, ContextStack, PATH_SEPARATOR};
pub use error::{Result, TreeLogError};
pub use level::Level;
pub use log::{buffered_open, discard_open, Log};
pub use message::{ArtifactSpec, Data, FileMode, Message};
pub use metrics::{metrics, LogMetrics};
pub use naming::{split_extension, ArtifactDir, NameSequence, MAX_NAME_ATTEMPTS};
pub use state::{
    add, context, current, data, data_with_type, debug, debug_data, debug_file, disable, error,
    error_data, error_file, file, info, info_data, info_file, open_file, set, user, user_data,
    user_file, warning, warning_data, warning_file, with_context, with_log, write, LogScope,
};
pub use timestamp::TimestampFormat;
