//! Backend implementations

pub mod data;
pub mod filter;
pub mod null;
pub mod record;
pub mod tee;
pub mod text;
pub mod tracing_log;

pub use data::{DataLog, NAME_CACHE_SIZE};
pub use filter::FilterLog;
pub use null::NullLog;
pub use record::{record, Event, RecordLog, Trace};
pub use tee::TeeLog;
pub use text::TextLog;
pub use tracing_log::{TracingLog, TRACING_TARGET};

// Re-export the trait for convenience
pub use crate::core::Log;
