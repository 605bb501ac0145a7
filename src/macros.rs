//! Formatting macros that write to the current backend.
//!
//! Each macro formats its arguments like `format!` and returns the
//! [`Result`](crate::Result) of the write.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use treelog::{info, warning, RecordLog};
//!
//! let record = Arc::new(RecordLog::new(false));
//! let _scope = treelog::set(record.clone());
//!
//! info!("Server started").unwrap();
//! let port = 8080;
//! warning!("Port {} already in use", port).unwrap();
//! assert_eq!(record.trace().len(), 2);
//! ```

/// Write a formatted message at the given level.
///
/// # Examples
///
/// ```
/// use treelog::{log, Level};
/// # let _scope = treelog::disable();
/// log!(Level::Info, "Simple message").unwrap();
/// log!(Level::Error, "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        $crate::write($level, format!($($arg)+))
    };
}

/// Write a formatted debug-level message.
///
/// # Examples
///
/// ```
/// use treelog::debug;
/// # let _scope = treelog::disable();
/// debug!("Counter value: {}", 10).unwrap();
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Debug, $($arg)+)
    };
}

/// Write a formatted info-level message.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Info, $($arg)+)
    };
}

/// Write a formatted message meant for the end user.
///
/// # Examples
///
/// ```
/// use treelog::user;
/// # let _scope = treelog::disable();
/// user!("Processed {} of {} files", 3, 5).unwrap();
/// ```
#[macro_export]
macro_rules! user {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::User, $($arg)+)
    };
}

/// Write a formatted warning-level message.
#[macro_export]
macro_rules! warning {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Warning, $($arg)+)
    };
}

/// Write a formatted error-level message.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Error, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::backends::{Event, RecordLog};
    use crate::core::{set, Level, Message};
    use std::sync::Arc;

    fn written(record: &RecordLog) -> Vec<(String, Level)> {
        record
            .trace()
            .events()
            .iter()
            .filter_map(|event| match event {
                Event::Write(Message::Text(text), level) => Some((text.clone(), *level)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_level_macros() {
        let record = Arc::new(RecordLog::new(false));
        let _scope = set(record.clone());
        debug!("d {}", 1).unwrap();
        info!("i").unwrap();
        user!("u {}-{}", 2, 3).unwrap();
        warning!("w").unwrap();
        error!("e {:>3}", 4).unwrap();
        assert_eq!(
            written(&record),
            [
                ("d 1".to_string(), Level::Debug),
                ("i".to_string(), Level::Info),
                ("u 2-3".to_string(), Level::User),
                ("w".to_string(), Level::Warning),
                ("e   4".to_string(), Level::Error),
            ]
        );
    }

    #[test]
    fn test_log_macro() {
        let record = Arc::new(RecordLog::new(false));
        let _scope = set(record.clone());
        let level = Level::Warning;
        log!(level, "value: {}", 42).unwrap();
        assert_eq!(written(&record), [("value: 42".to_string(), level)]);
    }
}
