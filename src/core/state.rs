//! The current backend and the functions that log to it
//!
//! Every thread has its own stack of backends. [`set`] pushes one and returns
//! a [`LogScope`] that restores the previous backend when dropped, so nested
//! scopes unwind in LIFO order, panics included. With nothing set, logging
//! goes to stdout filtered at [`Level::Info`].

use super::{
    artifact::ModeCheck,
    context::ContextGuard,
    error::{Result, TreeLogError},
    level::Level,
    log::Log,
    message::{ArtifactSpec, Data, Message},
};
use crate::backends::{FilterLog, NullLog, TeeLog, TextLog};
use std::cell::RefCell;
use std::io::Write;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

thread_local! {
    static STACK: RefCell<Vec<Arc<dyn Log>>> = const { RefCell::new(Vec::new()) };
}

static DEFAULT: OnceLock<Arc<dyn Log>> = OnceLock::new();

fn default_log() -> Arc<dyn Log> {
    DEFAULT
        .get_or_init(|| {
            Arc::new(FilterLog::new(Arc::new(TextLog::stdout())).with_min_level(Level::Info))
        })
        .clone()
}

/// The backend that logging on this thread currently goes to.
pub fn current() -> Arc<dyn Log> {
    STACK
        .with(|stack| stack.borrow().last().cloned())
        .unwrap_or_else(default_log)
}

/// Restores the previously current backend when dropped.
#[must_use = "the previous backend is restored as soon as the scope is dropped"]
pub struct LogScope {
    depth: usize,
    log: Arc<dyn Log>,
    // scopes belong to the thread whose stack they modified
    _not_send: PhantomData<*const ()>,
}

impl LogScope {
    /// The backend this scope installed.
    pub fn log(&self) -> &Arc<dyn Log> {
        &self.log
    }
}

impl std::fmt::Debug for LogScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogScope")
            .field("depth", &self.depth)
            .field("log", &self.log.name())
            .finish()
    }
}

impl Drop for LogScope {
    fn drop(&mut self) {
        let _ = STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.len() > self.depth {
                stack.truncate(self.depth);
            }
        });
    }
}

/// Make `log` current until the returned scope is dropped.
pub fn set(log: Arc<dyn Log>) -> LogScope {
    let depth = STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push(log.clone());
        stack.len() - 1
    });
    LogScope {
        depth,
        log,
        _not_send: PhantomData,
    }
}

/// Tee `log` onto the current backend until the scope is dropped.
pub fn add(log: Arc<dyn Log>) -> LogScope {
    set(Arc::new(TeeLog::new(current(), log)))
}

/// Discard all logging until the scope is dropped.
pub fn disable() -> LogScope {
    set(Arc::new(NullLog::new()))
}

/// Run `f` with `log` current.
pub fn with_log<R>(log: Arc<dyn Log>, f: impl FnOnce() -> R) -> R {
    let _scope = set(log);
    f()
}

/// Open a context on the current backend, popped when the guard drops.
pub fn context(title: &str) -> Result<ContextGuard> {
    ContextGuard::enter(current(), title)
}

/// Run `f` inside a context titled `title`.
pub fn with_context<R>(title: &str, f: impl FnOnce() -> R) -> Result<R> {
    let guard = context(title)?;
    let result = f();
    guard.close()?;
    Ok(result)
}

/// Write `text` at `level` to the current backend.
pub fn write(level: Level, text: impl Into<String>) -> Result<()> {
    current().write(&Message::Text(text.into()), level)
}

/// Publish an in-memory artifact at `level`.
pub fn data(level: Level, name: &str, payload: impl Into<Vec<u8>>) -> Result<()> {
    current().write(&Message::Data(Data::new(name, payload)), level)
}

/// Like [`data`], tagging the artifact with a media type such as `image/png`.
pub fn data_with_type(
    level: Level,
    name: &str,
    payload: impl Into<Vec<u8>>,
    media_type: &str,
) -> Result<()> {
    let data = Data::new(name, payload).with_media_type(media_type);
    current().write(&Message::Data(data), level)
}

/// Publish an artifact whose content `body` streams into a handle.
///
/// Text-mode artifacts must be valid UTF-8 once `body` returns.
pub fn file<F>(level: Level, spec: &ArtifactSpec, body: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let log = current();
    let mut body = Some(body);
    log.open(spec, level, &mut |handle| {
        let body = body
            .take()
            .ok_or_else(|| TreeLogError::other("artifact body invoked twice"))?;
        let mut checked = ModeCheck::new(handle, spec.mode);
        body(&mut checked)?;
        checked.finish(&spec.name)
    })
}

/// Like [`file`], parsing `mode` (`"w"` or `"wb"`) before anything is opened.
pub fn open_file<F>(level: Level, name: &str, mode: &str, body: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let spec = ArtifactSpec::parse(name, mode)?;
    file(level, &spec, body)
}

macro_rules! level_functions {
    ($($level:ident => $text:ident, $data:ident, $file:ident;)*) => {$(
        #[doc = concat!("Write text at `", stringify!($text), "` level to the current backend.")]
        pub fn $text(text: impl Into<String>) -> Result<()> {
            write(Level::$level, text)
        }

        #[doc = concat!("Publish an in-memory artifact at `", stringify!($text), "` level.")]
        pub fn $data(name: &str, payload: impl Into<Vec<u8>>) -> Result<()> {
            data(Level::$level, name, payload)
        }

        #[doc = concat!("Publish a streamed artifact at `", stringify!($text), "` level.")]
        pub fn $file<F>(name: &str, mode: &str, body: F) -> Result<()>
        where
            F: FnOnce(&mut dyn Write) -> Result<()>,
        {
            open_file(Level::$level, name, mode, body)
        }
    )*};
}

level_functions! {
    Debug => debug, debug_data, debug_file;
    Info => info, info_data, info_file;
    User => user, user_data, user_file;
    Warning => warning, warning_data, warning_file;
    Error => error, error_data, error_file;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{Event, RecordLog};

    fn recorder() -> Arc<RecordLog> {
        Arc::new(RecordLog::new(false))
    }

    #[test]
    fn test_set_restores_in_lifo_order() {
        let outer = recorder();
        let inner = recorder();
        {
            let _a = set(outer.clone());
            info("one").unwrap();
            {
                let _b = set(inner.clone());
                info("two").unwrap();
            }
            info("three").unwrap();
        }
        assert_eq!(outer.trace().len(), 2);
        assert_eq!(inner.trace().len(), 1);
    }

    #[test]
    fn test_set_restores_after_panic() {
        let outer = recorder();
        let _a = set(outer.clone());
        let result = std::panic::catch_unwind(|| {
            let _b = set(Arc::new(NullLog::new()));
            panic!("boom");
        });
        assert!(result.is_err());
        info("after").unwrap();
        assert_eq!(outer.trace().len(), 1);
    }

    #[test]
    fn test_data_with_type() {
        let record = recorder();
        let _a = set(record.clone());
        data_with_type(Level::User, "plot.png", b"png".to_vec(), "image/png").unwrap();
        let events = record.trace().into_events();
        match &events[..] {
            [Event::Write(Message::Data(data), Level::User)] => {
                assert_eq!(data.media_type.as_deref(), Some("image/png"));
                assert_eq!(data.to_string(), "plot.png [image/png; 3 bytes]");
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_disable() {
        let record = recorder();
        let _a = set(record.clone());
        {
            let _off = disable();
            assert_eq!(current().name(), "null");
            error("hidden").unwrap();
        }
        assert!(record.trace().is_empty());
    }

    #[test]
    fn test_add_tees_onto_current() {
        let first = recorder();
        let second = recorder();
        let _a = set(first.clone());
        {
            let _b = add(second.clone());
            user("both").unwrap();
        }
        user("first only").unwrap();
        assert_eq!(first.trace().len(), 2);
        assert_eq!(second.trace().len(), 1);
    }

    #[test]
    fn test_context_guard_pops_on_drop() {
        let record = recorder();
        let _a = set(record.clone());
        {
            let ctx = context("step {}").unwrap();
            info("foo").unwrap();
            ctx.recontext("step 1").unwrap();
        }
        assert_eq!(
            record.trace().events(),
            &[
                Event::Push("step {}".into()),
                Event::Write(Message::from("foo"), Level::Info),
                Event::Recontext("step 1".into()),
                Event::Pop,
            ]
        );
    }

    #[test]
    fn test_file_rejects_bad_mode_before_io() {
        let record = recorder();
        let _a = set(record.clone());
        let err = info_file("x.dat", "rw", |_| Ok(())).unwrap_err();
        assert!(matches!(err, TreeLogError::InvalidMode { .. }));
        assert!(record.trace().is_empty());
    }

    #[test]
    fn test_file_text_mode_requires_utf8() {
        let record = recorder();
        let _a = set(record.clone());
        let err = info_file("x.txt", "w", |f| {
            f.write_all(&[0xff])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, TreeLogError::InvalidText { .. }));
        // the context opened for the artifact is still closed
        assert_eq!(record.trace().events().last(), Some(&Event::Pop));
    }

    #[test]
    fn test_with_context_returns_value() {
        let record = recorder();
        let _a = set(record.clone());
        let value = with_context("compute", || 42).unwrap();
        assert_eq!(value, 42);
        assert_eq!(record.trace().len(), 2);
    }
}
