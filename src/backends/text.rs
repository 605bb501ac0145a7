//! Plain text backend

use crate::core::{ContextStack, Level, Log, Message, Result, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;
use parking_lot::Mutex;
use std::io::{self, Write};

struct TextState<W> {
    stack: ContextStack,
    writer: W,
}

/// Writes one line per message, prefixed with the open context titles.
///
/// ```text
/// hello
/// ctx > a
/// ctx > out.bin [3 bytes]
/// ```
///
/// Artifacts are reported by name and size; their content is not printed.
/// Multi-line messages are written as given.
pub struct TextLog<W: Write + Send = io::Stdout> {
    state: Mutex<TextState<W>>,
    timestamp_format: Option<TimestampFormat>,
    #[cfg(feature = "console")]
    use_colors: bool,
}

impl TextLog<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl TextLog<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> TextLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            state: Mutex::new(TextState {
                stack: ContextStack::new(),
                writer,
            }),
            timestamp_format: None,
            #[cfg(feature = "console")]
            use_colors: false,
        }
    }

    /// Colour each line by its level.
    #[cfg(feature = "console")]
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Prefix each line with `[timestamp] `.
    ///
    /// # Examples
    ///
    /// ```
    /// use treelog::{TextLog, TimestampFormat};
    ///
    /// let log = TextLog::stderr().with_timestamp_format(TimestampFormat::Rfc3339);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = Some(format);
        self
    }

    /// Run `f` with exclusive access to the underlying writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.state.lock().writer)
    }

    pub fn into_inner(self) -> W {
        self.state.into_inner().writer
    }

    fn format_line(
        &self,
        stack: &ContextStack,
        message: &Message,
        level: Level,
    ) -> Result<String> {
        let mut line = stack.render(message);
        #[cfg(feature = "console")]
        if self.use_colors {
            if let Some(color) = level.color_code() {
                line = line.color(color).to_string();
            }
        }
        #[cfg(not(feature = "console"))]
        let _ = level;
        if let Some(format) = &self.timestamp_format {
            line = format!("[{}] {}", format.now()?, line);
        }
        line.push('\n');
        Ok(line)
    }
}

impl<W: Write + Send> Log for TextLog<W> {
    fn push_context(&self, title: &str) -> Result<()> {
        self.state.lock().stack.push(title);
        Ok(())
    }

    fn pop_context(&self) -> Result<()> {
        self.state.lock().stack.pop()?;
        Ok(())
    }

    fn recontext(&self, title: &str) -> Result<()> {
        self.state.lock().stack.recontext(title)
    }

    fn write(&self, message: &Message, level: Level) -> Result<()> {
        let mut state = self.state.lock();
        let line = self.format_line(&state.stack, message, level)?;
        state.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.state.lock().writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "text"
    }
}
