//! Iterators that open a context per element
//!
//! Wrapping an iterator pushes a context when the first element is produced,
//! retitles it for every later element and pops it once the iterator is
//! exhausted. Titles number the element being processed from 1.
//!
//! ```
//! use std::sync::Arc;
//! use treelog::{ContextIterExt, RecordLog};
//!
//! let record = Arc::new(RecordLog::new(true));
//! treelog::with_log(record.clone(), || {
//!     for x in [1, 2, 3].into_iter().log_fraction("solving") {
//!         treelog::info(format!("x = {x}")).unwrap();
//!     }
//! });
//! assert_eq!(record.trace().len(), 7);
//! ```
//!
//! If the loop may stop early, keep the wrapper and close it explicitly, or
//! use [`ContextIter::scoped`]. A wrapper dropped with its context still open
//! pops it but reports the leak through `tracing` and [`LogMetrics`].
//!
//! [`LogMetrics`]: crate::LogMetrics

use crate::core::{current, metrics, Log, Result};
use std::fmt;
use std::sync::Arc;

/// Computes a title from the 1-based element index and the known length.
pub type TitleFn = Box<dyn FnMut(usize, Option<usize>) -> String>;

enum Titles {
    Plain(String),
    Fraction(String),
    Percentage(String),
    Custom(TitleFn),
}

impl Titles {
    fn title(&mut self, index: usize, length: Option<usize>) -> String {
        match self {
            Titles::Plain(title) => format!("{title} {index}"),
            Titles::Fraction(title) => match length {
                Some(length) => format!("{title} {index}/{length}"),
                None => format!("{title} {index}/?"),
            },
            Titles::Percentage(title) => match length {
                Some(length) if length > 0 => {
                    format!("{title} {}%", (100 * index + length / 2) / length)
                }
                _ => format!("{title} {index}"),
            },
            Titles::Custom(f) => f(index, length),
        }
    }
}

/// Iterator adapter holding one context open across its elements.
pub struct ContextIter<I> {
    inner: I,
    titles: Titles,
    length: Option<usize>,
    index: usize,
    log: Option<Arc<dyn Log>>,
    done: bool,
}

impl<I: Iterator> ContextIter<I> {
    fn with_titles(inner: I, titles: Titles) -> Self {
        let length = match inner.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        };
        Self {
            inner,
            titles,
            length,
            index: 0,
            log: None,
            done: false,
        }
    }

    /// Titles `"title 1"`, `"title 2"`, ...
    pub fn plain(inner: I, title: impl Into<String>) -> Self {
        Self::with_titles(inner, Titles::Plain(title.into()))
    }

    /// Titles `"title 1/N"`, or `"title 1/?"` when the length is unknown.
    pub fn fraction(inner: I, title: impl Into<String>) -> Self {
        Self::with_titles(inner, Titles::Fraction(title.into()))
    }

    /// Titles `"title 10%"`, rounded; plain numbering when the length is unknown.
    pub fn percentage(inner: I, title: impl Into<String>) -> Self {
        Self::with_titles(inner, Titles::Percentage(title.into()))
    }

    /// Titles computed by `f(index, length)`.
    pub fn titled(inner: I, f: impl FnMut(usize, Option<usize>) -> String + 'static) -> Self {
        Self::with_titles(inner, Titles::Custom(Box::new(f)))
    }

    /// Use `length` as the total instead of the inner size hint.
    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Whether a context is currently open.
    pub fn is_open(&self) -> bool {
        self.log.is_some()
    }

    /// Number of elements produced so far.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Stop iterating and pop the context if one is open.
    pub fn close(mut self) -> Result<()> {
        self.done = true;
        self.pop()
    }

    /// Run `f` with the iterator, then close it however `f` finished.
    ///
    /// A panic in `f` still pops the context, reported as a leak.
    pub fn scoped<R>(mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R> {
        let result = f(&mut self);
        self.close()?;
        Ok(result)
    }

    fn advance(&mut self) -> Result<()> {
        let title = self.titles.title(self.index, self.length);
        match &self.log {
            Some(log) => log.recontext(&title),
            None => {
                let log = current();
                log.push_context(&title)?;
                self.log = Some(log);
                Ok(())
            }
        }
    }

    fn pop(&mut self) -> Result<()> {
        match self.log.take() {
            Some(log) => log.pop_context(),
            None => Ok(()),
        }
    }
}

impl<I: Iterator> Iterator for ContextIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Some(item) => {
                self.index += 1;
                if let Err(e) = self.advance() {
                    tracing::warn!(index = self.index, error = %e, "failed to update iteration context");
                }
                Some(item)
            }
            None => {
                self.done = true;
                if let Err(e) = self.pop() {
                    tracing::warn!(error = %e, "failed to pop iteration context");
                }
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            self.inner.size_hint()
        }
    }
}

impl<I> Drop for ContextIter<I> {
    fn drop(&mut self) {
        if let Some(log) = self.log.take() {
            metrics().record_leak();
            tracing::warn!(
                backend = log.name(),
                position = self.index,
                "iteration context dropped while open; close it or use scoped()"
            );
            if let Err(e) = log.pop_context() {
                tracing::warn!(error = %e, "failed to pop leaked iteration context");
            }
        }
    }
}

impl<I> fmt::Debug for ContextIter<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextIter")
            .field("index", &self.index)
            .field("length", &self.length)
            .field("open", &self.log.is_some())
            .finish_non_exhaustive()
    }
}

/// Adapters for wrapping any iterator in a [`ContextIter`].
pub trait ContextIterExt: Iterator + Sized {
    fn log_iter(self, title: impl Into<String>) -> ContextIter<Self> {
        ContextIter::plain(self, title)
    }

    fn log_fraction(self, title: impl Into<String>) -> ContextIter<Self> {
        ContextIter::fraction(self, title)
    }

    fn log_percentage(self, title: impl Into<String>) -> ContextIter<Self> {
        ContextIter::percentage(self, title)
    }

    fn log_titled(
        self,
        f: impl FnMut(usize, Option<usize>) -> String + 'static,
    ) -> ContextIter<Self> {
        ContextIter::titled(self, f)
    }
}

impl<I: Iterator> ContextIterExt for I {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{Event, RecordLog};
    use crate::core::{info, set, Level, Message};

    fn recorder() -> Arc<RecordLog> {
        Arc::new(RecordLog::new(false))
    }

    fn titles(record: &RecordLog) -> Vec<String> {
        record
            .trace()
            .events()
            .iter()
            .filter_map(|event| match event {
                Event::Push(title) | Event::Recontext(title) => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_titles() {
        let record = recorder();
        let _scope = set(record.clone());
        let items: Vec<char> = "abc".chars().log_iter("step").collect();
        assert_eq!(items, ['a', 'b', 'c']);
        assert_eq!(
            record.trace().events(),
            &[
                Event::Push("step 1".into()),
                Event::Recontext("step 2".into()),
                Event::Recontext("step 3".into()),
                Event::Pop,
            ]
        );
    }

    #[test]
    fn test_fraction_and_percentage() {
        let record = recorder();
        let _scope = set(record.clone());
        (0..4).log_fraction("f").for_each(drop);
        (0..3).log_percentage("p").for_each(drop);
        assert_eq!(
            titles(&record),
            ["f 1/4", "f 2/4", "f 3/4", "f 4/4", "p 33%", "p 67%", "p 100%"]
        );
    }

    #[test]
    fn test_unknown_length() {
        let record = recorder();
        let _scope = set(record.clone());
        (0..).filter(|n| n % 2 == 0).take(2).log_fraction("f").for_each(drop);
        (0..10)
            .filter(|n| n % 5 == 0)
            .log_fraction("g")
            .with_length(2)
            .for_each(drop);
        assert_eq!(titles(&record), ["f 1/?", "f 2/?", "g 1/2", "g 2/2"]);
    }

    #[test]
    fn test_titled() {
        let record = recorder();
        let _scope = set(record.clone());
        ["x", "y"]
            .iter()
            .log_titled(|i, n| format!("item {i} of {}", n.unwrap_or(0)))
            .for_each(drop);
        assert_eq!(titles(&record), ["item 1 of 2", "item 2 of 2"]);
    }

    #[test]
    fn test_empty_sequence_opens_nothing() {
        let record = recorder();
        let _scope = set(record.clone());
        assert_eq!(std::iter::empty::<u8>().log_iter("none").count(), 0);
        assert!(record.trace().is_empty());
    }

    #[test]
    fn test_first_element_is_produced_outside_context() {
        let record = recorder();
        let _scope = set(record.clone());
        let mut n = 0;
        let producer = std::iter::from_fn(move || {
            n += 1;
            info("producing").unwrap();
            (n <= 1).then_some(n)
        });
        producer.log_iter("it").for_each(drop);
        assert_eq!(
            record.trace().events(),
            &[
                Event::Write(Message::from("producing"), Level::Info),
                Event::Push("it 1".into()),
                Event::Write(Message::from("producing"), Level::Info),
                Event::Pop,
            ]
        );
    }

    #[test]
    fn test_close_after_break() {
        let record = recorder();
        let _scope = set(record.clone());
        let before = metrics().leaked_contexts();
        let mut steps = (0..10).log_iter("step");
        for i in steps.by_ref() {
            if i == 2 {
                break;
            }
        }
        assert_eq!(steps.position(), 3);
        steps.close().unwrap();
        assert_eq!(record.trace().events().last(), Some(&Event::Pop));
        assert_eq!(record.depth(), 0);
        assert_eq!(metrics().leaked_contexts(), before);
    }

    #[test]
    fn test_scoped() {
        let record = recorder();
        let _scope = set(record.clone());
        let first = (0..10)
            .log_iter("step")
            .scoped(|steps| steps.next())
            .unwrap();
        assert_eq!(first, Some(0));
        assert_eq!(record.depth(), 0);
    }

    #[test]
    fn test_abandoned_iterator_pops_and_reports_leak() {
        let record = recorder();
        let _scope = set(record.clone());
        let before = metrics().leaked_contexts();
        {
            let mut steps = (0..10).log_iter("step");
            steps.next();
            assert!(steps.is_open());
        }
        assert_eq!(record.depth(), 0);
        assert!(metrics().leaked_contexts() > before);
    }

    #[test]
    fn test_context_stays_on_original_log() {
        let outer = recorder();
        let inner = recorder();
        let _scope = set(outer.clone());
        for _ in (0..2).log_iter("loop") {
            let _nested = set(inner.clone());
            info("inside").unwrap();
        }
        assert_eq!(outer.trace().len(), 3);
        assert_eq!(inner.trace().len(), 2);
    }
}
