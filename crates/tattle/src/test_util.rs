// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test utilities for the tattle crate.
//!
//! This module is only available when the `test-util` feature is enabled.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Span;

use crate::{ErrorSink, Event, Fields};

/// An [`ErrorSink`] that records every event it receives.
///
/// Clones share the same recording, so a clone can be handed to an
/// [`ErrorHandler`](crate::ErrorHandler) while the original is kept for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<Record>>>,
}

#[derive(Debug, Clone)]
struct Record {
    event: Event,
    with_context: bool,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.records.lock().iter().map(|record| record.event.clone()).collect()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns the number of events that arrived through
    /// [`log_error_context`](ErrorSink::log_error_context).
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.records.lock().iter().filter(|record| record.with_context).count()
    }

    /// Forgets every recorded event.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn record(&self, message: &str, fields: &Fields, with_context: bool) {
        self.records.lock().push(Record {
            event: Event::new(message, fields.clone()),
            with_context,
        });
    }
}

impl ErrorSink for RecordingSink {
    fn log_error(&self, message: &str, fields: &Fields) {
        self.record(message, fields, false);
    }

    fn log_error_context(&self, _cx: &Span, message: &str, fields: &Fields) {
        self.record(message, fields, true);
    }
}

/// Asserts that a [`RecordingSink`] received exactly the given events, in order.
///
/// Each event is written as `message` or `message => { key => value, ... }`.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-util")]
/// # {
/// use tattle::test_util::RecordingSink;
/// use tattle::{Error, ErrorHandler, assert_events};
///
/// let sink = RecordingSink::new();
/// let handler = ErrorHandler::new(sink.clone());
///
/// handler.handle(&Error::plain("error").with_detail("key", "value"));
///
/// assert_events!(sink, ["error" => { "key" => "value" }]);
/// # }
/// ```
#[macro_export]
#[cfg_attr(coverage_nightly, coverage(off))] // coverage doesn't handle panics well
macro_rules! assert_events {
    ($sink:expr, [$($message:literal $(=> { $($key:expr => $value:expr),* $(,)? })?),* $(,)?]) => {{
        let expected: ::std::vec::Vec<$crate::Event> = ::std::vec![
            $($crate::Event::new($message, $crate::fields! { $($($key => $value),*)? })),*
        ];
        let actual = $sink.events();

        assert_eq!(
            actual.len(),
            expected.len(),
            "recorded {} events, but expected {}: {actual:?}",
            actual.len(),
            expected.len()
        );
        for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
            assert_eq!(actual, expected, "event {index} differs");
        }
    }};
}
