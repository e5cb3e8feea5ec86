// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::sync::Arc;

use tracing::Span;

use crate::Fields;

/// The minimal logging capability an [`ErrorHandler`](crate::ErrorHandler) needs.
///
/// Implement this for any logger to receive error events. Only [`log_error`](Self::log_error)
/// is required; sinks without a notion of context inherit a
/// [`log_error_context`](Self::log_error_context) that drops the context and forwards to
/// `log_error`, so context-carrying calls never fail for lack of support.
///
/// Sinks are called synchronously from the thread handling the error. A sink shared between
/// threads must be `Send + Sync` itself; the handler adds no synchronization.
pub trait ErrorSink {
    /// Logs one error event.
    fn log_error(&self, message: &str, fields: &Fields);

    /// Logs one error event within the context of `cx`.
    fn log_error_context(&self, cx: &Span, message: &str, fields: &Fields) {
        let _ = cx;
        self.log_error(message, fields);
    }
}

/// A sink that discards every event.
///
/// This is the sink of a default-constructed [`ErrorHandler`](crate::ErrorHandler).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopSink;

impl ErrorSink for NoopSink {
    fn log_error(&self, _message: &str, _fields: &Fields) {}

    fn log_error_context(&self, _cx: &Span, _message: &str, _fields: &Fields) {}
}

/// A missing sink behaves like [`NoopSink`].
impl<S: ErrorSink> ErrorSink for Option<S> {
    fn log_error(&self, message: &str, fields: &Fields) {
        if let Some(sink) = self {
            sink.log_error(message, fields);
        }
    }

    fn log_error_context(&self, cx: &Span, message: &str, fields: &Fields) {
        if let Some(sink) = self {
            sink.log_error_context(cx, message, fields);
        }
    }
}

macro_rules! impl_for_pointer {
    ($($pointer:ty),+) => {
        $(
            impl<S: ErrorSink + ?Sized> ErrorSink for $pointer {
                fn log_error(&self, message: &str, fields: &Fields) {
                    (**self).log_error(message, fields);
                }

                fn log_error_context(&self, cx: &Span, message: &str, fields: &Fields) {
                    (**self).log_error_context(cx, message, fields);
                }
            }
        )+
    };
}

impl_for_pointer!(&S, Box<S>, Arc<S>);

/// Adapts a closure into an [`ErrorSink`]. Created by [`sink_fn`].
#[derive(Clone)]
pub struct FnSink<F> {
    f: F,
}

impl<F> fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

impl<F: Fn(&str, &Fields)> ErrorSink for FnSink<F> {
    fn log_error(&self, message: &str, fields: &Fields) {
        (self.f)(message, fields);
    }
}

/// Creates a context-unaware sink from a closure.
///
/// ```rust
/// use tattle::{Error, ErrorHandler};
///
/// let handler = ErrorHandler::new(tattle::sink_fn(|message, fields| {
///     eprintln!("{message} {fields:?}");
/// }));
///
/// handler.handle(&Error::plain("oops"));
/// ```
pub fn sink_fn<F: Fn(&str, &Fields)>(f: F) -> FnSink<F> {
    FnSink { f }
}
