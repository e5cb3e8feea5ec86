// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use tracing::Span;

use crate::{ErrorSink, Fields, NoopSink, Reportable, StackTrace};

/// Field set to the function name of an error's top frame when stack info is enabled.
pub const FUNC_FIELD: &str = "func";

/// Field set to the `file:line` of an error's top frame when stack info is enabled.
pub const FILE_FIELD: &str = "file";

/// One loggable unit produced from an error: a message and its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The display form of the elementary error.
    pub message: String,
    /// Inherited and own details, plus call-site fields when enabled.
    pub fields: Fields,
}

impl Event {
    /// Creates an event.
    pub fn new(message: impl Into<String>, fields: Fields) -> Self {
        Self {
            message: message.into(),
            fields,
        }
    }
}

/// Breaks errors into events and forwards each one to an [`ErrorSink`].
///
/// An error that groups several errors produces one event per grouped error, each carrying
/// the group's details overlaid with its own; otherwise the error produces exactly one event
/// carrying its details. Events reach the sink synchronously and in order.
///
/// A default-constructed handler uses a [`NoopSink`] and drops every event.
///
/// # Examples
///
/// ```rust
/// use tattle::{Error, ErrorHandler, TracingSink};
///
/// let handler = ErrorHandler::new(TracingSink::new()).with_stack_info();
///
/// let err = Error::combine([tattle::error!("shard 1 offline"), tattle::error!("shard 4 offline")])
///     .unwrap()
///     .with_detail("cluster", "west");
///
/// // Two ERROR events, both with `cluster` plus their own `func` and `file`.
/// handler.handle(&err);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler<S = NoopSink> {
    sink: S,
    stack_info: bool,
}

impl<S: ErrorSink> ErrorHandler<S> {
    /// Creates a handler that forwards events to `sink`.
    ///
    /// Pass `None::<S>` to get a handler that discards events.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self { sink, stack_info: false }
    }

    /// Annotates every event with the [`FUNC_FIELD`] and [`FILE_FIELD`] of its error's top
    /// frame, when the error has one. The annotation overrides details with the same keys.
    ///
    /// There is no way to turn annotation off again; calling this twice has no further effect.
    #[must_use]
    pub fn with_stack_info(mut self) -> Self {
        self.stack_info = true;
        self
    }

    /// Returns `true` if events are annotated with call-site fields.
    #[must_use]
    pub fn stack_info(&self) -> bool {
        self.stack_info
    }

    /// Returns the sink events are forwarded to.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Reports `err` through [`ErrorSink::log_error`].
    pub fn handle<E: Reportable + ?Sized>(&self, err: &E) {
        self.dispatch(err, |message, fields| self.sink.log_error(message, fields));
    }

    /// Reports `err` through [`ErrorSink::log_error_context`].
    pub fn handle_context<E: Reportable + ?Sized>(&self, cx: &Span, err: &E) {
        self.dispatch(err, |message, fields| self.sink.log_error_context(cx, message, fields));
    }

    /// Reports `err` if there is one.
    pub fn handle_opt<E: Reportable + ?Sized>(&self, err: Option<&E>) {
        if let Some(err) = err {
            self.handle(err);
        }
    }

    /// Reports `err` with context if there is one.
    pub fn handle_opt_context<E: Reportable + ?Sized>(&self, cx: &Span, err: Option<&E>) {
        if let Some(err) = err {
            self.handle_context(cx, err);
        }
    }

    /// Reports the error of a failed `result`; an `Ok` is ignored.
    pub fn handle_result<T, E: Reportable>(&self, result: &Result<T, E>) {
        self.handle_opt(result.as_ref().err());
    }

    /// Returns the events `err` would produce, without forwarding them.
    #[must_use]
    pub fn events<E: Reportable + ?Sized>(&self, err: &E) -> Vec<Event> {
        let mut events = Vec::new();
        self.dispatch(err, |message, fields| events.push(Event::new(message, fields.clone())));
        events
    }

    fn dispatch<E, F>(&self, err: &E, mut emit: F)
    where
        E: Reportable + ?Sized,
        F: FnMut(&str, &Fields),
    {
        let inherited = err.details().to_fields();

        if let Some(members) = group_members(err) {
            tracing::trace!(target: "tattle", members = members.len(), "reporting error group");

            for member in members {
                let mut fields = Fields::layered(&inherited, &member.details().to_fields());
                self.annotate(member, &mut fields);
                emit(&member.to_string(), &fields);
            }
        } else {
            let mut fields = inherited;
            self.annotate(err, &mut fields);
            emit(&err.to_string(), &fields);
        }
    }

    fn annotate<E: Reportable + ?Sized>(&self, err: &E, fields: &mut Fields) {
        if !self.stack_info {
            return;
        }

        if let Some(frame) = err.stack_trace().and_then(StackTrace::top) {
            fields.insert(FUNC_FIELD, frame.function_name().to_owned());
            fields.insert(FILE_FIELD, frame.file_line());
        }
    }
}

/// Returns the errors to report separately, or `None` if `err` is reported as itself.
///
/// A list with fewer than two members is reported as `err` itself. When that one member is
/// `err`, the single event has the same message, fields and annotation a group event would.
fn group_members<E: Reportable + ?Sized>(err: &E) -> Option<Vec<&dyn Reportable>> {
    err.errors().filter(|members| members.len() > 1)
}
