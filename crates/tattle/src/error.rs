// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::iter;
use std::sync::Arc;

use crate::{Details, Frame, Reportable, StackTrace, Value};

/// Internal error data that is boxed to keep `Error` pointer-sized.
#[derive(Debug, Clone)]
struct Inner {
    kind: Kind,
    details: Details,
    stack: StackTrace,
}

#[derive(Debug, Clone)]
enum Kind {
    /// A message and nothing else
    Message(Cow<'static, str>),
    /// A message on top of a source error
    Wrapped {
        message: Cow<'static, str>,
        source: Arc<dyn StdError + Send + Sync>,
    },
    /// Several errors reported together
    Group(Vec<Error>),
}

/// An error that can carry details, call-site frames and child errors.
///
/// `Error` implements every [`Reportable`] capability, so an
/// [`ErrorHandler`](crate::ErrorHandler) can break it into one event per elementary error.
///
/// # Examples
///
/// ```rust
/// use tattle::Error;
///
/// let first = tattle::error!("disk {} is full", "/dev/sda1").with_detail("free_bytes", 0_u64);
/// let second = Error::plain("replica unreachable");
///
/// let err = Error::combine([first, second]).unwrap().with_detail("request_id", "r-17");
///
/// assert_eq!(err.to_string(), "disk /dev/sda1 is full; replica unreachable");
/// assert_eq!(err.children().len(), 2);
/// ```
#[derive(Clone)]
pub struct Error {
    data: Box<Inner>,
}

impl Error {
    fn from_kind(kind: Kind) -> Self {
        Self {
            data: Box::new(Inner {
                kind,
                details: Details::new(),
                stack: StackTrace::new(),
            }),
        }
    }

    /// Creates an error with a message and no recorded call site.
    ///
    /// Use the [`error!`](crate::error!) macro to also record the caller's frame.
    pub fn plain(message: impl Into<Cow<'static, str>>) -> Self {
        Self::from_kind(Kind::Message(message.into()))
    }

    /// Wraps `source` under a new message. The error displays as `message: source`.
    ///
    /// When `source` is itself an `Error`, its details are inherited and its frames are used
    /// for as long as the wrapper records none of its own.
    pub fn wrap<E>(source: E, message: impl Into<Cow<'static, str>>) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let source: Box<dyn StdError + Send + Sync> = source.into();
        Self::from_kind(Kind::Wrapped {
            message: message.into(),
            source: Arc::from(source),
        })
    }

    /// Combines errors into one composite error.
    ///
    /// Composite inputs that carry no details or frames of their own are flattened into the
    /// result. Returns `None` for no errors and the error itself for exactly one.
    pub fn combine(errors: impl IntoIterator<Item = Self>) -> Option<Self> {
        let mut children = Vec::new();
        for error in errors {
            let bare = error.data.details.is_empty() && error.data.stack.is_empty();
            match error.data.kind {
                Kind::Group(nested) if bare => children.extend(nested),
                _ => children.push(error),
            }
        }

        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(Self::from_kind(Kind::Group(children))),
        }
    }

    /// Attaches a detail.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.data.details.push(key, value);
        self
    }

    /// Attaches every entry of `details`, after the existing ones.
    #[must_use]
    pub fn with_details(mut self, details: &Details) -> Self {
        self.data.details.append(details);
        self
    }

    /// Records a call-site frame. The first frame recorded is the innermost one.
    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.data.stack.push(frame);
        self
    }

    /// Replaces the recorded call-site frames.
    #[must_use]
    pub fn with_stack(mut self, stack: StackTrace) -> Self {
        self.data.stack = stack;
        self
    }

    /// Returns the details attached to this error, excluding any inherited from its source.
    #[must_use]
    pub fn own_details(&self) -> &Details {
        &self.data.details
    }

    /// Returns the frames recorded on this error, excluding any from its source.
    #[must_use]
    pub fn own_stack(&self) -> &StackTrace {
        &self.data.stack
    }

    /// Returns the errors grouped by this error; empty unless it was built by [`combine`](Self::combine).
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.data.kind {
            Kind::Group(children) => children,
            _ => &[],
        }
    }

    /// Returns `true` if this error groups several errors.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.data.kind, Kind::Group(_))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.data.kind)
            .field("details", &self.data.details)
            .field("stack", &self.data.stack)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data.kind {
            Kind::Message(message) => f.write_str(message),
            Kind::Wrapped { message, source } => write!(f, "{message}: {source}"),
            Kind::Group(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    fmt::Display::fmt(child, f)?;
                }
                Ok(())
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.data.kind {
            Kind::Wrapped { source, .. } => Some(source.as_ref()),
            Kind::Message(_) | Kind::Group(_) => None,
        }
    }
}

impl Reportable for Error {
    fn details(&self) -> Details {
        chain_details(self)
    }

    fn errors(&self) -> Option<Vec<&dyn Reportable>> {
        match &self.data.kind {
            Kind::Group(children) => Some(children.iter().map(|child| child as &dyn Reportable).collect()),
            Kind::Message(_) | Kind::Wrapped { .. } => None,
        }
    }

    fn stack_trace(&self) -> Option<&StackTrace> {
        chain_stack_trace(self)
    }
}

fn chain<'a>(err: &'a (dyn StdError + 'static)) -> impl Iterator<Item = &'a Error> {
    iter::successors(Some(err), |&e| e.source()).filter_map(|e| e.downcast_ref::<Error>())
}

/// Collects the details of every `Error` in the source chain, innermost first, so that
/// outer errors win on key collision.
pub(crate) fn chain_details(err: &(dyn StdError + 'static)) -> Details {
    let layers: Vec<&Details> = chain(err).map(Error::own_details).collect();

    let mut details = Details::new();
    for layer in layers.into_iter().rev() {
        details.append(layer);
    }
    details
}

/// Returns the frames of the outermost `Error` in the source chain that recorded any.
pub(crate) fn chain_stack_trace<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a StackTrace> {
    chain(err).map(Error::own_stack).find(|stack| !stack.is_empty())
}

/// Creates an [`Error`] from a format string and records the caller's [`Frame`].
///
/// ```rust
/// let err = tattle::error!("connection to {} refused", "db-1");
///
/// assert_eq!(err.to_string(), "connection to db-1 refused");
/// assert_eq!(err.own_stack().top().map(tattle::Frame::function_name), Some("main"));
/// ```
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::Error::plain(::std::format!($($arg)+)).with_frame($crate::frame!())
    };
}
