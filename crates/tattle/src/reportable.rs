// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::error::Error as StdError;
use std::fmt::Display;
use std::sync::Arc;

use crate::{Details, Error, StackTrace};

/// The capabilities an error may expose to an [`ErrorHandler`](crate::ErrorHandler).
///
/// Only the message is mandatory. Every other capability has a default that reports it as
/// absent, and absence is never an error: no details means no fields, no children means the
/// error is reported as a single event, no stack trace means no call-site annotation.
///
/// # Examples
///
/// ```rust
/// use std::fmt;
///
/// use tattle::{Details, Reportable};
///
/// struct QuotaExceeded {
///     tenant: &'static str,
/// }
///
/// impl fmt::Display for QuotaExceeded {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str("quota exceeded")
///     }
/// }
///
/// impl Reportable for QuotaExceeded {
///     fn details(&self) -> Details {
///         [("tenant", self.tenant)].into_iter().collect()
///     }
/// }
/// ```
pub trait Reportable: Display {
    /// Returns the key/value metadata carried by this error.
    fn details(&self) -> Details {
        Details::new()
    }

    /// Returns the errors this error groups together, in reporting order.
    ///
    /// `None` means this is not a composite error.
    fn errors(&self) -> Option<Vec<&dyn Reportable>> {
        None
    }

    /// Returns the call-site frames recorded for this error, innermost first.
    fn stack_trace(&self) -> Option<&StackTrace> {
        None
    }
}

// Standard errors are probed for a `tattle::Error` at the top (children) and anywhere in
// their source chain (details and frames). Everything else is a plain leaf.
macro_rules! impl_for_std_error {
    ($($bounds:tt)*) => {
        impl Reportable for dyn StdError $($bounds)* {
            fn details(&self) -> Details {
                crate::error::chain_details(self)
            }

            fn errors(&self) -> Option<Vec<&dyn Reportable>> {
                self.downcast_ref::<Error>().and_then(Reportable::errors)
            }

            fn stack_trace(&self) -> Option<&StackTrace> {
                crate::error::chain_stack_trace(self)
            }
        }
    };
}

impl_for_std_error!(+ 'static);
impl_for_std_error!(+ Send + Sync + 'static);

macro_rules! impl_for_pointer {
    ($($pointer:ty),+) => {
        $(
            impl<E: Reportable + ?Sized> Reportable for $pointer {
                fn details(&self) -> Details {
                    (**self).details()
                }

                fn errors(&self) -> Option<Vec<&dyn Reportable>> {
                    (**self).errors()
                }

                fn stack_trace(&self) -> Option<&StackTrace> {
                    (**self).stack_trace()
                }
            }
        )+
    };
}

impl_for_pointer!(&E, Box<E>, Arc<E>);

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Frame, Value};

    #[derive(Debug)]
    struct Foreign;

    impl Display for Foreign {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("foreign")
        }
    }

    impl StdError for Foreign {}

    #[test]
    fn foreign_std_error_is_a_plain_leaf() {
        let err: &(dyn StdError + 'static) = &Foreign;

        assert!(err.details().is_empty());
        assert!(err.errors().is_none());
        assert!(err.stack_trace().is_none());
    }

    #[test]
    fn boxed_tattle_error_exposes_capabilities() {
        let group = Error::combine([Error::plain("a"), Error::plain("b").with_frame(Frame::new("f", "x.rs", 1))])
            .unwrap()
            .with_detail("key", "value");
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(group);

        assert_eq!(boxed.details().to_fields().get("key"), Some(&Value::from("value")));
        assert_eq!(boxed.errors().map(|errors| errors.len()), Some(2));
        assert!(boxed.stack_trace().is_none());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Error);

    #[test]
    fn wrapped_in_foreign_error_keeps_details() {
        let outer = Outer(Error::plain("inner").with_detail("id", 7_u32).with_frame(Frame::new("f", "x.rs", 1)));
        let err: &(dyn StdError + 'static) = &outer;

        assert_eq!(err.details().to_fields().get("id"), Some(&Value::U64(7)));
        assert_eq!(err.stack_trace().and_then(StackTrace::top).map(Frame::function), Some("f"));
        assert!(err.errors().is_none());
    }

    #[test]
    fn pointers_forward() {
        let err = Error::plain("e").with_detail("k", "v");
        let shared = Arc::new(err.clone());

        let boxed: Box<dyn Reportable> = Box::new(err.clone());

        assert_eq!(shared.details(), err.details());
        assert_eq!(boxed.details(), err.details());
    }
}
