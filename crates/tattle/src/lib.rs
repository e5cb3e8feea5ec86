// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Turns errors into structured log events.
//!
//! An error may carry key/value details, the call site it was created at, and other errors it
//! groups together. An [`ErrorHandler`] breaks such an error into one [`Event`] per elementary
//! error and hands each event to an [`ErrorSink`]. Grouped errors inherit the details of the
//! group, and their own details win on key collision.
//!
//! # Key Features
//!
//! - [**`ErrorHandler`**](ErrorHandler): Decomposes errors and forwards the events to a sink
//! - [**`Reportable`**](Reportable): The capabilities an error may expose; implemented for any
//!   `dyn std::error::Error`
//! - [**`ErrorSink`**](ErrorSink): The minimal logging capability, with [`TracingSink`] as the
//!   ready-made `tracing` integration
//! - [**`Error`**](Error): An error type that carries details, frames and child errors
//!
//! # Quick Start
//!
//! ```rust
//! use tattle::{Error, ErrorHandler, TracingSink};
//!
//! fn replicate() -> Result<(), Error> {
//!     let failures = [
//!         tattle::error!("replica 1 timed out").with_detail("replica", 1),
//!         tattle::error!("replica 2 timed out").with_detail("replica", 2),
//!     ];
//!     Err(Error::combine(failures).unwrap().with_detail("volume", "vol-7"))
//! }
//!
//! let handler = ErrorHandler::new(TracingSink::new()).with_stack_info();
//!
//! // Logs two ERROR events, each with `volume`, its own `replica`, `func` and `file`.
//! handler.handle_result(&replicate());
//! ```
//!
//! # Decomposition
//!
//! An error that lists several grouped errors yields one event per grouped error. Each event's
//! fields start as a fresh copy of the group's details, overlaid with the grouped error's own
//! details. Anything else yields a single event with the error's own details.
//!
//! ```rust
//! use tattle::{Error, ErrorHandler, fields};
//!
//! let err = Error::combine([Error::plain("a").with_detail("key", "mine"), Error::plain("b")])
//!     .unwrap()
//!     .with_detail("key", "group");
//!
//! let events = ErrorHandler::new(tattle::NoopSink).events(&err);
//!
//! assert_eq!(events[0].fields, fields! { "key" => "mine" });
//! assert_eq!(events[1].fields, fields! { "key" => "group" });
//! ```
//!
//! # Foreign Errors
//!
//! Any `dyn std::error::Error + 'static` is [`Reportable`]. An [`Error`] found behind it, or
//! anywhere in its source chain, contributes details and frames; other errors are reported as
//! plain messages.
//!
//! ```rust
//! use tattle::{Error, ErrorHandler};
//!
//! let err: Box<dyn std::error::Error + Send + Sync> =
//!     Box::new(Error::wrap(std::io::Error::other("refused"), "connect failed").with_detail("port", 5432));
//!
//! let events = ErrorHandler::new(tattle::NoopSink).events(&*err);
//!
//! assert_eq!(events[0].message, "connect failed: refused");
//! assert_eq!(events[0].fields.len(), 1);
//! ```
//!
//! # Testing
//!
//! With the `test-util` feature, `test_util::RecordingSink` records events and
//! `assert_events!` checks them.

mod details;
mod error;
mod fields;
mod frame;
mod handler;
mod reportable;
mod sink;
mod tracing_sink;
mod value;

#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod test_util;

pub use details::Details;
pub use error::Error;
pub use fields::Fields;
pub use frame::{Frame, StackTrace};
pub use handler::{ErrorHandler, Event, FILE_FIELD, FUNC_FIELD};
pub use reportable::Reportable;
pub use sink::{ErrorSink, FnSink, NoopSink, sink_fn};
pub use tracing_sink::TracingSink;
pub use value::Value;
