// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(feature = "test-util")]

use std::fmt;

use parking_lot::Mutex;
use tattle::test_util::RecordingSink;
use tattle::{Details, Error, ErrorHandler, Reportable, assert_events};

fn recording() -> (RecordingSink, ErrorHandler<RecordingSink>) {
    let sink = RecordingSink::new();
    (sink.clone(), ErrorHandler::new(sink))
}

// An error type outside this crate that exposes details but no grouping.
#[derive(Debug)]
struct QuotaExceeded {
    tenant: &'static str,
}

impl fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quota exceeded for {}", self.tenant)
    }
}

impl Reportable for QuotaExceeded {
    fn details(&self) -> Details {
        [("tenant", self.tenant)].into_iter().collect()
    }
}

#[test]
fn scenario_plain_error() {
    let (sink, handler) = recording();
    handler.handle(&Error::plain("error"));
    assert_events!(sink, ["error"]);
}

#[test]
fn scenario_combined_errors() {
    let (sink, handler) = recording();
    handler.handle(&Error::combine([Error::plain("error 1"), Error::plain("error 2")]).unwrap());
    assert_events!(sink, ["error 1", "error 2"]);
}

#[test]
fn scenario_details() {
    let (sink, handler) = recording();
    handler.handle(&Error::plain("error").with_detail("key", "value"));
    assert_events!(sink, ["error" => { "key" => "value" }]);
}

#[test]
fn scenario_group_details() {
    let (sink, handler) = recording();
    let err = Error::combine([
        Error::plain("error 1").with_details(&Details::from_key_values(["key", "value", "key 2", "value 2"])),
        Error::plain("error 2"),
    ])
    .unwrap()
    .with_detail("key", "parent value");

    handler.handle(&err);

    assert_events!(sink, [
        "error 1" => { "key" => "value", "key 2" => "value 2" },
        "error 2" => { "key" => "parent value" },
    ]);
}

#[test]
fn wrapped_group_keeps_decomposing() {
    let (sink, handler) = recording();
    let group = Error::combine([Error::plain("a"), Error::plain("b")]).unwrap().with_detail("k", "v");
    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(group);

    handler.handle(&boxed);

    assert_events!(sink, ["a" => { "k" => "v" }, "b" => { "k" => "v" }]);
}

#[test]
fn wrapper_contributes_details_to_a_single_event() {
    let (sink, handler) = recording();
    let err = Error::wrap(Error::plain("refused").with_detail("port", 5432), "connect failed").with_detail("host", "db-1");

    handler.handle(&err);

    assert_events!(sink, ["connect failed: refused" => { "host" => "db-1", "port" => 5432 }]);
}

#[test]
fn custom_reportable() {
    let (sink, handler) = recording();
    handler.handle(&QuotaExceeded { tenant: "contoso" });
    assert_events!(sink, ["quota exceeded for contoso" => { "tenant" => "contoso" }]);
}

#[test]
fn results_and_options() {
    let (sink, handler) = recording();

    handler.handle_result(&Ok::<u8, Error>(1));
    handler.handle_opt(None::<&Error>);
    assert_eq!(sink.count(), 0);

    handler.handle_result(&Err::<u8, _>(Error::plain("failed")));
    handler.handle_opt(Some(&QuotaExceeded { tenant: "fabrikam" }));

    assert_events!(sink, ["failed", "quota exceeded for fabrikam" => { "tenant" => "fabrikam" }]);
}

#[test]
fn context_is_passed_to_the_sink() {
    let (sink, handler) = recording();
    let span = tracing::Span::none();

    handler.handle_context(&span, &Error::combine([Error::plain("a"), Error::plain("b")]).unwrap());
    handler.handle_opt_context(&span, Some(&Error::plain("c")));

    assert_events!(sink, ["a", "b", "c"]);
    assert_eq!(sink.context_count(), 3);
}

#[test]
fn closure_sink() {
    let seen = Mutex::new(Vec::new());
    let handler = ErrorHandler::new(tattle::sink_fn(|message: &str, fields: &tattle::Fields| {
        seen.lock().push(format!("{message} {}", fields.len()));
    }));

    handler.handle(&Error::combine([Error::plain("a").with_detail("x", 1), Error::plain("b")]).unwrap());

    assert_eq!(*seen.lock(), ["a 1", "b 0"]);
}
