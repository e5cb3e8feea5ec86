// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use tracing::Span;

use crate::{ErrorSink, Fields};

/// An [`ErrorSink`] that emits every error event as a `tracing` event at the ERROR level.
///
/// The event message is the error message. The fields are attached as a single `fields`
/// value rendered as a JSON object, since `tracing` field names must be known at compile
/// time. Events use the `tattle` target.
///
/// With [`log_error_context`](ErrorSink::log_error_context) the given span becomes the
/// explicit parent of the event; a disabled span leaves the current span in charge.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Creates a new tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ErrorSink for TracingSink {
    fn log_error(&self, message: &str, fields: &Fields) {
        tracing::error!(target: "tattle", fields = %JsonFields(fields), "{message}");
    }

    fn log_error_context(&self, cx: &Span, message: &str, fields: &Fields) {
        if cx.is_disabled() {
            self.log_error(message, fields);
        } else {
            tracing::error!(target: "tattle", parent: cx, fields = %JsonFields(fields), "{message}");
        }
    }
}

struct JsonFields<'a>(&'a Fields);

impl fmt::Display for JsonFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self.0) {
            Ok(json) => f.write_str(&json),
            Err(e) => write!(f, "<unrenderable fields: {e}>"),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::Layer;
    use tracing_subscriber::fmt::MakeWriter;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    /// Collects formatted log output in memory.
    #[derive(Debug, Clone, Default)]
    struct LogCapture {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl LogCapture {
        fn output(&self) -> String {
            String::from_utf8_lossy(&self.buffer.lock()).to_string()
        }

        fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + use<> {
            tracing_subscriber::registry().with(
                tracing_subscriber::fmt::layer()
                    .with_writer(self.clone())
                    .with_ansi(false)
                    .with_filter(LevelFilter::ERROR),
            )
        }
    }

    impl<'a> MakeWriter<'a> for LogCapture {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.buffer.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn emits_error_with_json_fields() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        TracingSink::new().log_error("disk full", &crate::fields! { "device" => "sda1", "free" => 0_u64 });

        let output = capture.output();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("tattle"), "{output}");
        assert!(output.contains("disk full"), "{output}");
        assert!(output.contains(r#"fields={"device":"sda1","free":0}"#), "{output}");
    }

    #[test]
    fn context_span_becomes_parent() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let span = tracing::error_span!("request", id = 7);
        TracingSink::new().log_error_context(&span, "denied", &Fields::new());

        let output = capture.output();
        assert!(output.contains("request{id=7}"), "{output}");
        assert!(output.contains("denied"), "{output}");
        assert!(output.contains("fields={}"), "{output}");
    }

    #[test]
    fn disabled_context_logs_plainly() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        TracingSink::new().log_error_context(&Span::none(), "plain", &Fields::new());

        let output = capture.output();
        assert!(output.contains("plain"), "{output}");
        assert!(!output.contains("request"), "{output}");
    }

    #[test]
    fn json_fields_render() {
        let fields = crate::fields! { "b" => true, "a" => "x" };
        assert_eq!(JsonFields(&fields).to_string(), r#"{"a":"x","b":true}"#);
    }
}
