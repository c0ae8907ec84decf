//! Structured log records and the sink they are written to.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::Level;
use tracing::field::display;

/// Placeholder for values that are unavailable on a failure branch.
pub const NOT_AVAILABLE: &str = "na";

pub const COMPONENT: &str = "client";
pub const SOURCE: &str = "ApiAutoLog";
pub const PROTOCOL: &str = "REST";
pub const METHOD_TYPE: &str = "unary";

/// Key order shared by every entry, whichever branch produced it.
pub const KEYS: [&str; 10] = [
    "code",
    "component",
    "time_ms",
    "method",
    "service",
    "url",
    "error",
    "source",
    "protocol",
    "method_type",
];

/// A numeric value, or text when the number is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(u64),
    Text(String),
}

impl FieldValue {
    pub fn na() -> Self {
        FieldValue::Text(NOT_AVAILABLE.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// One record per outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub code: FieldValue,
    pub component: &'static str,
    pub time_ms: FieldValue,
    pub method: String,
    pub service: String,
    pub url: String,
    pub error: String,
    pub source: &'static str,
    pub protocol: &'static str,
    pub method_type: &'static str,
}

impl LogEntry {
    /// An entry for `url` with every call-specific field set to `"na"`.
    pub fn unavailable(url: impl Into<String>) -> Self {
        Self {
            code: FieldValue::na(),
            component: COMPONENT,
            time_ms: FieldValue::na(),
            method: NOT_AVAILABLE.to_string(),
            service: NOT_AVAILABLE.to_string(),
            url: url.into(),
            error: NOT_AVAILABLE.to_string(),
            source: SOURCE,
            protocol: PROTOCOL,
            method_type: METHOD_TYPE,
        }
    }

    /// Key/value pairs in [`KEYS`] order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let values = [
            self.code.to_string(),
            self.component.to_string(),
            self.time_ms.to_string(),
            self.method.clone(),
            self.service.clone(),
            self.url.clone(),
            self.error.clone(),
            self.source.to_string(),
            self.protocol.to_string(),
            self.method_type.to_string(),
        ];
        KEYS.into_iter().zip(values).collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Destination for call records.
///
/// Implementations are shared by every call made through an adapter and must
/// be safe to use concurrently.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, message: &str, entry: &LogEntry);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn log(&self, level: Level, message: &str, entry: &LogEntry) {
        (**self).log(level, message, entry)
    }
}

/// Emits each entry as a `tracing` event with one field per key.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str, entry: &LogEntry) {
        macro_rules! emit {
            ($event:ident, $code:expr, $time_ms:expr) => {
                tracing::$event!(
                    code = $code,
                    component = entry.component,
                    time_ms = $time_ms,
                    method = %entry.method,
                    service = %entry.service,
                    url = %entry.url,
                    error = %entry.error,
                    source = entry.source,
                    protocol = entry.protocol,
                    method_type = entry.method_type,
                    "{}",
                    message
                )
            };
        }

        macro_rules! at_level {
            ($code:expr, $time_ms:expr) => {
                match level {
                    Level::ERROR => emit!(error, $code, $time_ms),
                    Level::WARN => emit!(warn, $code, $time_ms),
                    Level::INFO => emit!(info, $code, $time_ms),
                    Level::DEBUG => emit!(debug, $code, $time_ms),
                    _ => emit!(trace, $code, $time_ms),
                }
            };
        }

        // Numbers stay numeric in structured output; only the sentinel is text.
        match (&entry.code, &entry.time_ms) {
            (FieldValue::Number(code), FieldValue::Number(time_ms)) => at_level!(*code, *time_ms),
            (FieldValue::Number(code), FieldValue::Text(time_ms)) => {
                at_level!(*code, display(time_ms))
            }
            (FieldValue::Text(code), FieldValue::Number(time_ms)) => {
                at_level!(display(code), *time_ms)
            }
            (FieldValue::Text(code), FieldValue::Text(time_ms)) => {
                at_level!(display(code), display(time_ms))
            }
        }
    }
}
