//! Timing, classification and logging of a single outbound call.
//!
//! Both adapters funnel through [`CallRecord`], so a call produces the same
//! entry whichever hook intercepted it.

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use http::{Method, StatusCode};
use tracing::Level;
use url::Url;

use crate::classifier::{Classification, classify, classify_url};
use crate::entry::{FieldValue, LogEntry, LogSink};
use crate::error::AutologError;

pub const MSG_PARSE_FAILED: &str = "error parsing request URL";
pub const MSG_CALL_FAILED: &str = "error finishing call";
pub const MSG_CALL_FINISHED: &str = "finished call";

/// Anything carrying the HTTP status of a completed exchange.
pub trait ResponseStatus {
    fn status(&self) -> StatusCode;
}

impl<B> ResponseStatus for http::Response<B> {
    fn status(&self) -> StatusCode {
        http::Response::status(self)
    }
}

impl ResponseStatus for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }
}

/// Where a call was sent.
#[derive(Debug, Clone)]
pub enum CallTarget {
    /// A URL string that has not been parsed yet.
    Raw(String),
    /// An already parsed URL; classified on its path and query.
    Parsed(Url),
}

impl CallTarget {
    fn as_str(&self) -> &str {
        match self {
            CallTarget::Raw(raw) => raw,
            CallTarget::Parsed(url) => url.as_str(),
        }
    }
}

/// Per-call state, created right before the transport is invoked.
#[derive(Debug)]
pub struct CallRecord {
    method: Method,
    target: CallTarget,
    start: Instant,
}

impl CallRecord {
    pub fn start(method: Method, target: CallTarget) -> Self {
        Self {
            method,
            target,
            start: Instant::now(),
        }
    }

    /// Turns the transport result into the one entry this call emits.
    pub fn finish<R, E>(self, result: &Result<R, E>) -> CallOutcome
    where
        R: ResponseStatus,
        E: Display,
    {
        match self.classify() {
            Ok(classification) => self.complete(classification, result),
            Err(err) => CallOutcome::parse_failure(self.target.as_str(), &err),
        }
    }

    /// Classifies the call; fails only for raw targets that do not parse.
    pub fn classify(&self) -> Result<Classification, AutologError> {
        match &self.target {
            CallTarget::Raw(raw) => classify(&self.method, raw),
            CallTarget::Parsed(url) => Ok(classify_url(&self.method, url)),
        }
    }

    /// The target as it was handed to the transport.
    pub fn target(&self) -> &str {
        self.target.as_str()
    }

    /// Builds the entry for a classified call from the transport result.
    pub fn complete<R, E>(self, classification: Classification, result: &Result<R, E>) -> CallOutcome
    where
        R: ResponseStatus,
        E: Display,
    {
        let elapsed_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut entry = LogEntry::unavailable(classification.url);
        entry.method = classification.label;
        entry.service = classification.service;

        match result {
            Err(err) => {
                entry.error = err.to_string();
                CallOutcome {
                    level: Level::ERROR,
                    message: MSG_CALL_FAILED,
                    entry,
                }
            }
            Ok(response) => {
                let status = response.status();
                entry.code = FieldValue::Number(u64::from(status.as_u16()));
                entry.time_ms = FieldValue::Number(elapsed_ms);

                let level = if status.is_success() {
                    Level::INFO
                } else {
                    entry.error = status.to_string();
                    Level::ERROR
                };
                CallOutcome {
                    level,
                    message: MSG_CALL_FINISHED,
                    entry,
                }
            }
        }
    }
}

/// The single record produced for a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub level: Level,
    pub message: &'static str,
    pub entry: LogEntry,
}

impl CallOutcome {
    /// Entry for a call whose target could not be turned into a URL.
    pub fn parse_failure(target: &str, error: &dyn Display) -> Self {
        let mut entry = LogEntry::unavailable(target);
        entry.error = error.to_string();
        CallOutcome {
            level: Level::ERROR,
            message: MSG_PARSE_FAILED,
            entry,
        }
    }

    pub fn emit(&self, sink: &dyn LogSink) {
        sink.log(self.level, self.message, &self.entry);
    }
}

/// Awaits `call`, logs it and hands its result back untouched.
pub async fn observe<F, R, E>(
    sink: &dyn LogSink,
    method: Method,
    target: CallTarget,
    call: F,
) -> Result<R, E>
where
    F: Future<Output = Result<R, E>>,
    R: ResponseStatus,
    E: Display,
{
    let record = CallRecord::start(method, target);
    let result = call.await;
    record.finish(&result).emit(sink);
    result
}
