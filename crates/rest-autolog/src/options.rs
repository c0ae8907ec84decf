use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::entry::{LogSink, TracingSink};
use crate::policy::LoggingPolicy;

const DEFAULT_MAX_RETRIES: u32 = 5;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry settings handed to the caller's retry policy as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOptions {
    pub max_retries: u32,
}

impl Default for RetryOptions {
    fn default() -> Self {
        RetryOptions {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Client settings with call logging attached.
#[derive(Clone)]
pub struct ClientOptions {
    pub retry: RetryOptions,
    pub connect_timeout: Duration,
    pub headers: HeaderMap,
    pub sink: Arc<dyn LogSink>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            retry: RetryOptions::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            headers: HeaderMap::new(),
            sink: Arc::new(TracingSink),
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("retry", &self.retry)
            .field("connect_timeout", &self.connect_timeout)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl ClientOptions {
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Per-call pipeline step logging to this configuration's sink.
    #[must_use]
    pub fn logging_policy(&self) -> LoggingPolicy {
        LoggingPolicy::new(self.sink.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.retry.max_retries, 5);
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert!(options.headers.is_empty());
    }

    #[test]
    fn test_logging_policy_shares_sink() {
        let sink: Arc<dyn LogSink> = Arc::new(TracingSink);
        let options = ClientOptions {
            retry: RetryOptions { max_retries: 2 },
            ..Default::default()
        }
        .with_sink(sink.clone());

        assert!(Arc::ptr_eq(options.logging_policy().sink(), &sink));
        assert_eq!(options.retry.max_retries, 2);
    }
}
