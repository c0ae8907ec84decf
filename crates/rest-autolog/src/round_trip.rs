//! Transport-level call logging for `reqwest` clients.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, IntoUrl, Method, Request, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use crate::call::{CallOutcome, CallTarget, observe};
use crate::entry::{LogSink, NOT_AVAILABLE};
use crate::error::AutologError;
use crate::options::ClientOptions;

/// Executes a single HTTP exchange.
#[async_trait]
pub trait RoundTrip: Send + Sync {
    async fn round_trip(&self, request: Request) -> Result<Response, reqwest::Error>;
}

#[async_trait]
impl RoundTrip for Client {
    async fn round_trip(&self, request: Request) -> Result<Response, reqwest::Error> {
        self.execute(request).await
    }
}

/// Wraps a transport so every exchange through it is logged.
pub struct LoggingRoundTripper<T = Client> {
    proxied: T,
    sink: Arc<dyn LogSink>,
}

/// A `reqwest` client whose calls are all logged.
pub type LoggingClient = LoggingRoundTripper<Client>;

impl<T: RoundTrip> LoggingRoundTripper<T> {
    pub fn new(proxied: T, sink: Arc<dyn LogSink>) -> Self {
        debug!(transport = std::any::type_name::<T>(), "Wrapping transport with call logging");
        Self { proxied, sink }
    }
}

impl<T: fmt::Debug> fmt::Debug for LoggingRoundTripper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingRoundTripper")
            .field("proxied", &self.proxied)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: RoundTrip> RoundTrip for LoggingRoundTripper<T> {
    async fn round_trip(&self, request: Request) -> Result<Response, reqwest::Error> {
        let method = request.method().clone();
        let target = CallTarget::Parsed(request.url().clone());
        observe(
            &*self.sink,
            method,
            target,
            self.proxied.round_trip(request),
        )
        .await
    }
}

impl LoggingClient {
    /// Starts a request on the underlying client; send it with [`Self::send`].
    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.proxied.request(method, url)
    }

    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn patch<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    pub fn delete<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    /// Sends a built request through the logging transport.
    ///
    /// A request that fails to build never reaches the transport; it is
    /// logged as a URL parse failure and the builder error is returned.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, reqwest::Error> {
        let request = match builder.build() {
            Ok(request) => request,
            Err(err) => {
                let target = err.url().map_or(NOT_AVAILABLE, Url::as_str);
                CallOutcome::parse_failure(target, &err).emit(&*self.sink);
                return Err(err);
            }
        };
        self.round_trip(request).await
    }
}

/// Builds a `reqwest` client from `options` with logging installed.
pub fn new_logging_client(options: &ClientOptions) -> Result<LoggingClient, AutologError> {
    debug!(
        connect_timeout = ?options.connect_timeout,
        max_retries = options.retry.max_retries,
        "Building logging client"
    );
    let client = Client::builder()
        .default_headers(options.headers.clone())
        .connect_timeout(options.connect_timeout)
        .build()?;
    Ok(LoggingRoundTripper::new(client, options.sink.clone()))
}
