//! Pipeline-step call logging
//!
//! Provides a Tower layer that logs every request passing through a client
//! service stack. Responses and transport errors are passed through; a request
//! URI that cannot be parsed is logged and surfaced as [`AutologError`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use http::{Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::{debug, trace};

use crate::call::{CallOutcome, CallRecord, CallTarget};
use crate::entry::{LogSink, TracingSink};
use crate::error::AutologError;

/// Tower layer that logs each outbound call to a [`LogSink`].
///
/// The layer holds nothing but the sink, so one instance can be cloned into
/// as many client pipelines as needed.
#[derive(Clone)]
pub struct LoggingPolicy {
    sink: Arc<dyn LogSink>,
}

impl LoggingPolicy {
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        debug!("Creating logging policy");
        Self { sink }
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }
}

impl Default for LoggingPolicy {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl fmt::Debug for LoggingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingPolicy").finish_non_exhaustive()
    }
}

impl<S> Layer<S> for LoggingPolicy {
    type Service = LoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingService {
            inner,
            sink: self.sink.clone(),
        }
    }
}

/// Service produced by [`LoggingPolicy`].
#[derive(Clone)]
pub struct LoggingService<S> {
    inner: S,
    sink: Arc<dyn LogSink>,
}

impl<S: fmt::Debug> fmt::Debug for LoggingService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingService")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for LoggingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Error: fmt::Display + From<AutologError>,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = LoggingResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        trace!(method = %req.method(), uri = %req.uri(), "intercepting call");
        let record = CallRecord::start(
            req.method().clone(),
            CallTarget::Raw(req.uri().to_string()),
        );

        LoggingResponseFuture {
            inner: self.inner.call(req),
            record: Some(record),
            sink: self.sink.clone(),
        }
    }
}

pin_project! {
    /// Response future that logs the call once the inner service completes.
    ///
    /// If the request URI cannot be parsed, the inner result is dropped and
    /// the parse error is returned instead.
    pub struct LoggingResponseFuture<F> {
        #[pin]
        inner: F,
        record: Option<CallRecord>,
        sink: Arc<dyn LogSink>,
    }
}

impl<F, ResBody, E> Future for LoggingResponseFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
    E: fmt::Display + From<AutologError>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let result = ready!(this.inner.poll(cx));

        let Some(record) = this.record.take() else {
            return Poll::Ready(result);
        };
        match record.classify() {
            Ok(classification) => {
                record.complete(classification, &result).emit(&**this.sink);
                Poll::Ready(result)
            }
            Err(err) => {
                CallOutcome::parse_failure(record.target(), &err).emit(&**this.sink);
                Poll::Ready(Err(err.into()))
            }
        }
    }
}
