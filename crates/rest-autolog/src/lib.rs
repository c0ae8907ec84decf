//! # rest-autolog
//!
//! Structured call logging for clients of a resource-management REST API.
//!
//! Every outbound call is timed, classified into a low-cardinality operation
//! label (`GET storageaccounts - READ`, `POST resourcegroups`, ...) and
//! reported as exactly one [`LogEntry`] to a [`LogSink`]. Two hooks are
//! available:
//!
//! * [`LoggingPolicy`] - a Tower layer for `http::Request` service stacks
//! * [`LoggingRoundTripper`] - a wrapper around a `reqwest` transport
//!
//! Both produce the same entry for the same call.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rest_autolog::{ClientOptions, new_logging_client};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = new_logging_client(&ClientOptions::default()).unwrap();
//!     let request = client.get(
//!         "https://management.azure.com/subscriptions/sub/resourcegroups?api-version=2021-04-01",
//!     );
//!     // Logged as `GET resourcegroups - LIST`
//!     let _response = client.send(request).await;
//! }
//! ```

mod call;
pub mod classifier;
pub mod entry;
mod error;
mod options;
pub mod policy;
pub mod round_trip;
pub mod status;

pub use call::{
    CallOutcome, CallRecord, CallTarget, MSG_CALL_FAILED, MSG_CALL_FINISHED, MSG_PARSE_FAILED,
    ResponseStatus, observe,
};
pub use classifier::{Classification, classify, classify_url};
pub use entry::{FieldValue, LogEntry, LogSink, TracingSink};
pub use error::AutologError;
pub use options::{ClientOptions, RetryOptions};
pub use policy::{LoggingPolicy, LoggingService};
pub use round_trip::{LoggingClient, LoggingRoundTripper, RoundTrip, new_logging_client};
pub use status::rpc_code_from_http;
