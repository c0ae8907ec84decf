//! # Call classification
//!
//! Turns a resource-management URL and an HTTP verb into a compact,
//! low-cardinality operation label such as `GET storageaccounts - READ`.
//!
//! Classification runs on the *normalized* URL: every query parameter except
//! `api-version` is dropped so that pagination tokens and filters never leak
//! into the label or the logged URL.
//!
//! ## Resolution
//!
//! The normalized URL is split on `/` and the first segment carrying
//! `api-version` acts as the anchor:
//!
//! * no anchor (or an anchor with nothing before it) - the whole normalized URL
//!   is used as the resource type
//! * the segment before the anchor names a known resource type - a single
//!   resource is addressed (`READ`)
//! * the anchor itself names a known resource type - the collection is
//!   addressed (`LIST`)
//! * anything else - the segment before the anchor is used verbatim
//!
//! Only `GET` labels carry the ` - READ` / ` - LIST` suffix.

use std::fmt;

use http::Method;
use url::{Position, Url};

use crate::entry::NOT_AVAILABLE;
use crate::error::AutologError;

/// Query parameter kept on normalized URLs.
pub const API_VERSION: &str = "api-version";

/// Resource types reported by name instead of by raw path segment.
pub const RESOURCE_TYPES: [&str; 4] = [
    "resourcegroups",
    "storageaccounts",
    "operationresults",
    "asyncoperations",
];

/// Result of classifying a single outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Verb plus resource type, e.g. `POST resourcegroups`.
    pub label: String,
    /// Query-trimmed URL (or path and query for already parsed requests).
    pub url: String,
    /// Target host, including the port when one is present.
    pub service: String,
}

/// Parses and classifies a raw request URL.
pub fn classify(method: &Method, raw_url: &str) -> Result<Classification, AutologError> {
    let parsed = Url::parse(raw_url)?;
    let url = trim_url(&parsed);
    Ok(Classification {
        label: method_info(method, &url),
        service: service_of(&parsed),
        url,
    })
}

/// Classifies an already parsed URL on its path and trimmed query.
pub fn classify_url(method: &Method, url: &Url) -> Classification {
    let trimmed = trimmed(url);
    let target = &trimmed[Position::BeforePath..Position::AfterQuery];
    Classification {
        label: method_info(method, target),
        url: target.to_string(),
        service: service_of(url),
    }
}

/// Drops every query parameter except `api-version`.
///
/// An `api-version` present with an empty value is kept; a URL without one
/// loses its query string entirely.
pub fn trim_url(url: &Url) -> String {
    trimmed(url).to_string()
}

fn trimmed(url: &Url) -> Url {
    let api_version = url
        .query_pairs()
        .find(|(key, _)| key == API_VERSION)
        .map(|(_, value)| value.into_owned());

    let mut trimmed = url.clone();
    match api_version {
        Some(version) => {
            trimmed
                .query_pairs_mut()
                .clear()
                .append_pair(API_VERSION, &version);
        }
        None => trimmed.set_query(None),
    }
    trimmed
}

fn service_of(url: &Url) -> String {
    let host = &url[Position::BeforeHost..Position::AfterPort];
    if host.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        host.to_string()
    }
}

/// Builds the operation label for an already normalized URL.
pub fn method_info(method: &Method, normalized: &str) -> String {
    let (resource_type, operation) = match resolve(normalized) {
        Resolution::WholeUrl => return format!("{} {}", method, normalized),
        Resolution::Known {
            resource_type,
            segment,
        } => (resource_type, split_operation(segment).1),
        Resolution::Custom { segment } => split_operation(segment),
    };

    if *method == Method::GET {
        format!("{} {} - {}", method, resource_type, operation)
    } else {
        format!("{} {}", method, resource_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Read,
    List,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => f.write_str("READ"),
            Operation::List => f.write_str("LIST"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Resolution<'a> {
    /// No usable `api-version` anchor.
    WholeUrl,
    /// A vocabulary resource type and the segment it was found in.
    Known {
        resource_type: &'static str,
        segment: &'a str,
    },
    /// Unrecognized resource type, reported verbatim.
    Custom { segment: &'a str },
}

fn resolve(normalized: &str) -> Resolution<'_> {
    let segments: Vec<&str> = normalized.split('/').collect();

    let anchor = match segments.iter().position(|s| s.contains(API_VERSION)) {
        Some(index) if index > 0 => index,
        _ => return Resolution::WholeUrl,
    };

    let preceding = segments[anchor - 1];
    if let Some(resource_type) = known_resource_type(preceding) {
        return Resolution::Known {
            resource_type,
            segment: preceding,
        };
    }

    let anchor_segment = segments[anchor];
    let anchor_path = anchor_segment
        .split_once('?')
        .map_or(anchor_segment, |(path, _)| path);
    if let Some(resource_type) = known_resource_type(anchor_path) {
        return Resolution::Known {
            resource_type,
            segment: anchor_segment,
        };
    }

    Resolution::Custom { segment: preceding }
}

fn known_resource_type(segment: &str) -> Option<&'static str> {
    let lowered = segment.to_ascii_lowercase();
    RESOURCE_TYPES
        .iter()
        .copied()
        .find(|resource_type| lowered.contains(resource_type))
}

/// A segment that still carries a path or query character addresses a
/// collection; the part before it is the resource type.
fn split_operation(segment: &str) -> (&str, Operation) {
    match segment.find(['/', '?']) {
        Some(index) => (&segment[..index], Operation::List),
        None => (segment, Operation::Read),
    }
}
