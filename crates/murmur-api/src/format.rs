use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT, request::Parts},
};
use serde::Deserialize;

/// Response shape requested by the client.
///
/// `Page` clients get full-document outcomes (redirects), `Fragment` clients
/// get a JSON partial describing the new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Page,
    Fragment,
}

#[derive(Debug, Default, Deserialize)]
struct FormatQuery {
    format: Option<String>,
}

impl Format {
    /// An explicit `format` parameter wins; otherwise look at the `Accept` header.
    pub fn negotiate(format: Option<&str>, accept: Option<&str>) -> Self {
        match format {
            Some("js") | Some("json") => return Self::Fragment,
            Some(_) => return Self::Page,
            None => {}
        }

        let wants_fragment = accept.is_some_and(|accept| {
            accept.split(',').any(|media| {
                let media = media.split(';').next().unwrap_or("").trim();
                media.eq_ignore_ascii_case("application/json")
                    || media.eq_ignore_ascii_case("text/javascript")
            })
        });

        if wants_fragment { Self::Fragment } else { Self::Page }
    }
}

impl<S> FromRequestParts<S> for Format
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A malformed query string is treated as carrying no format.
        let query = Query::<FormatQuery>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();
        let accept = parts.headers.get(ACCEPT).and_then(|v| v.to_str().ok());
        Ok(Self::negotiate(query.format.as_deref(), accept))
    }
}
