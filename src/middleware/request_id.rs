//! Request id propagation.
//!
//! Every request runs inside a `request` span tagged with an id taken from
//! `x-request-id` (or `x-correlation-id`) when well formed, otherwise a fresh
//! uuid. The id is echoed back on the response.

use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
pub static CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(Arc<str>);

impl RequestId {
    pub fn generate() -> Self {
        Self(Arc::from(Uuid::new_v4().to_string()))
    }

    /// Accepts caller-supplied ids made of alphanumerics, `-` and `_`.
    pub fn parse(id: &str) -> Option<Self> {
        let well_formed = !id.is_empty()
            && id.len() <= MAX_REQUEST_ID_LEN
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        well_formed.then(|| Self(Arc::from(id)))
    }

    fn from_headers(headers: &HeaderMap) -> Self {
        [&REQUEST_ID_HEADER, &CORRELATION_ID_HEADER]
            .into_iter()
            .filter_map(|name| headers.get(name))
            .filter_map(|value| value.to_str().ok())
            .find_map(Self::parse)
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());
    request.extensions_mut().insert(request_id.clone());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}
