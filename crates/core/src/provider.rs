use crate::error::GatewayError;
use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

/// An authenticated request ready to be sent upstream.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// Resolved model identifier, used as a path segment.
    pub model: String,
    /// Opaque client body, forwarded byte-for-byte.
    pub body: Bytes,
}

/// The result of a completed network round-trip, whatever its status.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        match self.content_type {
            Some(ct) => {
                response.headers_mut().insert(header::CONTENT_TYPE, ct);
            }
            None => {
                response.headers_mut().remove(header::CONTENT_TYPE);
            }
        }
        response
    }
}

/// Sends an authenticated request to the upstream provider.
///
/// `Ok` means the upstream answered, including 4xx/5xx answers, which must be
/// relayed untouched. `Err(GatewayError::Upstream)` means the upstream could
/// not be reached at all.
#[async_trait]
pub trait UpstreamForwarder: Send + Sync {
    /// Provider identifier for logs.
    fn identifier(&self) -> &str;

    async fn forward(&self, request: UpstreamRequest) -> Result<UpstreamResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upstream_response_is_relayed_verbatim() {
        let upstream = UpstreamResponse {
            status: StatusCode::TOO_MANY_REQUESTS,
            content_type: Some(HeaderValue::from_static("application/json; charset=UTF-8")),
            body: Bytes::from_static(br#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#),
        };
        assert!(!upstream.is_success());

        let resp = upstream.clone().into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=UTF-8"
        );
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, upstream.body);
    }

    #[test]
    fn test_missing_content_type_is_not_invented() {
        let resp = UpstreamResponse {
            status: StatusCode::OK,
            content_type: None,
            body: Bytes::from_static(b"raw"),
        }
        .into_response();
        assert!(resp.headers().get(header::CONTENT_TYPE).is_none());
    }
}
