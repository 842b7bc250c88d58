use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Every failure the gateway itself produces. Upstream non-2xx responses are
/// not errors here; they are relayed as ordinary responses.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing Authorization header")]
    AuthMissing,

    #[error("Invalid API key")]
    AuthInvalid,

    /// The upstream could not be reached or the exchange broke off.
    #[error("Proxy error: {0}")]
    Upstream(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::AuthMissing => StatusCode::UNAUTHORIZED,
            Self::AuthInvalid => StatusCode::FORBIDDEN,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short machine-friendly label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::AuthMissing => "auth_missing",
            Self::AuthInvalid => "auth_invalid",
            Self::Upstream(_) => "upstream_failure",
            Self::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({ "error": self.to_string() });

        (
            status,
            [("content-type", "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        // The outbound URL carries the upstream key in its query string.
        let e = e.without_url();
        let detail = error_chain(&e);
        if e.is_timeout() {
            Self::Upstream(format!("request timed out: {detail}"))
        } else if e.is_connect() {
            Self::Upstream(format!("connection failed: {detail}"))
        } else {
            Self::Upstream(detail)
        }
    }
}

/// Join an error and its sources into one line, deduplicating repeated messages.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut parts: Vec<String> = vec![e.to_string()];
    let mut source = e.source();
    while let Some(inner) = source {
        let msg = inner.to_string();
        if parts.last() != Some(&msg) {
            parts.push(msg);
        }
        source = inner.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: GatewayError) -> (StatusCode, Option<String>, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_envelopes() {
        let cases = [
            (GatewayError::MethodNotAllowed, 405, "Method not allowed"),
            (GatewayError::AuthMissing, 401, "Missing Authorization header"),
            (GatewayError::AuthInvalid, 403, "Invalid API key"),
            (
                GatewayError::Upstream("dns error".into()),
                502,
                "Proxy error: dns error",
            ),
        ];

        for (err, status, message) in cases {
            let (got_status, content_type, body) = render(err).await;
            assert_eq!(got_status.as_u16(), status);
            assert_eq!(content_type.as_deref(), Some("application/json"));
            assert_eq!(body, json!({ "error": message }));
        }
    }

    #[test]
    fn test_error_chain_dedupes() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(error_chain(&err), "outer: connection refused");
    }
}
