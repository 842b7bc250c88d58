use axum::http::{HeaderMap, Method};
use std::time::Instant;

/// Metadata captured when a request enters the gateway.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// UUID v4.
    pub request_id: String,
    pub start_time: Instant,
    pub method: Method,
    /// Path only; the query string is not kept.
    pub path: String,
    pub client_ip: Option<String>,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>, headers: &HeaderMap) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            start_time: Instant::now(),
            method,
            path: path.into(),
            client_ip: client_ip(headers),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start_time.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// First hop of `X-Forwarded-For`, else `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };
    forwarded.or_else(real_ip).map(str::to_string)
}

/// How one exchange ended, attached to the response as an extension so the
/// logging middleware can report it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeOutcome {
    /// Model the request was forwarded to; unset for rejected requests.
    pub model: Option<String>,
    /// `GatewayError::kind()` for gateway-generated failures.
    pub error_kind: Option<&'static str>,
    /// Rendered error message; never contains a secret.
    pub detail: Option<String>,
}

impl ExchangeOutcome {
    pub fn preflight() -> Self {
        Self::default()
    }

    pub fn forwarded(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    pub fn failed(model: Option<String>, error: &crate::error::GatewayError) -> Self {
        Self {
            model,
            error_kind: Some(error.kind()),
            detail: Some(error.to_string()),
        }
    }

    /// Short label for log lines: the error kind, or `ok`.
    pub fn label(&self) -> &'static str {
        self.error_kind.unwrap_or("ok")
    }
}
