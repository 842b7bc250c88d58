use axum::{extract::Request, middleware::Next, response::Response};
use gateway_core::context::{ExchangeOutcome, RequestContext};

/// One line when a request arrives and one when it completes, carrying the
/// model and outcome the handler attached to the response.
///
/// The Authorization header and query string are never logged.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let Some(ctx) = request.extensions().get::<RequestContext>().cloned() else {
        return next.run(request).await;
    };

    tracing::info!(
        request_id = %ctx.request_id,
        client_ip = ctx.client_ip.as_deref().unwrap_or("-"),
        method = %ctx.method,
        path = %ctx.path,
        "Request received"
    );

    let response = next.run(request).await;

    let outcome = response
        .extensions()
        .get::<ExchangeOutcome>()
        .cloned()
        .unwrap_or_default();
    let status = response.status().as_u16();
    let model = outcome.model.as_deref().unwrap_or("-");

    if outcome.error_kind.is_some() {
        tracing::warn!(
            request_id = %ctx.request_id,
            status,
            model,
            outcome = outcome.label(),
            detail = outcome.detail.as_deref().unwrap_or(""),
            elapsed_ms = ctx.elapsed_ms(),
            "Request failed"
        );
    } else {
        tracing::info!(
            request_id = %ctx.request_id,
            status,
            model,
            outcome = outcome.label(),
            elapsed_ms = ctx.elapsed_ms(),
            "Request completed"
        );
    }

    response
}
