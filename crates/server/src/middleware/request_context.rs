use axum::{extract::Request, middleware::Next, response::Response};
use gateway_core::context::RequestContext;

/// Stamp each request with a [`RequestContext`] extension.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let ctx = RequestContext::new(
        request.method().clone(),
        request.uri().path(),
        request.headers(),
    );
    request.extensions_mut().insert(ctx);
    next.run(request).await
}
