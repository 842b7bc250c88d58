use crate::AppState;
use crate::auth;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use gateway_core::context::ExchangeOutcome;
use gateway_core::error::GatewayError;
use gateway_core::provider::UpstreamRequest;

/// Entry point for every request: preflight, then authenticate, then forward.
/// Failures become the JSON error envelope; the CORS layer wraps both.
pub async fn gateway(State(state): State<AppState>, request: Request) -> Response {
    if request.method() == Method::OPTIONS {
        return with_outcome(preflight(), ExchangeOutcome::preflight());
    }

    if let Err(e) = auth::authenticate(request.method(), request.headers(), &state.shared_secret) {
        return failure(None, e);
    }

    let model = resolve_model(request.uri(), &state.config.default_model);
    match forward(&state, model.clone(), request.into_body()).await {
        Ok(response) => with_outcome(response, ExchangeOutcome::forwarded(model)),
        Err(e) => failure(Some(model), e),
    }
}

/// CORS preflight: 200 with an empty body, no credential check.
pub fn preflight() -> Response {
    StatusCode::OK.into_response()
}

async fn forward(state: &AppState, model: String, body: Body) -> Result<Response, GatewayError> {
    let body = axum::body::to_bytes(body, state.config.body_limit_bytes())
        .await
        .map_err(|e| GatewayError::BadRequest(format!("failed to read request body: {e}")))?;

    let upstream = state
        .forwarder
        .forward(UpstreamRequest { model, body })
        .await?;
    Ok(upstream.into_response())
}

fn failure(model: Option<String>, error: GatewayError) -> Response {
    let outcome = ExchangeOutcome::failed(model, &error);
    with_outcome(error.into_response(), outcome)
}

fn with_outcome(mut response: Response, outcome: ExchangeOutcome) -> Response {
    response.extensions_mut().insert(outcome);
    response
}

/// First `model` query parameter, or `default_model` when absent or empty.
pub(crate) fn resolve_model(uri: &Uri, default_model: &str) -> String {
    uri.query()
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(k, _)| k == "model")
                .map(|(_, v)| v.into_owned())
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_model.to_string())
}
