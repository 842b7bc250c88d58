use async_trait::async_trait;
use bytes::Bytes;
use gateway_core::config::Config;
use gateway_core::error::GatewayError;
use gateway_core::provider::{UpstreamForwarder, UpstreamRequest, UpstreamResponse};
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};

/// Forwards generation requests to the Gemini `generateContent` endpoint,
/// authenticating with the provider key in the `key` query parameter.
pub struct GeminiForwarder {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl GeminiForwarder {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Build the forwarder with an HTTP client configured from `config`.
    pub fn from_config(config: &Config, api_key: SecretString) -> Result<Self, anyhow::Error> {
        let client = gateway_core::proxy::build_http_client(
            config.proxy_url.as_deref(),
            config.connect_timeout,
            config.request_timeout,
        )?;
        Ok(Self::new(client, config.upstream_base_url.clone(), api_key))
    }

    /// `{base}/v1beta/models/{model}:generateContent?key={api_key}`
    fn endpoint(&self, model: &str) -> Result<url::Url, GatewayError> {
        build_endpoint(&self.base_url, model, self.api_key.expose_secret())
    }
}

fn build_endpoint(base_url: &str, model: &str, api_key: &str) -> Result<url::Url, GatewayError> {
    let mut url = url::Url::parse(base_url)
        .map_err(|e| GatewayError::Upstream(format!("invalid upstream base URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| GatewayError::Upstream("upstream base URL cannot carry a path".into()))?
        .pop_if_empty()
        .extend(["v1beta", "models", &format!("{model}:generateContent")]);
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

#[async_trait]
impl UpstreamForwarder for GeminiForwarder {
    fn identifier(&self) -> &str {
        "gemini"
    }

    async fn forward(&self, request: UpstreamRequest) -> Result<UpstreamResponse, GatewayError> {
        let UpstreamRequest { model, body } = request;
        let url = self.endpoint(&model)?;
        tracing::debug!(model = %model, bytes = body.len(), "Forwarding to Gemini");

        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let content_type = resp.headers().get(CONTENT_TYPE).cloned();
        let body: Bytes = resp.bytes().await?;

        let response = UpstreamResponse {
            status,
            content_type,
            body,
        };
        if !response.is_success() {
            tracing::debug!(
                model = %model,
                status = status.as_u16(),
                "Gemini returned an error status, relaying as-is"
            );
        }
        Ok(response)
    }
}
