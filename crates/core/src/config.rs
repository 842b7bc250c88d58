use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub const SHARED_SECRET_ENV: &str = "GATEWAY_SHARED_SECRET";
pub const UPSTREAM_API_KEY_ENV: &str = "GEMINI_API_KEY";

// ─── Config ────────────────────────────────────────────────────────────────

/// Non-secret gateway settings, loaded from YAML and overridable from the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Upstream
    pub upstream_base_url: String,
    pub default_model: String,
    pub proxy_url: Option<String>,

    // Timeouts (seconds)
    pub connect_timeout: u64,
    pub request_timeout: u64,

    // Request body size limit (MB)
    pub body_limit_mb: usize,

    // Logging
    pub log_format: LogFormat,
    pub logging_to_file: bool,
    pub log_dir: Option<String>,
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            proxy_url: None,
            connect_timeout: 10,
            request_timeout: 120,
            body_limit_mb: 10,
            log_format: LogFormat::Text,
            logging_to_file: false,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load config from a YAML file, sanitize, and validate.
    pub fn load(path: &str) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml_ng::from_str(&contents)?;
        config.sanitize();
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but falls back to defaults when the file does not exist.
    /// The flag tells whether the file was found.
    pub fn load_or_default(path: &str) -> Result<(Self, bool), anyhow::Error> {
        if !Path::new(path).exists() {
            return Ok((Config::default(), false));
        }
        Ok((Self::load(path)?, true))
    }

    /// Re-run sanitize and validate, e.g. after CLI overrides were applied.
    pub fn finalize(mut self) -> Result<Self, anyhow::Error> {
        self.sanitize();
        self.validate()?;
        Ok(self)
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.saturating_mul(1024 * 1024)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        let parsed = url::Url::parse(&self.upstream_base_url).map_err(|e| {
            anyhow::anyhow!("invalid upstream-base-url '{}': {e}", self.upstream_base_url)
        })?;
        anyhow::ensure!(
            matches!(parsed.scheme(), "http" | "https"),
            "upstream-base-url must use http or https, got '{}'",
            parsed.scheme()
        );
        anyhow::ensure!(!self.default_model.is_empty(), "default-model must not be empty");
        anyhow::ensure!(self.connect_timeout > 0, "connect-timeout must be positive");
        anyhow::ensure!(self.request_timeout > 0, "request-timeout must be positive");
        anyhow::ensure!(
            self.body_limit_mb > 0 && self.body_limit_mb.checked_mul(1024 * 1024).is_some(),
            "body-limit-mb must be positive and fit in memory addressing, got {}",
            self.body_limit_mb
        );
        if let Some(ref proxy) = self.proxy_url {
            crate::proxy::validate_proxy_url(proxy)?;
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        self.upstream_base_url = self.upstream_base_url.trim().trim_end_matches('/').to_string();
        self.default_model = self.default_model.trim().to_string();
        if self.proxy_url.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.proxy_url = None;
        }
    }
}

// ─── Secrets ───────────────────────────────────────────────────────────────

/// The two credentials the gateway holds. Never serialized, redacted in `Debug`.
#[derive(Debug)]
pub struct Secrets {
    /// Expected from clients as `Authorization: Bearer <secret>`.
    pub shared_secret: SecretString,
    /// Attached to outbound calls only.
    pub upstream_api_key: SecretString,
}

impl Secrets {
    pub fn new(
        shared_secret: impl Into<String>,
        upstream_api_key: impl Into<String>,
    ) -> Result<Self, anyhow::Error> {
        let shared_secret: String = shared_secret.into();
        let upstream_api_key: String = upstream_api_key.into();
        anyhow::ensure!(
            !shared_secret.trim().is_empty(),
            "{SHARED_SECRET_ENV} must be set to a non-empty value"
        );
        anyhow::ensure!(
            !upstream_api_key.trim().is_empty(),
            "{UPSTREAM_API_KEY_ENV} must be set to a non-empty value"
        );
        Ok(Self {
            shared_secret: SecretString::from(shared_secret),
            upstream_api_key: SecretString::from(upstream_api_key),
        })
    }

    /// Read both secrets from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let shared = std::env::var(SHARED_SECRET_ENV)
            .map_err(|_| anyhow::anyhow!("{SHARED_SECRET_ENV} is not set"))?;
        let upstream = std::env::var(UPSTREAM_API_KEY_ENV)
            .map_err(|_| anyhow::anyhow!("{UPSTREAM_API_KEY_ENV} is not set"))?;
        Self::new(shared, upstream)
    }

    /// Length hint for startup logs; never the value itself.
    pub fn describe(&self) -> String {
        format!(
            "shared secret: {} chars, upstream key: {} chars",
            self.shared_secret.expose_secret().len(),
            self.upstream_api_key.expose_secret().len()
        )
    }
}
