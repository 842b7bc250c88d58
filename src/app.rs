//! Application struct that encapsulates server assembly and serving logic.

use crate::cli::RunArgs;
use gateway_core::config::{Config, Secrets};
use gateway_core::lifecycle::signal::SignalHandler;
use gateway_core::lifecycle::{self, Lifecycle};
use gateway_core::provider::UpstreamForwarder;
use gateway_provider::GeminiForwarder;
use gateway_server::AppState;
use std::sync::Arc;

pub struct Application {
    config: Arc<Config>,
    app_router: axum::Router,
    lifecycle: Box<dyn Lifecycle>,
}

/// Everything the gateway needs at startup, loaded exactly once.
pub struct Settings {
    pub config: Config,
    pub secrets: Secrets,
    /// False when the config file was absent and defaults were used.
    pub config_found: bool,
}

/// Load the config file, apply CLI/env overrides, and read both secrets.
pub fn load_settings(args: &RunArgs) -> anyhow::Result<Settings> {
    let (mut config, config_found) = Config::load_or_default(&args.config)?;

    if let Some(ref host) = args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ref model) = args.default_model {
        config.default_model = model.clone();
    }
    if let Some(ref base_url) = args.upstream_base_url {
        config.upstream_base_url = base_url.clone();
    }
    let config = config.finalize()?;

    // Secrets come from the environment (or `.env`) only, never from flags or the file.
    let secrets = Secrets::from_env()?;

    Ok(Settings {
        config,
        secrets,
        config_found,
    })
}

impl Application {
    /// Build the upstream forwarder and the router from loaded settings.
    pub fn build(settings: Settings) -> anyhow::Result<Self> {
        let Settings { config, secrets, .. } = settings;
        let Secrets {
            shared_secret,
            upstream_api_key,
        } = secrets;

        let forwarder = GeminiForwarder::from_config(&config, upstream_api_key)?;

        tracing::info!(
            provider = forwarder.identifier(),
            upstream = %config.upstream_base_url,
            default_model = %config.default_model,
            connect_timeout = config.connect_timeout,
            request_timeout = config.request_timeout,
            "Upstream forwarder configured"
        );

        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            shared_secret: Arc::new(shared_secret),
            forwarder: Arc::new(forwarder),
        };
        let app_router = gateway_server::build_router(state);

        Ok(Self {
            config,
            app_router,
            lifecycle: lifecycle::detect_lifecycle(),
        })
    }

    /// Serve HTTP until SIGINT/SIGTERM, then drain in-flight requests.
    pub async fn serve(self) -> anyhow::Result<()> {
        let Self {
            config,
            app_router,
            lifecycle,
        } = self;

        let (signal_handler, mut shutdown_rx) = SignalHandler::new();
        tokio::spawn(signal_handler.run());

        let addr = config.listen_addr();
        tracing::info!("Starting HTTP server on {addr}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        lifecycle.on_ready();

        let shutdown = async move {
            let _ = shutdown_rx.wait_for(|v| *v).await;
        };

        axum::serve(listener, app_router)
            .with_graceful_shutdown(shutdown)
            .await?;

        lifecycle.on_stopping();
        tracing::info!("Server shut down.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(path: &std::path::Path) -> RunArgs {
        RunArgs {
            config: path.to_str().unwrap().to_string(),
            host: None,
            port: None,
            default_model: None,
            upstream_base_url: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_malformed_config_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.yaml");
        std::fs::write(&path, "port: [not a port\n").unwrap();

        assert!(load_settings(&args_for(&path)).is_err());
    }

    #[test]
    fn test_invalid_override_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(&dir.path().join("absent.yaml"));
        args.upstream_base_url = Some("ftp://example.com".to_string());

        assert!(load_settings(&args).is_err());
    }
}
