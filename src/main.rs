mod app;
mod cli;

use clap::Parser;
use cli::{Cli, Command, RunArgs};
use gateway_core::lifecycle::logging::{self, LogSettings};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Command::Run(cli.run));

    match command {
        Command::Run(args) => cmd_run(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let settings = app::load_settings(&args);

    // Logging follows the loaded config; on a load failure stderr defaults
    // are used so the error itself is still reported.
    let log_settings = settings
        .as_ref()
        .map(|s| LogSettings::from_config(&s.config))
        .unwrap_or_default();
    let _guard = logging::init_logging(&args.log_level, &log_settings);

    let settings = settings.inspect_err(|e| tracing::error!("Startup failed: {e:#}"))?;
    if !settings.config_found {
        tracing::warn!("Config file '{}' not found, using defaults", args.config);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let application = app::Application::build(settings)?;
        application.serve().await
    })
}

fn cmd_check(args: RunArgs) -> anyhow::Result<()> {
    let _guard = logging::init_logging("warn", &LogSettings::default());
    let app::Settings {
        config,
        secrets,
        config_found,
    } = app::load_settings(&args)?;

    if !config_found {
        println!("Config file '{}' not found, defaults in effect", args.config);
    }
    println!("Configuration OK");
    println!("  listen:         {}", config.listen_addr());
    println!("  upstream:       {}", config.upstream_base_url);
    println!("  default model:  {}", config.default_model);
    println!(
        "  timeouts:       connect {}s, request {}s",
        config.connect_timeout, config.request_timeout
    );
    println!("  body limit:     {} MB", config.body_limit_mb);
    println!("  log format:     {:?}", config.log_format);
    println!("  secrets:        {}", secrets.describe());
    Ok(())
}
