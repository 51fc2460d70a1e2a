//! basic-file-server entry point.

use anyhow::Context;
use basic_file_server::{
    config::{Cli, Command, Config, ServeArgs},
    server,
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    match cli.command {
        Some(Command::Init { force }) => cmd_init(force),
        Some(Command::Serve(args)) => cmd_serve(config, args).await,
        None => cmd_serve(config, cli.serve).await,
    }
}

/// Write a default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());

    Ok(())
}

/// Directory containing the running executable.
fn executable_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot determine executable location")?;
    exe.parent()
        .map(|p| p.to_path_buf())
        .context("Executable has no parent directory")
}

/// Start the server.
async fn cmd_serve(mut config: Config, args: ServeArgs) -> anyhow::Result<()> {
    config.apply_args(&args);

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basic_file_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let root = match config.server.base_path.clone() {
        Some(path) => path,
        None => executable_dir()?,
    };

    let bind = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    tracing::info!(
        bind = %bind,
        root = %root.display(),
        cache = %config.cache.dir.display(),
        policy = ?config.images.policy,
        allowed_ip = ?config.server.allowed_ip,
        "Starting basic-file-server"
    );

    let state = server::AppState::new(config, root);

    // Writes fail later (and are logged) if this does not succeed.
    if let Err(e) = state.listings.ensure_dir() {
        tracing::warn!(
            dir = %state.listings.dir().display(),
            error = %e,
            "Failed to create cache directory"
        );
    }

    let app = server::create_router(state);

    let listener = TcpListener::bind(bind).await?;
    tracing::info!(address = %bind, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
