mod cli;
mod commands {
    pub mod ingest;
    pub mod search;
}

use clap::Parser;
use cli::{Cli, Command};
use ft_core::app_error::{AppResult, EXIT_NO_MATCH};
use ft_core::config::AppConfig;
use ft_core::remote::{open_remote_store, RemoteTargetUri};
use ft_core::staging::StagingArea;
use std::path::{Path, PathBuf};

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("FT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> AppResult<AppConfig> {
    let mut cfg = AppConfig::load(cli.config.as_deref().map(Path::new))?;
    if let Some(remote) = &cli.remote {
        cfg.remote = remote.clone();
    }
    if let Some(root) = &cli.staging_root {
        cfg.staging_root = root.clone();
    }
    Ok(cfg)
}

fn run(cli: Cli, cfg: AppConfig) -> AppResult<i32> {
    let target = RemoteTargetUri::parse(&cfg.remote)?;
    let remote = open_remote_store(&target)?;
    let staging = StagingArea::new(PathBuf::from(&cfg.staging_root));

    match cli.cmd {
        Command::R { folder_name } => {
            commands::ingest::run_ingest(remote.as_ref(), &staging, &cfg, &folder_name)?;
            Ok(0)
        }
        Command::S { query, strict } => {
            let mut settings = cfg.search.clone();
            settings.strict_parse |= strict;
            let matched = commands::search::run_search(remote.as_ref(), &staging, &query, &settings)?;
            Ok(if matched { 0 } else { EXIT_NO_MATCH })
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{}: {}", err.code, err.message);
            std::process::exit(err.exit_code());
        }
    };
    init_logging(&cfg.log_level);

    match run(cli, cfg) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::debug!(details = %err.details, "command failed");
            eprintln!("{}: {}", err.code, err.message);
            std::process::exit(err.exit_code());
        }
    }
}
