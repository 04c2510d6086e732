use std::process::ExitCode;

use festdb::{Config, processor};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,festdb=debug".to_string()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "invalid configuration");
            return ExitCode::FAILURE;
        },
    };

    tracing::info!(raw_dir = %config.raw_dir.display(), out = %config.out_file.display(), "building canonical dataset");

    match processor::run(&config) {
        Ok(report) => {
            if !report.is_clean() {
                tracing::warn!("dataset written with data-completeness warnings");
            }
            ExitCode::SUCCESS
        },
        Err(err) => {
            tracing::error!("build failed: {err}");
            ExitCode::FAILURE
        },
    }
}
