mod args;
mod commands;
mod output;
mod utils;

use args::Cli;
use clap::Parser;
use client::{AppContext, ClientConfig, Result};
use output::TerminalNotifier;
use std::{process::ExitCode, sync::Arc};

/// Reads the environment, letting `--api-url` stand in for a missing
/// `REGISTRAR_API_URL`
fn config(api_url: Option<&str>) -> Result<ClientConfig> {
    let mut config = match (ClientConfig::from_env(), api_url) {
        (Ok(config), _) => config,
        (Err(e), Some(url)) => {
            log::debug!("falling back to defaults: {e}");
            ClientConfig::new(url)
        }
        (Err(e), None) => return Err(e),
    };

    if let Some(url) = api_url {
        config.api_url = url.trim_end_matches('/').to_owned();
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let ctx = match config(cli.api_url.as_deref()).and_then(|c| AppContext::from_config(&c)) {
        Ok(ctx) => ctx.with_notifier(Arc::new(TerminalNotifier)),
        Err(e) => {
            output::print_error(&e);
            return ExitCode::FAILURE;
        }
    };
    log::debug!("session is {:?}", ctx.session().state());

    match commands::run(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
