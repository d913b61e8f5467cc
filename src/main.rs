use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use courier::cli::{run, Cli};
use courier::config::ClientConfig;
use courier::net::Client;
use courier::render::Style;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = cli.to_request()?;

    let default_filter = if cfg.options.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let client = Client::new(ClientConfig::default())?;
    let style = if std::io::stdout().is_terminal() { Style::Ansi } else { Style::Plain };

    let mut stdout = std::io::stdout().lock();
    run::execute(cfg, &client, style, &mut stdout).await
}
