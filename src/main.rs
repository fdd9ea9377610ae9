mod api;
mod catalog;
mod config;
mod logging;
mod models;
mod run;
mod ui;

use anyhow::{Context, Result};

use api::HttpGateway;
use catalog::Catalog;
use config::Config;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Help and version must work without a config file or log directory.
    if args.get(1).is_some_and(|cmd| run::print_meta(cmd)) {
        return Ok(());
    }

    let config = Config::load()?;
    logging::init(&config.log_path()?, &config.log_level)?;
    let mut catalog = build_catalog(&config)?;

    match args.len() {
        1 => run::as_tui(&mut catalog),
        _ => run::as_cli(&args, &mut catalog),
    }
}

fn build_catalog(config: &Config) -> Result<Catalog<HttpGateway>> {
    let gateway = HttpGateway::new(&config.api_url, config.request_timeout())
        .with_context(|| format!("Failed to create HTTP client for {}", config.api_url))?;
    tracing::info!(url = gateway.url(), page_size = config.page_size, "catalog ready");
    Ok(Catalog::new(gateway, config.page_size, config.search_delay()))
}
