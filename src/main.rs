//! Scrape one product page and print the record as JSON
//!
//! Usage: stock-probe <product-url> [--config <path>]

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use stock_probe::infrastructure::{ConfigManager, ProductScraper, init_logging_with_config};

struct Args {
    product_url: String,
    config_path: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut product_url = None;
    let mut config_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = Some(args.next().context("--config needs a path")?),
            "-h" | "--help" => bail!("usage: stock-probe <product-url> [--config <path>]"),
            _ if product_url.is_none() => product_url = Some(arg),
            _ => bail!("unexpected argument: {arg}"),
        }
    }

    Ok(Args {
        product_url: product_url.context("usage: stock-probe <product-url> [--config <path>]")?,
        config_path,
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = parse_args()?;

    let manager = match &args.config_path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config = manager.load_config().await?;
    init_logging_with_config(&config.logging)?;

    let scraper = ProductScraper::new(&config)?;
    match scraper.scrape(&args.product_url).await {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let failure = serde_json::json!({
                "error": e.kind().code(),
                "message": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&failure)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
