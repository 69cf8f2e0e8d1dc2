use cad_downloader::cli::Cli;
use cad_downloader::downloader::Downloader;
use cad_downloader::fetcher::HttpFetcher;
use cad_downloader::parser;
use cad_downloader::reporter::ConsoleReporter;
use clap::Parser;
use colored::*;
use log::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("Starting URL list downloader");

    let cli = Cli::parse();
    info!(
        "CLI arguments parsed: input={}, output={}, workers={}, timeout={}s",
        cli.input.display(),
        cli.output.display(),
        cli.workers,
        cli.timeout
    );

    let urls = match parser::load_urls(&cli.input).await {
        Ok(urls) => {
            info!("Loaded {} URLs", urls.len());
            urls
        }
        Err(e) => {
            error!("Failed to load URL list: {}", e);
            eprintln!("{}", "Failed to load URL list".red());
            return Err(e.into());
        }
    };

    let fetcher = HttpFetcher::new(cli.timeout())?;
    let downloader = Downloader::new(fetcher, cli.workers);
    let reporter = ConsoleReporter::new();

    let stats = downloader.download_all(urls, &cli.output, &reporter).await?;
    if stats.fail_count > 0 {
        info!("{} downloads failed", stats.fail_count);
    }

    Ok(())
}
