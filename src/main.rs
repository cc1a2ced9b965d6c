//! biquge-dl CLI - search a novel site and download a novel chapter by chapter.

use anyhow::{Context, Result};
use biquge_dl::config::Config;
use biquge_dl::console::Console;
use biquge_dl::crawler::Crawler;
use biquge_dl::session::Session;
use biquge_dl::site::{HttpTransport, SiteClient};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Web novel downloader.
#[derive(Parser, Debug)]
#[command(name = "biquge-dl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Title to search for first; prompts when omitted.
    search: Option<String>,

    /// Use this config file instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that receives the novel folders.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    biquge_dl::logging::init(args.verbose)?;
    let console = Console::new();

    console.section("biquge-dl - Web Novel Downloader");

    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(dir) = args.output_dir {
        config.download.output_directory = dir;
    }
    config.validate().context("Invalid configuration")?;

    let transport = HttpTransport::new(config.download.request_timeout())
        .context("Failed to create HTTP client")?;
    let site = SiteClient::new(Arc::new(transport), config.site.clone())
        .context("Failed to set up site profile")?;
    let crawler = Crawler::new(Arc::new(site), config.download.clone());

    console.info(&format!(
        "Saving novels under {}",
        config.download.output_directory.display()
    ));

    let stdin = std::io::stdin();
    let mut session = Session::new(crawler, console, stdin.lock());
    session
        .run(args.search)
        .await
        .context("Failed to read input")?;

    Ok(())
}
