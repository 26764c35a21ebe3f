//! # News Analyzer
//!
//! Fetches articles from the New York Times developer API, counts their
//! keyword tags and publication days, and renders the result as a terminal
//! report, JSON, or an interactive web dashboard.
//!
//! ## Usage
//!
//! ```sh
//! news_analyzer search --section technology --start 2024-01-01 --end 2024-01-07
//! news_analyzer top-stories --section science --keyword mars
//! news_analyzer serve --bind 0.0.0.0:8501
//! ```
//!
//! ## Architecture
//!
//! Every fetch runs the same pipeline:
//! 1. **Fetching**: One API call per day (search) or per section (top stories)
//! 2. **Extraction**: Typed parse of each record into an `Article`
//! 3. **Aggregation**: Keyword frequencies and articles per day
//! 4. **Output**: Terminal text, JSON, or the dashboard page

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod api;
mod cli;
mod config;
mod extract;
mod models;
mod outputs;
mod pipeline;
mod utils;
mod web;

use api::NytClient;
use cli::{Cli, Command};
use outputs::{json, text};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("news_analyzer starting up");

    let args = Cli::parse();
    debug!(command = ?args.command, config = ?args.config, "Parsed CLI arguments");

    // ---- Configuration & credential (fatal when missing) ----
    let settings = args.settings().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    let api_key = config::load_api_key(args.api_key.as_deref(), &settings.api_key_file)
        .inspect_err(|e| error!(error = %e, "Cannot start without an API key"))?;
    let client = NytClient::new(&settings, api_key)?;
    info!(
        base_url = %settings.base_url,
        timeout_secs = settings.request_timeout_secs,
        concurrency = settings.concurrency,
        "API client ready"
    );

    match args.command.fetch_request(Local::now().date_naive()) {
        Some(request) => {
            let report = pipeline::run(&client, &request, &settings).await;
            if args.command.wants_json() {
                println!("{}", json::to_json(&report)?);
            } else {
                print!("{}", text::render(&report));
            }
        }
        None => {
            if let Command::Serve { bind } = &args.command {
                web::serve(bind, web::AppState { client, settings }).await?;
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
