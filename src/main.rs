//! # Article Ethics
//!
//! A terminal client for an article-ethics service. Give it a news article
//! URL; it asks the backend to scrape the article, shows it, then asks the
//! backend for an AI evaluation of the article against eight journalism
//! ethics dimensions and shows that too.
//!
//! ## Usage
//!
//! ```sh
//! article_ethics evaluate https://n.news.naver.com/mnews/article/001/0014612345
//! article_ethics            # prompt for URLs
//! article_ethics health     # probe the backend
//! ```
//!
//! ## Architecture
//!
//! 1. **Form**: trims the input and refuses blank submissions
//! 2. **Orchestrator**: runs `POST /scrape`, then `POST /evaluate` with the
//!    scraped title and body, recording every step as a reducer action
//! 3. **Renderers**: turn the current state into Markdown or JSON
//!
//! The backend address comes from `--api-base`, `API_BASE`, or a config file,
//! and defaults to `http://localhost:8000`.

use clap::Parser;
use std::error::Error;
use std::io::IsTerminal;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod app;
mod cli;
mod config;
mod form;
mod models;
mod orchestrator;
mod render;
mod state;
mod utils;

use api::HttpBackend;
use app::App;
use cli::{Cli, Command};
use config::Settings;
use render::RenderOptions;

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

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref()).await?;
    if let Some(api_base) = args.api_base.as_deref() {
        settings = settings.with_api_base(api_base)?;
    }
    if let Some(secs) = args.timeout_secs {
        settings = settings.with_timeout_secs(secs);
    }
    info!(api_base = %settings.api_base, timeout = ?settings.timeout, "Using backend");

    let backend = HttpBackend::new(&settings)?;
    let render = RenderOptions {
        color: !args.no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal(),
    };

    let result = match args.command() {
        Command::Health => app::run_health(&backend, args.format).await,
        Command::Evaluate { url } => App::new(backend, args.format, render)
            .run_once(&url)
            .await
            .map(|_| ()),
        Command::Interactive => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            App::new(backend, args.format, render)
                .run_interactive(stdin)
                .await
                .map(|_| ())
        }
    };

    if let Err(e) = &result {
        error!(error = %e, "Execution failed");
    }
    result
}
