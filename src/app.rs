//! Terminal front end: runs submissions, shows progress, prints results.
//!
//! Results go to stdout (Markdown or JSON). Prompts and loading messages go
//! to stderr, so `article_ethics evaluate URL > result.md` captures only the
//! result.

use crate::api::{HttpBackend, NewsBackend};
use crate::cli::OutputFormat;
use crate::form::UrlForm;
use crate::orchestrator::Orchestrator;
use crate::render::{RenderOptions, loading_message, outcome_summary, page_json, render_page};
use crate::state::{AppState, Phase, SubmissionId};
use futures::future::{self, Either};
use std::error::Error;
use std::io::Write as _;
use std::pin::pin;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

const PROMPT: &str = "기사 URL> ";
const QUIT_WORDS: [&str; 3] = ["quit", "exit", ":q"];
const SCRAPE_FAILED_ERROR: &str = "scrape failed";

/// The terminal front end over an [`Orchestrator`].
///
/// Owns the output format and render options, and prints each settled state
/// to stdout.
pub struct App<B> {
    orchestrator: Orchestrator<B>,
    format: OutputFormat,
    render: RenderOptions,
}

impl<B: NewsBackend> App<B> {
    pub fn new(backend: B, format: OutputFormat, render: RenderOptions) -> Self {
        Self {
            orchestrator: Orchestrator::new(backend),
            format,
            render,
        }
    }

    pub fn state(&self) -> AppState {
        self.orchestrator.snapshot()
    }

    /// Render a state in the configured format.
    pub fn format_state(&self, state: &AppState) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Markdown => Ok(render_page(state, self.render)),
            OutputFormat::Json => page_json(state),
        }
    }

    /// Submit and print loading messages until the submission settles.
    async fn submit_with_progress(&self, url: &str) -> Option<SubmissionId> {
        let submission = pin!(self.orchestrator.submit(url));
        let reporter = pin!(report_progress(self.orchestrator.subscribe()));
        match future::select(submission, reporter).await {
            Either::Left((id, _)) => id,
            Either::Right(((), submission)) => submission.await,
        }
    }

    /// Evaluate one URL and print the result.
    ///
    /// # Arguments
    ///
    /// * `url` - The article URL as typed. Surrounding whitespace is trimmed.
    ///
    /// # Returns
    ///
    /// The settled [`AppState`]. A scrape failure is returned as a short
    /// `"scrape failed"` error so the process exits non-zero; the backend's
    /// message is already in the printed result. An evaluation failure is
    /// not an error: the article was still retrieved.
    #[instrument(level = "info", skip(self))]
    pub async fn run_once(&self, url: &str) -> Result<AppState, Box<dyn Error>> {
        let mut form = UrlForm::new();
        form.set_value(url);
        let Some(url) = form.submit() else {
            return Err("no article URL given".into());
        };

        self.submit_with_progress(&url).await;
        let state = self.state();
        println!("{}", self.format_state(&state)?);

        if state.phase == Phase::ScrapeFailed {
            return Err(SCRAPE_FAILED_ERROR.into());
        }
        Ok(state)
    }

    /// Prompt for URLs until EOF or a quit word. Returns how many submissions
    /// were made.
    #[instrument(level = "info", skip_all)]
    pub async fn run_interactive<R>(&self, input: R) -> Result<usize, Box<dyn Error>>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut form = UrlForm::new();
        let mut lines = input.lines();
        let mut submitted = 0usize;

        prompt();
        while let Some(line) = lines.next_line().await? {
            if QUIT_WORDS.contains(&line.trim()) {
                break;
            }
            form.set_value(line);
            if !form.can_submit() {
                debug!("Ignoring blank input");
                prompt();
                continue;
            }
            let Some(url) = form.submit() else {
                continue;
            };

            form.set_disabled(true);
            self.submit_with_progress(&url).await;
            form.set_disabled(false);
            submitted += 1;

            let state = self.state();
            println!("{}", self.format_state(&state)?);
            let summary = outcome_summary(&state);
            if !summary.is_empty() {
                eprintln!("{summary}");
            }
            prompt();
        }

        info!(submitted, "Interactive session ended");
        Ok(submitted)
    }
}

fn prompt() {
    eprint!("{PROMPT}");
    let _ = std::io::stderr().flush();
}

/// Print a line each time the loading message changes, until the submission
/// settles.
async fn report_progress(mut rx: watch::Receiver<AppState>) {
    let mut last: Option<&'static str> = None;
    while rx.changed().await.is_ok() {
        let (message, settled) = {
            let state = rx.borrow_and_update();
            (loading_message(&state), state.phase.is_terminal())
        };
        if let Some(m) = message.filter(|m| Some(*m) != last) {
            eprintln!("⏳ {m}");
        }
        if settled {
            break;
        }
        last = message;
    }
}

/// Probe the backend and print its health.
#[instrument(level = "info", skip_all, fields(base = %backend.base()))]
pub async fn run_health(backend: &HttpBackend, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    let health = backend.health().await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
        OutputFormat::Markdown => println!(
            "{} {} {} ({})",
            health.status,
            health.service,
            health.version,
            backend.base()
        ),
    }
    if !health.is_healthy() {
        warn!(status = %health.status, "Backend reports unhealthy status");
        return Err(format!("backend status is {:?}", health.status).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BackendError;
    use crate::models::{Article, Evaluation, sample_article};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scrapes anything under `https://ok.example/`, rejects everything else.
    #[derive(Default)]
    struct StaticBackend {
        scrapes: AtomicUsize,
    }

    impl NewsBackend for StaticBackend {
        async fn scrape(&self, url: &str) -> Result<Article, BackendError> {
            self.scrapes.fetch_add(1, Ordering::SeqCst);
            if url.starts_with("https://ok.example/") {
                Ok(Article {
                    original_url: url.to_string(),
                    ..sample_article()
                })
            } else {
                Err(BackendError::Rejected {
                    status: 400,
                    message: Some("지원하지 않는 언론사입니다".to_string()),
                })
            }
        }

        async fn evaluate(&self, _title: &str, _body: &str) -> Result<Evaluation, BackendError> {
            Ok(Evaluation {
                evaluation_summary: "양호".to_string(),
                scores: BTreeMap::from([("truth".to_string(), 8.0)]),
                detailed_feedback: None,
            })
        }
    }

    fn app(format: OutputFormat) -> App<StaticBackend> {
        App::new(StaticBackend::default(), format, RenderOptions { color: false })
    }

    #[tokio::test]
    async fn test_run_once_success() {
        let app = app(OutputFormat::Markdown);
        let state = app.run_once("  https://ok.example/1 ").await.unwrap();
        assert_eq!(state.phase, Phase::Evaluated);
        assert_eq!(state.url.as_deref(), Some("https://ok.example/1"));
    }

    #[tokio::test]
    async fn test_run_once_scrape_failure_is_error() {
        let app = app(OutputFormat::Markdown);
        let err = app.run_once("https://bad.example/1").await.unwrap_err();
        assert_eq!(err.to_string(), "scrape failed");

        let state = app.state();
        assert_eq!(state.phase, Phase::ScrapeFailed);
        assert_eq!(state.error.as_deref(), Some("지원하지 않는 언론사입니다"));
        assert!(app.format_state(&state).unwrap().contains("지원하지 않는 언론사입니다"));
    }

    #[tokio::test]
    async fn test_run_once_blank_url() {
        let app = app(OutputFormat::Markdown);
        assert!(app.run_once("   ").await.is_err());
        assert_eq!(app.orchestrator.backend().scrapes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_interactive_skips_blank_lines() {
        let app = app(OutputFormat::Json);
        let input: &[u8] = b"https://ok.example/1\n\n   \nhttps://bad.example/2\nquit\nhttps://ok.example/3\n";
        let submitted = app.run_interactive(input).await.unwrap();

        assert_eq!(submitted, 2);
        assert_eq!(app.orchestrator.backend().scrapes.load(Ordering::SeqCst), 2);
        let state = app.state();
        assert_eq!(state.phase, Phase::ScrapeFailed);
        assert_eq!(state.submission, Some(SubmissionId::new(2)));
    }

    #[test]
    fn test_format_state_json() {
        let app = app(OutputFormat::Json);
        let out = app.format_state(&AppState::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["loading"], false);
    }
}
