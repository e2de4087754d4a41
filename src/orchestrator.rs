//! Sequences the scrape and evaluate calls for each submission.
//!
//! The orchestrator owns the [`AppState`] and publishes it through a
//! [`tokio::sync::watch`] channel, so a UI can follow along (loading
//! indicators) without polling. All mutation goes through [`reduce`].
//!
//! A submission runs two calls strictly in sequence:
//!
//! 1. `scrape(url)`. Failure ends the submission with an error banner.
//! 2. `evaluate(title, body)`, issued as soon as the article arrives. Failure
//!    keeps the article on screen and only leaves the evaluation empty.
//!
//! Every action is tagged with the submission's id, so when a user resubmits
//! before an earlier submission finishes, the earlier one's late responses are
//! dropped by the reducer instead of clobbering the new state.

use crate::api::{BackendError, NewsBackend, SCRAPE_FAILED_MESSAGE, UNKNOWN_ERROR_MESSAGE};
use crate::form::normalize_submission;
use crate::state::{Action, AppState, SubmissionId, reduce};
use chrono::Local;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Runs submissions against a [`NewsBackend`] and publishes the resulting
/// [`AppState`].
///
/// Submissions may overlap. Ids come from a counter, so the latest
/// submission always wins.
pub struct Orchestrator<B> {
    backend: B,
    state: watch::Sender<AppState>,
    next_id: AtomicU64,
}

impl<B: NewsBackend> Orchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: watch::Sender::new(AppState::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Follow state changes.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply one action. Returns whether it changed anything.
    pub fn dispatch(&self, action: Action) -> bool {
        let id = action.submission();
        let applied = self.state.send_if_modified(|state| {
            let next = reduce(state.clone(), action);
            if next == *state {
                return false;
            }
            *state = next;
            true
        });
        if !applied {
            debug!(submission = %id, "Discarded action");
        }
        applied
    }

    /// Run one submission to completion.
    ///
    /// # Arguments
    ///
    /// * `raw_url` - The URL as typed. It is trimmed before use.
    ///
    /// # Returns
    ///
    /// `None` for blank input, which changes no state and makes no network
    /// call. Otherwise the id assigned to this submission. The outcome is in
    /// the state, not in the return value.
    #[instrument(level = "info", skip(self))]
    pub async fn submit(&self, raw_url: &str) -> Option<SubmissionId> {
        let url = normalize_submission(raw_url)?;
        let id = SubmissionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let t0 = Instant::now();

        self.dispatch(Action::Submit {
            id,
            url: url.clone(),
            at: Local::now(),
        });
        let mut guard = InFlightGuard {
            orchestrator: self,
            id,
            armed: true,
        };

        self.run(id, &url).await;

        guard.armed = false;
        info!(
            submission = %id,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            phase = ?self.snapshot().phase,
            "Submission finished"
        );
        Some(id)
    }

    async fn run(&self, id: SubmissionId, url: &str) {
        let article = match self.backend.scrape(url).await {
            Ok(article) => article,
            Err(e) => {
                log_failure("scrape", id, &e);
                self.dispatch(Action::ScrapeFailed {
                    id,
                    message: e.user_message(SCRAPE_FAILED_MESSAGE),
                });
                return;
            }
        };

        let (title, body) = (article.title.clone(), article.body.clone());
        self.dispatch(Action::ScrapeSucceeded { id, article });
        if !self.dispatch(Action::EvaluateStarted { id }) {
            // superseded while scraping; the newer submission owns the screen
            return;
        }

        match self.backend.evaluate(&title, &body).await {
            Ok(evaluation) => {
                self.dispatch(Action::EvaluateSucceeded { id, evaluation });
            }
            Err(e) => {
                log_failure("evaluate", id, &e);
                let message = (!e.is_rejection()).then(|| UNKNOWN_ERROR_MESSAGE.to_string());
                self.dispatch(Action::EvaluateFailed { id, message });
            }
        }
    }
}

fn log_failure(call: &str, id: SubmissionId, e: &BackendError) {
    match e {
        BackendError::Rejected { status, message } => warn!(
            call,
            submission = %id,
            status,
            message = message.as_deref().unwrap_or(""),
            "Backend rejected request"
        ),
        other => error!(call, submission = %id, error = %other, "Backend call failed"),
    }
}

/// Marks a submission interrupted if its future is dropped mid-flight, so the
/// in-flight flags never outlive the calls they describe.
struct InFlightGuard<'a, B: NewsBackend> {
    orchestrator: &'a Orchestrator<B>,
    id: SubmissionId,
    armed: bool,
}

impl<B: NewsBackend> Drop for InFlightGuard<'_, B> {
    fn drop(&mut self) {
        if self.armed && self.orchestrator.dispatch(Action::Interrupted { id: self.id }) {
            warn!(submission = %self.id, "Submission dropped before finishing");
        }
    }
}
