//! Explicit UI state and the reducer that drives it.
//!
//! Every transition of a submission is an [`Action`] applied by [`reduce`],
//! a pure function from the old state to the new one:
//!
//! ```text
//! Idle ──Submit──▶ Scraping ──ScrapeFailed──▶ ScrapeFailed
//!                     │
//!                ScrapeSucceeded
//!                     ▼
//!                  Scraped ──EvaluateStarted──▶ Evaluating ──EvaluateFailed──▶ EvaluateFailed
//!                                                   │
//!                                            EvaluateSucceeded
//!                                                   ▼
//!                                               Evaluated
//! ```
//!
//! `Interrupted` is reachable from any in-flight phase when the submission is
//! dropped before finishing.
//!
//! Each action carries the [`SubmissionId`] it belongs to. Actions for any
//! submission other than the latest one are discarded, so a slow response to
//! an old submission can never overwrite a newer one. Transitions that are not
//! legal from the current phase are discarded the same way.

use crate::models::{Article, Evaluation};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

/// Identifies one submission. Later submissions have larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SubmissionId(u64);

impl SubmissionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the current submission is in the scrape-then-evaluate sequence.
///
/// `Scraped` is transient: the evaluate call is issued as soon as the article
/// arrives. `Interrupted` marks a submission abandoned before it settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Scraping,
    ScrapeFailed,
    Scraped,
    Evaluating,
    EvaluateFailed,
    Evaluated,
    Interrupted,
}

impl Phase {
    /// Whether this phase ends a submission.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Idle
                | Phase::ScrapeFailed
                | Phase::EvaluateFailed
                | Phase::Evaluated
                | Phase::Interrupted
        )
    }
}

/// Everything the front end shows.
///
/// Only [`reduce`] produces new states. The in-flight flags are derived from
/// [`Phase`] rather than stored, so they cannot disagree with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    pub submission: Option<SubmissionId>,
    pub submitted_at: Option<DateTime<Local>>,
    pub url: Option<String>,
    pub phase: Phase,
    pub article: Option<Article>,
    pub evaluation: Option<Evaluation>,
    pub error: Option<String>,
}

impl AppState {
    /// Scrape call in flight.
    pub fn is_scraping(&self) -> bool {
        self.phase == Phase::Scraping
    }

    /// Evaluate call in flight. `Scraped` counts: the evaluate call is issued
    /// immediately and the user sees no gap.
    pub fn is_evaluating(&self) -> bool {
        matches!(self.phase, Phase::Scraped | Phase::Evaluating)
    }

    /// Either call in flight. The form is disabled while this holds.
    pub fn is_loading(&self) -> bool {
        self.is_scraping() || self.is_evaluating()
    }

    /// Whether `id` is the submission this state belongs to.
    pub fn is_current(&self, id: SubmissionId) -> bool {
        self.submission == Some(id)
    }
}

/// One event in a submission's life, tagged with its [`SubmissionId`].
///
/// Actions for any submission other than the current one are ignored by
/// [`reduce`], except `Submit` with a newer id, which starts over.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Submit {
        id: SubmissionId,
        url: String,
        at: DateTime<Local>,
    },
    ScrapeSucceeded {
        id: SubmissionId,
        article: Article,
    },
    ScrapeFailed {
        id: SubmissionId,
        message: String,
    },
    EvaluateStarted {
        id: SubmissionId,
    },
    EvaluateSucceeded {
        id: SubmissionId,
        evaluation: Evaluation,
    },
    /// `message` is shown to the user; `None` fails quietly and only hides
    /// the evaluation section.
    EvaluateFailed {
        id: SubmissionId,
        message: Option<String>,
    },
    Interrupted {
        id: SubmissionId,
    },
}

impl Action {
    pub fn submission(&self) -> SubmissionId {
        match self {
            Action::Submit { id, .. }
            | Action::ScrapeSucceeded { id, .. }
            | Action::ScrapeFailed { id, .. }
            | Action::EvaluateStarted { id }
            | Action::EvaluateSucceeded { id, .. }
            | Action::EvaluateFailed { id, .. }
            | Action::Interrupted { id } => *id,
        }
    }
}

/// Apply `action` to `state`.
pub fn reduce(state: AppState, action: Action) -> AppState {
    if let Action::Submit { id, url, at } = action {
        if state.submission.is_some_and(|current| current >= id) {
            return state;
        }
        return AppState {
            submission: Some(id),
            submitted_at: Some(at),
            url: Some(url),
            phase: Phase::Scraping,
            article: None,
            evaluation: None,
            error: None,
        };
    }

    if !state.is_current(action.submission()) {
        return state;
    }

    match (state.phase, action) {
        (Phase::Scraping, Action::ScrapeSucceeded { article, .. }) => AppState {
            phase: Phase::Scraped,
            article: Some(article),
            ..state
        },
        (Phase::Scraping, Action::ScrapeFailed { message, .. }) => AppState {
            phase: Phase::ScrapeFailed,
            article: None,
            evaluation: None,
            error: Some(message),
            ..state
        },
        (Phase::Scraped, Action::EvaluateStarted { .. }) => AppState {
            phase: Phase::Evaluating,
            ..state
        },
        (Phase::Evaluating, Action::EvaluateSucceeded { evaluation, .. }) => AppState {
            phase: Phase::Evaluated,
            evaluation: Some(evaluation),
            ..state
        },
        (Phase::Evaluating, Action::EvaluateFailed { message, .. }) => AppState {
            phase: Phase::EvaluateFailed,
            evaluation: None,
            error: message,
            ..state
        },
        (Phase::Scraping | Phase::Scraped | Phase::Evaluating, Action::Interrupted { .. }) => {
            AppState {
                phase: Phase::Interrupted,
                ..state
            }
        }
        (_, _) => state,
    }
}
