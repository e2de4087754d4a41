//! Renderers for articles, evaluations, and the page as a whole.
//!
//! Everything here is a pure function of already-fetched data. The Markdown
//! renderers produce what the terminal shows; [`page_json`] produces the same
//! view for machine consumers.
//!
//! # Dimensions
//!
//! Evaluations are always shown over the same eight dimensions in the same
//! order, see [`DIMENSIONS`]. A dimension missing from the response shows as
//! `0`; it is never an error.

use crate::models::{Article, Evaluation};
use crate::state::{AppState, Phase};
use crate::utils::format_score;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// One evaluation dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    /// Canonical score key.
    pub key: &'static str,
    /// Other keys the evaluation service is known to emit for this dimension.
    pub aliases: &'static [&'static str],
    pub label: &'static str,
    /// ANSI SGR color for the score bar.
    pub color: &'static str,
}

impl Dimension {
    /// Look this dimension up in `scores`, defaulting to `0`.
    pub fn score_in(&self, scores: &BTreeMap<String, f64>) -> f64 {
        std::iter::once(self.key)
            .chain(self.aliases.iter().copied())
            .find_map(|key| scores.get(key).copied())
            .unwrap_or(0.0)
    }
}

pub const DIMENSIONS: [Dimension; 8] = [
    Dimension {
        key: "truth",
        aliases: &["진실성"],
        label: "진실성 (Truth)",
        color: "34",
    },
    Dimension {
        key: "accuracy",
        aliases: &["정확성"],
        label: "정확성 (Accuracy)",
        color: "32",
    },
    Dimension {
        key: "fairness",
        aliases: &["공정성"],
        label: "공정성 (Fairness)",
        color: "33",
    },
    Dimension {
        key: "transparency",
        aliases: &["투명성"],
        label: "투명성 (Transparency)",
        color: "35",
    },
    Dimension {
        key: "context",
        aliases: &["맥락"],
        label: "맥락 (Context)",
        color: "95",
    },
    Dimension {
        key: "human-rights-respect",
        aliases: &["human_rights_respect", "인권_존중"],
        label: "인권 존중 (Human Rights)",
        color: "31",
    },
    Dimension {
        key: "accountability",
        aliases: &["책임성"],
        label: "책임성 (Accountability)",
        color: "94",
    },
    Dimension {
        key: "independence",
        aliases: &["독립성"],
        label: "독립성 (Independence)",
        color: "36",
    },
];

pub const SCRAPING_MESSAGE: &str = "기사를 스크래핑하고 있습니다...";
pub const EVALUATING_MESSAGE: &str = "AI가 기사를 평가하고 있습니다...";

const BAR_WIDTH: usize = 20;

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Mean of every score present in the mapping, `None` when there are none.
///
/// This is the mean over what the evaluator reported, not over the eight
/// fixed dimensions: an omitted dimension does not pull the average down.
pub fn average_score(scores: &BTreeMap<String, f64>) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.values().sum::<f64>() / scores.len() as f64)
}

/// The average as displayed: one decimal, or `0` when nothing was scored.
///
/// Ties round half away from zero, so a mean of `7.25` shows as `7.3`.
pub fn format_average(scores: &BTreeMap<String, f64>) -> String {
    match average_score(scores) {
        Some(avg) => format!("{:.1}", (avg * 10.0).round() / 10.0),
        None => "0".to_string(),
    }
}

/// A `[####------]` bar for a 0-10 score.
pub fn score_bar(score: f64, width: usize) -> String {
    let filled = ((score.clamp(0.0, 10.0) / 10.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn paint(text: &str, sgr: &str, opts: RenderOptions) -> String {
    if opts.color {
        format!("\x1b[{sgr}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn normalize_body(body: &str) -> String {
    BLANK_RUNS.replace_all(body.trim(), "\n\n").into_owned()
}

pub fn render_article(article: &Article) -> String {
    let mut md = String::new();
    writeln!(md, "## 스크래핑 결과\n").unwrap();

    let meta = [&article.press, &article.author, &article.published_at]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .join(" · ");
    if !meta.is_empty() {
        writeln!(md, "{meta}\n").unwrap();
    }

    writeln!(md, "### 제목\n\n{}\n", article.title.trim()).unwrap();
    writeln!(md, "### 본문\n\n{}\n", normalize_body(&article.body)).unwrap();
    writeln!(md, "[원본 기사 보기]({})", article.original_url).unwrap();
    md
}

pub fn render_evaluation(evaluation: &Evaluation, opts: RenderOptions) -> String {
    let mut md = String::new();
    writeln!(md, "## AI 기사 평가 결과\n").unwrap();
    writeln!(
        md,
        "**{} / 10** 종합 평균 점수\n",
        format_average(&evaluation.scores)
    )
    .unwrap();

    writeln!(md, "### 평가 요약\n\n{}\n", evaluation.evaluation_summary.trim()).unwrap();

    writeln!(md, "### 8차원 평가 점수\n").unwrap();
    for dim in &DIMENSIONS {
        let score = dim.score_in(&evaluation.scores);
        writeln!(
            md,
            "- {} {} {}",
            dim.label,
            paint(&score_bar(score, BAR_WIDTH), dim.color, opts),
            format_score(score)
        )
        .unwrap();
    }

    if let Some(feedback) = evaluation
        .detailed_feedback
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
    {
        writeln!(md, "\n### 상세 피드백\n\n{feedback}").unwrap();
    }
    md
}

/// What the user should see while a call is in flight.
pub fn loading_message(state: &AppState) -> Option<&'static str> {
    if state.is_scraping() {
        Some(SCRAPING_MESSAGE)
    } else if state.is_evaluating() {
        Some(EVALUATING_MESSAGE)
    } else {
        None
    }
}

/// The whole page for the current state.
///
/// Error banner first, then the loading line, then whatever results exist.
/// The article is hidden only while it is being scraped.
pub fn render_page(state: &AppState, opts: RenderOptions) -> String {
    let mut sections = Vec::new();

    if let Some(error) = &state.error {
        sections.push(format!("> **오류 발생**\n>\n> {error}\n"));
    }
    if let Some(message) = loading_message(state) {
        sections.push(format!("{message}\n"));
    }
    if let Some(article) = state.article.as_ref().filter(|_| !state.is_scraping()) {
        sections.push(render_article(article));
    }
    if let Some(evaluation) = &state.evaluation {
        sections.push(render_evaluation(evaluation, opts));
    }

    sections.join("\n")
}

#[derive(Debug, Serialize)]
struct DimensionView {
    key: &'static str,
    label: &'static str,
    score: f64,
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    #[serde(flatten)]
    state: &'a AppState,
    loading: bool,
    average_score: Option<String>,
    dimensions: Option<Vec<DimensionView>>,
}

/// The page as a JSON document: the raw state plus the derived display
/// values (average and per-dimension scores).
pub fn page_json(state: &AppState) -> Result<String, serde_json::Error> {
    let view = PageView {
        state,
        loading: state.is_loading(),
        average_score: state.evaluation.as_ref().map(|e| format_average(&e.scores)),
        dimensions: state.evaluation.as_ref().map(|e| {
            DIMENSIONS
                .iter()
                .map(|dim| DimensionView {
                    key: dim.key,
                    label: dim.label,
                    score: dim.score_in(&e.scores),
                })
                .collect()
        }),
    };
    serde_json::to_string_pretty(&view)
}

/// One-line outcome for logs and the interactive prompt.
pub fn outcome_summary(state: &AppState) -> String {
    match state.phase {
        Phase::Evaluated => match &state.evaluation {
            Some(e) => format!("평가 완료 (평균 {} / 10)", format_average(&e.scores)),
            None => "평가 완료".to_string(),
        },
        Phase::EvaluateFailed => "기사는 가져왔지만 평가에 실패했습니다".to_string(),
        Phase::ScrapeFailed => "스크래핑 실패".to_string(),
        Phase::Interrupted => "요청이 중단되었습니다".to_string(),
        Phase::Idle => String::new(),
        Phase::Scraping | Phase::Scraped | Phase::Evaluating => "진행 중".to_string(),
    }
}
