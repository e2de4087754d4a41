//! Data models exchanged with the article backend.
//!
//! This module defines the wire shapes used by the client:
//! - [`Article`]: A scraped news article as returned by `POST /scrape`
//! - [`Evaluation`]: The ethics evaluation returned by `POST /evaluate`
//! - [`ScrapeRequest`] / [`EvaluateRequest`]: Outbound request bodies
//! - [`HealthStatus`]: The body of `GET /health`
//!
//! Field names follow the backend's snake_case JSON exactly, so every type
//! here derives serde without renames.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A news article as scraped by the backend.
///
/// The client never edits an article. It is stored as received and replaced
/// wholesale by the next submission.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// The article headline.
    pub title: String,
    /// Byline, e.g. "홍길동 기자".
    pub author: String,
    /// Publisher name.
    pub press: String,
    /// Publication time as a display string (`YYYY-MM-DD HH:MM`). Not parsed.
    pub published_at: String,
    /// Full article text.
    pub body: String,
    /// Canonical URL of the original article.
    pub original_url: String,
}

/// An AI-generated ethics evaluation of an [`Article`].
///
/// `scores` maps dimension keys to values in `[0, 10]`. The backend may omit
/// dimensions or include keys the renderer does not know about; neither is an
/// error.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Evaluation {
    /// Short prose summary of the evaluation.
    pub evaluation_summary: String,
    /// Per-dimension scores. A `null` score decodes as `0`.
    #[serde(deserialize_with = "scores_with_nulls")]
    pub scores: BTreeMap<String, f64>,
    /// Longer feedback, when the evaluator produced any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_feedback: Option<String>,
}

fn scores_with_nulls<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Option<f64>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, score)| (key, score.unwrap_or(0.0)))
        .collect())
}

/// Body of `POST /scrape`.
#[derive(Debug, Serialize)]
pub struct ScrapeRequest<'a> {
    pub url: &'a str,
}

/// Body of `POST /evaluate`.
#[derive(Debug, Serialize)]
pub struct EvaluateRequest<'a> {
    pub article_body: &'a str,
    pub article_title: &'a str,
}

impl<'a> EvaluateRequest<'a> {
    pub fn for_article(article: &'a Article) -> Self {
        Self {
            article_body: &article.body,
            article_title: &article.title,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
pub(crate) fn sample_article() -> Article {
    Article {
        title: "기사 제목 예시".to_string(),
        author: "홍길동 기자".to_string(),
        press: "연합뉴스".to_string(),
        published_at: "2025-11-15 10:30".to_string(),
        body: "기사 본문 내용...".to_string(),
        original_url: "https://www.yna.co.kr/view/AKR20251115000100001".to_string(),
    }
}
