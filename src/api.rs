//! HTTP client for the article backend.
//!
//! The orchestrator talks to the backend only through the [`NewsBackend`]
//! trait, so tests can swap in a scripted implementation.
//!
//! # Endpoints
//!
//! | Method | Path | Request | Success body |
//! |--------|------|---------|--------------|
//! | POST | `/scrape` | [`ScrapeRequest`] | [`Article`] |
//! | POST | `/evaluate` | [`EvaluateRequest`] | [`Evaluation`] |
//! | GET | `/health` | - | [`HealthStatus`] |
//!
//! Failed calls are expected to carry `{"detail": {"error": "..."}}`. Any
//! other failure body still yields a [`BackendError::Rejected`], just without
//! a message.
//!
//! Nothing here retries. A failed call is reported once and left to the user.

use crate::config::Settings;
use crate::models::{Article, EvaluateRequest, Evaluation, HealthStatus, ScrapeRequest};
use crate::utils::truncate_for_log;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Shown when the scrape endpoint fails without a usable message.
pub const SCRAPE_FAILED_MESSAGE: &str = "스크래핑에 실패했습니다";

/// Shown for failures that never produced a backend response.
pub const UNKNOWN_ERROR_MESSAGE: &str = "알 수 없는 오류가 발생했습니다";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Rejected { status: u16, message: Option<String> },

    /// The request never completed (connection refused, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered 2xx with a body that does not match the model.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

impl BackendError {
    /// The message to put in front of the user.
    ///
    /// A backend-provided message wins. A rejection without one falls back to
    /// `fallback`. Everything else is an unexpected failure and gets the
    /// generic message.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected { message: None, .. } => fallback.to_string(),
            _ => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// The two calls the orchestrator sequences.
pub trait NewsBackend {
    /// Scrape the article at `url`.
    async fn scrape(&self, url: &str) -> Result<Article, BackendError>;

    /// Evaluate a scraped article by title and body.
    async fn evaluate(&self, title: &str, body: &str) -> Result<Evaluation, BackendError>;
}

/// Pull `detail.error` out of a failure body.
///
/// Returns `None` for non-JSON bodies, other shapes (FastAPI validation
/// errors put a list under `detail`), and empty messages.
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let message = value.get("detail")?.get("error")?.as_str()?.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

/// [`NewsBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(settings: &Settings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base: settings.api_base.clone(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base.join(path)?)
    }

    /// Probe `GET /health`.
    #[instrument(level = "info", skip_all, fields(base = %self.base))]
    pub async fn health(&self) -> Result<HealthStatus, BackendError> {
        let url = self.endpoint("health")?;
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let t0 = Instant::now();
        let result = match self.client.post(url).json(body).send().await {
            Ok(response) => read_json(response).await,
            Err(e) => Err(e.into()),
        };
        let elapsed_ms = t0.elapsed().as_millis();
        match &result {
            Ok(_) => debug!(path, elapsed_ms, "Backend call succeeded"),
            Err(e) => warn!(path, elapsed_ms, error = %e, "Backend call failed"),
        }
        result
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        let message = extract_error_message(&bytes);
        debug!(
            status = status.as_u16(),
            body = %truncate_for_log(&String::from_utf8_lossy(&bytes), 300),
            "Backend rejected request"
        );
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_slice(&bytes)?)
}

impl NewsBackend for HttpBackend {
    #[instrument(level = "info", skip(self))]
    async fn scrape(&self, url: &str) -> Result<Article, BackendError> {
        let article: Article = self.post_json("scrape", &ScrapeRequest { url }).await?;
        info!(
            title = %truncate_for_log(&article.title, 50),
            press = %article.press,
            "Scraped article"
        );
        Ok(article)
    }

    #[instrument(level = "info", skip_all, fields(title = %truncate_for_log(title, 50)))]
    async fn evaluate(&self, title: &str, body: &str) -> Result<Evaluation, BackendError> {
        let request = EvaluateRequest {
            article_body: body,
            article_title: title,
        };
        let evaluation: Evaluation = self.post_json("evaluate", &request).await?;
        info!(dimensions = evaluation.scores.len(), "Received evaluation");
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"detail": {"error": "스크래핑 실패", "detail": "지원하지 않는 언론사입니다"}}"#;
        assert_eq!(extract_error_message(body.as_bytes()), Some("스크래핑 실패".to_string()));
    }

    #[test]
    fn test_extract_error_message_other_shapes() {
        // FastAPI validation error
        let body = br#"{"detail": [{"loc": ["body", "url"], "msg": "field required"}]}"#;
        assert_eq!(extract_error_message(body), None);

        assert_eq!(extract_error_message(br#"{"detail": "Not Found"}"#), None);
        assert_eq!(extract_error_message(br#"{"detail": {"error": ""}}"#), None);
        assert_eq!(extract_error_message(br#"{"detail": {"error": 42}}"#), None);
        assert_eq!(extract_error_message(b"<html>502 Bad Gateway</html>"), None);
        assert_eq!(extract_error_message(b""), None);
    }

    #[test]
    fn test_user_message() {
        let with_message = BackendError::Rejected {
            status: 400,
            message: Some("지원하지 않는 언론사".to_string()),
        };
        assert_eq!(with_message.user_message(SCRAPE_FAILED_MESSAGE), "지원하지 않는 언론사");

        let without = BackendError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(without.user_message(SCRAPE_FAILED_MESSAGE), SCRAPE_FAILED_MESSAGE);

        let decode = BackendError::Decode(serde_json::from_str::<Article>("{}").unwrap_err());
        assert_eq!(decode.user_message(SCRAPE_FAILED_MESSAGE), UNKNOWN_ERROR_MESSAGE);
        assert!(!decode.is_rejection());
    }
}
