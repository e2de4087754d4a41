//! The URL input form.
//!
//! Holds one raw input string and turns it into a submission. Validation is
//! presence only: whatever remains after trimming is submitted verbatim, and
//! blank input never produces a submission. The owner disables the form while
//! a request is in flight.

/// Trim `raw` and return it if anything is left.
pub fn normalize_submission(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The URL input and its enabled flag.
///
/// Submitting leaves the value in place, so a failed submission can be sent
/// again unchanged.
#[derive(Debug, Default, Clone)]
pub struct UrlForm {
    value: String,
    disabled: bool,
}

impl UrlForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Whether the submit button would be enabled.
    pub fn can_submit(&self) -> bool {
        !self.disabled && !self.value.trim().is_empty()
    }

    /// Produce a submission, or `None` when the form is disabled or blank.
    pub fn submit(&self) -> Option<String> {
        if self.disabled {
            return None;
        }
        normalize_submission(&self.value)
    }
}
