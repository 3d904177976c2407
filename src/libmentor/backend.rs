use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend not available (no credentials configured)")]
    Unavailable,
    #[error("backend call failed: {0}")]
    CallFailed(String),
}

/// Something that turns a prompt into generated text.
pub trait TextBackend {
    /// False when the backend cannot be used at all, e.g. missing credentials.
    fn available(&self) -> bool;

    fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Never available. Used with `--offline` or when built without `gemini`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBackend;

impl TextBackend for OfflineBackend {
    fn available(&self) -> bool {
        false
    }

    fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        Err(BackendError::Unavailable)
    }
}

/// Local deterministic responder.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockBackend;

impl TextBackend for MockBackend {
    fn available(&self) -> bool {
        true
    }

    fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        Ok(mock_response(prompt))
    }
}

pub const MOCK_MCQ: &str = "Question: What is the capital of India?\n\
Options:\nA) Mumbai\nB) New Delhi\nC) Chennai\nD) Kolkata\nAnswer: B";

/// Canned reply for offline use, chosen by a few keywords in the prompt.
pub fn mock_response(prompt: &str) -> String {
    let lowered = prompt.to_lowercase();
    if lowered.contains("summarize") {
        return "This is a short mock summary. (Set GEMINI_API_KEY to use real model.)".to_string();
    }
    if ["question", "mcq", "generate"]
        .iter()
        .any(|keyword| lowered.contains(keyword))
    {
        return MOCK_MCQ.to_string();
    }
    if prompt.chars().count() < 40 {
        let head: String = prompt.chars().take(120).collect();
        return format!("(mock) I received: {}", head);
    }
    "(mock) This is an offline fallback. Set GEMINI_API_KEY for real replies.".to_string()
}

#[cfg(feature = "gemini")]
pub use gemini::GeminiBackend;

#[cfg(feature = "gemini")]
mod gemini {
    use super::{BackendError, TextBackend};
    use log::{debug, warn};
    use serde::Deserialize;
    use std::time::Duration;

    const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

    #[derive(Deserialize)]
    struct GenerateResponse {
        #[serde(default)]
        candidates: Vec<Candidate>,
    }

    #[derive(Deserialize)]
    struct Candidate {
        content: Option<Content>,
    }

    #[derive(Deserialize)]
    struct Content {
        #[serde(default)]
        parts: Vec<Part>,
    }

    #[derive(Deserialize)]
    struct Part {
        text: Option<String>,
    }

    /// Google Gemini `generateContent` over blocking HTTP.
    pub struct GeminiBackend {
        agent: ureq::Agent,
        api_key: String,
        model: String,
    }

    impl GeminiBackend {
        pub fn new(api_key: &str, model: &str, timeout: Duration) -> Self {
            let config = ureq::Agent::config_builder()
                .timeout_global(Some(timeout))
                .build();
            Self {
                agent: config.into(),
                api_key: api_key.trim().to_string(),
                model: model.to_string(),
            }
        }

        fn request(&self, prompt: &str) -> Result<GenerateResponse, ureq::Error> {
            let url = format!("{}/{}:generateContent", ENDPOINT, self.model);
            let body = serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
            });
            let mut resp = self
                .agent
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .send_json(&body)?;
            resp.body_mut().read_json()
        }
    }

    impl TextBackend for GeminiBackend {
        fn available(&self) -> bool {
            !self.api_key.is_empty()
        }

        fn generate(&self, prompt: &str) -> Result<String, BackendError> {
            if !self.available() {
                return Err(BackendError::Unavailable);
            }
            debug!("[Backend] Sending {} byte prompt to {}", prompt.len(), self.model);
            let response = self.request(prompt).map_err(|err| {
                warn!("[Backend] Gemini call failed: {}", err);
                BackendError::CallFailed(err.to_string())
            })?;
            reply_text(response)
        }
    }

    fn reply_text(response: GenerateResponse) -> Result<String, BackendError> {
        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| BackendError::CallFailed("response had no candidates".to_string()))?;
        Ok(content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect())
    }

}
