use crate::libmentor::backend::{mock_response, TextBackend};
use log::warn;

pub const TUTOR_INSTRUCTION: &str =
    "You are a helpful tutor. Answer step by step with examples when possible.\nQuestion: ";

/// Exchanges kept in the prompt of a multi-turn chat.
pub const CONTEXT_EXCHANGES: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Generated(String),
    /// The backend call failed; `fallback` is the offline answer.
    Failed { error: String, fallback: String },
    /// No backend configured.
    Mock(String),
}

/// Single-shot tutoring: every student line is answered on its own.
pub fn tutor_reply(backend: &dyn TextBackend, question: &str) -> Reply {
    let prompt = format!("{}{}", TUTOR_INSTRUCTION, question);
    if !backend.available() {
        return Reply::Mock(mock_response(&prompt));
    }
    match backend.generate(&prompt) {
        Ok(text) => Reply::Generated(text),
        Err(err) => {
            warn!("[Tutor] {}", err);
            Reply::Failed {
                error: err.to_string(),
                fallback: mock_response(&prompt),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub bot: String,
}

/// Multi-turn chat history.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    exchanges: Vec<Exchange>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Prompt holding the most recent exchanges followed by the new line.
    pub fn prompt_for(&self, user_text: &str) -> String {
        let skip = self.exchanges.len().saturating_sub(CONTEXT_EXCHANGES);
        let context = self.exchanges[skip..]
            .iter()
            .map(|exchange| format!("User: {}\nBot: {}", exchange.user, exchange.bot))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Conversation so far:\n{}\nUser: {}\nAssistant:",
            context, user_text
        )
    }

    /// Answers `user_text` and remembers the exchange.
    pub fn ask(&mut self, backend: &dyn TextBackend, user_text: &str) -> String {
        let prompt = self.prompt_for(user_text);
        let answer = if backend.available() {
            match backend.generate(&prompt) {
                Ok(text) => text,
                Err(err) => {
                    warn!("[Chat] {}", err);
                    format!("(error) {}", err)
                }
            }
        } else {
            mock_response(&prompt)
        };
        self.exchanges.push(Exchange {
            user: user_text.to_string(),
            bot: answer.clone(),
        });
        answer
    }
}
