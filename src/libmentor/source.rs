use crate::libmentor::backend::TextBackend;
use crate::libmentor::parser::{self, ParseFailure};
use crate::libmentor::pool::QuestionPool;
use crate::libmentor::question::Question;
use log::{debug, warn};
use std::fmt;

/// Where a question handed to the session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Generated,
    FallbackParsed,
    FallbackLocal,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Generated => "generated",
            Origin::FallbackParsed => "fallback-parsed",
            Origin::FallbackLocal => "fallback-local",
        })
    }
}

pub fn generation_prompt(subject: &str, difficulty: &str) -> String {
    format!(
        "You are an exam setter. Generate exactly ONE {} level MCQ on the topic: {}.\n\
         Format:\nQuestion: <...>\nOptions:\nA) ...\nB) ...\nC) ...\nD) ...\nAnswer: <A/B/C/D>",
        difficulty, subject
    )
}

pub struct QuestionSource<'a> {
    backend: &'a dyn TextBackend,
    pool: &'a QuestionPool,
}

impl<'a> QuestionSource<'a> {
    pub fn new(backend: &'a dyn TextBackend, pool: &'a QuestionPool) -> Self {
        Self { backend, pool }
    }

    /// Always yields a question. The backend is called at most once.
    pub fn next(&self, subject: &str, difficulty: &str) -> (Question, Origin) {
        if !self.backend.available() {
            debug!("[Source] Backend unavailable, using local pool");
            return self.local();
        }

        let raw = match self.backend.generate(&generation_prompt(subject, difficulty)) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("[Source] {}; using local pool", err);
                return self.local();
            }
        };

        match accept(&raw) {
            Ok(q) => (q, Origin::Generated),
            Err(first) => {
                warn!("[Source] Could not use generated text ({}): {:?}", first, raw);
                match accept(&raw) {
                    Ok(q) => (q, Origin::FallbackParsed),
                    Err(_) => self.local(),
                }
            }
        }
    }

    fn local(&self) -> (Question, Origin) {
        (self.pool.pick(), Origin::FallbackLocal)
    }
}

#[derive(Debug)]
enum Rejection {
    Parse(ParseFailure),
    AnswerNotAnOption,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Parse(failure) => write!(f, "{}", failure),
            Rejection::AnswerNotAnOption => f.write_str("answer does not name any option"),
        }
    }
}

/// Parses and rejects questions whose answer points at no option.
fn accept(raw: &str) -> Result<Question, Rejection> {
    let q = parser::parse(raw).map_err(Rejection::Parse)?;
    if q.is_consistent() {
        Ok(q)
    } else {
        Err(Rejection::AnswerNotAnOption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libmentor::backend::{BackendError, MockBackend, OfflineBackend};
    use crate::libmentor::question::Label;
    use crate::libmentor::testing::CannedBackend;

    const GOOD: &str = "Question: What is 2+2?\nOptions:\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer: B";

    #[test]
    fn test_prompt_embeds_subject_and_difficulty() {
        let prompt = generation_prompt("Science", "Hard");
        assert!(prompt.contains("ONE Hard level MCQ on the topic: Science."));
        assert!(prompt.ends_with("Answer: <A/B/C/D>"));
    }

    #[test]
    fn test_generated_question() {
        let pool = QuestionPool::builtin();
        let backend = CannedBackend::replying(GOOD);
        let (q, origin) = QuestionSource::new(&backend, &pool).next("Math", "Easy");
        assert_eq!(origin, Origin::Generated);
        assert_eq!(q.text, "What is 2+2?");
        assert_eq!(q.answer, Label::B);
        assert_eq!(backend.calls(), 1);
        assert!(backend.last_prompt().unwrap().contains("topic: Math"));
    }

    #[test]
    fn test_unavailable_backend_is_not_called() {
        let pool = QuestionPool::builtin();
        let backend = CannedBackend::unavailable();
        let (q, origin) = QuestionSource::new(&backend, &pool).next("GK", "Easy");
        assert_eq!(origin, Origin::FallbackLocal);
        assert!(pool.questions().contains(&q));
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn test_failed_call_falls_back_without_retry() {
        let pool = QuestionPool::builtin();
        let backend = CannedBackend::failing(BackendError::CallFailed("503".to_string()));
        let (q, origin) = QuestionSource::new(&backend, &pool).next("GK", "Easy");
        assert_eq!(origin, Origin::FallbackLocal);
        assert!(pool.questions().contains(&q));
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_inconsistent_answer_falls_back() {
        let pool = QuestionPool::builtin();
        let backend =
            CannedBackend::replying("Question: Q?\nOptions:\nA) 1\nA) 2\nC) 3\nC) 4\nAnswer: B");
        let (_, origin) = QuestionSource::new(&backend, &pool).next("GK", "Easy");
        assert_eq!(origin, Origin::FallbackLocal);
    }

    #[test]
    fn test_always_returns_a_question() {
        let pool = QuestionPool::builtin();
        let backends = vec![
            CannedBackend::replying(""),
            CannedBackend::replying("I cannot help with that."),
            CannedBackend::replying("Question: Q?\nOptions:\nA) 1\nAnswer: A"),
            CannedBackend::replying("Question: Q?\nOptions:\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer: Z"),
            CannedBackend::failing(BackendError::Unavailable),
            CannedBackend::failing(BackendError::CallFailed(String::new())),
            CannedBackend::unavailable(),
        ];
        for backend in &backends {
            let (q, origin) = QuestionSource::new(backend, &pool).next("GK", "Easy");
            assert_eq!(origin, Origin::FallbackLocal);
            assert!(pool.questions().contains(&q));
        }
    }

    #[test]
    fn test_stock_backends() {
        let pool = QuestionPool::builtin();
        let (_, origin) = QuestionSource::new(&OfflineBackend, &pool).next("GK", "Easy");
        assert_eq!(origin, Origin::FallbackLocal);

        let (q, origin) = QuestionSource::new(&MockBackend, &pool).next("GK", "Easy");
        assert_eq!(origin, Origin::Generated);
        assert_eq!(q.text, "What is the capital of India?");
    }
}
