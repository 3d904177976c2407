use crate::libmentor::question::{Label, Question};
use log::{debug, info, warn};
use rand::{rng, Rng};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Record layout of `quiz_questions.json`.
#[derive(Deserialize, Debug)]
struct QuestionJson {
    question: String,
    options: Vec<String>,
    answer: String,
}

/// Fixed questions used whenever generation is not possible. Never empty.
#[derive(Debug, Clone)]
pub struct QuestionPool {
    questions: Vec<Question>,
}

impl QuestionPool {
    pub fn builtin() -> Self {
        let q = |text: &str, options: [&str; 4], answer| {
            Question::new(text, options.map(String::from), answer)
        };
        Self {
            questions: vec![
                q(
                    "What is the capital of France?",
                    ["A) Berlin", "B) London", "C) Paris", "D) Madrid"],
                    Label::C,
                ),
                q(
                    "Which planet is largest?",
                    ["A) Earth", "B) Jupiter", "C) Mars", "D) Saturn"],
                    Label::B,
                ),
                q("What is 5 + 7?", ["A)10", "B)11", "C)12", "D)13"], Label::C),
            ],
        }
    }

    /// `None` when `questions` is empty.
    pub fn from_questions(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            None
        } else {
            Some(Self { questions })
        }
    }

    /// Valid records from a JSON question file, or the built-in pool when the
    /// file is missing, malformed, or holds no usable record.
    pub fn load_or_builtin(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                debug!("[Pool] No question file at {:?}: {}", path, err);
                return Self::builtin();
            }
        };
        let records: Vec<QuestionJson> = match serde_json::from_str(&json) {
            Ok(records) => records,
            Err(err) => {
                warn!("[Pool] Malformed question file {:?}: {}", path, err);
                return Self::builtin();
            }
        };

        let questions: Vec<Question> = records
            .into_iter()
            .filter_map(|record| match to_question(&record) {
                Some(q) => Some(q),
                None => {
                    warn!("[Pool] Skipping invalid question record {:?}", record);
                    None
                }
            })
            .collect();

        match Self::from_questions(questions) {
            Some(pool) => {
                info!("[Pool] Loaded {} questions from {:?}", pool.len(), path);
                pool
            }
            None => Self::builtin(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Uniformly random question.
    pub fn pick(&self) -> Question {
        let idx = rng().random_range(0..self.questions.len());
        self.questions[idx].clone()
    }
}

fn to_question(record: &QuestionJson) -> Option<Question> {
    let text = record.question.trim();
    if text.is_empty() {
        return None;
    }
    let options: [String; 4] = record.options.clone().try_into().ok()?;
    let answer = Label::from_token(&record.answer)?;
    Some(Question::new(text, options, answer)).filter(Question::is_consistent)
}
