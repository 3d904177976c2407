//! One quiz run: Setup -> Asking -> Grading -> ... -> Finished.
//!
//! The session is a plain value moved through each transition.

use crate::libmentor::question::{Label, Question};
use crate::libmentor::scores::ScoreStore;
use crate::libmentor::source::{Origin, QuestionSource};
use log::{debug, info};

pub const DEFAULT_NAME: &str = "Player";
pub const DEFAULT_SUBJECT: &str = "GK";
pub const DEFAULT_DIFFICULTY: &str = "Easy";
pub const DEFAULT_QUESTION_COUNT: usize = 3;
pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    Good,
    Bad,
    Warn,
}

/// Line-based user interaction.
pub trait Console {
    /// `None` once input is closed.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    fn say(&mut self, tone: Tone, text: &str);
}

/// `exit` or `quit`, in any case.
pub fn is_exit_word(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Upper case first letter, lower case rest.
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub name: String,
    pub subject: String,
    pub difficulty: String,
    pub question_count: usize,
}

impl Settings {
    /// Builds settings from raw answers, substituting defaults for blanks and
    /// for a count that is not a number.
    pub fn from_input(name: &str, subject: &str, difficulty: &str, count: &str) -> Self {
        let or_default = |input: &str, default: &str| {
            let input = input.trim();
            if input.is_empty() {
                default.to_string()
            } else {
                input.to_string()
            }
        };
        let difficulty = title_case(difficulty.trim());

        Self {
            name: or_default(name, DEFAULT_NAME),
            subject: or_default(subject, DEFAULT_SUBJECT),
            difficulty: or_default(&difficulty, DEFAULT_DIFFICULTY),
            question_count: count.trim().parse().unwrap_or(DEFAULT_QUESTION_COUNT),
        }
    }

    pub fn collect(console: &mut dyn Console) -> Self {
        let mut ask = |prompt: &str| console.read_line(prompt).unwrap_or_default();
        let name = ask("Name: ");
        let subject = ask("Subject (Math/Science/GK): ");
        let difficulty = ask("Difficulty (Easy/Medium/Hard): ");
        let count = ask("How many questions? (default 3): ");
        Self::from_input(&name, &subject, &difficulty, &count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GivenAnswer {
    Choice(Label),
    Invalid,
}

impl GivenAnswer {
    pub fn from_input(input: &str) -> Self {
        Label::from_token(input).map_or(GivenAnswer::Invalid, GivenAnswer::Choice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub asked: Question,
    pub given: GivenAnswer,
}

impl RoundResult {
    pub fn is_correct(&self) -> bool {
        self.given == GivenAnswer::Choice(self.asked.answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Asking,
    Grading { question: Question, origin: Origin },
    Finished,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    settings: Settings,
    graded: usize,
    correct: usize,
    phase: Phase,
}

impl QuizSession {
    pub fn start(settings: Settings) -> Self {
        let phase = if settings.question_count == 0 {
            Phase::Finished
        } else {
            Phase::Asking
        };
        Self {
            settings,
            graded: 0,
            correct: 0,
            phase,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// 1-based number of the question being asked or about to be asked.
    pub fn round(&self) -> usize {
        self.graded + 1
    }

    pub fn graded(&self) -> usize {
        self.graded
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Asking -> Grading. Other phases are returned unchanged.
    pub fn ask(mut self, source: &QuestionSource<'_>) -> Self {
        if self.phase == Phase::Asking {
            let (question, origin) = source.next(&self.settings.subject, &self.settings.difficulty);
            debug!("[Session] Round {} question is {}", self.round(), origin);
            self.phase = Phase::Grading { question, origin };
        }
        self
    }

    /// Grading -> Asking, or Finished after the last round.
    pub fn grade(mut self, given: GivenAnswer) -> (Self, Option<RoundResult>) {
        let question = match std::mem::replace(&mut self.phase, Phase::Finished) {
            Phase::Grading { question, .. } => question,
            other => {
                self.phase = other;
                return (self, None);
            }
        };

        let result = RoundResult {
            asked: question,
            given,
        };
        self.graded += 1;
        if result.is_correct() {
            self.correct += 1;
        }
        self.phase = if self.graded >= self.settings.question_count {
            Phase::Finished
        } else {
            Phase::Asking
        };
        (self, Some(result))
    }

    /// Ends the run early; graded rounds still count.
    pub fn stop(mut self) -> Self {
        self.phase = Phase::Finished;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReport {
    pub name: String,
    pub subject: String,
    pub correct: usize,
    pub asked: usize,
    pub saved: bool,
    pub leaderboard: Vec<(String, u64)>,
}

/// Adds the session's correct answers to the store and ranks the result.
pub fn finish(session: &QuizSession, store: &ScoreStore) -> QuizReport {
    let settings = session.settings();
    let (board, saved) = store.record(&settings.name, &settings.subject, session.correct() as u64);
    QuizReport {
        name: settings.name.clone(),
        subject: settings.subject.clone(),
        correct: session.correct(),
        asked: session.graded(),
        saved,
        leaderboard: board.rank(),
    }
}

/// Runs a whole quiz against the console and returns what was recorded.
pub fn run_quiz(
    console: &mut dyn Console,
    source: &QuestionSource<'_>,
    store: &ScoreStore,
) -> QuizReport {
    let mut session = QuizSession::start(Settings::collect(console));
    info!("[Session] Starting {:?}", session.settings());

    while !matches!(session.phase(), Phase::Finished) {
        session = session.ask(source);
        if let Phase::Grading { question, .. } = session.phase() {
            present_question(console, session.round(), question);
        }

        match console.read_line("Your answer (A/B/C/D): ") {
            Some(input) if !is_exit_word(&input) => {
                let (next, result) = session.grade(GivenAnswer::from_input(&input));
                if let Some(result) = result {
                    present_result(console, &result);
                }
                session = next;
            }
            _ => {
                console.say(Tone::Warn, "Quiz stopped early.");
                session = session.stop();
            }
        }
    }

    let report = finish(&session, store);
    console.say(
        Tone::Heading,
        &format!(
            "{} scored {}/{} in {}",
            report.name, report.correct, report.asked, report.subject
        ),
    );
    if !report.saved {
        console.say(
            Tone::Warn,
            &format!("Warning: could not save scores to {}", store.path().display()),
        );
    }
    show_leaderboard(console, &report.leaderboard);
    report
}

fn present_question(console: &mut dyn Console, round: usize, question: &Question) {
    console.say(Tone::Heading, &format!("Q{}: {}", round, question.text));
    for option in &question.options {
        console.say(Tone::Plain, option);
    }
}

fn present_result(console: &mut dyn Console, result: &RoundResult) {
    let answer = result
        .asked
        .answer_option()
        .map_or_else(|| result.asked.answer.to_string(), |option| option.to_string());
    if result.is_correct() {
        console.say(Tone::Good, &format!("Correct! The answer is {}", answer));
    } else {
        console.say(Tone::Bad, &format!("Wrong. The correct answer is {}", answer));
    }
}

pub fn show_leaderboard(console: &mut dyn Console, ranking: &[(String, u64)]) {
    if ranking.is_empty() {
        console.say(Tone::Plain, "No scores yet.");
        return;
    }
    console.say(Tone::Heading, "Leaderboard");
    for (place, (user, total)) in ranking.iter().take(LEADERBOARD_SIZE).enumerate() {
        console.say(Tone::Plain, &format!("{}. {} - {} pts", place + 1, user, total));
    }
}
