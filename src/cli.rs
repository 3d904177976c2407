use crate::libmentor::backend::TextBackend;
use crate::libmentor::pool::QuestionPool;
use crate::libmentor::scores::ScoreStore;
use crate::libmentor::session::{is_exit_word, run_quiz, show_leaderboard, Console, Tone};
use crate::libmentor::source::QuestionSource;
use crate::libmentor::tutor::{tutor_reply, Conversation, Reply};
use colored::Colorize;
use log::debug;
use std::io::{self, BufRead, Write};
use text_io::try_read;

/// stdin/stdout console.
pub(crate) struct TerminalConsole;

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{}", prompt.cyan());
        let _ = io::stdout().flush();
        if input_closed(&mut io::stdin().lock()) {
            debug!("[Console] stdin closed");
            return None;
        }
        let line: String = try_read!("{}\n").ok()?;
        Some(line.trim_end_matches('\r').to_string())
    }

    fn say(&mut self, tone: Tone, text: &str) {
        match tone {
            Tone::Plain => println!("{}", text),
            Tone::Heading => println!("{}", text.cyan().bold()),
            Tone::Good => println!("{}", text.bright_green()),
            Tone::Bad => println!("{}", text.bright_red()),
            Tone::Warn => println!("{}", text.yellow()),
        }
    }
}

/// `try_read!` yields an empty string at end of input, so check first.
fn input_closed(reader: &mut impl BufRead) -> bool {
    reader.fill_buf().map_or(true, |buf| buf.is_empty())
}

#[derive(Debug, PartialEq)]
enum MenuChoice {
    Play,
    Leaderboard,
    Exit,
    Invalid,
}

impl MenuChoice {
    fn from_str(input: &str) -> MenuChoice {
        match input.trim() {
            "1" => MenuChoice::Play,
            "2" => MenuChoice::Leaderboard,
            "3" => MenuChoice::Exit,
            other if is_exit_word(other) => MenuChoice::Exit,
            _ => MenuChoice::Invalid,
        }
    }
}

pub(crate) fn menu_loop(
    console: &mut dyn Console,
    backend: &dyn TextBackend,
    pool: &QuestionPool,
    store: &ScoreStore,
) {
    let source = QuestionSource::new(backend, pool);
    console.say(Tone::Heading, "EduMentor Quiz - menu: 1) Play  2) Leaderboard  3) Exit");
    loop {
        let choice = match console.read_line("Choose: ") {
            Some(input) => MenuChoice::from_str(&input),
            None => MenuChoice::Exit,
        };
        debug!("[Menu] choice: {:?}", choice);

        match choice {
            MenuChoice::Play => {
                run_quiz(console, &source, store);
            }
            MenuChoice::Leaderboard => leaderboard(console, store),
            MenuChoice::Exit => {
                console.say(Tone::Heading, "Goodbye.");
                return;
            }
            MenuChoice::Invalid => console.say(Tone::Bad, "Invalid choice."),
        }
    }
}

pub(crate) fn leaderboard(console: &mut dyn Console, store: &ScoreStore) {
    show_leaderboard(console, &store.load().rank());
}

pub(crate) fn tutor_loop(console: &mut dyn Console, backend: &dyn TextBackend) {
    console.say(Tone::Heading, "EduMentor Tutor - type 'exit' to quit.");
    loop {
        let question = match console.read_line("Student: ") {
            Some(line) if !is_exit_word(&line) => line,
            _ => break,
        };
        match tutor_reply(backend, question.trim()) {
            Reply::Generated(text) => console.say(Tone::Plain, &format!("Tutor: {}", text)),
            Reply::Failed { error, fallback } => {
                console.say(Tone::Bad, &format!("Tutor (error): {}", error));
                console.say(Tone::Plain, &format!("Tutor (mock): {}", fallback));
            }
            Reply::Mock(text) => console.say(Tone::Plain, &format!("Tutor (mock): {}", text)),
        }
    }
    console.say(Tone::Heading, "Tutor: Goodbye!");
}

pub(crate) fn chat_loop(console: &mut dyn Console, backend: &dyn TextBackend) {
    console.say(Tone::Heading, "EduMentor Chat - multi-turn. Type 'exit' to quit.");
    let mut conversation = Conversation::new();
    loop {
        let line = match console.read_line("You: ") {
            Some(line) if !is_exit_word(&line) => line,
            _ => break,
        };
        let answer = conversation.ask(backend, line.trim());
        console.say(Tone::Plain, &format!("Bot: {}", answer));
    }
    console.say(Tone::Heading, "Bye");
}
