//! Tolerant reader for generated multiple choice text.
//!
//! The expected layout is
//!
//! ```text
//! Question: <text>
//! Options:
//! A) ...
//! B) ...
//! C) ...
//! D) ...
//! Answer: <A-D>
//! ```
//!
//! Keywords are matched case-insensitively. `Question:` may appear anywhere,
//! `Options:` and `Answer:` only at the start of a line (leading blanks
//! allowed). Options may sit on their own lines or be run together on one line. The answer letter is
//! not checked against the option labels here; see [`Question::is_consistent`].

use crate::libmentor::question::{Label, Question};
use log::debug;
use thiserror::Error;

const QUESTION_KEYWORD: &str = "question:";
const OPTIONS_KEYWORD: &str = "options:";
const ANSWER_KEYWORD: &str = "answer:";
const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no Question:/Options:/Answer: layout found")]
    NoMatch,
    #[error("fewer than four options found")]
    InsufficientOptions,
    #[error("answer is not one of A, B, C or D")]
    InvalidAnswerLabel,
}

/// The three sections of the raw text, keywords excluded.
struct Sections<'a> {
    question: &'a str,
    options: &'a str,
    answer: &'a str,
}

pub fn parse(raw: &str) -> Result<Question, ParseFailure> {
    let sections = locate_sections(raw).ok_or(ParseFailure::NoMatch)?;

    let text = sections.question.trim();
    if text.is_empty() {
        return Err(ParseFailure::NoMatch);
    }

    let mut options = split_lines(sections.options);
    if options.len() < OPTION_COUNT {
        debug!(
            "[Parser] Only {} option lines, retrying on label boundaries",
            options.len()
        );
        options = split_boundaries(sections.options);
    }
    if options.len() < OPTION_COUNT {
        return Err(ParseFailure::InsufficientOptions);
    }
    let options: [String; OPTION_COUNT] = [
        options[0].to_string(),
        options[1].to_string(),
        options[2].to_string(),
        options[3].to_string(),
    ];

    let answer = read_answer(sections.answer).ok_or(ParseFailure::InvalidAnswerLabel)?;

    Ok(Question::new(text, options, answer))
}

fn locate_sections(raw: &str) -> Option<Sections<'_>> {
    // ASCII lowercasing keeps every byte offset valid for `raw`.
    let lowered = raw.to_ascii_lowercase();
    let question_at = find_from(&lowered, 0, QUESTION_KEYWORD)?;
    let question_end = question_at + QUESTION_KEYWORD.len();
    let options_at = find_line_start(&lowered, question_end, OPTIONS_KEYWORD)?;
    let options_end = options_at + OPTIONS_KEYWORD.len();
    let answer_at = find_line_start(&lowered, options_end, ANSWER_KEYWORD)?;
    let answer_end = answer_at + ANSWER_KEYWORD.len();

    Some(Sections {
        question: &raw[question_end..options_at],
        options: &raw[options_end..answer_at],
        answer: &raw[answer_end..],
    })
}

fn find_from(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    haystack[from..].find(needle).map(|idx| from + idx)
}

/// Like [`find_from`], but only where `needle` opens a line.
fn find_line_start(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    let mut at = from;
    while let Some(found) = find_from(haystack, at, needle) {
        let opens_line = haystack[..found]
            .rfind('\n')
            .is_some_and(|newline| haystack[newline + 1..found].trim().is_empty());
        if opens_line {
            return Some(found);
        }
        at = found + needle.len();
    }
    None
}

/// First pass: every line whose first visible character is a, b, c or d.
fn split_lines(block: &str) -> Vec<&str> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().next().and_then(Label::from_char).is_some())
        .collect()
}

/// Second pass: cut wherever an upper case A-D followed by `)` or `.` starts
/// the block or follows whitespace. Text before the first cut is dropped.
/// Option text such as `Vitamin C.` is cut there too.
fn split_boundaries(block: &str) -> Vec<&str> {
    let mut starts = Vec::new();
    let mut prev: Option<char> = None;
    let mut chars = block.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        let after_gap = prev.map_or(true, char::is_whitespace);
        let delimited = matches!(chars.peek(), Some((_, ')' | '.')));
        if after_gap && delimited && matches!(c, 'A'..='D') {
            starts.push(idx);
        }
        prev = Some(c);
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(block.len());
            block[start..end].trim()
        })
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn read_answer(section: &str) -> Option<Label> {
    section.trim_start().chars().next().and_then(Label::from_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, options: [&str; 4], answer: Label) -> Question {
        Question::new(text, options.map(String::from), answer)
    }

    #[test]
    fn test_parse_canonical_example() {
        let raw = "Question: What is 2+2?\nOptions:\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer: B";
        assert_eq!(
            parse(raw),
            Ok(question("What is 2+2?", ["A) 3", "B) 4", "C) 5", "D) 6"], Label::B))
        );
    }

    #[test]
    fn test_parse_rendered_question_back() {
        let samples = [
            question(
                "What is the capital of France?",
                ["A) Berlin", "B) London", "C) Paris", "D) Madrid"],
                Label::C,
            ),
            question("What is 5 + 7?", ["A)10", "B)11", "C)12", "D)13"], Label::C),
            question(
                "Pick the noble gas",
                ["D. Argon", "C. Iron", "B. Sodium", "A. Carbon"],
                Label::D,
            ),
        ];
        for q in samples {
            assert_eq!(parse(&q.to_canonical_text()), Ok(q.clone()));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_tolerates_noise() {
        let raw = "Sure! Here you go.\n\n  QUESTION:   Largest planet? \n\noptions:\n  a) Earth\n  b) Jupiter\n  c) Mars\n  d) Saturn\n\nanswer:  b\nHope this helps.";
        let q = parse(raw).unwrap();
        assert_eq!(q.text, "Largest planet?");
        assert_eq!(q.options[1], "b) Jupiter");
        assert_eq!(q.answer, Label::B);
    }

    #[test]
    fn test_parse_options_run_together() {
        let raw = "Question: Capital of Spain?\nOptions: A) Paris B) London C) Berlin D) Madrid\nAnswer: D";
        let q = parse(raw).unwrap();
        assert_eq!(q.options, ["A) Paris", "B) London", "C) Berlin", "D) Madrid"].map(String::from));
        assert_eq!(q.answer, Label::D);
    }

    #[test]
    fn test_parse_options_partially_joined() {
        let raw = "Question: Q?\nOptions:\nA. one B. two\nC. three\nD. four\nAnswer: A";
        let q = parse(raw).unwrap();
        assert_eq!(q.options, ["A. one", "B. two", "C. three", "D. four"].map(String::from));
    }

    #[test]
    fn test_parse_keeps_first_four_options() {
        let raw = "Question: Q?\nOptions:\nA) 1\nB) 2\nC) 3\nD) 4\nA) again\nAnswer: C";
        let q = parse(raw).unwrap();
        assert_eq!(q.options[3], "D) 4");
    }

    #[test]
    fn test_parse_keeps_option_order_as_found() {
        let raw = "Question: Q?\nOptions:\nC) 3\nA) 1\nD) 4\nB) 2\nAnswer: A";
        let q = parse(raw).unwrap();
        assert_eq!(q.options, ["C) 3", "A) 1", "D) 4", "B) 2"].map(String::from));
        assert_eq!(q.answer_option(), Some("A) 1"));
    }

    #[test]
    fn test_parse_missing_answer_keyword() {
        let raw = "Question: Q?\nOptions:\nA) 1\nB) 2\nC) 3\nD) 4\nB";
        assert_eq!(parse(raw), Err(ParseFailure::NoMatch));
    }

    #[test]
    fn test_parse_keywords_out_of_order() {
        let raw = "Options:\nA) 1\nB) 2\nC) 3\nD) 4\nQuestion: Q?\nAnswer: A";
        assert_eq!(parse(raw), Err(ParseFailure::NoMatch));
    }

    #[test]
    fn test_parse_empty_question_text() {
        let raw = "Question:   \nOptions:\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer: A";
        assert_eq!(parse(raw), Err(ParseFailure::NoMatch));
    }

    #[test]
    fn test_parse_three_options() {
        let raw = "Question: Q?\nOptions:\nA) 1\nB) 2\nC) 3\nAnswer: A";
        assert_eq!(parse(raw), Err(ParseFailure::InsufficientOptions));
    }

    #[test]
    fn test_parse_answer_out_of_range() {
        let raw = "Question: Q?\nOptions:\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer: E";
        assert_eq!(parse(raw), Err(ParseFailure::InvalidAnswerLabel));
    }

    #[test]
    fn test_parse_blank_answer() {
        let raw = "Question: Q?\nOptions:\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer:   ";
        assert_eq!(parse(raw), Err(ParseFailure::InvalidAnswerLabel));
    }

    #[test]
    fn test_parse_does_not_check_answer_against_labels() {
        let raw = "Question: Q?\nOptions:\nA) 1\nA) 2\nC) 3\nC) 4\nAnswer: B";
        let q = parse(raw).unwrap();
        assert_eq!(q.answer, Label::B);
        assert!(!q.is_consistent());
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse(""), Err(ParseFailure::NoMatch));
    }

    #[test]
    fn test_parse_keyword_inside_question_text() {
        let raw = "Question: Which of these options: is even?\nOptions:\nA) 1\nB) 2\nC) 3\nD) 5\nAnswer: B";
        let q = parse(raw).unwrap();
        assert_eq!(q.text, "Which of these options: is even?");
        assert_eq!(q.answer, Label::B);
    }

    #[test]
    fn test_parse_keyword_inside_option_text() {
        let q = question(
            "Skip it?",
            ["A) yes", "B) no", "C) maybe", "D) no answer: skip"],
            Label::A,
        );
        assert!(q.is_consistent());
        assert_eq!(parse(&q.to_canonical_text()), Ok(q.clone()));
    }

    #[test]
    fn test_parse_indented_keywords() {
        let raw = "Question: Q?\n  Options:\n  A) 1\n  B) 2\n  C) 3\n  D) 4\n\tAnswer: D";
        let q = parse(raw).unwrap();
        assert_eq!(q.options[0], "A) 1");
        assert_eq!(q.answer, Label::D);
    }

    #[test]
    fn test_parse_keywords_on_question_line() {
        let raw = "Question: Q? Options: A) 1 B) 2 C) 3 D) 4 Answer: A";
        assert_eq!(parse(raw), Err(ParseFailure::NoMatch));
    }

    #[test]
    fn test_split_boundaries_cuts_at_letter_with_delimiter() {
        let parts = split_boundaries("A) Vitamin C. B) Iron C) Zinc D) Calcium");
        assert_eq!(parts, vec!["A) Vitamin", "C.", "B) Iron", "C) Zinc", "D) Calcium"]);
    }

    #[test]
    fn test_split_boundaries_ignores_letters_inside_words() {
        let parts = split_boundaries("A) Bob. B) Ann C) Dave D) Cy.");
        assert_eq!(parts, vec!["A) Bob.", "B) Ann", "C) Dave", "D) Cy."]);
    }
}
