use std::fmt;

/// Option label of a four-way multiple choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    A,
    B,
    C,
    D,
}

impl Label {
    /// Case-insensitive: `'b'` and `'B'` both give `Label::B`.
    pub fn from_char(c: char) -> Option<Label> {
        match c.to_ascii_uppercase() {
            'A' => Some(Label::A),
            'B' => Some(Label::B),
            'C' => Some(Label::C),
            'D' => Some(Label::D),
            _ => None,
        }
    }

    /// Parses a whole token such as `"b"` or `" C "`. Anything else is `None`.
    pub fn from_token(token: &str) -> Option<Label> {
        let mut chars = token.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Label::A => 'A',
            Label::B => 'B',
            Label::C => 'C',
            Label::D => 'D',
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A multiple choice question. Options keep their label prefix verbatim
/// (`"A) Paris"`), the label is read back from the text when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub options: [String; 4],
    pub answer: Label,
}

impl Question {
    pub fn new(text: impl Into<String>, options: [String; 4], answer: Label) -> Self {
        Self {
            text: text.into(),
            options,
            answer,
        }
    }

    /// Label written at the start of each option, if any.
    pub fn option_labels(&self) -> [Option<Label>; 4] {
        self.options
            .each_ref()
            .map(|opt| opt.trim_start().chars().next().and_then(Label::from_char))
    }

    /// True when the stated answer names one of the four options.
    pub fn is_consistent(&self) -> bool {
        self.option_labels().contains(&Some(self.answer))
    }

    /// The option the answer points at, if it exists.
    pub fn answer_option(&self) -> Option<&str> {
        self.option_labels()
            .iter()
            .position(|label| *label == Some(self.answer))
            .map(|idx| self.options[idx].as_str())
    }

    /// Renders the `Question:/Options:/Answer:` layout the parser reads.
    pub fn to_canonical_text(&self) -> String {
        let mut text = format!("Question: {}\nOptions:\n", self.text);
        for option in &self.options {
            text.push_str(option);
            text.push('\n');
        }
        text.push_str(&format!("Answer: {}", self.answer));
        text
    }
}
