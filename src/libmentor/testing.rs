//! Fakes shared by the unit tests.

use crate::libmentor::backend::{BackendError, TextBackend};
use crate::libmentor::session::{Console, Tone};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// Backend that answers every prompt the same way and counts calls.
pub struct CannedBackend {
    available: bool,
    reply: Result<String, BackendError>,
    calls: Cell<usize>,
    last_prompt: RefCell<Option<String>>,
}

impl CannedBackend {
    pub fn replying(text: &str) -> Self {
        Self::with(true, Ok(text.to_string()))
    }

    pub fn failing(err: BackendError) -> Self {
        Self::with(true, Err(err))
    }

    pub fn unavailable() -> Self {
        Self::with(false, Err(BackendError::Unavailable))
    }

    fn with(available: bool, reply: Result<String, BackendError>) -> Self {
        Self {
            available,
            reply,
            calls: Cell::new(0),
            last_prompt: RefCell::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.borrow().clone()
    }
}

impl TextBackend for CannedBackend {
    fn available(&self) -> bool {
        self.available
    }

    fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_prompt.borrow_mut() = Some(prompt.to_string());
        self.reply.clone()
    }
}

/// Console fed from a fixed list of input lines. Runs dry as closed input.
#[derive(Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    pub output: Vec<(Tone, String)>,
}

impl ScriptedConsole {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|line| line.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn printed(&self) -> String {
        self.output
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn lines_with(&self, tone: Tone) -> Vec<&str> {
        self.output
            .iter()
            .filter(|(t, _)| *t == tone)
            .map(|(_, line)| line.as_str())
            .collect()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.inputs.pop_front()
    }

    fn say(&mut self, tone: Tone, text: &str) {
        self.output.push((tone, text.to_string()));
    }
}
