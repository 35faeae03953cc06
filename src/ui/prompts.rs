//! ui::prompts
//!
//! Interactive confirmations.
//!
//! # Design
//!
//! Confirmation is a capability handed to the commands that need it, so the
//! delete path can be driven by a scripted answer in tests and by stdin in
//! the real binary.

use std::io::{self, BufRead};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Something that can answer a yes/no question.
pub trait Confirm {
    /// Ask `question`; `Ok(true)` only for an explicit yes.
    ///
    /// The question itself is printed by the caller.
    fn confirm(&mut self, question: &str) -> Result<bool, PromptError>;
}

/// Reads the answer from a line of input; only `y` counts as yes.
#[derive(Debug)]
pub struct LinePrompt<R> {
    input: R,
}

impl LinePrompt<io::StdinLock<'static>> {
    /// Prompt reading from the process's stdin.
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> LinePrompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Confirm for LinePrompt<R> {
    fn confirm(&mut self, _question: &str) -> Result<bool, PromptError> {
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim_end_matches(['\r', '\n']) == "y")
    }
}

/// Answers every question the same way without asking.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _question: &str) -> Result<bool, PromptError> {
        Ok(self.0)
    }
}
