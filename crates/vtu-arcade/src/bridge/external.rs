//! Narrow interfaces to the collaborators outside the simulation.

use serde::{Deserialize, Serialize};

/// A four-choice quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub choices: [String; 4],
    pub correct_index: usize,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(text: impl Into<String>, choices: [&str; 4], correct_index: usize) -> Self {
        Self {
            text: text.into(),
            choices: choices.map(String::from),
            correct_index,
            hint: None,
            explanation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        self == Self::Correct
    }
}

/// Question source and answer judge used by quiz interrupts.
///
/// Failures never reach the tick: `None` from `random_question` skips the
/// interrupt, and an absent answer is judged incorrect.
pub trait ExternalBridge {
    fn random_question(&mut self) -> Option<Question>;

    fn resolve_interrupt(&mut self, question: &Question, chosen: Option<usize>) -> Verdict {
        match chosen {
            Some(i) if i == question.correct_index => Verdict::Correct,
            _ => Verdict::Incorrect,
        }
    }
}

/// A bridge with no questions: every interrupt is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuestions;

impl ExternalBridge for NoQuestions {
    fn random_question(&mut self) -> Option<Question> {
        None
    }
}
