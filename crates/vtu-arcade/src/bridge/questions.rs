use serde::Deserialize;

use crate::bridge::external::{ExternalBridge, Question};
use crate::core::rng::{RandomSource, Rng};

/// One item as stored in the cached question file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    #[serde(default)]
    id: i64,
    question: String,
    #[serde(default)]
    options: Vec<String>,
    option_a: Option<String>,
    option_b: Option<String>,
    option_c: Option<String>,
    option_d: Option<String>,
    correct_option: i64,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

impl QuestionRecord {
    fn into_question(self) -> Option<Question> {
        let mut options = self.options;
        if options.is_empty() {
            options = [self.option_a, self.option_b, self.option_c, self.option_d]
                .into_iter()
                .flatten()
                .collect();
        }
        let choices: [String; 4] = options.try_into().ok()?;
        let correct_index = usize::try_from(self.correct_option).ok().filter(|i| *i < 4)?;
        Some(Question {
            text: self.question,
            choices,
            correct_index,
            hint: self.hint.filter(|h| !h.is_empty()),
            explanation: self.explanation.filter(|e| !e.is_empty()),
        })
    }
}

/// In-memory question bank with seeded uniform picks.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    rng: Rng,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>, seed: u64) -> Self {
        Self {
            questions,
            rng: Rng::new(seed),
        }
    }

    /// Parse a JSON array of questions. Items without exactly four options
    /// or with an out-of-range answer are skipped.
    pub fn from_json(json: &str, seed: u64) -> Result<Self, serde_json::Error> {
        let records: Vec<QuestionRecord> = serde_json::from_str(json)?;
        let total = records.len();
        let mut questions = Vec::with_capacity(total);
        for record in records {
            let id = record.id;
            match record.into_question() {
                Some(q) => questions.push(q),
                None => log::warn!("skipping malformed question {}", id),
            }
        }
        log::info!("question bank loaded: {} of {} usable", questions.len(), total);
        Ok(Self::new(questions, seed))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl ExternalBridge for QuestionBank {
    fn random_question(&mut self) -> Option<Question> {
        if self.questions.is_empty() {
            return None;
        }
        let idx = self.rng.next_int(self.questions.len() as u32) as usize;
        self.questions.get(idx).cloned()
    }
}
