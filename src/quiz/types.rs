use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// A question as stored in the bank, correct answer included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    /// Client-facing view of the question. Never carries the correct answer.
    pub fn view(&self) -> QuestionView {
        QuestionView {
            id: self.id,
            text: self.text.clone(),
            options: self.options.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
}

/// One player's recorded entry for a single round.
///
/// A round timeout is recorded with no choice, the full deadline as
/// elapsed time, and `correct: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAnswer {
    pub choice: Option<usize>,
    pub elapsed_ms: u64,
    pub correct: bool,
}

impl RecordedAnswer {
    pub fn timed_out(deadline_ms: u64) -> Self {
        Self {
            choice: None,
            elapsed_ms: deadline_ms,
            correct: false,
        }
    }
}

/// A player's own final view of the match: full per-round detail.
/// Rounds never reached (early termination) stay `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub score: u32,
    pub total_elapsed_ms: u64,
    pub rounds: Vec<Option<RecordedAnswer>>,
}

/// What a player gets to see of their opponent's outcome: score and
/// total time only, no per-round detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentSummary {
    pub display_name: String,
    pub score: u32,
    pub total_elapsed_ms: u64,
}
