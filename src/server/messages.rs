//! WebSocket wire protocol.
//!
//! Every frame is JSON tagged `{"action": ..., "data": ...}`. Inbound
//! messages come from the client; outbound messages are pushed by the
//! matchmaking server and match sessions through the connection actor.

use actix::prelude::*;
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::quiz::types::{OpponentSummary, PlayerResult, QuestionView};

/// Message client -> server.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum ClientWsMessage {
    #[serde(rename_all = "camelCase")]
    JoinMatchmaking {
        subject: String,
        display_name: String,
    },
    LeaveMatchmaking,
    #[serde(rename_all = "camelCase")]
    SubmitAnswer {
        question_id: Uuid,
        choice_index: usize,
        elapsed_ms: u64,
    },
    Ping,
}

/// Message server -> client.
#[derive(Message, Serialize, Deserialize, Clone, Debug)]
#[rtype(result = "()")]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum ServerWsMessage {
    MatchmakingStatus {
        status: String,
    },
    #[serde(rename_all = "camelCase")]
    MatchFound {
        session_id: Uuid,
        subject: String,
        opponent_name: String,
    },
    QuizStart,
    #[serde(rename_all = "camelCase")]
    QuizQuestion {
        question: QuestionView,
        round_index: usize,
        total_rounds: usize,
    },
    /// Sent only to the submitter.
    AnswerResult {
        correct: bool,
        score: u32,
    },
    /// Sent only to the non-submitter; reveals nothing about the answer.
    OpponentAnswered,
    #[serde(rename_all = "camelCase")]
    QuizEnd {
        my_result: PlayerResult,
        opponent_result: OpponentSummary,
    },
    OpponentLeft,
    Error {
        message: String,
    },
}

impl ServerWsMessage {
    pub fn waiting() -> Self {
        Self::MatchmakingStatus { status: "waiting".to_string() }
    }

    pub fn error(message: &str) -> Self {
        Self::Error { message: message.to_string() }
    }
}
