use crate::quiz::types::{PlayerResult, OpponentSummary, Question, RecordedAnswer};
use crate::server::matchmaking::types::{PlayerId, PlayerInfo};

/// Lifecycle of a match session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Session created, countdown to the first question running.
    Waiting,
    /// Rounds in progress.
    Playing,
    /// Results computed and delivered, pending disposal.
    Finished,
    /// Terminal; the session is gone from the registry.
    Disposed,
}

/// Handle for the pending timeout of one round.
///
/// A timer callback only acts if its token still matches the state's
/// current generation, so a deadline that was scheduled before the round
/// resolved becomes a no-op instead of corrupting a later round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineToken {
    pub round: usize,
    pub generation: u64,
}

/// All bookkeeping for one two-player match.
///
/// Pure state: the session actor owns one of these and serializes every
/// mutation through its mailbox.
#[derive(Debug, Clone)]
pub struct MatchState {
    pub subject: String,
    pub players: [PlayerInfo; 2],
    pub questions: Vec<Question>,
    phase: Phase,
    round: Option<usize>,
    deadline_gen: u64,
    scores: [u32; 2],
    elapsed_ms: [u64; 2],
    answers: Vec<[Option<RecordedAnswer>; 2]>,
}

impl MatchState {
    pub fn new(subject: String, players: [PlayerInfo; 2], questions: Vec<Question>) -> Self {
        let rounds = questions.len();
        Self {
            subject,
            players,
            questions,
            phase: Phase::Waiting,
            round: None,
            deadline_gen: 0,
            scores: [0; 2],
            elapsed_ms: [0; 2],
            answers: vec![[None, None]; rounds],
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the round in progress. `None` until the first question goes out.
    pub fn round(&self) -> Option<usize> {
        self.round
    }

    pub fn total_rounds(&self) -> usize {
        self.questions.len()
    }

    pub fn seat_of(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn score(&self, seat: usize) -> u32 {
        self.scores[seat]
    }

    /// Start the match: `Waiting -> Playing`. False if the session already
    /// moved on (e.g. a disconnect during the countdown).
    pub fn begin(&mut self) -> bool {
        if self.phase != Phase::Waiting {
            return false;
        }
        self.phase = Phase::Playing;
        true
    }

    /// Move to the next round. `None` once the questions are exhausted.
    pub fn advance_round(&mut self) -> Option<usize> {
        if self.phase != Phase::Playing {
            return None;
        }
        let next = self.round.map_or(0, |r| r + 1);
        if next >= self.questions.len() {
            return None;
        }
        self.round = Some(next);
        Some(next)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.round.and_then(|r| self.questions.get(r))
    }

    pub fn on_last_round(&self) -> bool {
        self.round.is_some_and(|r| r + 1 == self.questions.len())
    }

    pub fn has_answered(&self, seat: usize) -> bool {
        self.round.is_some_and(|r| self.answers[r][seat].is_some())
    }

    /// Record one player's entry for the current round. Rejects anything
    /// outside an active round and duplicate submissions; neither mutates
    /// score or elapsed time.
    pub fn record_answer(&mut self, seat: usize, answer: RecordedAnswer) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        let Some(round) = self.round else {
            return false;
        };
        if self.answers[round][seat].is_some() {
            return false;
        }
        if answer.correct {
            self.scores[seat] += 1;
        }
        self.elapsed_ms[seat] += answer.elapsed_ms;
        self.answers[round][seat] = Some(answer);
        true
    }

    /// Record the timeout sentinel for every seat without an entry in the
    /// current round. Returns how many seats were filled.
    pub fn fill_timeouts(&mut self, deadline_ms: u64) -> usize {
        if self.phase != Phase::Playing {
            return 0;
        }
        let Some(round) = self.round else {
            return 0;
        };
        let mut filled = 0;
        for seat in 0..2 {
            if self.answers[round][seat].is_none() {
                self.elapsed_ms[seat] += deadline_ms;
                self.answers[round][seat] = Some(RecordedAnswer::timed_out(deadline_ms));
                filled += 1;
            }
        }
        filled
    }

    /// True once every seat has a recorded entry for the current round.
    pub fn round_complete(&self) -> bool {
        self.round
            .is_some_and(|r| self.answers[r].iter().all(|a| a.is_some()))
    }

    /// Stamp a new deadline token for the given round, invalidating any
    /// previously armed one.
    pub fn arm_deadline(&mut self, round: usize) -> DeadlineToken {
        self.deadline_gen += 1;
        DeadlineToken {
            round,
            generation: self.deadline_gen,
        }
    }

    pub fn deadline_current(&self, token: DeadlineToken) -> bool {
        self.phase == Phase::Playing
            && self.round == Some(token.round)
            && self.deadline_gen == token.generation
    }

    /// Invalidate whatever deadline token is outstanding.
    pub fn invalidate_deadline(&mut self) {
        self.deadline_gen += 1;
    }

    /// `Waiting|Playing -> Finished`. False if already finished or disposed,
    /// which is what makes result delivery exactly-once.
    pub fn finish(&mut self) -> bool {
        if !matches!(self.phase, Phase::Waiting | Phase::Playing) {
            return false;
        }
        self.phase = Phase::Finished;
        true
    }

    /// Terminal transition. False if already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.phase == Phase::Disposed {
            return false;
        }
        self.phase = Phase::Disposed;
        true
    }

    pub fn result_for(&self, seat: usize) -> PlayerResult {
        PlayerResult {
            score: self.scores[seat],
            total_elapsed_ms: self.elapsed_ms[seat],
            rounds: self.answers.iter().map(|pair| pair[seat].clone()).collect(),
        }
    }

    pub fn summary_for(&self, seat: usize) -> OpponentSummary {
        OpponentSummary {
            display_name: self.players[seat].display_name.clone(),
            score: self.scores[seat],
            total_elapsed_ms: self.elapsed_ms[seat],
        }
    }
}
