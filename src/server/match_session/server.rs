//! Match session actor.
//!
//! One actor per two-player match. Its mailbox serializes every mutation:
//! answer submissions, deadline timers, and disconnects can never
//! interleave mid-round. Round flow lives in `rounds`, result delivery in
//! `results`; this file holds the actor itself and its message handlers.

use actix::prelude::*;
use log::{info, debug, warn};
use uuid::Uuid;

use super::messages::{Dispose, PlayerDisconnected, PlayerLink, SessionEvent, SubmitAnswer};
use super::registry::SessionRegistry;
use super::{results, rounds};
use crate::config::quiz::QuizConfig;
use crate::quiz::state::{MatchState, Phase};
use crate::quiz::types::{Question, RecordedAnswer};
use crate::server::messages::ServerWsMessage;
use crate::server::question_source::{QuestionBank, ValidateAnswer};

pub struct MatchSession {
    pub(crate) session_id: Uuid,
    pub(crate) links: [PlayerLink; 2],
    pub(crate) state: MatchState,
    pub(crate) config: QuizConfig,
    pub(crate) registry: Addr<SessionRegistry>,
    pub(crate) question_source: Addr<QuestionBank>,
    /// Timer for the pending round deadline, cancelled when a round
    /// resolves early. The deadline token is what makes a late firing
    /// harmless; cancelling just avoids the wakeup.
    pub(crate) deadline_timer: Option<SpawnHandle>,
}

impl MatchSession {
    pub fn new(
        session_id: Uuid,
        subject: String,
        links: [PlayerLink; 2],
        questions: Vec<Question>,
        config: QuizConfig,
        registry: Addr<SessionRegistry>,
        question_source: Addr<QuestionBank>,
    ) -> Self {
        let players = [links[0].info.clone(), links[1].info.clone()];
        Self {
            session_id,
            links,
            state: MatchState::new(subject, players, questions),
            config,
            registry,
            question_source,
            deadline_timer: None,
        }
    }

    pub(crate) fn broadcast(&self, msg: ServerWsMessage) {
        for link in &self.links {
            link.msg.do_send(msg.clone());
        }
    }

    /// Apply a validated answer and resolve the round if it is now full.
    fn apply_answer(
        &mut self,
        seat: usize,
        choice_index: usize,
        elapsed_ms: u64,
        correct: bool,
        ctx: &mut Context<Self>,
    ) {
        let recorded = RecordedAnswer {
            choice: Some(choice_index),
            elapsed_ms,
            correct,
        };
        if !self.state.record_answer(seat, recorded) {
            return;
        }
        self.links[seat].msg.do_send(ServerWsMessage::AnswerResult {
            correct,
            score: self.state.score(seat),
        });
        self.links[1 - seat].msg.do_send(ServerWsMessage::OpponentAnswered);
        if self.state.round_complete() {
            rounds::complete_round(self, ctx);
        }
    }
}

impl Actor for MatchSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        for seat in 0..2 {
            let opponent = &self.links[1 - seat].info;
            self.links[seat].ctl.do_send(SessionEvent::Assigned {
                session_id: self.session_id,
                addr: ctx.address(),
            });
            self.links[seat].msg.do_send(ServerWsMessage::MatchFound {
                session_id: self.session_id,
                subject: self.state.subject.clone(),
                opponent_name: opponent.display_name.clone(),
            });
        }
        info!(
            "[MatchSession] {} created: {} vs {} on \"{}\"",
            self.session_id,
            self.state.players[0].display_name,
            self.state.players[1].display_name,
            self.state.subject
        );
        ctx.run_later(self.config.start_delay, |act, ctx| {
            rounds::begin_match(act, ctx);
        });
    }
}

impl Handler<SubmitAnswer> for MatchSession {
    type Result = ();

    /// Records at most one answer per player per round. Stale and
    /// duplicate submissions are discarded, never errors.
    fn handle(&mut self, msg: SubmitAnswer, ctx: &mut Self::Context) -> Self::Result {
        if self.state.phase() != Phase::Playing {
            debug!("[MatchSession] {} answer outside playing phase, discarded", self.session_id);
            return;
        }
        let Some(seat) = self.state.seat_of(msg.player_id) else {
            return;
        };
        let Some(round) = self.state.round() else {
            return;
        };
        let Some(question) = self.state.current_question() else {
            return;
        };
        if question.id != msg.question_id {
            debug!(
                "[MatchSession] {} stale answer from {} for a resolved round, discarded",
                self.session_id, msg.player_id
            );
            return;
        }
        if self.state.has_answered(seat) {
            debug!(
                "[MatchSession] {} duplicate answer from {}, discarded",
                self.session_id, msg.player_id
            );
            return;
        }

        // Validation is a round-trip to the question source; by the time it
        // lands, the deadline may have fired or the match ended, so the
        // continuation re-checks currency before touching anything.
        let validate = self.question_source.send(ValidateAnswer {
            subject: self.state.subject.clone(),
            question_id: msg.question_id,
            choice_index: msg.choice_index,
        });
        ctx.spawn(validate.into_actor(self).map(move |res, act, ctx| {
            if act.state.phase() != Phase::Playing
                || act.state.round() != Some(round)
                || act.state.has_answered(seat)
            {
                debug!(
                    "[MatchSession] {} validation landed after the round resolved, discarded",
                    act.session_id
                );
                return;
            }
            let correct = match res {
                Ok(Ok(correct)) => correct,
                Ok(Err(err)) => {
                    // the match must never stall on the collaborator
                    warn!("[MatchSession] {} answer validation failed: {}", act.session_id, err);
                    false
                }
                Err(err) => {
                    warn!("[MatchSession] {} question source unreachable: {}", act.session_id, err);
                    false
                }
            };
            act.apply_answer(seat, msg.choice_index, msg.elapsed_ms, correct, ctx);
        }));
    }
}

impl Handler<PlayerDisconnected> for MatchSession {
    type Result = ();

    /// Early termination: skip remaining rounds, tell the peer, finalize
    /// and dispose without the usual grace period.
    fn handle(&mut self, msg: PlayerDisconnected, ctx: &mut Self::Context) -> Self::Result {
        let Some(seat) = self.state.seat_of(msg.player_id) else {
            return;
        };
        match self.state.phase() {
            Phase::Waiting | Phase::Playing => {
                info!(
                    "[MatchSession] {} player {} left mid-match",
                    self.session_id, self.state.players[seat].display_name
                );
                self.links[1 - seat].msg.do_send(ServerWsMessage::OpponentLeft);
                results::finalize(self, ctx, Some(seat));
            }
            Phase::Finished | Phase::Disposed => {
                // grace period already running, nothing left to cut short
            }
        }
    }
}

impl Handler<Dispose> for MatchSession {
    type Result = ();

    fn handle(&mut self, _msg: Dispose, ctx: &mut Self::Context) -> Self::Result {
        results::dispose(self, ctx);
    }
}
