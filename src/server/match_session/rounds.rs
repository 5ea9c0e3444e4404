//! Round flow for a match session.
//!
//! Start countdown, question broadcast, deadline arming, and round
//! resolution. Within one session the order is fixed: a round's broadcast
//! precedes its deadline arming, which precedes the next broadcast.

use actix::prelude::*;
use log::debug;

use super::results;
use super::server::MatchSession;
use crate::quiz::state::DeadlineToken;
use crate::server::messages::ServerWsMessage;

/// End of the start countdown: `waiting -> playing`, first question out.
pub fn begin_match(this: &mut MatchSession, ctx: &mut Context<MatchSession>) {
    if !this.state.begin() {
        // a disconnect during the countdown already ended the session
        return;
    }
    this.broadcast(ServerWsMessage::QuizStart);
    next_round(this, ctx);
}

/// Broadcast the next question and arm its deadline.
pub fn next_round(this: &mut MatchSession, ctx: &mut Context<MatchSession>) {
    let Some(round) = this.state.advance_round() else {
        results::finalize(this, ctx, None);
        return;
    };
    let Some(question) = this.state.current_question() else {
        results::finalize(this, ctx, None);
        return;
    };
    this.broadcast(ServerWsMessage::QuizQuestion {
        question: question.view(),
        round_index: round,
        total_rounds: this.state.total_rounds(),
    });
    arm_deadline(this, round, ctx);
}

fn arm_deadline(this: &mut MatchSession, round: usize, ctx: &mut Context<MatchSession>) {
    let token = this.state.arm_deadline(round);
    let handle = ctx.run_later(this.config.round_deadline, move |act, ctx| {
        on_deadline(act, token, ctx);
    });
    this.deadline_timer = Some(handle);
}

/// Deadline firing: record the timeout sentinel for everyone still
/// unanswered, then resolve the round as if both had answered. A token
/// that no longer matches means the round already resolved; firing then
/// has no observable effect.
pub fn on_deadline(this: &mut MatchSession, token: DeadlineToken, ctx: &mut Context<MatchSession>) {
    if !this.state.deadline_current(token) {
        return;
    }
    let deadline_ms = this.config.round_deadline.as_millis() as u64;
    let filled = this.state.fill_timeouts(deadline_ms);
    debug!(
        "[MatchSession] {} round {} deadline expired, {} unanswered",
        this.session_id, token.round, filled
    );
    complete_round(this, ctx);
}

/// Round resolution, reached exactly once per round: either every seat
/// answered or the deadline filled the gaps.
pub fn complete_round(this: &mut MatchSession, ctx: &mut Context<MatchSession>) {
    if let Some(handle) = this.deadline_timer.take() {
        ctx.cancel_future(handle);
    }
    this.state.invalidate_deadline();
    if this.state.on_last_round() {
        results::finalize(this, ctx, None);
    } else {
        next_round(this, ctx);
    }
}
