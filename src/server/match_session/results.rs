//! Result aggregation and session disposal.
//!
//! Finalization runs exactly once per session, whether the match ran out
//! of questions or a player disconnected; the phase transition is the
//! guard. Each connected player receives their own full result plus the
//! opponent's score and total time, never the opponent's per-round detail.

use actix::prelude::*;
use log::{info, debug};

use super::messages::SessionEvent;
use super::registry::DestroySession;
use super::server::MatchSession;
use crate::server::messages::ServerWsMessage;

/// Compute and deliver the final results, then arrange disposal.
///
/// `departed` names a seat that disconnected: it gets no delivery, and the
/// session is disposed immediately instead of after the grace period.
pub fn finalize(this: &mut MatchSession, ctx: &mut Context<MatchSession>, departed: Option<usize>) {
    if let Some(handle) = this.deadline_timer.take() {
        ctx.cancel_future(handle);
    }
    this.state.invalidate_deadline();
    if !this.state.finish() {
        return;
    }

    for seat in 0..2 {
        if departed == Some(seat) {
            continue;
        }
        this.links[seat].msg.do_send(ServerWsMessage::QuizEnd {
            my_result: this.state.result_for(seat),
            opponent_result: this.state.summary_for(1 - seat),
        });
    }
    info!(
        "[MatchSession] {} finished {} - {}",
        this.session_id,
        this.state.score(0),
        this.state.score(1)
    );

    if departed.is_some() {
        dispose(this, ctx);
    } else {
        ctx.run_later(this.config.disposal_delay, |act, ctx| {
            dispose(act, ctx);
        });
    }
}

/// Terminal teardown: release both players' session references, drop the
/// registry entry, stop the actor.
pub fn dispose(this: &mut MatchSession, ctx: &mut Context<MatchSession>) {
    if !this.state.dispose() {
        return;
    }
    for link in &this.links {
        link.ctl.do_send(SessionEvent::Closed);
    }
    this.registry.do_send(DestroySession {
        session_id: this.session_id,
    });
    debug!("[MatchSession] {} disposed", this.session_id);
    ctx.stop();
}
