//! Matchmaking server actor.
//!
//! Owns the per-subject waiting queues: admits players, removes them on
//! leave or disconnect, and pairs the two oldest entries of a subject the
//! moment they exist. Pairings are handed to the session registry; if the
//! registry cannot create the session, the pair goes back to the head of
//! its queue for a later retry.

use actix::prelude::*;
use log::{info, debug, warn};

use super::queue::SubjectQueues;
use super::types::PlayerId;
use crate::server::match_session::messages::PlayerLink;
use crate::server::match_session::registry::{CreateSession, SessionRegistry};
use crate::server::messages::ServerWsMessage;

/// Main matchmaking server actor.
pub struct MatchmakingServer {
    /// Waiting players, one FIFO per subject.
    queues: SubjectQueues<PlayerLink>,
    /// Address of the session registry for launching matches.
    registry: Addr<SessionRegistry>,
}

impl MatchmakingServer {
    /// Create a new matchmaking server.
    pub fn new(registry: Addr<SessionRegistry>) -> Self {
        Self {
            queues: SubjectQueues::new(),
            registry,
        }
    }

    /// Pair off waiting players for a subject, two oldest first.
    ///
    /// Entries leave the queue before the registry is asked to create the
    /// session, so a third arrival can never be paired with a claimed one.
    /// On creation failure the pair is restored to the head of the queue
    /// and retried on the next queue event.
    fn try_pair(&mut self, subject: &str, ctx: &mut Context<Self>) {
        while let Some(pair) = self.queues.pop_pair(subject) {
            info!(
                "[Matchmaking] pairing {} and {} on \"{}\" (oldest waited {:?})",
                pair[0].payload.info.display_name,
                pair[1].payload.info.display_name,
                subject,
                pair[0].enqueued_at.elapsed()
            );
            let subject_owned = subject.to_string();
            let links = [pair[0].payload.clone(), pair[1].payload.clone()];
            let request = self.registry.send(CreateSession {
                subject: subject_owned.clone(),
                players: links,
            });
            ctx.spawn(request.into_actor(self).map(move |res, act, _ctx| {
                let err = match res {
                    Ok(Ok(session_id)) => {
                        debug!("[Matchmaking] session {} created for \"{}\"", session_id, subject_owned);
                        return;
                    }
                    Ok(Err(err)) => err,
                    Err(err) => err.to_string(),
                };
                warn!("[Matchmaking] session creation failed on \"{}\": {}", subject_owned, err);
                for entry in &pair {
                    entry.payload.msg.do_send(ServerWsMessage::error(
                        "Match could not be started, you are back in the queue",
                    ));
                    entry.payload.msg.do_send(ServerWsMessage::waiting());
                }
                act.queues.requeue_front(&subject_owned, pair);
            }));
        }
    }
}

/// Message: player joins a subject queue.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Enqueue {
    pub subject: String,
    pub link: PlayerLink,
}

/// Message: player leaves whatever queue they are in. Idempotent.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Dequeue {
    pub player_id: PlayerId,
}

impl Actor for MatchmakingServer {
    type Context = Context<Self>;
}

impl Handler<Enqueue> for MatchmakingServer {
    type Result = ();

    /// Handles a player joining a subject queue and immediately attempts
    /// pairing. Enqueueing while already queued moves the entry.
    fn handle(&mut self, msg: Enqueue, ctx: &mut Self::Context) -> Self::Result {
        let player_id = msg.link.info.id;
        msg.link.msg.do_send(ServerWsMessage::waiting());
        self.queues.enqueue(&msg.subject, player_id, msg.link);
        debug!(
            "[Matchmaking] {} queued for \"{}\" ({} waiting)",
            player_id,
            msg.subject,
            self.queues.len(&msg.subject)
        );
        self.try_pair(&msg.subject, ctx);
    }
}

impl Handler<Dequeue> for MatchmakingServer {
    type Result = ();

    /// Handles a player leaving the queue (explicit leave or disconnect).
    fn handle(&mut self, msg: Dequeue, _ctx: &mut Self::Context) -> Self::Result {
        if let Some(subject) = self.queues.subject_of(msg.player_id).map(str::to_string) {
            self.queues.remove(msg.player_id);
            debug!("[Matchmaking] {} left the \"{}\" queue", msg.player_id, subject);
        }
    }
}
