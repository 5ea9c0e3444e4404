//! Session registry actor.
//!
//! Creates, looks up, and destroys match sessions. Creation pulls the
//! question snapshot from the question source first; the session actor is
//! only spawned once a non-empty set is in hand, so a source failure never
//! produces a half-initialized match.

use actix::prelude::*;
use std::collections::HashMap;
use log::{debug, warn};
use uuid::Uuid;

use super::messages::{Dispose, PlayerLink};
use super::server::MatchSession;
use crate::config::quiz::QuizConfig;
use crate::server::matchmaking::types::PlayerId;
use crate::server::question_source::{FetchQuestions, QuestionBank};

pub struct SessionRegistry {
    sessions: HashMap<Uuid, Addr<MatchSession>>,
    /// Which session each player currently belongs to.
    players: HashMap<PlayerId, Uuid>,
    question_source: Addr<QuestionBank>,
    config: QuizConfig,
}

impl SessionRegistry {
    pub fn new(question_source: Addr<QuestionBank>, config: QuizConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            players: HashMap::new(),
            question_source,
            config,
        }
    }
}

impl Actor for SessionRegistry {
    type Context = Context<Self>;
}

/// Message: create a session for a freshly paired duo.
#[derive(Message)]
#[rtype(result = "Result<Uuid, String>")]
pub struct CreateSession {
    pub subject: String,
    pub players: [PlayerLink; 2],
}

/// Message: look up a session by id.
#[derive(Message)]
#[rtype(result = "Result<Addr<MatchSession>, String>")]
pub struct GetSession {
    pub session_id: Uuid,
}

/// Message: look up the session a player is in.
#[derive(Message)]
#[rtype(result = "Result<Addr<MatchSession>, String>")]
pub struct GetSessionForPlayer {
    pub player_id: PlayerId,
}

/// Message: remove a session. Irreversible.
#[derive(Message)]
#[rtype(result = "()")]
pub struct DestroySession {
    pub session_id: Uuid,
}

impl Handler<CreateSession> for SessionRegistry {
    type Result = ResponseActFuture<Self, Result<Uuid, String>>;

    fn handle(&mut self, msg: CreateSession, _ctx: &mut Self::Context) -> Self::Result {
        let fetch = self.question_source.send(FetchQuestions {
            subject: msg.subject.clone(),
            count: self.config.questions_per_match,
        });
        Box::pin(fetch.into_actor(self).map(move |res, act, ctx| {
            let questions = match res {
                Ok(Ok(questions)) if !questions.is_empty() => questions,
                Ok(Ok(_)) => return Err(format!("no questions for subject \"{}\"", msg.subject)),
                Ok(Err(err)) => {
                    warn!("[Registry] question source rejected \"{}\": {}", msg.subject, err);
                    return Err(err.to_string());
                }
                Err(err) => {
                    warn!("[Registry] question source unreachable: {}", err);
                    return Err("question source unavailable".to_string());
                }
            };

            let session_id = Uuid::new_v4();
            for link in &msg.players {
                act.players.insert(link.info.id, session_id);
            }
            let session = MatchSession::new(
                session_id,
                msg.subject,
                msg.players,
                questions,
                act.config,
                ctx.address(),
                act.question_source.clone(),
            )
            .start();
            act.sessions.insert(session_id, session);
            debug!("[Registry] session {} created ({} active)", session_id, act.sessions.len());
            Ok(session_id)
        }))
    }
}

impl Handler<GetSession> for SessionRegistry {
    type Result = Result<Addr<MatchSession>, String>;

    fn handle(&mut self, msg: GetSession, _ctx: &mut Self::Context) -> Self::Result {
        self.sessions
            .get(&msg.session_id)
            .cloned()
            .ok_or_else(|| "Match session not found".to_string())
    }
}

impl Handler<GetSessionForPlayer> for SessionRegistry {
    type Result = Result<Addr<MatchSession>, String>;

    fn handle(&mut self, msg: GetSessionForPlayer, _ctx: &mut Self::Context) -> Self::Result {
        self.players
            .get(&msg.player_id)
            .and_then(|session_id| self.sessions.get(session_id))
            .cloned()
            .ok_or_else(|| "Player is not in a match".to_string())
    }
}

impl Handler<DestroySession> for SessionRegistry {
    type Result = ();

    fn handle(&mut self, msg: DestroySession, _ctx: &mut Self::Context) -> Self::Result {
        if let Some(session) = self.sessions.remove(&msg.session_id) {
            self.players.retain(|_, sid| *sid != msg.session_id);
            session.do_send(Dispose);
            debug!(
                "[Registry] session {} destroyed ({} active)",
                msg.session_id,
                self.sessions.len()
            );
        }
    }
}
