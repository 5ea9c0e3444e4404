//! WebSocket session handler for connected players.
//!
//! This actor is the player handle: one per connection, carrying the
//! display name, the subject of interest while queued, and the current
//! match reference. It relays client messages to the matchmaking server
//! or the match session, and serializes server messages back out.

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::borrow::Cow;
use log::debug;
use uuid::Uuid;

use crate::server::match_session::messages::{PlayerDisconnected, PlayerLink, SessionEvent, SubmitAnswer};
use crate::server::match_session::server::MatchSession;
use crate::server::matchmaking::server::{Dequeue, Enqueue, MatchmakingServer};
use crate::server::matchmaking::types::{PlayerId, PlayerInfo};
use crate::server::messages::{ClientWsMessage, ServerWsMessage};

/// Represents one player's WebSocket connection.
pub struct PlayerSession {
    pub player_id: PlayerId,
    pub display_name: String,
    /// Subject the player asked to be queued for, if any.
    pub subject: Option<String>,
    /// Reference to the match the player is in, if any.
    pub session: Option<(Uuid, Addr<MatchSession>)>,
    pub matchmaking: Addr<MatchmakingServer>,
}

impl PlayerSession {
    fn link(&self, ctx: &mut ws::WebsocketContext<Self>) -> PlayerLink {
        PlayerLink {
            info: PlayerInfo {
                id: self.player_id,
                display_name: self.display_name.clone(),
            },
            msg: ctx.address().recipient(),
            ctl: ctx.address().recipient(),
        }
    }

    /// Serialize a server message onto the socket.
    fn send_message(&self, msg: &ServerWsMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(err) => {
                // Serialization error: close the connection rather than
                // leave the client with a half-delivered state.
                log::error!("[PlayerSession] failed to serialize server message: {}", err);
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }
}

impl Actor for PlayerSession {
    type Context = ws::WebsocketContext<Self>;

    /// Called when the connection drops. Disconnect is the cancellation
    /// signal: leave the queue and tell the match, if any.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(subject) = &self.subject {
            debug!("[PlayerSession] {} disconnected while queued for \"{}\"", self.player_id, subject);
        }
        self.matchmaking.do_send(Dequeue {
            player_id: self.player_id,
        });
        if let Some((_, session)) = &self.session {
            session.do_send(PlayerDisconnected {
                player_id: self.player_id,
            });
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSession {
    /// Handles incoming WebSocket messages from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientWsMessage>(&text) {
                Ok(ClientWsMessage::JoinMatchmaking { subject, display_name }) => {
                    if self.session.is_some() {
                        self.send_message(&ServerWsMessage::error("Already in a match"), ctx);
                        return;
                    }
                    if !display_name.trim().is_empty() {
                        self.display_name = display_name;
                    }
                    self.subject = Some(subject.clone());
                    self.matchmaking.do_send(Enqueue {
                        subject,
                        link: self.link(ctx),
                    });
                }
                Ok(ClientWsMessage::LeaveMatchmaking) => {
                    self.subject = None;
                    self.matchmaking.do_send(Dequeue {
                        player_id: self.player_id,
                    });
                }
                Ok(ClientWsMessage::SubmitAnswer { question_id, choice_index, elapsed_ms }) => {
                    match &self.session {
                        Some((_, session)) => session.do_send(SubmitAnswer {
                            player_id: self.player_id,
                            question_id,
                            choice_index,
                            elapsed_ms,
                        }),
                        None => self.send_message(&ServerWsMessage::error("Not in a match"), ctx),
                    }
                }
                Ok(ClientWsMessage::Ping) => {
                    // keepalive, nothing to do
                }
                Err(_) => {
                    self.send_message(&ServerWsMessage::error("Invalid client message"), ctx);
                }
            },
            Ok(ws::Message::Ping(payload)) => ctx.pong(&payload),
            Ok(ws::Message::Close(_)) => ctx.stop(),
            _ => (),
        }
    }
}

impl Handler<ServerWsMessage> for PlayerSession {
    type Result = ();

    /// Relays messages from the matchmaking server or match session to the client.
    fn handle(&mut self, msg: ServerWsMessage, ctx: &mut Self::Context) {
        self.send_message(&msg, ctx);
    }
}

impl Handler<SessionEvent> for PlayerSession {
    type Result = ();

    fn handle(&mut self, msg: SessionEvent, _ctx: &mut Self::Context) {
        match msg {
            SessionEvent::Assigned { session_id, addr } => {
                self.session = Some((session_id, addr));
                // a pairing can race a re-enqueue; make sure no queue entry survives
                self.matchmaking.do_send(Dequeue {
                    player_id: self.player_id,
                });
            }
            SessionEvent::Closed => {
                self.session = None;
                debug!("[PlayerSession] {} released from match", self.player_id);
            }
        }
    }
}

/// WebSocket endpoint for players.
///
/// Accepts an optional `name` query parameter as the initial display name;
/// `joinMatchmaking` can override it. Every connection gets a fresh player id.
pub async fn ws_quiz(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    let mut display_name = String::new();
    for kv in req.query_string().split('&') {
        let mut split = kv.split('=');
        if let (Some("name"), Some(value)) = (split.next(), split.next()) {
            display_name = urlencoding::decode(value)
                .unwrap_or_else(|_| Cow::Borrowed(""))
                .into_owned();
        }
    }

    let player_id = Uuid::new_v4();
    if display_name.is_empty() {
        display_name = format!("player-{}", &player_id.to_string()[..6]);
    }

    ws::start(
        PlayerSession {
            player_id,
            display_name,
            subject: None,
            session: None,
            matchmaking: data.matchmaking_addr.clone(),
        },
        &req,
        stream,
    )
}
