//! HTTP and WebSocket routing configuration.
//!
//! A single WebSocket endpoint carries a player through matchmaking and
//! their match; the connection actor routes messages to the right place.

use actix_web::web;
use crate::server::session::ws_quiz;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/ws/quiz")
            .to(ws_quiz)
    );
}
