//! Main entry point for the backend server.
//!
//! Initializes the actor system, configures application state, and launches
//! the HTTP server with the WebSocket endpoint players connect through.

use actix::Actor;
use actix_web::{web, App, HttpServer};
use config::quiz::QuizConfig;
use server::matchmaking::server::MatchmakingServer;
use server::match_session::registry::SessionRegistry;
use server::question_source::QuestionBank;

pub mod config;
mod quiz;
mod server;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::init();

    // Start the question source (in-memory bank with the built-in subjects).
    let question_bank = QuestionBank::with_default_subjects().start();

    // Start the SessionRegistry actor (creates and tracks match sessions).
    let registry = SessionRegistry::new(question_bank, QuizConfig::default()).start();

    // Start the MatchmakingServer actor (subject queues and pairing).
    let matchmaking = MatchmakingServer::new(registry).start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(matchmaking));

    // Start the HTTP server with the WebSocket endpoint.
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
