//! Cross-actor scenarios: pairing, full matches, timeouts, disconnects.
//!
//! These tests stand in mock player actors for the WebSocket connections
//! and shrink every delay so a whole match runs in milliseconds.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use actix::prelude::*;
use uuid::Uuid;

use crate::config::quiz::QuizConfig;
use crate::quiz::types::Question;
use crate::server::match_session::messages::{PlayerDisconnected, PlayerLink, SessionEvent, SubmitAnswer};
use crate::server::match_session::registry::{GetSession, GetSessionForPlayer, SessionRegistry};
use crate::server::match_session::server::MatchSession;
use crate::server::matchmaking::server::{Enqueue, MatchmakingServer};
use crate::server::matchmaking::types::PlayerInfo;
use crate::server::messages::ServerWsMessage;
use crate::server::question_source::QuestionBank;

/// How a mock player reacts to each question.
#[derive(Clone, Copy)]
enum AnswerPlan {
    /// Submit this choice index immediately, every round.
    Always(usize),
    /// Never answer; rely on the deadline.
    Never,
}

/// Stand-in for a `PlayerSession`: collects every server message and
/// answers questions according to its plan.
struct MockPlayer {
    player_id: Uuid,
    plan: AnswerPlan,
    session: Option<Addr<MatchSession>>,
    events: Arc<Mutex<Vec<ServerWsMessage>>>,
}

impl Actor for MockPlayer {
    type Context = Context<Self>;
}

impl Handler<ServerWsMessage> for MockPlayer {
    type Result = ();

    fn handle(&mut self, msg: ServerWsMessage, _ctx: &mut Context<Self>) {
        if let (ServerWsMessage::QuizQuestion { question, .. }, AnswerPlan::Always(choice), Some(session)) =
            (&msg, self.plan, &self.session)
        {
            session.do_send(SubmitAnswer {
                player_id: self.player_id,
                question_id: question.id,
                choice_index: choice,
                elapsed_ms: 1200,
            });
        }
        self.events.lock().unwrap().push(msg);
    }
}

impl Handler<SessionEvent> for MockPlayer {
    type Result = ();

    fn handle(&mut self, msg: SessionEvent, _ctx: &mut Context<Self>) {
        match msg {
            SessionEvent::Assigned { addr, .. } => self.session = Some(addr),
            SessionEvent::Closed => self.session = None,
        }
    }
}

struct TestPlayer {
    id: Uuid,
    addr: Addr<MockPlayer>,
    events: Arc<Mutex<Vec<ServerWsMessage>>>,
}

fn spawn_player(plan: AnswerPlan) -> TestPlayer {
    let id = Uuid::new_v4();
    let events = Arc::new(Mutex::new(Vec::new()));
    let addr = MockPlayer {
        player_id: id,
        plan,
        session: None,
        events: events.clone(),
    }
    .start();
    TestPlayer { id, addr, events }
}

fn link_for(player: &TestPlayer, name: &str) -> PlayerLink {
    PlayerLink {
        info: PlayerInfo {
            id: player.id,
            display_name: name.to_string(),
        },
        msg: player.addr.clone().recipient(),
        ctl: player.addr.clone().recipient(),
    }
}

/// A bank where choice 0 is always the correct answer.
fn fixed_bank(rounds: usize) -> Addr<QuestionBank> {
    let questions: Vec<Question> = (0..rounds)
        .map(|i| Question {
            id: Uuid::new_v4(),
            text: format!("question {}", i),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 0,
        })
        .collect();
    let mut bank = QuestionBank::new();
    bank.insert_subject("testing", questions);
    bank.start()
}

fn fast_config(rounds: usize, deadline: Duration) -> QuizConfig {
    QuizConfig {
        questions_per_match: rounds,
        start_delay: Duration::from_millis(20),
        round_deadline: deadline,
        disposal_delay: Duration::from_millis(40),
    }
}

async fn wait_until(mut cond: impl FnMut() -> bool, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !cond() {
        if Instant::now() > deadline {
            panic!("condition not reached within {:?}", timeout);
        }
        actix_rt::time::sleep(Duration::from_millis(10)).await;
    }
}

fn events_of(player: &TestPlayer) -> Vec<ServerWsMessage> {
    player.events.lock().unwrap().clone()
}

fn question_count(events: &[ServerWsMessage]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ServerWsMessage::QuizQuestion { .. }))
        .count()
}

fn quiz_end_count(events: &[ServerWsMessage]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ServerWsMessage::QuizEnd { .. }))
        .count()
}

fn final_scores(events: &[ServerWsMessage]) -> Option<(u32, u32)> {
    events.iter().find_map(|e| match e {
        ServerWsMessage::QuizEnd { my_result, opponent_result } => {
            Some((my_result.score, opponent_result.score))
        }
        _ => None,
    })
}

#[actix_rt::test]
async fn full_match_reports_each_player_exactly_once() {
    let registry = SessionRegistry::new(fixed_bank(2), fast_config(2, Duration::from_millis(200))).start();
    let matchmaking = MatchmakingServer::new(registry).start();
    let alice = spawn_player(AnswerPlan::Always(0));
    let bob = spawn_player(AnswerPlan::Always(1));

    matchmaking.do_send(Enqueue { subject: "testing".into(), link: link_for(&alice, "alice") });
    matchmaking.do_send(Enqueue { subject: "testing".into(), link: link_for(&bob, "bob") });

    wait_until(
        || quiz_end_count(&events_of(&alice)) == 1 && quiz_end_count(&events_of(&bob)) == 1,
        Duration::from_secs(3),
    )
    .await;
    // leave room for an accidental duplicate delivery to show up
    actix_rt::time::sleep(Duration::from_millis(150)).await;

    let alice_events = events_of(&alice);
    let bob_events = events_of(&bob);

    assert_eq!(quiz_end_count(&alice_events), 1);
    assert_eq!(quiz_end_count(&bob_events), 1);
    // both players answer instantly, so every round resolves on answers and
    // each question still goes out exactly once
    assert_eq!(question_count(&alice_events), 2);
    assert_eq!(question_count(&bob_events), 2);

    assert_eq!(final_scores(&alice_events), Some((2, 0)));
    assert_eq!(final_scores(&bob_events), Some((0, 2)));

    let opponent_of_alice = alice_events.iter().find_map(|e| match e {
        ServerWsMessage::MatchFound { opponent_name, .. } => Some(opponent_name.clone()),
        _ => None,
    });
    assert_eq!(opponent_of_alice.as_deref(), Some("bob"));
}

#[actix_rt::test]
async fn unanswered_player_is_timed_out_each_round() {
    let deadline = Duration::from_millis(100);
    let registry = SessionRegistry::new(fixed_bank(2), fast_config(2, deadline)).start();
    let matchmaking = MatchmakingServer::new(registry).start();
    let alice = spawn_player(AnswerPlan::Always(0));
    let bob = spawn_player(AnswerPlan::Never);

    matchmaking.do_send(Enqueue { subject: "testing".into(), link: link_for(&alice, "alice") });
    matchmaking.do_send(Enqueue { subject: "testing".into(), link: link_for(&bob, "bob") });

    wait_until(
        || quiz_end_count(&events_of(&bob)) == 1,
        Duration::from_secs(3),
    )
    .await;

    let bob_end = events_of(&bob)
        .into_iter()
        .find_map(|e| match e {
            ServerWsMessage::QuizEnd { my_result, opponent_result } => Some((my_result, opponent_result)),
            _ => None,
        })
        .unwrap();

    // every round of bob's is the timeout sentinel
    assert_eq!(bob_end.0.score, 0);
    assert_eq!(bob_end.0.total_elapsed_ms, 200);
    assert!(bob_end.0.rounds.iter().all(|r| {
        r.as_ref().is_some_and(|a| a.choice.is_none() && !a.correct)
    }));
    assert_eq!(bob_end.1.score, 2);

    // the answering player saw the opponent time out, never answer
    let alice_events = events_of(&alice);
    assert!(!alice_events.iter().any(|e| matches!(e, ServerWsMessage::OpponentAnswered)));
    assert_eq!(final_scores(&alice_events), Some((2, 0)));
}

#[actix_rt::test]
async fn disconnect_ends_the_match_early() {
    let registry = SessionRegistry::new(fixed_bank(5), fast_config(5, Duration::from_millis(500))).start();
    let matchmaking = MatchmakingServer::new(registry.clone()).start();
    let alice = spawn_player(AnswerPlan::Always(0));
    let bob = spawn_player(AnswerPlan::Never);

    matchmaking.do_send(Enqueue { subject: "testing".into(), link: link_for(&alice, "alice") });
    matchmaking.do_send(Enqueue { subject: "testing".into(), link: link_for(&bob, "bob") });

    wait_until(
        || question_count(&events_of(&alice)) == 1,
        Duration::from_secs(3),
    )
    .await;

    let session = registry
        .send(GetSessionForPlayer { player_id: bob.id })
        .await
        .unwrap()
        .unwrap();
    session.do_send(PlayerDisconnected { player_id: bob.id });

    wait_until(
        || quiz_end_count(&events_of(&alice)) == 1,
        Duration::from_secs(3),
    )
    .await;
    actix_rt::time::sleep(Duration::from_millis(150)).await;

    let alice_events = events_of(&alice);
    let bob_events = events_of(&bob);

    assert!(alice_events.iter().any(|e| matches!(e, ServerWsMessage::OpponentLeft)));
    // no further questions after the disconnect, and nothing for the leaver
    assert_eq!(question_count(&alice_events), 1);
    assert_eq!(quiz_end_count(&bob_events), 0);

    // disposal skipped the grace period: the registry has let go of both
    let session_id = alice_events
        .iter()
        .find_map(|e| match e {
            ServerWsMessage::MatchFound { session_id, .. } => Some(*session_id),
            _ => None,
        })
        .unwrap();
    let lookup = registry.send(GetSession { session_id }).await.unwrap();
    assert!(lookup.is_err());
    let lookup = registry.send(GetSessionForPlayer { player_id: alice.id }).await.unwrap();
    assert!(lookup.is_err());
}

#[actix_rt::test]
async fn failed_session_creation_returns_players_to_the_queue() {
    // a bank with no subjects at all: creation always fails
    let registry = SessionRegistry::new(QuestionBank::new().start(), fast_config(2, Duration::from_millis(100))).start();
    let matchmaking = MatchmakingServer::new(registry.clone()).start();
    let alice = spawn_player(AnswerPlan::Always(0));
    let bob = spawn_player(AnswerPlan::Always(0));

    matchmaking.do_send(Enqueue { subject: "astronomy".into(), link: link_for(&alice, "alice") });
    matchmaking.do_send(Enqueue { subject: "astronomy".into(), link: link_for(&bob, "bob") });

    let got_error = |p: &TestPlayer| {
        events_of(p)
            .iter()
            .any(|e| matches!(e, ServerWsMessage::Error { .. }))
    };
    wait_until(
        || got_error(&alice) && got_error(&bob),
        Duration::from_secs(3),
    )
    .await;

    // both are back waiting, no match was ever announced
    let alice_events = events_of(&alice);
    assert!(!alice_events.iter().any(|e| matches!(e, ServerWsMessage::MatchFound { .. })));
    assert_eq!(
        alice_events
            .iter()
            .filter(|e| matches!(e, ServerWsMessage::MatchmakingStatus { .. }))
            .count(),
        2
    );
    let lookup = registry.send(GetSessionForPlayer { player_id: bob.id }).await.unwrap();
    assert!(lookup.is_err());
}
