//! Subject waiting queues.
//!
//! One FIFO per subject. Owned exclusively by the matchmaking server;
//! every mutation goes through these methods, so a pairing removes both
//! entries before anything else can observe the queue.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::config::matchmaking::MATCH_SIZE;
use super::types::PlayerId;

/// A waiting player's placeholder in a subject FIFO.
#[derive(Debug, Clone)]
pub struct QueueEntry<T> {
    pub player_id: PlayerId,
    pub payload: T,
    pub enqueued_at: Instant,
}

#[derive(Debug)]
pub struct SubjectQueues<T> {
    queues: HashMap<String, VecDeque<QueueEntry<T>>>,
}

impl<T> SubjectQueues<T> {
    pub fn new() -> Self {
        Self { queues: HashMap::new() }
    }

    /// Append a player to a subject queue. A player waits in at most one
    /// queue at a time: any previous entry is removed first.
    pub fn enqueue(&mut self, subject: &str, player_id: PlayerId, payload: T) {
        self.remove(player_id);
        self.queues
            .entry(subject.to_string())
            .or_default()
            .push_back(QueueEntry {
                player_id,
                payload,
                enqueued_at: Instant::now(),
            });
    }

    /// Remove a player from whatever queue they are in. Removing an absent
    /// player is a no-op, not an error.
    pub fn remove(&mut self, player_id: PlayerId) -> Option<QueueEntry<T>> {
        let mut removed = None;
        for queue in self.queues.values_mut() {
            if let Some(pos) = queue.iter().position(|e| e.player_id == player_id) {
                removed = queue.remove(pos);
                break;
            }
        }
        self.queues.retain(|_, q| !q.is_empty());
        removed
    }

    /// Atomically take the two oldest entries of a subject, oldest first.
    /// Returns `None` until the queue holds a full pair.
    pub fn pop_pair(&mut self, subject: &str) -> Option<[QueueEntry<T>; 2]> {
        let queue = self.queues.get_mut(subject)?;
        if queue.len() < MATCH_SIZE {
            return None;
        }
        let first = queue.pop_front()?;
        let second = queue.pop_front()?;
        if queue.is_empty() {
            self.queues.remove(subject);
        }
        Some([first, second])
    }

    /// Put a failed pairing back at the head of its queue, oldest first.
    pub fn requeue_front(&mut self, subject: &str, pair: [QueueEntry<T>; 2]) {
        let queue = self.queues.entry(subject.to_string()).or_default();
        let [first, second] = pair;
        queue.push_front(second);
        queue.push_front(first);
    }

    /// Subject the player is currently waiting in, if any.
    pub fn subject_of(&self, player_id: PlayerId) -> Option<&str> {
        self.queues.iter().find_map(|(subject, queue)| {
            queue
                .iter()
                .any(|e| e.player_id == player_id)
                .then_some(subject.as_str())
        })
    }

    pub fn len(&self, subject: &str) -> usize {
        self.queues.get(subject).map_or(0, VecDeque::len)
    }
}
