//! Per-user memory of the last generated prompt, consulted by button presses.
//!
//! Entries expire after a fixed time-to-live and the store holds at most
//! `capacity` users; inserting past capacity evicts the oldest entries.
//! Nothing survives a process restart.

use crate::parser::PromptRecord;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    record: PromptRecord,
    stored_at: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<Mutex<HashMap<u64, Entry>>>,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        SessionStore {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Store (or replace) the user's record.
    pub fn insert(&self, user_id: u64, record: PromptRecord) {
        self.insert_at(user_id, record, Instant::now());
    }

    fn insert_at(&self, user_id: u64, record: PromptRecord, now: Instant) {
        let mut entries = self.entries.lock();
        let ttl = self.ttl;
        entries.retain(|_, e| now.saturating_duration_since(e.stored_at) < ttl);

        entries.insert(
            user_id,
            Entry {
                record,
                stored_at: now,
            },
        );

        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    debug!(user_id = id, "evicting session over capacity");
                    entries.remove(&id);
                }
                None => break,
            }
        }
    }

    /// The user's record, unless it is missing or expired.
    pub fn get(&self, user_id: u64) -> Option<PromptRecord> {
        self.get_at(user_id, Instant::now())
    }

    fn get_at(&self, user_id: u64, now: Instant) -> Option<PromptRecord> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(&user_id) {
            Some(e) if now.saturating_duration_since(e.stored_at) < self.ttl => {
                return Some(e.record.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(&user_id);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
