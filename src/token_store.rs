//! In-memory slot for the current access credential

use crate::types::Credential;
use parking_lot::Mutex;
use std::time::Duration;

/// Holds at most one [`Credential`] and a generation counter.
///
/// Every write bumps the generation. A refresh captures the generation when
/// it starts and only commits its result if nothing superseded it in the
/// meantime.
pub struct TokenStore {
    slot: Mutex<Slot>,
}

#[derive(Default)]
struct Slot {
    credential: Option<Credential>,
    generation: u64,
}

impl TokenStore {
    /// Create an empty token store
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Replace the current credential
    pub fn replace(&self, credential: Credential) {
        let mut slot = self.slot.lock();
        slot.credential = Some(credential);
        slot.generation += 1;
    }

    /// Replace the credential only if `generation` is still current.
    /// Returns whether the credential was stored.
    pub fn replace_if_current(&self, generation: u64, credential: Credential) -> bool {
        let mut slot = self.slot.lock();
        if slot.generation != generation {
            return false;
        }
        slot.credential = Some(credential);
        slot.generation += 1;
        true
    }

    /// Current token, without any expiry check
    pub fn token(&self) -> Option<String> {
        self.slot
            .lock()
            .credential
            .as_ref()
            .map(|c| c.token().to_string())
    }

    /// Current token together with the generation it belongs to
    pub fn snapshot(&self) -> (Option<Credential>, u64) {
        let slot = self.slot.lock();
        (slot.credential.clone(), slot.generation)
    }

    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }

    /// True if empty or within `buffer` of expiry
    pub fn is_expired(&self, buffer: Duration) -> bool {
        match &self.slot.lock().credential {
            Some(credential) => credential.is_expired_within(buffer),
            None => true,
        }
    }

    /// Drop the credential and supersede any in-flight refresh
    pub fn clear(&self) {
        let mut slot = self.slot.lock();
        slot.credential = None;
        slot.generation += 1;
    }

    /// Drop the credential only if `generation` is still current.
    pub fn clear_if_current(&self, generation: u64) -> bool {
        let mut slot = self.slot.lock();
        if slot.generation != generation {
            return false;
        }
        slot.credential = None;
        slot.generation += 1;
        true
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}
