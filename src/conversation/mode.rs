//! Per-user conversation mode and event serialization

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::UserId;

/// Lock entries kept before idle ones are pruned
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// How the next free-text message from a user is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationMode {
    /// Free text is a task to solve
    #[default]
    Idle,
    /// Onboarding: free text is the user's name
    AwaitingName,
    /// Language change: free text is a language code
    AwaitingLanguage,
}

/// In-memory mode per user; an absent entry means [`ConversationMode::Idle`]
#[derive(Debug, Default)]
pub struct ModeTable {
    modes: Mutex<HashMap<UserId, ConversationMode>>,
}

impl ModeTable {
    /// Current mode of a user
    pub fn get(&self, user_id: UserId) -> ConversationMode {
        let map = self.modes.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        map.get(&user_id).copied().unwrap_or_default()
    }

    /// Replace a user's mode
    pub fn set(&self, user_id: UserId, mode: ConversationMode) {
        let mut map = self.modes.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if mode == ConversationMode::Idle {
            map.remove(&user_id);
        } else {
            map.insert(user_id, mode);
        }
    }
}

/// One async mutex per user so a user's events are handled one at a time
///
/// Different users never contend with each other.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    /// Wait for exclusive access to a user's state
    pub async fn acquire(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

            if map.len() >= LOCK_PRUNE_THRESHOLD {
                // Only the map holds an idle lock
                map.retain(|_, l| Arc::strong_count(l) > 1);
            }

            Arc::clone(map.entry(user_id).or_default())
        };

        lock.lock_owned().await
    }
}
