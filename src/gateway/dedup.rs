//! Outbound dedup guard.
//!
//! Remembers the last text sent to each user and suppresses a byte-identical
//! repeat, so webhook redeliveries and double-processed turns never produce
//! the same message twice in a row. In-memory only: a restart forgets, which
//! at worst re-sends one message.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub(super) struct DedupGuard {
    last: Mutex<HashMap<String, String>>,
}

impl DedupGuard {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Record `text` as the latest outbound for `user_id`; returns `false`
    /// when it matches what was last sent and must be suppressed.
    pub(super) fn should_send(&self, user_id: &str, text: &str) -> bool {
        let Ok(mut last) = self.last.lock() else {
            return true;
        };
        match last.get(user_id) {
            Some(previous) if previous == text => false,
            _ => {
                last.insert(user_id.to_string(), text.to_string());
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_repeat_is_suppressed() {
        let guard = DedupGuard::new();
        assert!(guard.should_send("5511", "Confirma?"));
        assert!(!guard.should_send("5511", "Confirma?"));
    }

    #[test]
    fn test_different_text_resets_the_memory() {
        let guard = DedupGuard::new();
        assert!(guard.should_send("5511", "Confirma?"));
        assert!(guard.should_send("5511", "✓ Agendado."));
        assert!(guard.should_send("5511", "Confirma?"), "not adjacent anymore");
    }

    #[test]
    fn test_users_are_independent() {
        let guard = DedupGuard::new();
        assert!(guard.should_send("5511", "oi"));
        assert!(guard.should_send("5522", "oi"));
    }
}
