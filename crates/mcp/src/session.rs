//! Per-session state (SPEC §4.8.1 step 2, §4.8.4 scope manager): call
//! counts and a short outcome history per tool, used by the pattern
//! detector to spot abusive polling before it wastes a whole context
//! window on dead ends.

use std::collections::HashMap;

use crate::tools::{ToolCategory, ToolName};

const HISTORY_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct CallRecord {
    pub tool: ToolName,
    pub category: ToolCategory,
    pub empty_result: bool,
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub call_counts: HashMap<ToolName, u64>,
    pub history: Vec<CallRecord>,
}

impl SessionState {
    pub fn record(&mut self, record: CallRecord) {
        *self.call_counts.entry(record.tool).or_insert(0) += 1;
        self.history.push(record);
        if self.history.len() > HISTORY_LEN {
            self.history.remove(0);
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<String, SessionState>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an existing session or creates one, per SPEC §4.8.1 step 2.
    pub fn resolve(&mut self, session_id: Option<String>) -> String {
        let id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.sessions.entry(id.clone()).or_default();
        id
    }

    pub fn state_mut(&mut self, session_id: &str) -> &mut SessionState {
        self.sessions.entry(session_id.to_string()).or_default()
    }

    pub fn state(&self, session_id: &str) -> Option<&SessionState> {
        self.sessions.get(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_reuses_a_supplied_session_id() {
        let mut manager = SessionManager::new();
        let id = manager.resolve(Some("abc".to_string()));
        assert_eq!(id, "abc");
        assert!(manager.state("abc").is_some());
    }

    #[test]
    fn resolve_without_an_id_creates_a_fresh_session() {
        let mut manager = SessionManager::new();
        let a = manager.resolve(None);
        let b = manager.resolve(None);
        assert_ne!(a, b);
    }

    #[test]
    fn history_is_capped_at_the_configured_length() {
        let mut manager = SessionManager::new();
        let id = manager.resolve(None);
        for _ in 0..20 {
            manager.state_mut(&id).record(CallRecord {
                tool: ToolName::Recon,
                category: ToolCategory::Search,
                empty_result: false,
            });
        }
        assert_eq!(manager.state(&id).unwrap().history.len(), HISTORY_LEN);
        assert_eq!(*manager.state(&id).unwrap().call_counts.get(&ToolName::Recon).unwrap(), 20);
    }
}
