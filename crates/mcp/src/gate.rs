//! Two-phase confirmation gate (SPEC §4.8.2). A gated call's first
//! invocation returns `GATE_REQUIRED` with a single-shot token; the retry
//! must carry that token plus a reason of at least `minimum_justification_chars`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const MINIMUM_JUSTIFICATION_CHARS: usize = 40;
const TOKEN_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct GateTrip {
    pub pattern: &'static str,
}

struct PendingGate {
    tool: String,
    purpose: &'static str,
    issued_at: Instant,
}

#[derive(Default)]
pub struct GateRegistry {
    pending: HashMap<String, PendingGate>,
}

impl GateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a single-shot token bound to `tool` and the tripped pattern.
    pub fn issue(&mut self, tool: &str, purpose: &'static str) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.pending.insert(token.clone(), PendingGate { tool: tool.to_string(), purpose, issued_at: Instant::now() });
        token
    }

    /// Validates a retried call's `(gate_token, gate_reason)` against the
    /// tool it was issued for. Tokens are single-shot: valid or not, the
    /// entry is removed.
    pub fn validate(&mut self, tool: &str, token: &str, reason: &str) -> Result<(), String> {
        let Some(pending) = self.pending.remove(token) else {
            return Err("gate token not found or already used".to_string());
        };
        if pending.tool != tool {
            return Err("gate token was issued for a different tool".to_string());
        }
        if pending.issued_at.elapsed() > TOKEN_TTL {
            return Err("gate token expired".to_string());
        }
        if reason.trim().chars().count() < MINIMUM_JUSTIFICATION_CHARS {
            return Err(format!("gate_reason must be at least {MINIMUM_JUSTIFICATION_CHARS} characters"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fresh_token_with_a_long_enough_reason_validates() {
        let mut gates = GateRegistry::new();
        let token = gates.issue("recon", "zero-result-search-cluster");
        let reason = "a".repeat(MINIMUM_JUSTIFICATION_CHARS);
        assert!(gates.validate("recon", &token, &reason).is_ok());
    }

    #[test]
    fn tokens_are_single_shot() {
        let mut gates = GateRegistry::new();
        let token = gates.issue("recon", "zero-result-search-cluster");
        let reason = "a".repeat(MINIMUM_JUSTIFICATION_CHARS);
        assert!(gates.validate("recon", &token, &reason).is_ok());
        assert!(gates.validate("recon", &token, &reason).is_err());
    }

    #[test]
    fn a_short_reason_is_rejected() {
        let mut gates = GateRegistry::new();
        let token = gates.issue("recon", "zero-result-search-cluster");
        assert!(gates.validate("recon", &token, "too short").is_err());
    }

    #[test]
    fn a_token_issued_for_another_tool_is_rejected() {
        let mut gates = GateRegistry::new();
        let token = gates.issue("recon", "zero-result-search-cluster");
        let reason = "a".repeat(MINIMUM_JUSTIFICATION_CHARS);
        assert!(gates.validate("lexical_search", &token, &reason).is_err());
    }
}
