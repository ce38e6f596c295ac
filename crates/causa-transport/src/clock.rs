//! Vector clocks backing the in-memory store's causal tokens.

use std::collections::BTreeMap;

use causa_types::CausalToken;
use serde::{Deserialize, Serialize};

use crate::error::{TransportError, TransportResult};

/// A vector clock: how many writes from each actor a version has seen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClock {
    counters: BTreeMap<String, u64>,
}

impl VectorClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter for an actor (0 if never seen).
    pub fn get(&self, actor: &str) -> u64 {
        self.counters.get(actor).copied().unwrap_or(0)
    }

    pub fn set(&mut self, actor: impl Into<String>, value: u64) {
        self.counters.insert(actor.into(), value);
    }

    /// Pointwise maximum of both clocks.
    pub fn merge(&mut self, other: &Self) {
        for (actor, &n) in &other.counters {
            let entry = self.counters.entry(actor.clone()).or_insert(0);
            *entry = (*entry).max(n);
        }
    }

    /// `true` if this clock has seen everything `other` has.
    pub fn descends(&self, other: &Self) -> bool {
        other.counters.iter().all(|(actor, &n)| self.get(actor) >= n)
    }

    /// `true` if neither clock descends the other.
    pub fn concurrent_with(&self, other: &Self) -> bool {
        !self.descends(other) && !other.descends(self)
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn to_token(&self) -> TransportResult<CausalToken> {
        bincode::serialize(&self.counters)
            .map(CausalToken::new)
            .map_err(|e| TransportError::Internal(format!("encode vector clock: {e}")))
    }

    /// Parse a token issued by [`Self::to_token`]. The empty token is the empty clock.
    pub fn from_token(token: &CausalToken) -> TransportResult<Self> {
        if token.is_empty() {
            return Ok(Self::new());
        }
        let counters = bincode::deserialize(token.as_bytes())
            .map_err(|e| TransportError::InvalidToken(e.to_string()))?;
        Ok(Self { counters })
    }
}
