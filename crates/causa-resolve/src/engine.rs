use causa_transport::Transport;
use causa_types::{CausalToken, ConflictCandidate, Location, ResolvedConflict, StoredObject};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::resolver::ConflictResolver;
use crate::write_back::{write_back, WriteBackReport};

/// The decision reached for a set of siblings, before any write-back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Choice {
    NotFound,
    /// Exactly one sibling; nothing to resolve.
    Single(ConflictCandidate),
    /// A strategy resolved `sibling_count` siblings.
    Resolved {
        resolved: ResolvedConflict,
        sibling_count: usize,
    },
}

/// Pick the authoritative value among `candidates`.
///
/// An explicit `strategy` takes precedence over `fallback` (the output
/// type's own resolver). A single candidate is returned as-is without
/// calling either.
pub fn choose(
    mut candidates: Vec<ConflictCandidate>,
    strategy: Option<&dyn ConflictResolver>,
    fallback: Option<&dyn ConflictResolver>,
) -> ResolveResult<Choice> {
    match candidates.len() {
        0 => Ok(Choice::NotFound),
        1 => Ok(Choice::Single(candidates.remove(0))),
        n => {
            let resolver = strategy
                .or(fallback)
                .ok_or(ResolveError::NoResolver { siblings: n })?;
            let resolved = resolver.resolve(&candidates);
            if resolved.causal_token.is_empty() {
                return Err(ResolveError::InvalidResolution("missing causal token"));
            }
            Ok(Choice::Resolved {
                resolved,
                sibling_count: n,
            })
        }
    }
}

/// A value ready to be decoded, with how it was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub value: Vec<u8>,
    pub causal_token: CausalToken,
    pub content_type: Option<String>,
    /// Siblings the read returned (1 when no conflict).
    pub sibling_count: usize,
    /// Present only when a conflict was resolved.
    pub write_back: Option<WriteBackReport>,
}

impl Resolved {
    pub fn was_conflicted(&self) -> bool {
        self.sibling_count > 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    Value(Resolved),
}

/// Resolves siblings and persists resolutions through an explicit transport.
pub struct ConflictEngine<'a> {
    transport: &'a dyn Transport,
    config: &'a EngineConfig,
}

impl<'a> ConflictEngine<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a EngineConfig) -> Self {
        Self { transport, config }
    }

    /// Turn the siblings fetched from `location` into one value.
    ///
    /// On a genuine conflict the chosen value is written back before
    /// returning; the outcome of that write is reported in
    /// [`Resolved::write_back`] and never fails the read.
    pub async fn resolve(
        &self,
        location: &Location,
        siblings: Vec<StoredObject>,
        strategy: Option<&dyn ConflictResolver>,
        fallback: Option<&dyn ConflictResolver>,
    ) -> ResolveResult<Resolution> {
        if siblings.len() > self.config.sibling_warn_threshold {
            warn!(
                %location,
                siblings = siblings.len(),
                threshold = self.config.sibling_warn_threshold,
                "sibling count above threshold"
            );
        }

        let candidates = siblings.into_iter().map(ConflictCandidate::from).collect();
        match choose(candidates, strategy, fallback)? {
            Choice::NotFound => Ok(Resolution::NotFound),
            Choice::Single(c) => Ok(Resolution::Value(Resolved {
                value: c.value,
                causal_token: c.causal_token,
                content_type: c.content_type,
                sibling_count: 1,
                write_back: None,
            })),
            Choice::Resolved {
                resolved,
                sibling_count,
            } => {
                debug!(%location, sibling_count, "conflict resolved");
                let report = write_back(self.transport, location, &resolved, &self.config.write_back).await;
                Ok(Resolution::Value(Resolved {
                    value: resolved.value,
                    causal_token: resolved.causal_token,
                    content_type: resolved.content_type,
                    sibling_count,
                    write_back: Some(report),
                }))
            }
        }
    }
}
