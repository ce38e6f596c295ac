use std::marker::PhantomData;

use causa_types::{ConflictCandidate, ResolvedConflict};

/// A resolution strategy: given every sibling, choose or synthesize the one
/// value that becomes authoritative.
///
/// Candidates arrive in the order the store returned them, which implies no
/// priority. Strategies are expected to be pure and fast; they run inline on
/// the read path.
pub trait ConflictResolver: Send + Sync {
    fn resolve(&self, candidates: &[ConflictCandidate]) -> ResolvedConflict;
}

impl<F> ConflictResolver for F
where
    F: Fn(&[ConflictCandidate]) -> ResolvedConflict + Send + Sync,
{
    fn resolve(&self, candidates: &[ConflictCandidate]) -> ResolvedConflict {
        self(candidates)
    }
}

/// An output type that knows how to resolve its own siblings.
///
/// Used when a read has no explicit strategy.
pub trait SelfResolving {
    fn resolve_conflict(candidates: &[ConflictCandidate]) -> ResolvedConflict;
}

/// Adapts a [`SelfResolving`] type into a [`ConflictResolver`].
pub struct TypeResolver<T: ?Sized>(PhantomData<fn() -> Box<T>>);

impl<T: ?Sized> TypeResolver<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: ?Sized> Default for TypeResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SelfResolving + ?Sized> ConflictResolver for TypeResolver<T> {
    fn resolve(&self, candidates: &[ConflictCandidate]) -> ResolvedConflict {
        T::resolve_conflict(candidates)
    }
}

/// Keep the sibling with the latest modification time.
///
/// Ties go to the earliest candidate; siblings without a timestamp lose to
/// any that has one.
#[derive(Clone, Copy, Debug, Default)]
pub struct LastWriteWins;

impl ConflictResolver for LastWriteWins {
    fn resolve(&self, candidates: &[ConflictCandidate]) -> ResolvedConflict {
        let mut best: Option<&ConflictCandidate> = None;
        for c in candidates {
            match best {
                Some(b) if c.last_modified <= b.last_modified => {}
                _ => best = Some(c),
            }
        }
        best.map(ResolvedConflict::from_candidate)
            .unwrap_or_else(|| ResolvedConflict::new(Vec::new(), Default::default()))
    }
}
