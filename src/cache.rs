//! Contains the cache-invalidation hook consulted before write dispatch.

use crate::Namespace;

/// A client-side cache of read results that must be invalidated before writes are attempted.
///
/// The engine calls [`clear_namespace`](QueryCache::clear_namespace) before every sub-dispatch,
/// including each half produced by splitting: a write may partially apply before a fault is
/// observed, so cached reads for the namespace cannot be trusted to survive any attempted write.
pub trait QueryCache: Send + Sync {
    /// Drops all cached results for the given namespace.
    fn clear_namespace(&self, namespace: &Namespace);
}
