use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::bundle::{Bundle, ItemId};
use crate::assets::trim::{DEFAULT_ALPHA_THRESHOLD, TrimResult, trim_surface};

/// Memoization table `ItemId -> TrimResult`.
///
/// The table is immutable once built: membership changes produce a patched copy that shares
/// every surviving entry, so readers never observe a half-updated table.
#[derive(Clone, Debug)]
pub struct TrimCache {
    alpha_threshold: u8,
    entries: Arc<HashMap<ItemId, Arc<TrimResult>>>,
}

impl Default for TrimCache {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA_THRESHOLD)
    }
}

impl TrimCache {
    /// Empty table trimming with `alpha_threshold`.
    pub fn new(alpha_threshold: u8) -> Self {
        Self {
            alpha_threshold,
            entries: Arc::new(HashMap::new()),
        }
    }

    /// Alpha threshold used for every entry.
    pub fn alpha_threshold(&self) -> u8 {
        self.alpha_threshold
    }

    /// Cached trim for `id`.
    pub fn get(&self, id: ItemId) -> Option<&Arc<TrimResult>> {
        self.entries.get(&id)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// New table matching `bundle` membership: surviving entries are shared, removed items are
    /// dropped, and missing items are trimmed (in parallel) exactly once.
    #[tracing::instrument(skip_all, fields(items = bundle.len()))]
    pub fn patched(&self, bundle: &Bundle) -> TrimCache {
        let threshold = self.alpha_threshold;
        let missing: Vec<(ItemId, Arc<TrimResult>)> = bundle
            .items()
            .par_iter()
            .filter(|it| !self.entries.contains_key(&it.id))
            .map(|it| (it.id, Arc::new(trim_surface(it.asset.surface(), threshold))))
            .collect();

        let computed = missing.len();
        let mut next = HashMap::with_capacity(bundle.len());
        for it in bundle.items() {
            if let Some(t) = self.entries.get(&it.id) {
                next.insert(it.id, Arc::clone(t));
            }
        }
        for (id, trim) in missing {
            if trim.is_empty() {
                tracing::warn!(%id, "item has no pixels above the alpha threshold");
            }
            next.insert(id, trim);
        }
        tracing::debug!(computed, total = next.len(), "trim cache patched");

        TrimCache {
            alpha_threshold: threshold,
            entries: Arc::new(next),
        }
    }

    /// New table without `id`, forcing a recompute on the next [`TrimCache::patched`].
    pub fn invalidated(&self, id: ItemId) -> TrimCache {
        let mut next = (*self.entries).clone();
        next.remove(&id);
        TrimCache {
            alpha_threshold: self.alpha_threshold,
            entries: Arc::new(next),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/trim_cache.rs"]
mod tests;
