use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::profile::ProfileWithLinks;

/// Route whose cached listing every profile write invalidates.
pub const HOME_ROUTE: &str = "/";

#[derive(Default)]
struct Views {
    generation: u64,
    entries: HashMap<String, Arc<Vec<ProfileWithLinks>>>,
}

/// Cached directory listings keyed by route.
///
/// Readers take a generation ticket before loading from the store and only
/// publish the result if no revalidation happened in between, so a listing
/// loaded before a write is never cached after it.
#[derive(Clone, Default)]
pub struct ViewCache {
    views: Arc<RwLock<Views>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Arc<Vec<ProfileWithLinks>>> {
        self.views.read().entries.get(path).cloned()
    }

    pub fn ticket(&self) -> u64 {
        self.views.read().generation
    }

    /// Returns `false` if the listing went stale while it was being loaded.
    pub fn store(&self, path: &str, ticket: u64, listing: Arc<Vec<ProfileWithLinks>>) -> bool {
        let mut views = self.views.write();
        if views.generation != ticket {
            return false;
        }
        views.entries.insert(path.to_string(), listing);
        true
    }

    pub fn revalidate(&self, path: &str) {
        let mut views = self.views.write();
        views.generation += 1;
        views.entries.remove(path);
        tracing::debug!(path, generation = views.generation, "view revalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revalidate_drops_cached_listing() {
        let cache = ViewCache::new();
        let ticket = cache.ticket();
        assert!(cache.store(HOME_ROUTE, ticket, Arc::new(Vec::new())));
        assert!(cache.get(HOME_ROUTE).is_some());

        cache.revalidate(HOME_ROUTE);

        assert!(cache.get(HOME_ROUTE).is_none());
    }

    #[test]
    fn stale_listing_is_not_published() {
        let cache = ViewCache::new();
        let ticket = cache.ticket();

        cache.revalidate(HOME_ROUTE);

        assert!(!cache.store(HOME_ROUTE, ticket, Arc::new(Vec::new())));
        assert!(cache.get(HOME_ROUTE).is_none());
    }
}
