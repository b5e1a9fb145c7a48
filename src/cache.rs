//! Shared snapshots of backend collections used by autocomplete and lookups.
//!
//! A snapshot is refreshed whenever a command loads the collection and is
//! patched through [`crate::core::reconcile`] only after a mutation succeeds.

use crate::{
    core::reconcile::{self, Keyed},
    errors::Result,
    models::{DeliveryArea, Product, VehicleType},
};
use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{debug, trace};

#[derive(Debug)]
struct Snapshot<T> {
    items: Vec<T>,
    loaded_at: Option<Instant>,
}

/// A TTL-bounded copy of one backend collection.
#[derive(Debug)]
pub struct ResourceCache<T> {
    name: &'static str,
    ttl: Duration,
    inner: Arc<RwLock<Snapshot<T>>>,
}

impl<T> Clone for ResourceCache<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            ttl: self.ttl,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Keyed + Clone> ResourceCache<T> {
    /// Creates an empty cache; `name` is only used in logs.
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            inner: Arc::new(RwLock::new(Snapshot {
                items: Vec::new(),
                loaded_at: None,
            })),
        }
    }

    /// The snapshot if it was loaded within the TTL.
    pub async fn get_fresh(&self) -> Option<Vec<T>> {
        let snapshot = self.inner.read().await;
        snapshot
            .loaded_at
            .filter(|loaded| loaded.elapsed() < self.ttl)
            .map(|_| snapshot.items.clone())
    }

    /// The snapshot regardless of age; empty if never loaded.
    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.read().await.items.clone()
    }

    /// Replaces the snapshot with a freshly loaded collection.
    pub async fn replace(&self, items: Vec<T>) {
        let mut snapshot = self.inner.write().await;
        snapshot.items = items;
        snapshot.loaded_at = Some(Instant::now());
        debug!("{} cache refreshed with {} items", self.name, snapshot.items.len());
    }

    /// Returns the fresh snapshot, or runs `loader` and stores its result.
    ///
    /// A failed load leaves the previous snapshot in place.
    pub async fn get_or_load<F, Fut>(&self, loader: F) -> Result<Vec<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        if let Some(items) = self.get_fresh().await {
            trace!("{} cache hit", self.name);
            return Ok(items);
        }
        let items = loader().await?;
        self.replace(items.clone()).await;
        Ok(items)
    }

    /// Merges a record the backend has just stored.
    pub async fn upsert(&self, record: T) {
        reconcile::apply_server_record(&mut self.inner.write().await.items, record);
    }

    /// Drops a record the backend has just deleted.
    pub async fn remove(&self, key: i64) -> bool {
        reconcile::remove_record(&mut self.inner.write().await.items, key)
    }

    /// Forces the next [`Self::get_or_load`] to hit the backend.
    pub async fn invalidate(&self) {
        self.inner.write().await.loaded_at = None;
    }
}

/// The collections autocomplete draws from.
#[derive(Debug, Clone)]
pub struct Caches {
    /// Delivery areas
    pub areas: ResourceCache<DeliveryArea>,
    /// Products (stock and discounts)
    pub products: ResourceCache<Product>,
    /// Vehicle types
    pub vehicle_types: ResourceCache<VehicleType>,
}

impl Caches {
    /// Creates empty caches sharing one TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            areas: ResourceCache::new("Areas", ttl),
            products: ResourceCache::new("Products", ttl),
            vehicle_types: ResourceCache::new("Vehicle types", ttl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::Error, test_utils::test_product};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_or_load_respects_ttl() -> Result<()> {
        let cache = ResourceCache::new("Products", Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let items = cache
                .get_or_load(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![test_product(1, "Beans", 4)])
                })
                .await?;
            assert_eq!(items.len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate().await;
        assert!(cache.get_fresh().await.is_none());
        assert_eq!(cache.snapshot().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_fresh() {
        let cache = ResourceCache::new("Products", Duration::ZERO);
        cache.replace(vec![test_product(1, "Beans", 4)]).await;
        assert!(cache.get_fresh().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_snapshot() {
        let cache = ResourceCache::new("Products", Duration::ZERO);
        cache.replace(vec![test_product(1, "Beans", 4)]).await;

        let result = cache
            .get_or_load(|| async { Err(Error::Unauthorized) })
            .await;

        assert!(matches!(result, Err(Error::Unauthorized)));
        assert_eq!(cache.snapshot().await, vec![test_product(1, "Beans", 4)]);
    }

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let cache = ResourceCache::new("Products", Duration::from_secs(60));
        cache.replace(vec![test_product(1, "Beans", 4)]).await;

        cache.upsert(test_product(1, "Beans", 9)).await;
        cache.upsert(test_product(2, "Rice", 3)).await;
        assert_eq!(cache.snapshot().await[0].stock, 9);
        assert_eq!(cache.snapshot().await.len(), 2);

        assert!(cache.remove(2).await);
        assert!(!cache.remove(2).await);
    }
}
