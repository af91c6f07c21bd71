//! Bounded analysis cache keyed by snapshot fingerprint
//!
//! The engine is pure, so a cached result is always valid for its key.
//! Eviction is oldest-insert first.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;

use eclaire_core::AnalysisResult;

/// Default number of cached results
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

struct CacheInner {
    entries: HashMap<String, Arc<AnalysisResult>>,
    order: VecDeque<String>,
}

pub struct AnalysisCache {
    capacity: usize,
    inner: RwLock<CacheInner>,
}

impl AnalysisCache {
    /// A capacity of 0 disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<AnalysisResult>> {
        self.inner.read().await.entries.get(key).cloned()
    }

    pub async fn insert(&self, key: String, result: Arc<AnalysisResult>) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.inner.write().await;
        if inner.entries.insert(key.clone(), result).is_none() {
            inner.order.push_back(key);
        }
        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}
