//! Keyed record storage.
//!
//! The auth services only ever touch one record per key at a time, so the
//! contract is a plain async key-value map with per-key atomic operations.
//! `InMemoryStore` keeps everything in process memory: records do not
//! survive a restart.

use crate::{Identity, PendingOtp, Session};

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

pub type Predicate<V> = Box<dyn Fn(&V) -> bool + Send + Sync>;
pub type Mutation<V> = Box<dyn FnOnce(&mut V) + Send>;

#[async_trait]
pub trait Store<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V>;

    /// Insert or replace, returning the previous value
    async fn put(&self, key: K, value: V) -> Option<V>;

    /// Insert only when the key is vacant. Returns whether the insert happened.
    async fn insert_if_absent(&self, key: K, value: V) -> bool;

    async fn delete(&self, key: &K) -> Option<V>;

    /// Remove the record only if it still satisfies `predicate`
    async fn remove_if(&self, key: &K, predicate: Predicate<V>) -> Option<V>;

    /// Apply `mutation` in place, returning the updated value
    async fn update(&self, key: &K, mutation: Mutation<V>) -> Option<V>;

    /// First record matching `predicate` (linear scan)
    async fn find(&self, predicate: Predicate<V>) -> Option<V>;

    /// Keep records matching `keep`, returning how many were dropped
    async fn retain(&self, keep: Predicate<V>) -> usize;

    async fn len(&self) -> usize;
}

pub type IdentityStore = Arc<dyn Store<String, Identity>>;
pub type OtpStore = Arc<dyn Store<String, PendingOtp>>;
pub type SessionStore = Arc<dyn Store<String, Session>>;

/// Process-memory store backed by a `RwLock<HashMap>`
pub struct InMemoryStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for InMemoryStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<K, V> Store<K, V> for InMemoryStore<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.inner.read().await.get(key).cloned()
    }

    async fn put(&self, key: K, value: V) -> Option<V> {
        self.inner.write().await.insert(key, value)
    }

    async fn insert_if_absent(&self, key: K, value: V) -> bool {
        let mut inner = self.inner.write().await;
        if inner.contains_key(&key) {
            return false;
        }
        inner.insert(key, value);
        true
    }

    async fn delete(&self, key: &K) -> Option<V> {
        self.inner.write().await.remove(key)
    }

    async fn remove_if(&self, key: &K, predicate: Predicate<V>) -> Option<V> {
        let mut inner = self.inner.write().await;
        match inner.get(key) {
            Some(value) if predicate(value) => inner.remove(key),
            _ => None,
        }
    }

    async fn update(&self, key: &K, mutation: Mutation<V>) -> Option<V> {
        let mut inner = self.inner.write().await;
        let value = inner.get_mut(key)?;
        mutation(value);
        Some(value.clone())
    }

    async fn find(&self, predicate: Predicate<V>) -> Option<V> {
        self.inner
            .read()
            .await
            .values()
            .find(|v| predicate(v))
            .cloned()
    }

    async fn retain(&self, keep: Predicate<V>) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|_, v| keep(v));
        before - inner.len()
    }

    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
