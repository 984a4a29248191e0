//! Run-lifetime memoization of lookups.
//!
//! Only successful lookups are stored; a failed key is queried again the
//! next time it is asked for. The lock is never held across an await.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use log::warn;

use crate::errors::Result;
use crate::source::{Rating, RatingSource, TaxIdLookup};

#[derive(Debug)]
struct Memo<K, V> {
    name: &'static str,
    entries: Mutex<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, V>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("{} cache lock poisoned, recovering", self.name);
            poisoned.into_inner()
        })
    }

    fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    fn insert(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// A [`RatingSource`] that remembers every answer it has given.
pub struct CachedRatingSource<S> {
    inner: S,
    memo: Memo<String, Rating>,
}

impl<S: RatingSource> CachedRatingSource<S> {
    pub fn new(inner: S) -> Self {
        let name = inner.id();
        Self {
            inner,
            memo: Memo::new(name),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.memo.len()
    }
}

#[async_trait]
impl<S: RatingSource> RatingSource for CachedRatingSource<S> {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn lookup(&self, key: &str) -> Result<Rating> {
        if let Some(hit) = self.memo.get(&key.to_string()) {
            return Ok(hit);
        }
        let rating = self.inner.lookup(key).await?;
        self.memo.insert(key.to_string(), rating.clone());
        Ok(rating)
    }
}

/// A [`TaxIdLookup`] that remembers resolved ids, including "not found".
pub struct CachedTaxIdLookup<L> {
    inner: L,
    memo: Memo<String, Option<String>>,
}

impl<L: TaxIdLookup> CachedTaxIdLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            memo: Memo::new("taxpayer id"),
        }
    }
}

#[async_trait]
impl<L: TaxIdLookup> TaxIdLookup for CachedTaxIdLookup<L> {
    async fn resolve(&self, isin: &str) -> Result<Option<String>> {
        if let Some(hit) = self.memo.get(&isin.to_string()) {
            return Ok(hit);
        }
        let id = self.inner.resolve(isin).await?;
        self.memo.insert(isin.to_string(), id.clone());
        Ok(id)
    }
}
