//! # 実行中フラグ
//!
//! 同じキーへの取得を同時に 1 つまでに制限する。
//! ガードがドロップされるとフラグは解除されるため、
//! 取得中の Future が破棄された場合も次の取得を妨げない。

use std::{
    collections::HashSet,
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

#[derive(Debug)]
pub(crate) struct InFlight<K: Eq + Hash> {
    keys: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            keys: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    /// フラグを立てる。既に立っていれば `None`
    pub(crate) fn try_acquire(&self, key: K) -> Option<InFlightGuard<K>> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    #[cfg(test)]
    pub(crate) fn is_busy(&self, key: &K) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// 実行中フラグのガード
#[derive(Debug)]
pub(crate) struct InFlightGuard<K: Eq + Hash> {
    keys: Arc<Mutex<HashSet<K>>>,
    key:  K,
}

impl<K: Eq + Hash> Drop for InFlightGuard<K> {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_同じキーは同時に1つしか取得できない() {
        let in_flight = InFlight::default();

        let guard = in_flight.try_acquire("feed");

        assert!(guard.is_some());
        assert!(in_flight.try_acquire("feed").is_none());
        assert!(in_flight.try_acquire("other").is_some());
    }

    #[test]
    fn test_ガードをドロップするとフラグが解除される() {
        let in_flight = InFlight::default();

        drop(in_flight.try_acquire("feed"));

        assert!(!in_flight.is_busy(&"feed"));
        assert!(in_flight.try_acquire("feed").is_some());
    }
}
