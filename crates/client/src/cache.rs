//! # クエリキャッシュ
//!
//! サーバーから取得した値をキーごとに保持する、プロセス内の共有キャッシュ。
//! 楽観的更新のためにスナップショットの取得と復元を提供する。
//!
//! ## 構造
//!
//! 各エントリは「確定値」と「楽観的オーバーレイ」を持つ。
//! 読み出しはオーバーレイを優先する。
//!
//! ```text
//! apply_optimistic ─▶ overlay = f(value), sequence += 1
//! commit(seq)      ─▶ seq が最新なら overlay を確定値へ
//! rollback(seq)    ─▶ seq が最新ならスナップショットへ戻す
//! ```
//!
//! `sequence` より古い試行の commit / rollback は無視される。
//!
//! ## 並行性
//!
//! 内部の `std::sync::Mutex` は各メソッドの中だけで保持し、
//! `.await` をまたいで保持することはない。

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// キャッシュエントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    confirmed: Option<V>,
    overlay:   Option<V>,
    sequence:  u64,
}

impl<V> Default for CacheEntry<V> {
    fn default() -> Self {
        Self {
            confirmed: None,
            overlay:   None,
            sequence:  0,
        }
    }
}

impl<V> CacheEntry<V> {
    /// 現在見えている値（オーバーレイ優先）
    pub fn value(&self) -> Option<&V> {
        self.overlay.as_ref().or(self.confirmed.as_ref())
    }

    /// サーバーの応答で確定した値
    pub fn confirmed(&self) -> Option<&V> {
        self.confirmed.as_ref()
    }

    /// 応答待ちの楽観的更新があるか
    pub fn is_pending(&self) -> bool {
        self.overlay.is_some()
    }

    /// 最後に開始した楽観的更新の番号
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// ある時点で見えていた値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<V> {
    value: Option<V>,
}

impl<V> Snapshot<V> {
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<V> {
        self.value
    }
}

/// 楽観的更新の受付結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticUpdate<V> {
    /// 適用直前の値
    pub snapshot: Snapshot<V>,
    /// 適用後の値
    pub applied:  V,
    /// この更新の番号
    pub sequence: u64,
}

/// キー `K` ごとに値 `V` を保持するクエリキャッシュ
///
/// `Arc<QueryCache<K, V>>` として共有する。
#[derive(Debug)]
pub struct QueryCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 現在見えている値
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).and_then(|e| e.value().cloned())
    }

    /// エントリ全体
    pub fn entry(&self, key: &K) -> Option<CacheEntry<V>> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock()
            .get(key)
            .is_some_and(|e| e.value().is_some())
    }

    /// サーバーから取得した値で確定値を置き換える
    ///
    /// 応答待ちの楽観的更新がある場合は置き換えない（`false` を返す）。
    pub fn set_confirmed(&self, key: K, value: V) -> bool {
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        if entry.is_pending() {
            return false;
        }
        entry.confirmed = Some(value);
        true
    }

    /// 取得開始時から試行が行われていなければ確定値を置き換える
    ///
    /// `expected_sequence` は取得開始時の [`CacheEntry::sequence`]（エントリがなければ 0）。
    /// その後に楽観的更新が始まっていれば、確定済みでも置き換えない（`false` を返す）。
    pub fn set_confirmed_if(&self, key: K, value: V, expected_sequence: u64) -> bool {
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        if entry.is_pending() || entry.sequence != expected_sequence {
            return false;
        }
        entry.confirmed = Some(value);
        true
    }

    /// 現在のシーケンス番号（エントリがなければ 0）
    pub fn sequence(&self, key: &K) -> u64 {
        self.lock().get(key).map_or(0, CacheEntry::sequence)
    }

    /// 確定値を関数で更新する
    ///
    /// 値が存在しない場合は `f` を呼ばず `false` を返す。
    pub fn update_confirmed(&self, key: &K, f: impl FnOnce(&mut V)) -> bool {
        let mut entries = self.lock();
        match entries.get_mut(key).and_then(|e| e.confirmed.as_mut()) {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, key: &K) {
        self.lock().remove(key);
    }

    /// 現在見えている値のスナップショット
    pub fn snapshot(&self, key: &K) -> Snapshot<V> {
        Snapshot {
            value: self.get(key),
        }
    }

    /// スナップショットの値に戻す
    ///
    /// オーバーレイは破棄され、スナップショットの値が確定値になる。
    pub fn restore(&self, key: &K, snapshot: Snapshot<V>) {
        Self::restore_in(&mut self.lock(), key, snapshot);
    }

    fn restore_in(entries: &mut HashMap<K, CacheEntry<V>>, key: &K, snapshot: Snapshot<V>) {
        match snapshot.value {
            Some(value) => {
                let entry = entries.entry(key.clone()).or_default();
                entry.overlay = None;
                entry.confirmed = Some(value);
            }
            None => {
                if let Some(entry) = entries.get_mut(key) {
                    entry.overlay = None;
                    entry.confirmed = None;
                }
            }
        }
    }

    /// スナップショットの取得と楽観的な値の適用を一度に行う
    ///
    /// `f` には現在見えている値が渡される。
    /// 値が存在しない場合は何もせず `None` を返す。
    pub fn apply_optimistic(&self, key: &K, f: impl FnOnce(&V) -> V) -> Option<OptimisticUpdate<V>> {
        let mut entries = self.lock();
        let entry = entries.get_mut(key)?;
        let current = entry.value()?.clone();
        let applied = f(&current);

        entry.sequence += 1;
        entry.overlay = Some(applied.clone());

        Some(OptimisticUpdate {
            snapshot: Snapshot {
                value: Some(current),
            },
            applied,
            sequence: entry.sequence,
        })
    }

    /// 楽観的更新を確定する
    ///
    /// `sequence` が最新でない場合は何もせず `false` を返す。
    pub fn commit(&self, key: &K, sequence: u64) -> bool {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        if entry.sequence != sequence {
            return false;
        }
        if let Some(value) = entry.overlay.take() {
            entry.confirmed = Some(value);
        }
        true
    }

    /// 楽観的更新を取り消し、スナップショットへ戻す
    ///
    /// `sequence` が最新でない場合は何もせず `false` を返す。
    pub fn rollback(&self, key: &K, sequence: u64, snapshot: Snapshot<V>) -> bool {
        let mut entries = self.lock();
        if entries.get(key).is_none_or(|e| e.sequence != sequence) {
            return false;
        }
        Self::restore_in(&mut entries, key, snapshot);
        true
    }
}
