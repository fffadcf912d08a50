//! # 楽観的トグル
//!
//! フォローとブックマークの切り替えを、サーバーの応答を待たずに画面へ反映する。
//!
//! ## 状態遷移（1 回の試行）
//!
//! ```text
//! Idle ──begin──▶ Pending ──成功──▶ Committed
//!                    │
//!                    ├──失敗──▶ RolledBack（スナップショットへ戻す + エラー通知）
//!                    │
//!                    └──より新しい試行がある──▶ Superseded（応答を捨てる）
//! ```
//!
//! 応答待ちの間も続けてトグルでき、試行ごとにスナップショットを持つ。
//! キャッシュへ反映されるのは各キーで最後に開始した試行の応答だけ。

use std::sync::Arc;

use conjob_domain::{post::PostId, toggle::ToggleState, user::UserId};

use crate::{
    api::SocialApi,
    cache::{QueryCache, Snapshot},
    error::{ClientError, MUTATION_FAILED_MESSAGE},
};

/// ブックマーク登録時の通知
pub const BOOKMARKED_MESSAGE: &str = "Post bookmarked";

/// ブックマーク解除時の通知
pub const UNBOOKMARKED_MESSAGE: &str = "Post unbookmarked";

/// トグル対象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleKey {
    /// ユーザーのフォロー（件数はフォロワー数）
    Follow(UserId),
    /// 投稿のブックマーク（件数なし）
    Bookmark(PostId),
}

/// 試行の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// 成功。楽観的な状態をそのまま確定した
    Committed(ToggleState),
    /// 失敗。試行前の状態へ戻した
    RolledBack(ToggleState),
    /// より新しい試行があるため応答を捨てた
    Superseded,
}

/// ユーザーへの通知先（トースト）
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// 通知をログに出力する Notifier
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        tracing::info!(toast = message, "通知");
    }

    fn error(&self, message: &str) {
        tracing::warn!(toast = message, "エラー通知");
    }
}

/// 応答待ちの試行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    key:      ToggleKey,
    sequence: u64,
    snapshot: Snapshot<ToggleState>,
    target:   ToggleState,
}

impl PendingToggle {
    pub fn key(&self) -> ToggleKey {
        self.key
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// 楽観的に適用した状態
    pub fn target(&self) -> ToggleState {
        self.target
    }
}

/// 楽観的トグルの実行者
pub struct ToggleMutator<A> {
    api:      Arc<A>,
    cache:    Arc<QueryCache<ToggleKey, ToggleState>>,
    notifier: Arc<dyn Notifier>,
}

impl<A: SocialApi> ToggleMutator<A> {
    pub fn new(
        api: Arc<A>,
        cache: Arc<QueryCache<ToggleKey, ToggleState>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            cache,
            notifier,
        }
    }

    /// 現在見えている状態
    pub fn state(&self, key: &ToggleKey) -> Option<ToggleState> {
        self.cache.get(key)
    }

    /// サーバーから状態を取得してキャッシュに載せる
    ///
    /// 取得中に試行が始まっていた場合、応答は古いものとして捨て、
    /// キャッシュは上書きせず現在の状態を返す。
    #[tracing::instrument(skip_all, fields(?key))]
    pub async fn load(&self, key: ToggleKey) -> Result<ToggleState, ClientError> {
        let started_at = self.cache.sequence(&key);
        let state = match key {
            ToggleKey::Follow(user_id) => self.api.follower_info(&user_id).await?.into(),
            ToggleKey::Bookmark(post_id) => self.api.bookmark_info(&post_id).await?.into(),
        };
        if !self.cache.set_confirmed_if(key, state, started_at) {
            tracing::debug!(?key, "取得中に試行があったため取得結果を破棄");
        }
        Ok(self.cache.get(&key).unwrap_or(state))
    }

    /// 試行を開始する
    ///
    /// スナップショットを取り、反転した状態を同期的にキャッシュへ適用する。
    /// キャッシュに状態がなければ `None`。
    pub fn begin(&self, key: ToggleKey) -> Option<PendingToggle> {
        let update = self.cache.apply_optimistic(&key, |state| state.toggled())?;

        if let ToggleKey::Bookmark(_) = key {
            self.notifier.info(if update.applied.is_active {
                BOOKMARKED_MESSAGE
            } else {
                UNBOOKMARKED_MESSAGE
            });
        }

        Some(PendingToggle {
            key,
            sequence: update.sequence,
            snapshot: update.snapshot,
            target: update.applied,
        })
    }

    /// 応答を反映する
    pub fn settle(&self, pending: PendingToggle, result: Result<(), ClientError>) -> ToggleOutcome {
        let PendingToggle {
            key,
            sequence,
            snapshot,
            target,
        } = pending;

        match result {
            Ok(()) => {
                if self.cache.commit(&key, sequence) {
                    ToggleOutcome::Committed(target)
                } else {
                    tracing::debug!(?key, sequence, "新しい試行があるため成功応答を破棄");
                    ToggleOutcome::Superseded
                }
            }
            Err(e) => {
                let restored = snapshot.value().copied();
                if !self.cache.rollback(&key, sequence, snapshot) {
                    tracing::debug!(?key, sequence, error = %e, "新しい試行があるため失敗応答を破棄");
                    return ToggleOutcome::Superseded;
                }
                tracing::warn!(?key, error = %e, "トグルに失敗したためロールバック");
                self.notifier.error(MUTATION_FAILED_MESSAGE);
                match restored {
                    Some(state) => ToggleOutcome::RolledBack(state),
                    None => ToggleOutcome::Superseded,
                }
            }
        }
    }

    /// トグルする
    ///
    /// 状態が未取得なら先にサーバーから取得する。
    /// 有効化は POST、無効化は DELETE を送信する。
    #[tracing::instrument(skip_all, fields(?key))]
    pub async fn toggle(&self, key: ToggleKey) -> Result<ToggleOutcome, ClientError> {
        if !self.cache.contains(&key) {
            self.load(key).await?;
        }
        let Some(pending) = self.begin(key) else {
            return Err(ClientError::Unexpected(format!(
                "トグル状態がキャッシュにありません: {key:?}"
            )));
        };

        let activate = pending.target().is_active;
        let result = match key {
            ToggleKey::Follow(user_id) => self.api.set_following(&user_id, activate).await,
            ToggleKey::Bookmark(post_id) => self.api.set_bookmarked(&post_id, activate).await,
        };

        Ok(self.settle(pending, result))
    }
}
