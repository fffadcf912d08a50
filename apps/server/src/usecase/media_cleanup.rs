//! # 未使用メディアのクリーンアップ
//!
//! 投稿に紐付かないまま残ったメディアを削除する定期ジョブ。
//!
//! 1. 未紐付けのメディアを取得（本番では作成から 24 時間以上経過したものに限る）
//! 2. URL からファイルキーを取り出し、メディアプロバイダに削除を依頼
//! 3. メディア行を削除
//!
//! プロバイダへの削除依頼が失敗しても行の削除は続行する。

use std::sync::Arc;

use conjob_domain::{clock::Clock, media::orphan_cutoff};
use conjob_infra::{MediaStorage, db::TransactionManager, repository::MediaRepository};
use itertools::Itertools;

use crate::error::ApiError;

/// クリーンアップ結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    /// 削除対象として見つかったメディア
    pub found:         u64,
    /// プロバイダ上で削除したファイル
    pub files_deleted: u64,
    /// 削除したメディア行
    pub rows_deleted:  u64,
}

pub struct MediaCleanupUseCaseImpl {
    media_repository:  Arc<dyn MediaRepository>,
    media_storage:     Arc<dyn MediaStorage>,
    tx_manager:        Arc<dyn TransactionManager>,
    clock:             Arc<dyn Clock>,
    /// ファイルキーの取り出しに使うアプリ ID
    app_id:            String,
    /// 24 時間の猶予を適用するか（本番のみ）
    enforce_retention: bool,
}

impl MediaCleanupUseCaseImpl {
    pub fn new(
        media_repository: Arc<dyn MediaRepository>,
        media_storage: Arc<dyn MediaStorage>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
        app_id: String,
        enforce_retention: bool,
    ) -> Self {
        Self {
            media_repository,
            media_storage,
            tx_manager,
            clock,
            app_id,
            enforce_retention,
        }
    }

    pub async fn clear_orphans(&self) -> Result<CleanupReport, ApiError> {
        let cutoff = orphan_cutoff(self.clock.now(), self.enforce_retention);
        let orphans = self.media_repository.find_orphans(cutoff).await?;
        if orphans.is_empty() {
            return Ok(CleanupReport::default());
        }

        let file_keys: Vec<String> = orphans
            .iter()
            .filter_map(|m| m.file_key(&self.app_id))
            .unique()
            .map(str::to_string)
            .collect();

        let files_deleted = if file_keys.is_empty() {
            0
        } else {
            match self.media_storage.delete_files(&file_keys).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        keys = file_keys.len(),
                        "メディアプロバイダでのファイル削除に失敗しました"
                    );
                    0
                }
            }
        };

        let ids: Vec<_> = orphans.iter().map(|m| m.id).collect();
        let mut tx = self.tx_manager.begin().await?;
        let rows_deleted = self.media_repository.delete_by_ids(&mut tx, &ids).await?;
        tx.commit().await?;

        let report = CleanupReport {
            found: orphans.len() as u64,
            files_deleted,
            rows_deleted,
        };
        tracing::info!(
            found = report.found,
            files_deleted = report.files_deleted,
            rows_deleted = report.rows_deleted,
            "未使用メディアを削除しました"
        );
        Ok(report)
    }
}
