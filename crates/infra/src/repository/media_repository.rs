//! # MediaRepository
//!
//! 添付メディアの投稿への紐付けと、未使用メディアの検索・削除を担当する。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conjob_domain::{
    media::{Media, MediaId},
    post::PostId,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::post_repository::MediaRow;
use crate::{db::TxContext, error::InfraError};

/// メディアリポジトリトレイト
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// 未紐付けのメディアを投稿に紐付け、紐付けた件数を返す
    ///
    /// 存在しない・既に別の投稿に紐付いたメディアは数に含まれない。
    async fn attach_to_post(
        &self,
        tx: &mut TxContext,
        post_id: &PostId,
        media_ids: &[MediaId],
    ) -> Result<u64, InfraError>;

    /// 投稿に紐付いていないメディア
    ///
    /// `created_before` を指定するとそれ以前に作成されたものに限る。
    async fn find_orphans(
        &self,
        created_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Media>, InfraError>;

    async fn delete_by_ids(&self, tx: &mut TxContext, ids: &[MediaId])
    -> Result<u64, InfraError>;
}

/// PostgreSQL 実装の MediaRepository
#[derive(Debug, Clone)]
pub struct PostgresMediaRepository {
    pool: PgPool,
}

impl PostgresMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_uuids(ids: &[MediaId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

#[async_trait]
impl MediaRepository for PostgresMediaRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%post_id, count = media_ids.len()))]
    async fn attach_to_post(
        &self,
        tx: &mut TxContext,
        post_id: &PostId,
        media_ids: &[MediaId],
    ) -> Result<u64, InfraError> {
        if media_ids.is_empty() {
            return Ok(0);
        }
        let result =
            sqlx::query("UPDATE media SET post_id = $1 WHERE id = ANY($2) AND post_id IS NULL")
                .bind(post_id.as_uuid())
                .bind(to_uuids(media_ids))
                .execute(tx.conn()?)
                .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_orphans(
        &self,
        created_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Media>, InfraError> {
        let rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT id, post_id, type AS media_type, url, created_at
            FROM media
            WHERE post_id IS NULL
              AND ($1::timestamptz IS NULL OR created_at <= $1::timestamptz)
            ORDER BY created_at ASC
            "#,
        )
        .bind(created_before)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Media::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(count = ids.len()))]
    async fn delete_by_ids(
        &self,
        tx: &mut TxContext,
        ids: &[MediaId],
    ) -> Result<u64, InfraError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM media WHERE id = ANY($1)")
            .bind(to_uuids(ids))
            .execute(tx.conn()?)
            .await?;

        Ok(result.rows_affected())
    }
}
