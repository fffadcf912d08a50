//! # BookmarkRepository
//!
//! ユーザーによる投稿のブックマークを扱うリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conjob_domain::{post::PostId, toggle::BookmarkInfo, user::UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{db::TxContext, error::InfraError};

/// ブックマークリポジトリトレイト
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    async fn bookmark_info(
        &self,
        user_id: &UserId,
        post_id: &PostId,
    ) -> Result<BookmarkInfo, InfraError>;

    /// ブックマークを作成する。既に存在すれば `false`
    async fn insert(
        &self,
        tx: &mut TxContext,
        user_id: &UserId,
        post_id: &PostId,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError>;

    /// ブックマークを削除する。存在しなければ `false`
    async fn delete(
        &self,
        tx: &mut TxContext,
        user_id: &UserId,
        post_id: &PostId,
    ) -> Result<bool, InfraError>;
}

/// PostgreSQL 実装の BookmarkRepository
#[derive(Debug, Clone)]
pub struct PostgresBookmarkRepository {
    pool: PgPool,
}

impl PostgresBookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarkRepository for PostgresBookmarkRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%user_id, %post_id))]
    async fn bookmark_info(
        &self,
        user_id: &UserId,
        post_id: &PostId,
    ) -> Result<BookmarkInfo, InfraError> {
        let (is_bookmarked_by_user,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id.as_uuid())
        .bind(post_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(BookmarkInfo {
            is_bookmarked_by_user,
        })
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%user_id, %post_id))]
    async fn insert(
        &self,
        tx: &mut TxContext,
        user_id: &UserId,
        post_id: &PostId,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookmarks (id, user_id, post_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, post_id) DO NOTHING
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id.as_uuid())
        .bind(post_id.as_uuid())
        .bind(now)
        .execute(tx.conn()?)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%user_id, %post_id))]
    async fn delete(
        &self,
        tx: &mut TxContext,
        user_id: &UserId,
        post_id: &PostId,
    ) -> Result<bool, InfraError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND post_id = $2")
            .bind(user_id.as_uuid())
            .bind(post_id.as_uuid())
            .execute(tx.conn()?)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
