//! # FollowRepository
//!
//! ユーザー間のフォロー関係を扱うリポジトリ。
//! 作成・削除は冪等で、実際に行が変化したかを `bool` で返す。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conjob_domain::{toggle::FollowerInfo, user::UserId};
use sqlx::PgPool;

use crate::{db::TxContext, error::InfraError};

/// フォローリポジトリトレイト
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// `user_id` のフォロワー数と、`viewer` がフォロー済みか
    async fn follower_info(
        &self,
        user_id: &UserId,
        viewer: &UserId,
    ) -> Result<FollowerInfo, InfraError>;

    /// フォローを作成する。既にフォロー済みなら `false`
    async fn insert(
        &self,
        tx: &mut TxContext,
        follower: &UserId,
        following: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError>;

    /// フォローを解除する。フォローしていなければ `false`
    async fn delete(
        &self,
        tx: &mut TxContext,
        follower: &UserId,
        following: &UserId,
    ) -> Result<bool, InfraError>;
}

/// PostgreSQL 実装の FollowRepository
#[derive(Debug, Clone)]
pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%user_id))]
    async fn follower_info(
        &self,
        user_id: &UserId,
        viewer: &UserId,
    ) -> Result<FollowerInfo, InfraError> {
        let (followers, is_followed_by_user): (i64, bool) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM follows WHERE following_id = $1),
                EXISTS(SELECT 1 FROM follows WHERE following_id = $1 AND follower_id = $2)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(viewer.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(FollowerInfo {
            followers: u32::try_from(followers)
                .map_err(|_| InfraError::unexpected(format!("follower count overflow: {followers}")))?,
            is_followed_by_user,
        })
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%follower, %following))]
    async fn insert(
        &self,
        tx: &mut TxContext,
        follower: &UserId,
        following: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, following_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (follower_id, following_id) DO NOTHING
            "#,
        )
        .bind(follower.as_uuid())
        .bind(following.as_uuid())
        .bind(now)
        .execute(tx.conn()?)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%follower, %following))]
    async fn delete(
        &self,
        tx: &mut TxContext,
        follower: &UserId,
        following: &UserId,
    ) -> Result<bool, InfraError> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                .bind(follower.as_uuid())
                .bind(following.as_uuid())
                .execute(tx.conn()?)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
