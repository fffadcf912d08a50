//! # UserRepository
//!
//! フォロー対象の存在確認と、投稿者概要の取得に使う読み取り専用リポジトリ。

use async_trait::async_trait;
use conjob_domain::user::{UserId, UserSummary};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_summary(&self, id: &UserId) -> Result<Option<UserSummary>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id:           Uuid,
    username:     String,
    display_name: String,
    avatar_url:   Option<String>,
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_summary(&self, id: &UserId) -> Result<Option<UserSummary>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, display_name, avatar_url FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| UserSummary {
            id:           UserId::from_uuid(row.id),
            username:     row.username,
            display_name: row.display_name,
            avatar_url:   row.avatar_url,
        }))
    }
}
