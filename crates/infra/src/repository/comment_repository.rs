//! # CommentRepository
//!
//! 投稿のコメントスレッドを、最新から古い方向へページ取得する。
//!
//! アンカーより厳密に古いコメントを新しい順に `5 + 1` 件取得し、
//! 返すときは古い順に並べ直す。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conjob_domain::{
    comment::{Comment, CommentId},
    pagination::{Cursor, Page, PageSize, SortKey},
    post::PostId,
    user::{UserId, UserSummary},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// コメントリポジトリトレイト
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// `cursor` より古いコメントの 1 ページ（古い順）
    ///
    /// `cursor` が `None` なら最新のコメントから。
    async fn find_thread_page(
        &self,
        post_id: &PostId,
        cursor: Option<Cursor>,
    ) -> Result<Page<Comment>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id:           Uuid,
    post_id:      Uuid,
    content:      String,
    created_at:   DateTime<Utc>,
    user_id:      Uuid,
    username:     String,
    display_name: String,
    avatar_url:   Option<String>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id:         CommentId::from_uuid(row.id),
            post_id:    PostId::from_uuid(row.post_id),
            content:    row.content,
            author:     UserSummary {
                id:           UserId::from_uuid(row.user_id),
                username:     row.username,
                display_name: row.display_name,
                avatar_url:   row.avatar_url,
            },
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL 実装の CommentRepository
#[derive(Debug, Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%post_id))]
    async fn find_thread_page(
        &self,
        post_id: &PostId,
        cursor: Option<Cursor>,
    ) -> Result<Page<Comment>, InfraError> {
        let page_size = PageSize::COMMENT_THREAD;
        let anchor = match cursor {
            Some(cursor) => {
                let stored: Option<(DateTime<Utc>, Uuid)> = sqlx::query_as(
                    "SELECT created_at, id FROM comments WHERE id = $1 AND post_id = $2",
                )
                .bind(cursor.as_uuid())
                .bind(post_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
                cursor.anchor(stored.map(|(created_at, id)| SortKey::new(created_at, id)))
            }
            None => None,
        };

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT
                c.id, c.post_id, c.content, c.created_at,
                u.id AS user_id, u.username, u.display_name, u.avatar_url
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
              AND ($2::timestamptz IS NULL OR (c.created_at, c.id) < ($2::timestamptz, $3::uuid))
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $4
            "#,
        )
        .bind(post_id.as_uuid())
        .bind(anchor.map(|a| a.created_at))
        .bind(anchor.map(|a| a.id))
        .bind(page_size.fetch_limit())
        .fetch_all(&self.pool)
        .await?;

        let comments = rows.into_iter().map(Comment::from).collect();
        Ok(Page::from_backward_fetch(comments, page_size))
    }
}
