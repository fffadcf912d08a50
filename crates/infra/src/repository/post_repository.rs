//! # PostRepository
//!
//! 投稿の永続化とフィードのページ取得を担当するリポジトリ。
//!
//! フィードは `(created_at, id)` の降順で走査し、
//! アンカーより厳密に古い投稿を `page_size + 1` 件取得する。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conjob_domain::{
    media::{Media, MediaId, MediaType},
    pagination::{Page, PageRequest, SortKey},
    post::{NewPost, Post, PostId},
    user::{UserId, UserSummary},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{db::TxContext, error::InfraError};

/// 投稿リポジトリトレイト
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, InfraError>;

    async fn exists(&self, id: &PostId) -> Result<bool, InfraError>;

    /// 全投稿のフィード（新しい順）
    async fn find_for_you_page(&self, request: &PageRequest) -> Result<Page<Post>, InfraError>;

    /// `viewer` がフォローしているユーザーの投稿のフィード（新しい順）
    async fn find_following_page(
        &self,
        viewer: &UserId,
        request: &PageRequest,
    ) -> Result<Page<Post>, InfraError>;

    async fn insert(&self, tx: &mut TxContext, post: &NewPost) -> Result<(), InfraError>;
}

/// posts と users を結合した行
#[derive(sqlx::FromRow)]
struct PostRow {
    id:           Uuid,
    content:      String,
    created_at:   DateTime<Utc>,
    user_id:      Uuid,
    username:     String,
    display_name: String,
    avatar_url:   Option<String>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct MediaRow {
    pub(crate) id:         Uuid,
    pub(crate) post_id:    Option<Uuid>,
    pub(crate) media_type: String,
    pub(crate) url:        String,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<MediaRow> for Media {
    type Error = InfraError;

    fn try_from(row: MediaRow) -> Result<Self, Self::Error> {
        Ok(Media {
            id:         MediaId::from_uuid(row.id),
            url:        row.url,
            media_type: row
                .media_type
                .parse::<MediaType>()
                .map_err(|e| InfraError::unexpected(format!("unknown media type: {e}")))?,
            post_id:    row.post_id.map(PostId::from_uuid),
            created_at: row.created_at,
        })
    }
}

impl PostRow {
    fn into_post(self, attachments: Vec<Media>) -> Post {
        Post {
            id: PostId::from_uuid(self.id),
            content: self.content,
            author: UserSummary {
                id:           UserId::from_uuid(self.user_id),
                username:     self.username,
                display_name: self.display_name,
                avatar_url:   self.avatar_url,
            },
            attachments,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL 実装の PostRepository
#[derive(Debug, Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// カーソルが指す投稿の並び順キー
    async fn find_sort_key(&self, id: Uuid) -> Result<Option<SortKey>, InfraError> {
        let row: Option<(DateTime<Utc>, Uuid)> =
            sqlx::query_as("SELECT created_at, id FROM posts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(created_at, id)| SortKey::new(created_at, id)))
    }

    async fn resolve_anchor(&self, request: &PageRequest) -> Result<Option<SortKey>, InfraError> {
        match request.cursor {
            Some(cursor) => {
                let stored = self.find_sort_key(*cursor.as_uuid()).await?;
                Ok(cursor.anchor(stored))
            }
            None => Ok(None),
        }
    }

    /// 投稿行に添付メディアを付けて返す
    async fn attach_media(&self, rows: Vec<PostRow>) -> Result<Vec<Post>, InfraError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let post_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let media_rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT id, post_id, type AS media_type, url, created_at
            FROM media
            WHERE post_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(&post_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_post: HashMap<Uuid, Vec<Media>> = HashMap::new();
        for row in media_rows {
            let Some(post_id) = row.post_id else {
                continue;
            };
            by_post.entry(post_id).or_default().push(Media::try_from(row)?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let attachments = by_post.remove(&row.id).unwrap_or_default();
                row.into_post(attachments)
            })
            .collect())
    }
}

const POST_SELECT: &str = r#"
    SELECT
        p.id, p.content, p.created_at,
        u.id AS user_id, u.username, u.display_name, u.avatar_url
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, InfraError> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let posts = self.attach_media(row.into_iter().collect()).await?;
        Ok(posts.into_iter().next())
    }

    async fn exists(&self, id: &PostId) -> Result<bool, InfraError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(page_size = request.page_size.get()))]
    async fn find_for_you_page(&self, request: &PageRequest) -> Result<Page<Post>, InfraError> {
        let anchor = self.resolve_anchor(request).await?;
        let sql = format!(
            r#"{POST_SELECT}
            WHERE ($1::timestamptz IS NULL OR (p.created_at, p.id) < ($1::timestamptz, $2::uuid))
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3"#
        );

        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(anchor.map(|a| a.created_at))
            .bind(anchor.map(|a| a.id))
            .bind(request.page_size.fetch_limit())
            .fetch_all(&self.pool)
            .await?;

        let posts = self.attach_media(rows).await?;
        Ok(Page::from_forward_fetch(posts, request.page_size))
    }

    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(%viewer, page_size = request.page_size.get())
    )]
    async fn find_following_page(
        &self,
        viewer: &UserId,
        request: &PageRequest,
    ) -> Result<Page<Post>, InfraError> {
        let anchor = self.resolve_anchor(request).await?;
        let sql = format!(
            r#"{POST_SELECT}
            WHERE p.user_id IN (SELECT following_id FROM follows WHERE follower_id = $4)
              AND ($1::timestamptz IS NULL OR (p.created_at, p.id) < ($1::timestamptz, $2::uuid))
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3"#
        );

        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(anchor.map(|a| a.created_at))
            .bind(anchor.map(|a| a.id))
            .bind(request.page_size.fetch_limit())
            .bind(viewer.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        let posts = self.attach_media(rows).await?;
        Ok(Page::from_forward_fetch(posts, request.page_size))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %post.id))]
    async fn insert(&self, tx: &mut TxContext, post: &NewPost) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, content, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(post.author_id.as_uuid())
        .bind(post.content.as_str())
        .bind(post.created_at)
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }
}
