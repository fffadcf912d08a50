//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するシード用ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use conjob_domain::{
    comment::CommentId,
    media::MediaId,
    post::PostId,
    user::UserId,
};
use sqlx::PgPool;
use uuid::{NoContext, Timestamp, Uuid};

/// テスト用の基準日時
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// 基準日時から `offset_secs` 秒後の UUID v7 と日時
pub fn v7_at(offset_secs: i64) -> (Uuid, DateTime<Utc>) {
    let at = test_now() + Duration::seconds(offset_secs);
    let id = Uuid::new_v7(Timestamp::from_unix(
        NoContext,
        at.timestamp() as u64,
        at.timestamp_subsec_nanos(),
    ));
    (id, at)
}

pub async fn insert_user(pool: &PgPool, username: &str) -> UserId {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO users (id, username, display_name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(username)
        .bind(username.to_uppercase())
        .execute(pool)
        .await
        .unwrap();
    UserId::from_uuid(id)
}

/// 基準日時から `offset_secs` 秒後に作成された投稿
pub async fn insert_post(pool: &PgPool, author: &UserId, offset_secs: i64) -> PostId {
    let (id, created_at) = v7_at(offset_secs);
    sqlx::query("INSERT INTO posts (id, user_id, content, created_at) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(author.as_uuid())
        .bind(format!("post {offset_secs}"))
        .bind(created_at)
        .execute(pool)
        .await
        .unwrap();
    PostId::from_uuid(id)
}

pub async fn insert_comment(
    pool: &PgPool,
    post_id: &PostId,
    author: &UserId,
    offset_secs: i64,
) -> CommentId {
    let (id, created_at) = v7_at(offset_secs);
    sqlx::query(
        "INSERT INTO comments (id, post_id, user_id, content, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(post_id.as_uuid())
    .bind(author.as_uuid())
    .bind(format!("comment {offset_secs}"))
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();
    CommentId::from_uuid(id)
}

pub async fn insert_media(
    pool: &PgPool,
    post_id: Option<&PostId>,
    url: &str,
    created_at: DateTime<Utc>,
) -> MediaId {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO media (id, post_id, type, url, created_at) VALUES ($1, $2, 'image', $3, $4)")
        .bind(id)
        .bind(post_id.map(|p| *p.as_uuid()))
        .bind(url)
        .bind(created_at)
        .execute(pool)
        .await
        .unwrap();
    MediaId::from_uuid(id)
}
