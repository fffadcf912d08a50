//! # フィード・投稿 API ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/posts/for-you?cursor=&pageSize=` - おすすめフィード
//! - `GET /api/posts/following?cursor=&pageSize=` - フォロー中フィード
//! - `POST /api/posts` - 投稿作成
//!
//! クエリパラメータは文字列で受け取り、ドメイン側で検証する。
//! 不正な値は 400（JSON エラーボディ付き）になる。

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use conjob_domain::pagination::PageRequest;
use conjob_shared::CreatePostRequest;
use serde::Deserialize;

use super::{feed_page, post_dto};
use crate::{
    error::ApiError,
    middleware::CurrentUser,
    usecase::{CreatePostInput, FeedUseCaseImpl, PostUseCaseImpl},
};

/// フィード API の共有状態
pub struct FeedState {
    pub usecase:       FeedUseCaseImpl,
    pub max_page_size: u32,
}

/// 投稿作成 API の共有状態
pub struct PostState {
    pub usecase: PostUseCaseImpl,
}

/// フィードのクエリパラメータ
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub cursor:    Option<String>,
    pub page_size: Option<String>,
}

impl FeedQuery {
    fn page_request(&self, max_page_size: u32) -> Result<PageRequest, ApiError> {
        Ok(PageRequest::from_query(
            self.cursor.as_deref(),
            self.page_size.as_deref(),
            max_page_size,
        )?)
    }
}

/// GET /api/posts/for-you
#[tracing::instrument(skip_all)]
pub async fn for_you_feed(
    State(state): State<Arc<FeedState>>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.page_request(state.max_page_size)?;
    let page = state.usecase.for_you(&request).await?;
    Ok(Json(feed_page(page)))
}

/// GET /api/posts/following
#[tracing::instrument(skip_all, fields(viewer = %user.id))]
pub async fn following_feed(
    State(state): State<Arc<FeedState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.page_request(state.max_page_size)?;
    let page = state.usecase.following(&user.id, &request).await?;
    Ok(Json(feed_page(page)))
}

/// POST /api/posts
#[tracing::instrument(skip_all, fields(author = %user.id))]
pub async fn create_post(
    State(state): State<Arc<PostState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let post = state
        .usecase
        .create_post(CreatePostInput {
            author_id: user.id,
            content:   req.content,
            media_ids: req.media_ids,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(post_dto(post))))
}
