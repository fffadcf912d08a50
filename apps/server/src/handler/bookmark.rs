//! # ブックマーク API ハンドラ
//!
//! `GET` / `POST` / `DELETE` `/api/posts/{post_id}/bookmark`

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use conjob_domain::post::PostId;

use crate::{error::ApiError, middleware::CurrentUser, usecase::BookmarkUseCaseImpl};

pub struct BookmarkState {
    pub usecase: BookmarkUseCaseImpl,
}

#[tracing::instrument(skip_all, fields(%post_id))]
pub async fn get_bookmark_info(
    State(state): State<Arc<BookmarkState>>,
    Extension(viewer): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = PostId::parse(&post_id)?;
    Ok(Json(state.usecase.bookmark_info(&post_id, &viewer.id).await?))
}

#[tracing::instrument(skip_all, fields(%post_id))]
pub async fn bookmark_post(
    State(state): State<Arc<BookmarkState>>,
    Extension(viewer): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = PostId::parse(&post_id)?;
    Ok(Json(state.usecase.bookmark(&post_id, &viewer.id).await?))
}

#[tracing::instrument(skip_all, fields(%post_id))]
pub async fn unbookmark_post(
    State(state): State<Arc<BookmarkState>>,
    Extension(viewer): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = PostId::parse(&post_id)?;
    Ok(Json(state.usecase.unbookmark(&post_id, &viewer.id).await?))
}
