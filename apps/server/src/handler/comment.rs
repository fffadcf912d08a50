//! # コメント API ハンドラ
//!
//! `GET /api/posts/{post_id}/comments?cursor=` - コメントスレッド（5 件ずつ古い方向へ）

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use conjob_domain::{pagination::Cursor, post::PostId};
use serde::Deserialize;

use super::comment_page;
use crate::{error::ApiError, usecase::CommentUseCaseImpl};

pub struct CommentState {
    pub usecase: CommentUseCaseImpl,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentQuery {
    pub cursor: Option<String>,
}

#[tracing::instrument(skip_all, fields(%post_id))]
pub async fn list_comments(
    State(state): State<Arc<CommentState>>,
    Path(post_id): Path<String>,
    Query(query): Query<CommentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = PostId::parse(&post_id)?;
    let cursor = Cursor::parse(query.cursor.as_deref())?;

    let page = state.usecase.list_thread(&post_id, cursor).await?;
    Ok(Json(comment_page(page)))
}
