//! # フォロー API ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/users/{user_id}/followers` - フォロワー情報
//! - `POST /api/users/{user_id}/followers` - フォロー（冪等）
//! - `DELETE /api/users/{user_id}/followers` - フォロー解除（冪等）
//!
//! いずれも操作後の `FollowerInfo` を返す。

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use conjob_domain::user::UserId;

use crate::{error::ApiError, middleware::CurrentUser, usecase::FollowUseCaseImpl};

pub struct FollowState {
    pub usecase: FollowUseCaseImpl,
}

#[tracing::instrument(skip_all, fields(%user_id))]
pub async fn get_follower_info(
    State(state): State<Arc<FollowState>>,
    Extension(viewer): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = UserId::parse(&user_id)?;
    let info = state.usecase.follower_info(&user_id, &viewer.id).await?;
    Ok(Json(info))
}

#[tracing::instrument(skip_all, fields(%user_id))]
pub async fn follow_user(
    State(state): State<Arc<FollowState>>,
    Extension(viewer): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = UserId::parse(&user_id)?;
    let info = state.usecase.follow(&user_id, &viewer.id).await?;
    Ok(Json(info))
}

#[tracing::instrument(skip_all, fields(%user_id))]
pub async fn unfollow_user(
    State(state): State<Arc<FollowState>>,
    Extension(viewer): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = UserId::parse(&user_id)?;
    let info = state.usecase.unfollow(&user_id, &viewer.id).await?;
    Ok(Json(info))
}
