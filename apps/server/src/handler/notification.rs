//! # 通知 API ハンドラ
//!
//! `PATCH /api/notifications/mark-as-read` - ログインユーザー宛の未読通知をすべて既読にする

use std::sync::Arc;

use axum::{Extension, extract::State, http::StatusCode};

use crate::{error::ApiError, middleware::CurrentUser, usecase::NotificationUseCaseImpl};

pub struct NotificationState {
    pub usecase: NotificationUseCaseImpl,
}

#[tracing::instrument(skip_all)]
pub async fn mark_notifications_read(
    State(state): State<Arc<NotificationState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    state.usecase.mark_all_read(&user.id).await?;
    Ok(StatusCode::OK)
}
