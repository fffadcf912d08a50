//! # 未使用メディアのクリーンアップ API
//!
//! `GET /api/clear-upload` - cron から呼ばれる。
//! `Authorization: Bearer <CRON_SECRET>` が一致しなければ 401。
//! セッション認証の対象外。

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use subtle::ConstantTimeEq;

use crate::{error::ApiError, usecase::MediaCleanupUseCaseImpl};

pub struct MediaCleanupState {
    pub usecase:     MediaCleanupUseCaseImpl,
    pub cron_secret: String,
}

/// ベアラートークンが `secret` と一致するか（定数時間比較）
fn is_authorized(headers: &HeaderMap, secret: &str) -> bool {
    let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return false;
    };
    !secret.is_empty() && bool::from(token.as_bytes().ct_eq(secret.as_bytes()))
}

#[tracing::instrument(skip_all)]
pub async fn clear_upload(
    State(state): State<Arc<MediaCleanupState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    if !is_authorized(&headers, &state.cron_secret) {
        tracing::warn!("clear-upload: 認証に失敗しました");
        return Err(ApiError::Unauthorized);
    }

    state.usecase.clear_orphans().await?;
    Ok(StatusCode::OK)
}
