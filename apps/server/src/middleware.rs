//! # 認証ミドルウェア
//!
//! `auth_session` Cookie のセッション ID から Redis のセッションを解決し、
//! ログインユーザーをリクエスト拡張に載せる。
//!
//! セッションが無い・期限切れの場合は 401 を返し、ハンドラは実行しない。
//! 認証が必要な API は空ページなどで誤魔化さず必ず 401 にする。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/api/posts/for-you", get(for_you_feed))
//!     .layer(from_fn_with_state(auth_state, require_session))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use conjob_domain::user::UserId;
use conjob_infra::SessionManager;

use crate::error::ApiError;

/// セッション Cookie 名
pub const SESSION_COOKIE_NAME: &str = "auth_session";

/// 認証ミドルウェアの状態
#[derive(Clone)]
pub struct AuthState {
    pub session_manager: Arc<dyn SessionManager>,
}

/// ログインユーザー
///
/// ハンドラでは `Extension<CurrentUser>` として受け取る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id:       UserId,
    pub username: String,
}

/// セッションを検証するミドルウェア
pub async fn require_session(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match authenticate(state.session_manager.as_ref(), &jar).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    tracing::Span::current().record("user_id", tracing::field::display(&user.id));
    request.extensions_mut().insert(user);

    next.run(request).await
}

/// Cookie からセッションを取得する
async fn authenticate(
    session_manager: &dyn SessionManager,
    jar: &CookieJar,
) -> Result<CurrentUser, ApiError> {
    let session_id = jar
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    match session_manager.get(&session_id).await {
        Ok(Some(data)) => Ok(CurrentUser {
            id:       *data.user_id(),
            username: data.username().to_string(),
        }),
        Ok(None) => Err(ApiError::Unauthorized),
        Err(e) => {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = "session",
                "セッション取得で内部エラー: {}",
                e
            );
            Err(ApiError::Infra(e))
        }
    }
}
