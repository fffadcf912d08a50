//! # API エラー定義
//!
//! ハンドラ・ユースケースで発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | ステータス | `detail` |
//! |-----------|-----------|----------|
//! | `Validation` | 400 | メッセージをそのまま返す |
//! | `Unauthorized` | 401 | 固定文言 |
//! | `NotFound` | 404 | メッセージをそのまま返す |
//! | `Internal` / `Infra` | 500 | 固定文言（詳細はログのみ） |
//!
//! 外部キー制約違反の `Infra` は、参照先が消えた競合とみなして 404 にする。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use conjob_domain::DomainError;
use conjob_infra::InfraError;
use conjob_shared::ErrorResponse;
use thiserror::Error;

/// API で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    Validation(String),

    /// セッションがない・無効
    #[error("認証が必要です")]
    Unauthorized,

    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// インフラ層のエラー
    #[error("インフラエラー: {0}")]
    Infra(#[from] InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            e @ DomainError::NotFound { .. } => Self::NotFound(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            Self::Validation(msg) => ErrorResponse::validation_error(msg),
            Self::Unauthorized => ErrorResponse::unauthorized("Authentication required"),
            Self::NotFound(msg) => ErrorResponse::not_found(msg),
            Self::Infra(e) if e.is_foreign_key_violation() => {
                tracing::warn!(error = %e, "参照先が存在しない");
                ErrorResponse::not_found("Referenced resource not found")
            }
            Self::Infra(e) => {
                tracing::error!(
                    error.category = "infrastructure",
                    error = %e,
                    span_trace = %e.span_trace(),
                    "インフラエラー"
                );
                ErrorResponse::internal_error()
            }
            Self::Internal(msg) => {
                tracing::error!(error.category = "internal", "内部エラー: {}", msg);
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    async fn into_parts(err: ApiError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case(ApiError::Validation("bad".to_string()), StatusCode::BAD_REQUEST)]
    #[case(ApiError::Unauthorized, StatusCode::UNAUTHORIZED)]
    #[case(ApiError::NotFound("post".to_string()), StatusCode::NOT_FOUND)]
    #[case(ApiError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[tokio::test]
    async fn test_エラー種別ごとのステータスコード(
        #[case] err: ApiError,
        #[case] expected: StatusCode,
    ) {
        let (status, body) = into_parts(err).await;

        assert_eq!(status, expected);
        assert_eq!(body.status, expected.as_u16());
    }

    #[tokio::test]
    async fn test_内部エラーの詳細はレスポンスに含めない() {
        let (_, body) = into_parts(ApiError::Internal("secret detail".to_string())).await;

        assert!(!body.detail.contains("secret detail"));
    }

    #[tokio::test]
    async fn test_インフラエラーは500になる() {
        let (status, _) = into_parts(ApiError::from(InfraError::unexpected("db down"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_ドメインエラーの変換() {
        let validation = ApiError::from(DomainError::Validation("too long".to_string()));
        let not_found = ApiError::from(DomainError::NotFound {
            entity_type: "post",
            id:          "x".to_string(),
        });

        assert!(matches!(validation, ApiError::Validation(msg) if msg == "too long"));
        assert!(matches!(not_found, ApiError::NotFound(msg) if msg == "post not found: x"));
    }
}
