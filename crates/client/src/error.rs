//! # クライアントエラー
//!
//! API 呼び出しの失敗を、画面が扱う分類にまとめる。

use thiserror::Error;

/// 読み込み失敗時に表示するメッセージ
pub const LOAD_FAILED_MESSAGE: &str = "An error occurred while loading posts.";

/// 更新失敗（ロールバック）時に表示するメッセージ
pub const MUTATION_FAILED_MESSAGE: &str = "Something went wrong. Please try again.";

/// API クライアントのエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// セッションが無効（401）
    #[error("認証が必要です")]
    Unauthorized,

    /// リクエストが不正（400）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 対象が存在しない（404）
    #[error("見つかりません: {0}")]
    NotFound(String),

    /// 接続失敗・タイムアウトなど一時的な失敗
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// サーバー内部エラー（5xx）
    #[error("サーバーエラー: {0}")]
    Server(String),

    /// 上記に分類できないエラー（レスポンスの解釈失敗など）
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Unexpected(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
