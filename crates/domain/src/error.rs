//! # ドメイン層エラー定義
//!
//! 入力値の検証失敗や、参照先エンティティの不在を表すエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 不正なカーソル・ページサイズ・本文 |
//! | `NotFound` | 404 Not Found | 投稿やユーザーが存在しない |
//!
//! メッセージはそのままレスポンスの `detail` に載るため、
//! クライアントに見せてよい内容だけを含める。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 値は補正せずに拒否する（ページサイズの上限超過を丸めない、など）。
    #[error("{0}")]
    Validation(String),

    /// エンティティが見つからない
    #[error("{entity_type} not found: {id}")]
    NotFound {
        /// エンティティの種類（"Post", "User" など）
        entity_type: &'static str,
        id:          String,
    },
}
