//! # Conjob サーバー
//!
//! フィード・コメント・フォロー/ブックマークの HTTP API を提供する。
//!
//! ## 構成
//!
//! ```text
//! handler（axum）→ usecase → infra（PostgreSQL / Redis / メディアプロバイダ）
//! ```
//!
//! - [`app_builder`] - DI とルーター構築
//! - [`config`] - 環境変数からの設定読み込み
//! - [`middleware`] - セッション認証
//! - [`handler`] - HTTP ハンドラと DTO 変換
//! - [`usecase`] - ビジネスロジック
//! - [`error`] - API エラーと JSON エラーレスポンス

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;
