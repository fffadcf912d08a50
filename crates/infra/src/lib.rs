//! # Conjob インフラ層
//!
//! 外部システムとの接続・通信を担当する。
//!
//! ## 責務
//!
//! - **データベース**: PostgreSQL 接続プール、マイグレーション、トランザクション
//! - **リポジトリ**: 投稿・コメント・フォロー・ブックマーク・通知・メディア
//! - **セッション**: Redis に保存されたログインセッションの参照
//! - **メディアストレージ**: 外部プロバイダ上のファイル削除
//!
//! ## 依存関係
//!
//! ```text
//! server → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - 接続プールと [`db::TxContext`] / [`db::TransactionManager`]
//! - [`repository`] - リポジトリトレイトと PostgreSQL 実装
//! - [`session`] - セッションストア
//! - [`media_storage`] - メディアプロバイダクライアント
//! - [`error`] - インフラ層エラー
//! - `mock` - インメモリ実装（`test-utils` feature）

pub mod db;
pub mod error;
pub mod media_storage;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;
pub mod session;

pub use error::InfraError;
pub use media_storage::{HttpMediaStorage, MediaStorage};
pub use session::{RedisSessionManager, SessionData, SessionManager};
