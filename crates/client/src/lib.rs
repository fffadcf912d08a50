//! # Conjob クライアント
//!
//! サーバー API を呼び出し、取得結果をプロセス内のキャッシュに保持する。
//!
//! ## モジュール構成
//!
//! - [`api`]: HTTP API クライアント（[`SocialApi`] トレイトと reqwest 実装）
//! - [`cache`]: スナップショットと復元を持つクエリキャッシュ
//! - [`feed`]: 2 つのフィードの無限スクロール
//! - [`comments`]: コメントスレッドの後方ページング
//! - [`toggle`]: フォロー・ブックマークの楽観的更新
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use conjob_client::{ClientConfig, FeedKind, FeedLoader, HttpSocialApi, QueryCache};
//!
//! let api = Arc::new(HttpSocialApi::new(
//!     ClientConfig::new("http://localhost:3000").with_session(session_id),
//! ));
//! let feeds = FeedLoader::new(api, Arc::new(QueryCache::new()));
//! let status = feeds.open(FeedKind::ForYou).await;
//! ```

pub mod api;
pub mod cache;
pub mod comments;
pub mod config;
pub mod error;
pub mod feed;
mod inflight;
#[cfg(test)]
mod testing;
pub mod toggle;

pub use api::{HttpSocialApi, SocialApi};
pub use cache::{CacheEntry, QueryCache, Snapshot};
pub use comments::{CommentThread, CommentThreadLoader};
pub use config::ClientConfig;
pub use error::ClientError;
pub use feed::{FeedKind, FeedLoader, FeedStatus};
pub use toggle::{Notifier, ToggleKey, ToggleMutator, ToggleOutcome, TracingNotifier};
