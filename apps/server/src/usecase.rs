//! # ユースケース層
//!
//! サーバーのビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//! - **書き込みはトランザクション**: `TransactionManager` で開始した
//!   `TxContext` をリポジトリに渡す

pub mod bookmark;
pub mod comment;
pub mod feed;
pub mod follow;
pub mod media_cleanup;
pub mod notification;
pub mod post;

pub use bookmark::BookmarkUseCaseImpl;
pub use comment::CommentUseCaseImpl;
pub use feed::FeedUseCaseImpl;
pub use follow::FollowUseCaseImpl;
pub use media_cleanup::{CleanupReport, MediaCleanupUseCaseImpl};
pub use notification::NotificationUseCaseImpl;
pub use post::{CreatePostInput, PostUseCaseImpl};
