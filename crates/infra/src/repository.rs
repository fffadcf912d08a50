//! # リポジトリ実装
//!
//! 各リポジトリはトレイトと PostgreSQL 実装の組で定義する。
//! ユースケース層はトレイトにのみ依存し、テストでは [`crate::mock`] の
//! インメモリ実装に差し替える。
//!
//! 書き込みメソッドは [`crate::db::TxContext`] を必須引数に取る。

pub mod bookmark_repository;
pub mod comment_repository;
pub mod follow_repository;
pub mod media_repository;
pub mod notification_repository;
pub mod post_repository;
pub mod user_repository;

pub use bookmark_repository::{BookmarkRepository, PostgresBookmarkRepository};
pub use comment_repository::{CommentRepository, PostgresCommentRepository};
pub use follow_repository::{FollowRepository, PostgresFollowRepository};
pub use media_repository::{MediaRepository, PostgresMediaRepository};
pub use notification_repository::{NotificationRepository, PostgresNotificationRepository};
pub use post_repository::{PostRepository, PostgresPostRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};
