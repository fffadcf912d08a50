//! # Conjob 共有ユーティリティ
//!
//! サーバー・クライアント双方で使用されるワイヤー型と、
//! ログ初期化などの横断的なユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, client, server）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum 等の Web フレームワークには依存しない

pub mod api_types;
#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod cursor_page;
pub mod error_response;
pub mod health;
pub mod observability;

pub use api_types::{CommentDto, CreatePostRequest, MediaDto, PostDto, UserDto};
pub use cursor_page::{CommentPage, CursorPage};
pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
