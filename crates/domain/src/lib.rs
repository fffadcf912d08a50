//! # Conjob ドメイン層
//!
//! 投稿フィード・コメントスレッド・フォロー/ブックマークの中核となる
//! ドメインモデルとページング規則を定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! server → infra → domain
//! client → domain
//! ```
//!
//! ドメイン層は DB や HTTP に依存しない。
//!
//! ## モジュール構成
//!
//! - [`pagination`] - カーソル・ページサイズ・ページの組み立て
//! - [`toggle`] - フォロー/ブックマークのトグル状態
//! - [`post`], [`comment`], [`media`], [`notification`], [`user`] - エンティティ
//! - [`clock`] - 時刻の抽象化
//! - [`error`] - ドメインエラー
//!
//! ## 使用例
//!
//! ```rust
//! use conjob_domain::pagination::{Cursor, PageRequest};
//!
//! let request = PageRequest::from_query(None, Some("5"), 50).unwrap();
//! assert_eq!(request.cursor, None::<Cursor>);
//! assert_eq!(request.page_size.get(), 5);
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod comment;
pub mod error;
pub mod media;
pub mod notification;
pub mod pagination;
pub mod post;
pub mod toggle;
pub mod user;

pub use error::DomainError;
