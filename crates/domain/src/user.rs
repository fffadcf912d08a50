//! # ユーザー
//!
//! 投稿者・フォロー対象として参照されるユーザーの識別子と概要。
//! アカウントの登録や認証はこのクレートの範囲外。

use serde::{Deserialize, Serialize};

define_uuid_id! {
    /// ユーザー ID
    pub struct UserId("user");
}

/// 投稿やコメントに添えるユーザー概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id:           UserId,
    pub username:     String,
    pub display_name: String,
    pub avatar_url:   Option<String>,
}
