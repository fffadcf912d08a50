//! # コメント
//!
//! 投稿に付くコメント。スレッドは古い順に表示し、古いページへ遡って読み込む。

use chrono::{DateTime, Utc};

use crate::{
    pagination::{Paginated, SortKey},
    post::PostId,
    user::UserSummary,
};

define_uuid_id! {
    /// コメント ID
    pub struct CommentId("comment");
}

/// コメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id:         CommentId,
    pub post_id:    PostId,
    pub content:    String,
    pub author:     UserSummary,
    pub created_at: DateTime<Utc>,
}

impl Paginated for Comment {
    fn sort_key(&self) -> SortKey {
        SortKey::new(self.created_at, *self.id.as_uuid())
    }
}
