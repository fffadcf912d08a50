//! # 投稿
//!
//! フィードに並ぶ投稿と、その作成パラメータを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | ルール |
//! |---|------------|------|
//! | [`PostContent`] | 投稿本文 | trim 後 1〜2,000 文字 |
//! | [`NewPost`] | 新規投稿 | 添付メディアは最大 5 件、重複なし |
//! | [`Post`] | 投稿（読み取りモデル） | 投稿者概要と添付メディアを含む |

use chrono::{DateTime, Utc};

use crate::{
    DomainError,
    media::{Media, MediaId},
    pagination::{Paginated, SortKey},
    user::{UserId, UserSummary},
};

define_uuid_id! {
    /// 投稿 ID
    ///
    /// フィードのカーソルとしても使われる。
    pub struct PostId("post");
}

define_text_body! {
    /// 投稿本文
    pub struct PostContent {
        label: "Content",
        max_length: 2000,
    }
}

/// 1 投稿に添付できるメディアの上限
pub const MAX_ATTACHMENTS: usize = 5;

/// 新規投稿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub id:         PostId,
    pub author_id:  UserId,
    pub content:    PostContent,
    pub media_ids:  Vec<MediaId>,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    /// 新規投稿を作成する
    ///
    /// # Errors
    ///
    /// - 添付メディアが 5 件を超える場合
    /// - 同じメディアが重複している場合
    pub fn new(
        author_id: UserId,
        content: PostContent,
        media_ids: Vec<MediaId>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if media_ids.len() > MAX_ATTACHMENTS {
            return Err(DomainError::Validation(format!(
                "A post can have at most {MAX_ATTACHMENTS} attachments"
            )));
        }
        let mut unique = media_ids.clone();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() != media_ids.len() {
            return Err(DomainError::Validation(
                "Duplicate attachment in mediaIds".to_string(),
            ));
        }

        let (id, created_at) = PostId::new_at(now);
        Ok(Self {
            id,
            author_id,
            content,
            media_ids,
            created_at,
        })
    }
}

/// 投稿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id:          PostId,
    pub content:     String,
    pub author:      UserSummary,
    pub attachments: Vec<Media>,
    pub created_at:  DateTime<Utc>,
}

impl Paginated for Post {
    fn sort_key(&self) -> SortKey {
        SortKey::new(self.created_at, *self.id.as_uuid())
    }
}
