//! # 投稿作成ユースケース
//!
//! 本文と添付メディア ID を受け取り、投稿を作成してメディアを紐付ける。
//! 投稿の挿入とメディアの紐付けは同一トランザクションで行う。

use std::sync::Arc;

use conjob_domain::{
    clock::Clock,
    media::MediaId,
    post::{NewPost, Post, PostContent},
    user::UserId,
};
use conjob_infra::{
    db::TransactionManager,
    repository::{MediaRepository, PostRepository},
};

use crate::error::ApiError;

/// 投稿作成の入力
pub struct CreatePostInput {
    pub author_id: UserId,
    pub content:   String,
    /// クライアントから受け取った生の ID 文字列
    pub media_ids: Vec<String>,
}

/// 投稿ユースケース
pub struct PostUseCaseImpl {
    post_repository:  Arc<dyn PostRepository>,
    media_repository: Arc<dyn MediaRepository>,
    tx_manager:       Arc<dyn TransactionManager>,
    clock:            Arc<dyn Clock>,
}

impl PostUseCaseImpl {
    pub fn new(
        post_repository: Arc<dyn PostRepository>,
        media_repository: Arc<dyn MediaRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            post_repository,
            media_repository,
            tx_manager,
            clock,
        }
    }

    /// 投稿を作成する
    ///
    /// 1. 本文とメディア ID を検証
    /// 2. 投稿を挿入
    /// 3. 未紐付けのメディアを投稿に紐付け（1 件でも紐付けられなければ中止）
    /// 4. コミット後、作成した投稿を読み直して返す
    pub async fn create_post(&self, input: CreatePostInput) -> Result<Post, ApiError> {
        let content = PostContent::new(input.content)?;
        let media_ids = input
            .media_ids
            .iter()
            .map(String::as_str)
            .map(MediaId::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let new_post = NewPost::new(input.author_id, content, media_ids, self.clock.now())?;

        let mut tx = self.tx_manager.begin().await?;
        self.post_repository.insert(&mut tx, &new_post).await?;
        if !new_post.media_ids.is_empty() {
            let attached = self
                .media_repository
                .attach_to_post(&mut tx, &new_post.id, &new_post.media_ids)
                .await?;
            if attached != new_post.media_ids.len() as u64 {
                // tx はドロップでロールバックされる
                return Err(ApiError::Validation(
                    "Some attachments do not exist or are already in use".to_string(),
                ));
            }
        }
        tx.commit().await?;

        tracing::info!(
            post_id = %new_post.id,
            attachments = new_post.media_ids.len(),
            "投稿を作成しました"
        );

        self.post_repository
            .find_by_id(&new_post.id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("作成した投稿が見つかりません: {}", new_post.id)))
    }
}
