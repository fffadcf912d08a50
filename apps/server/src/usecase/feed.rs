//! # フィードユースケース
//!
//! 「おすすめ」（全投稿）と「フォロー中」の 2 つのフィードを
//! カーソルページングで返す。どちらも新しい順。

use std::sync::Arc;

use conjob_domain::{
    pagination::{Page, PageRequest},
    post::Post,
    user::UserId,
};
use conjob_infra::repository::PostRepository;

use crate::error::ApiError;

/// フィードユースケース
pub struct FeedUseCaseImpl {
    post_repository: Arc<dyn PostRepository>,
}

impl FeedUseCaseImpl {
    pub fn new(post_repository: Arc<dyn PostRepository>) -> Self {
        Self { post_repository }
    }

    pub async fn for_you(&self, request: &PageRequest) -> Result<Page<Post>, ApiError> {
        Ok(self.post_repository.find_for_you_page(request).await?)
    }

    pub async fn following(
        &self,
        viewer: &UserId,
        request: &PageRequest,
    ) -> Result<Page<Post>, ApiError> {
        Ok(self
            .post_repository
            .find_following_page(viewer, request)
            .await?)
    }
}
