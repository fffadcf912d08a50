//! # ブックマークユースケース
//!
//! ブックマークの登録・解除はどちらも冪等。

use std::sync::Arc;

use conjob_domain::{DomainError, clock::Clock, post::PostId, toggle::BookmarkInfo, user::UserId};
use conjob_infra::{
    db::TransactionManager,
    repository::{BookmarkRepository, PostRepository},
};

use crate::error::ApiError;

pub struct BookmarkUseCaseImpl {
    post_repository:     Arc<dyn PostRepository>,
    bookmark_repository: Arc<dyn BookmarkRepository>,
    tx_manager:          Arc<dyn TransactionManager>,
    clock:               Arc<dyn Clock>,
}

impl BookmarkUseCaseImpl {
    pub fn new(
        post_repository: Arc<dyn PostRepository>,
        bookmark_repository: Arc<dyn BookmarkRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            post_repository,
            bookmark_repository,
            tx_manager,
            clock,
        }
    }

    async fn ensure_post_exists(&self, post_id: &PostId) -> Result<(), ApiError> {
        if self.post_repository.exists(post_id).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound {
                entity_type: "Post",
                id:          post_id.to_string(),
            }
            .into())
        }
    }

    pub async fn bookmark_info(
        &self,
        post_id: &PostId,
        viewer: &UserId,
    ) -> Result<BookmarkInfo, ApiError> {
        self.ensure_post_exists(post_id).await?;
        Ok(self.bookmark_repository.bookmark_info(viewer, post_id).await?)
    }

    pub async fn bookmark(&self, post_id: &PostId, viewer: &UserId) -> Result<BookmarkInfo, ApiError> {
        self.ensure_post_exists(post_id).await?;

        let mut tx = self.tx_manager.begin().await?;
        self.bookmark_repository
            .insert(&mut tx, viewer, post_id, self.clock.now())
            .await?;
        tx.commit().await?;

        Ok(BookmarkInfo {
            is_bookmarked_by_user: true,
        })
    }

    pub async fn unbookmark(
        &self,
        post_id: &PostId,
        viewer: &UserId,
    ) -> Result<BookmarkInfo, ApiError> {
        self.ensure_post_exists(post_id).await?;

        let mut tx = self.tx_manager.begin().await?;
        self.bookmark_repository.delete(&mut tx, viewer, post_id).await?;
        tx.commit().await?;

        Ok(BookmarkInfo {
            is_bookmarked_by_user: false,
        })
    }
}
