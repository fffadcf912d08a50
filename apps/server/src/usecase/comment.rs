//! # コメントスレッドユースケース
//!
//! 投稿のコメントを新しい側から 5 件ずつ遡って返す。

use std::sync::Arc;

use conjob_domain::{
    DomainError,
    comment::Comment,
    pagination::{Cursor, Page},
    post::PostId,
};
use conjob_infra::repository::{CommentRepository, PostRepository};

use crate::error::ApiError;

pub struct CommentUseCaseImpl {
    post_repository:    Arc<dyn PostRepository>,
    comment_repository: Arc<dyn CommentRepository>,
}

impl CommentUseCaseImpl {
    pub fn new(
        post_repository: Arc<dyn PostRepository>,
        comment_repository: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            post_repository,
            comment_repository,
        }
    }

    /// `cursor` より古いコメントを 1 ページ分、古い順で返す
    ///
    /// `cursor` が `None` なら最新のコメントから。
    pub async fn list_thread(
        &self,
        post_id: &PostId,
        cursor: Option<Cursor>,
    ) -> Result<Page<Comment>, ApiError> {
        if !self.post_repository.exists(post_id).await? {
            return Err(DomainError::NotFound {
                entity_type: "Post",
                id:          post_id.to_string(),
            }
            .into());
        }

        Ok(self
            .comment_repository
            .find_thread_page(post_id, cursor)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use conjob_domain::{
        comment::CommentId,
        pagination::Paginated,
        post::Post,
        user::{UserId, UserSummary},
    };
    use conjob_infra::mock::{
        MockCommentRepository,
        MockFollowRepository,
        MockPostRepository,
        MockUserRepository,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn author() -> UserSummary {
        UserSummary {
            id:           UserId::new(),
            username:     "alice".to_string(),
            display_name: "Alice".to_string(),
            avatar_url:   None,
        }
    }

    fn setup(comment_count: i64) -> (CommentUseCaseImpl, PostId) {
        let base = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let user = author();
        let posts = MockPostRepository::new(MockFollowRepository::new(), MockUserRepository::new());
        let post_id = PostId::new();
        posts.add_post(Post {
            id:          post_id,
            content:     "post".to_string(),
            author:      user.clone(),
            attachments: Vec::new(),
            created_at:  base,
        });
        let comments = MockCommentRepository::new();
        for i in 0..comment_count {
            comments.add_comment(Comment {
                id:         CommentId::new(),
                post_id,
                content:    format!("c{i}"),
                author:     user.clone(),
                created_at: base + Duration::seconds(i + 1),
            });
        }
        let sut = CommentUseCaseImpl::new(Arc::new(posts), Arc::new(comments));
        (sut, post_id)
    }

    fn contents(page: &Page<Comment>) -> Vec<&str> {
        page.items.iter().map(|c| c.content.as_str()).collect()
    }

    #[tokio::test]
    async fn test_最新の5件を古い順で返し続きのカーソルを付ける() {
        let (sut, post_id) = setup(7);

        let page = sut.list_thread(&post_id, None).await.unwrap();

        assert_eq!(contents(&page), vec!["c2", "c3", "c4", "c5", "c6"]);
        assert_eq!(page.previous_cursor, Some(page.items[0].cursor()));
    }

    #[tokio::test]
    async fn test_カーソルより古いコメントを返し最後のページではカーソルなし() {
        let (sut, post_id) = setup(7);
        let first = sut.list_thread(&post_id, None).await.unwrap();

        let second = sut
            .list_thread(&post_id, first.previous_cursor)
            .await
            .unwrap();

        assert_eq!(contents(&second), vec!["c0", "c1"]);
        assert_eq!(second.previous_cursor, None);
    }

    #[tokio::test]
    async fn test_存在しない投稿は404() {
        let (sut, _) = setup(0);

        let result = sut.list_thread(&PostId::new(), None).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
