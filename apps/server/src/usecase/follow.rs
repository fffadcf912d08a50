//! # フォローユースケース
//!
//! フォロワー情報の取得と、フォロー/フォロー解除を行う。
//!
//! - フォローは冪等。既にフォロー済みなら何もしない
//! - 新しくフォローしたときだけフォロー通知を作る（同一トランザクション）
//! - フォロー解除ではフォロー通知も削除する
//!
//! どの操作も、操作後のフォロワー情報を返す。

use std::sync::Arc;

use conjob_domain::{
    DomainError,
    clock::Clock,
    notification::Notification,
    toggle::FollowerInfo,
    user::UserId,
};
use conjob_infra::{
    db::TransactionManager,
    repository::{FollowRepository, NotificationRepository, UserRepository},
};

use crate::error::ApiError;

pub struct FollowUseCaseImpl {
    user_repository:         Arc<dyn UserRepository>,
    follow_repository:       Arc<dyn FollowRepository>,
    notification_repository: Arc<dyn NotificationRepository>,
    tx_manager:              Arc<dyn TransactionManager>,
    clock:                   Arc<dyn Clock>,
}

impl FollowUseCaseImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        follow_repository: Arc<dyn FollowRepository>,
        notification_repository: Arc<dyn NotificationRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            follow_repository,
            notification_repository,
            tx_manager,
            clock,
        }
    }

    async fn ensure_user_exists(&self, user_id: &UserId) -> Result<(), ApiError> {
        match self.user_repository.find_summary(user_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound {
                entity_type: "User",
                id:          user_id.to_string(),
            }
            .into()),
        }
    }

    pub async fn follower_info(
        &self,
        user_id: &UserId,
        viewer: &UserId,
    ) -> Result<FollowerInfo, ApiError> {
        self.ensure_user_exists(user_id).await?;
        Ok(self.follow_repository.follower_info(user_id, viewer).await?)
    }

    /// `viewer` が `user_id` をフォローする
    pub async fn follow(&self, user_id: &UserId, viewer: &UserId) -> Result<FollowerInfo, ApiError> {
        if user_id == viewer {
            return Err(ApiError::Validation("You cannot follow yourself".to_string()));
        }
        self.ensure_user_exists(user_id).await?;

        let now = self.clock.now();
        let mut tx = self.tx_manager.begin().await?;
        let created = self
            .follow_repository
            .insert(&mut tx, viewer, user_id, now)
            .await?;
        if created {
            self.notification_repository
                .insert(&mut tx, &Notification::follow(*user_id, *viewer, now))
                .await?;
        }
        tx.commit().await?;

        if created {
            tracing::info!(follower = %viewer, following = %user_id, "フォローしました");
        }
        Ok(self.follow_repository.follower_info(user_id, viewer).await?)
    }

    /// `viewer` が `user_id` のフォローを解除する
    pub async fn unfollow(
        &self,
        user_id: &UserId,
        viewer: &UserId,
    ) -> Result<FollowerInfo, ApiError> {
        self.ensure_user_exists(user_id).await?;

        let mut tx = self.tx_manager.begin().await?;
        let removed = self.follow_repository.delete(&mut tx, viewer, user_id).await?;
        if removed {
            self.notification_repository
                .delete_follow(&mut tx, user_id, viewer)
                .await?;
        }
        tx.commit().await?;

        if removed {
            tracing::info!(follower = %viewer, following = %user_id, "フォローを解除しました");
        }
        Ok(self.follow_repository.follower_info(user_id, viewer).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use conjob_domain::{clock::FixedClock, notification::NotificationType, user::UserSummary};
    use conjob_infra::mock::{
        MockFollowRepository,
        MockNotificationRepository,
        MockTransactionManager,
        MockUserRepository,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    struct Fixture {
        sut:           FollowUseCaseImpl,
        notifications: MockNotificationRepository,
        viewer:        UserId,
        target:        UserId,
    }

    fn summary(name: &str) -> UserSummary {
        UserSummary {
            id:           UserId::new(),
            username:     name.to_string(),
            display_name: name.to_string(),
            avatar_url:   None,
        }
    }

    fn fixture() -> Fixture {
        let viewer = summary("viewer");
        let target = summary("target");
        let users = MockUserRepository::new();
        users.add_user(viewer.clone());
        users.add_user(target.clone());
        let notifications = MockNotificationRepository::new();
        let now: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let sut = FollowUseCaseImpl::new(
            Arc::new(users),
            Arc::new(MockFollowRepository::new()),
            Arc::new(notifications.clone()),
            Arc::new(MockTransactionManager),
            Arc::new(FixedClock::new(now)),
        );
        Fixture {
            sut,
            notifications,
            viewer: viewer.id,
            target: target.id,
        }
    }

    #[tokio::test]
    async fn test_フォローするとフォロワー数が増え通知が1件作られる() {
        let f = fixture();

        let info = f.sut.follow(&f.target, &f.viewer).await.unwrap();

        assert_eq!(
            info,
            FollowerInfo {
                followers:           1,
                is_followed_by_user: true,
            }
        );
        let notifications = f.notifications.all();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].recipient_id, f.target);
        assert_eq!(notifications[0].issuer_id, f.viewer);
        assert_eq!(notifications[0].kind, NotificationType::Follow);
    }

    #[tokio::test]
    async fn test_二重フォローは冪等で通知も増えない() {
        let f = fixture();
        f.sut.follow(&f.target, &f.viewer).await.unwrap();

        let info = f.sut.follow(&f.target, &f.viewer).await.unwrap();

        assert_eq!(info.followers, 1);
        assert_eq!(f.notifications.all().len(), 1);
    }

    #[tokio::test]
    async fn test_フォロー解除で通知も消える() {
        let f = fixture();
        f.sut.follow(&f.target, &f.viewer).await.unwrap();

        let info = f.sut.unfollow(&f.target, &f.viewer).await.unwrap();

        assert_eq!(
            info,
            FollowerInfo {
                followers:           0,
                is_followed_by_user: false,
            }
        );
        assert!(f.notifications.all().is_empty());
    }

    #[tokio::test]
    async fn test_フォローしていないユーザーの解除も成功する() {
        let f = fixture();

        let info = f.sut.unfollow(&f.target, &f.viewer).await.unwrap();

        assert_eq!(info.followers, 0);
    }

    #[tokio::test]
    async fn test_自分自身はフォローできない() {
        let f = fixture();

        let result = f.sut.follow(&f.viewer, &f.viewer).await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(f.notifications.all().is_empty());
    }

    #[tokio::test]
    async fn test_存在しないユーザーは404() {
        let f = fixture();
        let unknown = UserId::new();

        assert!(matches!(
            f.sut.follow(&unknown, &f.viewer).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            f.sut.follower_info(&unknown, &f.viewer).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
