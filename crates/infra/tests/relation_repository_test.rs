//! フォロー・ブックマーク・通知リポジトリの統合テスト

mod common;

use common::{insert_post, insert_user, test_now};
use conjob_domain::{
    notification::Notification,
    toggle::{BookmarkInfo, FollowerInfo},
};
use conjob_infra::{
    db::{PgTransactionManager, TransactionManager},
    repository::{
        BookmarkRepository,
        FollowRepository,
        NotificationRepository,
        PostgresBookmarkRepository,
        PostgresFollowRepository,
        PostgresNotificationRepository,
    },
};
use pretty_assertions::assert_eq;
use sqlx::PgPool;

async fn count_notifications(pool: &PgPool, read: bool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE read = $1")
        .bind(read)
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_フォローは冪等でフォロワー数に反映される(pool: PgPool) {
    let viewer = insert_user(&pool, "viewer").await;
    let alice = insert_user(&pool, "alice").await;
    let tx_manager = PgTransactionManager::new(pool.clone());
    let sut = PostgresFollowRepository::new(pool);

    let mut tx = tx_manager.begin().await.unwrap();
    assert!(sut.insert(&mut tx, &viewer, &alice, test_now()).await.unwrap());
    assert!(!sut.insert(&mut tx, &viewer, &alice, test_now()).await.unwrap());
    tx.commit().await.unwrap();

    assert_eq!(
        sut.follower_info(&alice, &viewer).await.unwrap(),
        FollowerInfo {
            followers:           1,
            is_followed_by_user: true,
        }
    );

    let mut tx = tx_manager.begin().await.unwrap();
    assert!(sut.delete(&mut tx, &viewer, &alice).await.unwrap());
    assert!(!sut.delete(&mut tx, &viewer, &alice).await.unwrap());
    tx.commit().await.unwrap();

    assert_eq!(
        sut.follower_info(&alice, &viewer).await.unwrap(),
        FollowerInfo {
            followers:           0,
            is_followed_by_user: false,
        }
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ブックマークの作成と削除(pool: PgPool) {
    let viewer = insert_user(&pool, "viewer").await;
    let post_id = insert_post(&pool, &viewer, 0).await;
    let tx_manager = PgTransactionManager::new(pool.clone());
    let sut = PostgresBookmarkRepository::new(pool);

    let mut tx = tx_manager.begin().await.unwrap();
    assert!(sut.insert(&mut tx, &viewer, &post_id, test_now()).await.unwrap());
    assert!(!sut.insert(&mut tx, &viewer, &post_id, test_now()).await.unwrap());
    tx.commit().await.unwrap();

    assert_eq!(
        sut.bookmark_info(&viewer, &post_id).await.unwrap(),
        BookmarkInfo {
            is_bookmarked_by_user: true,
        }
    );

    let mut tx = tx_manager.begin().await.unwrap();
    assert!(sut.delete(&mut tx, &viewer, &post_id).await.unwrap());
    tx.commit().await.unwrap();

    assert!(!sut.bookmark_info(&viewer, &post_id).await.unwrap().is_bookmarked_by_user);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_フォロー通知の記録と既読化(pool: PgPool) {
    let viewer = insert_user(&pool, "viewer").await;
    let alice = insert_user(&pool, "alice").await;
    let bob = insert_user(&pool, "bob").await;
    let tx_manager = PgTransactionManager::new(pool.clone());
    let sut = PostgresNotificationRepository::new();

    let mut tx = tx_manager.begin().await.unwrap();
    sut.insert(&mut tx, &Notification::follow(alice, viewer, test_now()))
        .await
        .unwrap();
    sut.insert(&mut tx, &Notification::follow(alice, bob, test_now()))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = tx_manager.begin().await.unwrap();
    assert_eq!(sut.delete_follow(&mut tx, &alice, &viewer).await.unwrap(), 1);
    assert_eq!(sut.mark_all_read(&mut tx, &alice).await.unwrap(), 1);
    assert_eq!(sut.mark_all_read(&mut tx, &alice).await.unwrap(), 0);
    tx.commit().await.unwrap();

    assert_eq!(count_notifications(&pool, false).await, 0);
    assert_eq!(count_notifications(&pool, true).await, 1);
}
