//! MediaRepository 統合テスト

mod common;

use chrono::Duration;
use common::{insert_media, insert_post, insert_user, test_now};
use conjob_domain::media::MediaId;
use conjob_infra::{
    db::{PgTransactionManager, TransactionManager},
    repository::{MediaRepository, PostgresMediaRepository},
};
use pretty_assertions::assert_eq;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_未使用メディアを作成日時の上限で絞り込める(pool: PgPool) {
    let author = insert_user(&pool, "alice").await;
    let post_id = insert_post(&pool, &author, 0).await;
    let old = insert_media(&pool, None, "https://utfs.io/a/app/old", test_now() - Duration::hours(48)).await;
    let fresh = insert_media(&pool, None, "https://utfs.io/a/app/fresh", test_now()).await;
    insert_media(&pool, Some(&post_id), "https://utfs.io/a/app/used", test_now() - Duration::hours(48)).await;
    let sut = PostgresMediaRepository::new(pool);

    let all: Vec<MediaId> = sut.find_orphans(None).await.unwrap().iter().map(|m| m.id).collect();
    let expired: Vec<MediaId> = sut
        .find_orphans(Some(test_now() - Duration::hours(24)))
        .await
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();

    assert_eq!(all, vec![old, fresh]);
    assert_eq!(expired, vec![old]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_idを指定してメディアを削除できる(pool: PgPool) {
    let a = insert_media(&pool, None, "https://utfs.io/a/app/a", test_now()).await;
    let b = insert_media(&pool, None, "https://utfs.io/a/app/b", test_now()).await;
    let tx_manager = PgTransactionManager::new(pool.clone());
    let sut = PostgresMediaRepository::new(pool);

    let mut tx = tx_manager.begin().await.unwrap();
    let deleted = sut.delete_by_ids(&mut tx, &[a]).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(deleted, 1);
    let remaining: Vec<MediaId> = sut.find_orphans(None).await.unwrap().iter().map(|m| m.id).collect();
    assert_eq!(remaining, vec![b]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_他の投稿に紐付いたメディアは紐付け直さない(pool: PgPool) {
    let author = insert_user(&pool, "alice").await;
    let first = insert_post(&pool, &author, 0).await;
    let second = insert_post(&pool, &author, 1).await;
    let media_id = insert_media(&pool, Some(&first), "https://utfs.io/a/app/x", test_now()).await;
    let tx_manager = PgTransactionManager::new(pool.clone());
    let sut = PostgresMediaRepository::new(pool);

    let mut tx = tx_manager.begin().await.unwrap();
    let attached = sut.attach_to_post(&mut tx, &second, &[media_id]).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(attached, 0);
}
