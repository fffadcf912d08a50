//! # NotificationRepository
//!
//! 通知の記録と既読化を担当するリポジトリ。

use async_trait::async_trait;
use conjob_domain::{
    notification::{Notification, NotificationType},
    user::UserId,
};

use crate::{db::TxContext, error::InfraError};

/// 通知リポジトリトレイト
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, tx: &mut TxContext, notification: &Notification)
    -> Result<(), InfraError>;

    /// `issuer` から `recipient` へのフォロー通知を削除する（フォロー解除時）
    async fn delete_follow(
        &self,
        tx: &mut TxContext,
        recipient: &UserId,
        issuer: &UserId,
    ) -> Result<u64, InfraError>;

    /// `recipient` の未読通知をすべて既読にし、更新件数を返す
    async fn mark_all_read(&self, tx: &mut TxContext, recipient: &UserId)
    -> Result<u64, InfraError>;
}

/// PostgreSQL 実装の NotificationRepository
///
/// 書き込みのみでプールを直接使わない。
#[derive(Debug, Clone, Default)]
pub struct PostgresNotificationRepository;

impl PostgresNotificationRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(id = %notification.id))]
    async fn insert(
        &self,
        tx: &mut TxContext,
        notification: &Notification,
    ) -> Result<(), InfraError> {
        let kind: &'static str = notification.kind.into();
        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, issuer_id, post_id, type, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.recipient_id.as_uuid())
        .bind(notification.issuer_id.as_uuid())
        .bind(notification.post_id.map(|id| *id.as_uuid()))
        .bind(kind)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%recipient, %issuer))]
    async fn delete_follow(
        &self,
        tx: &mut TxContext,
        recipient: &UserId,
        issuer: &UserId,
    ) -> Result<u64, InfraError> {
        let kind: &'static str = NotificationType::Follow.into();
        let result = sqlx::query(
            "DELETE FROM notifications WHERE recipient_id = $1 AND issuer_id = $2 AND type = $3",
        )
        .bind(recipient.as_uuid())
        .bind(issuer.as_uuid())
        .bind(kind)
        .execute(tx.conn()?)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%recipient))]
    async fn mark_all_read(
        &self,
        tx: &mut TxContext,
        recipient: &UserId,
    ) -> Result<u64, InfraError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = true WHERE recipient_id = $1 AND read = false",
        )
        .bind(recipient.as_uuid())
        .execute(tx.conn()?)
        .await?;

        Ok(result.rows_affected())
    }
}
