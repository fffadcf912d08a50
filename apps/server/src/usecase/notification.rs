//! # 通知ユースケース

use std::sync::Arc;

use conjob_domain::user::UserId;
use conjob_infra::{db::TransactionManager, repository::NotificationRepository};

use crate::error::ApiError;

pub struct NotificationUseCaseImpl {
    notification_repository: Arc<dyn NotificationRepository>,
    tx_manager:              Arc<dyn TransactionManager>,
}

impl NotificationUseCaseImpl {
    pub fn new(
        notification_repository: Arc<dyn NotificationRepository>,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            notification_repository,
            tx_manager,
        }
    }

    /// `recipient` 宛の未読通知をすべて既読にし、更新件数を返す
    pub async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, ApiError> {
        let mut tx = self.tx_manager.begin().await?;
        let updated = self
            .notification_repository
            .mark_all_read(&mut tx, recipient)
            .await?;
        tx.commit().await?;

        tracing::debug!(%recipient, updated, "通知を既読にしました");
        Ok(updated)
    }
}
