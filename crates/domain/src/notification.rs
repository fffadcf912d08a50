//! # 通知
//!
//! フォロー・いいね・コメントで受信者に届く通知。
//! このクレートで生成するのはフォロー通知のみで、フォロー作成と同じトランザクションで記録する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{post::PostId, user::UserId};

define_uuid_id! {
    /// 通知 ID
    pub struct NotificationId("notification");
}

/// 通知種別
///
/// `notifications.type` カラムに小文字で格納される。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationType {
    Like,
    Follow,
    Comment,
}

/// 通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id:           NotificationId,
    pub recipient_id: UserId,
    pub issuer_id:    UserId,
    pub post_id:      Option<PostId>,
    pub kind:         NotificationType,
    pub read:         bool,
    pub created_at:   DateTime<Utc>,
}

impl Notification {
    /// `issuer` が `recipient` をフォローしたことを知らせる未読通知
    pub fn follow(recipient_id: UserId, issuer_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_id,
            issuer_id,
            post_id: None,
            kind: NotificationType::Follow,
            read: false,
            created_at: now,
        }
    }
}
