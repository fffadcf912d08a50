//! # 添付メディア
//!
//! アップロード済みファイルのメタデータ。アップロード直後は投稿に紐付いておらず、
//! 投稿作成時に `post_id` が設定される。
//! 紐付かないまま残ったメディアは定期クリーンアップで削除される。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::post::PostId;

define_uuid_id! {
    /// メディア ID
    pub struct MediaId("media");
}

/// 未使用メディアを削除対象にするまでの猶予
pub const ORPHAN_RETENTION_HOURS: i64 = 24;

/// メディア種別
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
pub enum MediaType {
    Image,
    Video,
}

/// 添付メディア
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub id:         MediaId,
    pub url:        String,
    pub media_type: MediaType,
    pub post_id:    Option<PostId>,
    pub created_at: DateTime<Utc>,
}

impl Media {
    /// メディアプロバイダ上のファイルキー
    ///
    /// URL の `/a/{app_id}/` 以降をキーとみなす。形式が違う URL は `None`。
    pub fn file_key(&self, app_id: &str) -> Option<&str> {
        let marker = format!("/a/{app_id}/");
        let (_, key) = self.url.split_once(&marker)?;
        (!key.is_empty()).then_some(key)
    }

    pub fn is_orphan(&self) -> bool {
        self.post_id.is_none()
    }
}

/// 未使用メディアの作成日時の上限
///
/// 保持期限を適用する場合は `now` の 24 時間前、しない場合は上限なし。
pub fn orphan_cutoff(now: DateTime<Utc>, enforce_retention: bool) -> Option<DateTime<Utc>> {
    enforce_retention.then(|| now - Duration::hours(ORPHAN_RETENTION_HOURS))
}
