//! # セッションストア
//!
//! Redis に保存されたログインセッションを参照する。
//! セッションの発行（ログイン処理）は別システムの責務で、
//! このモジュールは同じキー形式で読み書きできることだけを保証する。
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `session:{session_id}` | SessionData (JSON) | 30 日 |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conjob_domain::user::UserId;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::InfraError;

/// セッションの有効期限（秒）
const SESSION_TTL_SECONDS: u64 = 60 * 60 * 24 * 30;

/// セッションデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    user_id:    UserId,
    username:   String,
    created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(user_id: UserId, username: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            username: username.into(),
            created_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// セッションストアトレイト
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// セッションを保存し、セッション ID（UUID v4）を返す
    async fn create(&self, data: &SessionData) -> Result<String, InfraError>;

    /// セッションを取得する。期限切れ・未登録は `None`
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError>;

    /// セッションを削除する。存在しなくても成功とする
    async fn delete(&self, session_id: &str) -> Result<(), InfraError>;

    /// 疎通確認
    async fn ping(&self) -> Result<(), InfraError>;
}

/// Redis を使用したセッションストア
#[derive(Clone)]
pub struct RedisSessionManager {
    conn: ConnectionManager,
}

impl RedisSessionManager {
    /// `redis_url` 例: `redis://localhost:6379`
    pub async fn new(redis_url: &str) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    fn session_key(session_id: &str) -> String {
        format!("session:{session_id}")
    }
}

#[async_trait]
impl SessionManager for RedisSessionManager {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
        let session_id = Uuid::new_v4().to_string();
        let json = serde_json::to_string(data)?;

        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(Self::session_key(&session_id), json, SESSION_TTL_SECONDS)
            .await?;

        Ok(session_id)
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
        let mut conn = self.conn.clone();
        let result: Option<String> = conn.get(Self::session_key(session_id)).await?;

        result
            .map(|json| serde_json::from_str(&json).map_err(InfraError::from))
            .transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::session_key(session_id)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), InfraError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
