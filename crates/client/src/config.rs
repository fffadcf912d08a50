//! # クライアント設定

/// API クライアントの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API のベース URL（例: `http://localhost:3000`）
    pub base_url:       String,
    /// `auth_session` Cookie に載せるセッション ID
    pub session_cookie: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url:       base_url.into().trim_end_matches('/').to_string(),
            session_cookie: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_cookie = Some(session_id.into());
        self
    }
}
