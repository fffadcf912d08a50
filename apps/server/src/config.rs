//! # サーバー設定
//!
//! 環境変数からサーバーの設定を読み込む。
//! 必須の値が欠けている・不正な場合は [`ConfigError`] を返し、起動を中止する。

use std::env;

use conjob_domain::pagination::DEFAULT_MAX_PAGE_SIZE;
use thiserror::Error;

/// メディアプロバイダ API のデフォルト URL
const DEFAULT_MEDIA_API_URL: &str = "https://api.uploadthing.com";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// サーバーの設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// バインドアドレス
    pub host:               String,
    /// ポート番号
    pub port:               u16,
    /// PostgreSQL 接続 URL
    pub database_url:       String,
    /// Redis 接続 URL（セッションストア）
    pub redis_url:          String,
    /// `/api/clear-upload` の Bearer トークン
    pub cron_secret:        String,
    /// メディアプロバイダ API の URL
    pub media_api_url:      String,
    /// メディアプロバイダのアプリ ID（ファイル URL からキーを取り出すのに使う）
    pub media_app_id:       String,
    /// メディアプロバイダの API キー
    pub media_api_key:      String,
    /// 本番環境か（`APP_ENV=production`）。未使用メディアの保持期限を適用する
    pub production:         bool,
    /// フィードの `pageSize` 上限
    pub feed_max_page_size: u32,
}

impl ServerConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let port_raw = required("SERVER_PORT")?;
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name:  "SERVER_PORT",
            value: port_raw.clone(),
        })?;

        let feed_max_page_size = match lookup("FEED_MAX_PAGE_SIZE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        name:  "FEED_MAX_PAGE_SIZE",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_MAX_PAGE_SIZE,
        };

        Ok(Self {
            host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            cron_secret: required("CRON_SECRET")?,
            media_api_url: lookup("MEDIA_API_URL")
                .unwrap_or_else(|| DEFAULT_MEDIA_API_URL.to_string()),
            media_app_id: required("MEDIA_APP_ID")?,
            media_api_key: required("MEDIA_API_KEY")?,
            production: lookup("APP_ENV").is_some_and(|v| v == "production"),
            feed_max_page_size,
        })
    }
}
