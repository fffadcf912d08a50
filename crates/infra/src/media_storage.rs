//! # メディアストレージ
//!
//! アップロード済みファイルを保持する外部プロバイダ（UploadThing 互換 API）のクライアント。
//! このクレートが使うのはファイル削除のみ。
//!
//! ## API
//!
//! ```text
//! POST {base_url}/v6/deleteFiles
//! x-uploadthing-api-key: {api_key}
//! { "fileKeys": ["..."] }
//! → { "success": true, "deletedCount": 2 }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::InfraError;

/// API キーを運ぶヘッダー名
const API_KEY_HEADER: &str = "x-uploadthing-api-key";

/// メディアストレージトレイト
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// ファイルを削除し、プロバイダが報告した削除件数を返す
    async fn delete_files(&self, file_keys: &[String]) -> Result<u64, InfraError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteFilesRequest<'a> {
    file_keys: &'a [String],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteFilesResponse {
    success:       bool,
    #[serde(default)]
    deleted_count: u64,
}

/// HTTP 経由のメディアストレージ実装
#[derive(Clone)]
pub struct HttpMediaStorage {
    base_url: String,
    api_key:  String,
    client:   reqwest::Client,
}

impl HttpMediaStorage {
    /// `base_url` 例: `https://api.uploadthing.com`
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key:  api_key.into(),
            client:   reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MediaStorage for HttpMediaStorage {
    #[tracing::instrument(skip_all, level = "debug", fields(count = file_keys.len()))]
    async fn delete_files(&self, file_keys: &[String]) -> Result<u64, InfraError> {
        if file_keys.is_empty() {
            return Ok(0);
        }
        let url = format!("{}/v6/deleteFiles", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&DeleteFilesRequest { file_keys })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfraError::media_provider(format!(
                "deleteFiles returned {status}: {body}"
            )));
        }

        let body: DeleteFilesResponse = response.json().await?;
        if !body.success {
            return Err(InfraError::media_provider("deleteFiles reported failure"));
        }
        Ok(body.deleted_count)
    }
}
