//! # API の JSON 型
//!
//! サーバーとクライアントで共有するリソース表現。
//! フィールド名はキャメルケースで送受信する。

use serde::{Deserialize, Serialize};

/// 投稿者などのユーザー概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id:           String,
    pub username:     String,
    pub display_name: String,
    pub avatar_url:   Option<String>,
}

/// 添付メディア
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDto {
    pub id:         String,
    pub url:        String,
    /// `"image"` または `"video"`
    pub media_type: String,
}

/// フィードに並ぶ投稿
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id:          String,
    pub content:     String,
    pub user:        UserDto,
    pub attachments: Vec<MediaDto>,
    /// RFC 3339
    pub created_at:  String,
}

/// コメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id:         String,
    pub post_id:    String,
    pub content:    String,
    pub user:       UserDto,
    pub created_at: String,
}

/// 投稿作成リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content:   String,
    #[serde(default)]
    pub media_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_投稿はキャメルケースでシリアライズされる() {
        let post = PostDto {
            id:          "p1".to_string(),
            content:     "hello".to_string(),
            user:        UserDto {
                id:           "u1".to_string(),
                username:     "alice".to_string(),
                display_name: "Alice".to_string(),
                avatar_url:   None,
            },
            attachments: vec![],
            created_at:  "2026-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&post).unwrap();

        assert_eq!(json["createdAt"], "2026-01-01T00:00:00Z");
        assert_eq!(json["user"]["displayName"], "Alice");
        assert_eq!(json["user"]["avatarUrl"], serde_json::Value::Null);
    }

    #[test]
    fn test_media_ids省略時は空配列になる() {
        let request: CreatePostRequest = serde_json::from_str(r#"{"content": "hi"}"#).unwrap();

        assert_eq!(request.media_ids, Vec::<String>::new());
    }
}
