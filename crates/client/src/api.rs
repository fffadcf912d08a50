//! # API クライアント
//!
//! サーバーの HTTP API を呼び出すクライアント。
//! ローダーやミューテーションは [`SocialApi`] トレイト経由で呼び出し、
//! テストではスタブに差し替える。
//!
//! ## 認証
//!
//! セッション ID を `auth_session` Cookie として送信する。
//!
//! ## エラー
//!
//! 非 2xx レスポンスは `{ error, status, detail }` 形式のボディから
//! `detail` を取り出し、ステータスに応じた [`ClientError`] に変換する。

use async_trait::async_trait;
use conjob_domain::{
    post::PostId,
    toggle::{BookmarkInfo, FollowerInfo},
    user::UserId,
};
use conjob_shared::{CommentDto, CommentPage, CursorPage, ErrorResponse, PostDto};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{config::ClientConfig, error::ClientError, feed::FeedKind};

/// セッション Cookie 名
const SESSION_COOKIE_NAME: &str = "auth_session";

/// リクエスト ID ヘッダー名
const REQUEST_ID_HEADER: &str = "x-request-id";

/// ソーシャル API トレイト
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// フィードの 1 ページを取得する
    async fn fetch_feed(
        &self,
        kind: FeedKind,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<CursorPage<PostDto>, ClientError>;

    /// コメントスレッドの 1 ページを取得する（`cursor` より古い方向）
    async fn fetch_comments(
        &self,
        post_id: &PostId,
        cursor: Option<&str>,
    ) -> Result<CommentPage<CommentDto>, ClientError>;

    async fn follower_info(&self, user_id: &UserId) -> Result<FollowerInfo, ClientError>;

    /// `follow` が `true` ならフォロー（POST）、`false` なら解除（DELETE）
    async fn set_following(&self, user_id: &UserId, follow: bool) -> Result<(), ClientError>;

    async fn bookmark_info(&self, post_id: &PostId) -> Result<BookmarkInfo, ClientError>;

    /// `bookmark` が `true` なら登録（POST）、`false` なら解除（DELETE）
    async fn set_bookmarked(&self, post_id: &PostId, bookmark: bool) -> Result<(), ClientError>;
}

/// HTTP 経由の SocialApi 実装
#[derive(Clone)]
pub struct HttpSocialApi {
    base_url:       String,
    session_cookie: Option<String>,
    client:         reqwest::Client,
}

impl HttpSocialApi {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            base_url:       config.base_url.trim_end_matches('/').to_string(),
            session_cookie: config.session_cookie,
            client:         reqwest::Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::now_v7().to_string());
        if let Some(session_id) = &self.session_cookie {
            builder = builder.header(
                reqwest::header::COOKIE,
                format!("{SESSION_COOKIE_NAME}={session_id}"),
            );
        }
        builder
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        let response = handle_response(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_toggle(&self, path: &str, activate: bool) -> Result<(), ClientError> {
        let method = if activate {
            Method::POST
        } else {
            Method::DELETE
        };
        let response = self.request(method, path).send().await?;
        handle_response(response).await?;
        Ok(())
    }
}

/// ステータスコードを検査し、エラーなら ClientError に変換する
async fn handle_response(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.detail)
        .unwrap_or(body);

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::BAD_REQUEST => ClientError::Validation(detail),
        StatusCode::NOT_FOUND => ClientError::NotFound(detail),
        s if s.is_server_error() => ClientError::Server(detail),
        s => ClientError::Unexpected(format!("{s}: {detail}")),
    })
}

#[async_trait]
impl SocialApi for HttpSocialApi {
    #[tracing::instrument(skip_all, level = "debug", fields(?kind, page_size))]
    async fn fetch_feed(
        &self,
        kind: FeedKind,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<CursorPage<PostDto>, ClientError> {
        let mut query = vec![("pageSize", page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get_json(kind.path(), &query).await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%post_id))]
    async fn fetch_comments(
        &self,
        post_id: &PostId,
        cursor: Option<&str>,
    ) -> Result<CommentPage<CommentDto>, ClientError> {
        let query: Vec<(&str, String)> = cursor
            .map(|c| ("cursor", c.to_string()))
            .into_iter()
            .collect();
        self.get_json(&format!("/api/posts/{post_id}/comments"), &query)
            .await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%user_id))]
    async fn follower_info(&self, user_id: &UserId) -> Result<FollowerInfo, ClientError> {
        self.get_json(&format!("/api/users/{user_id}/followers"), &[])
            .await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%user_id, follow))]
    async fn set_following(&self, user_id: &UserId, follow: bool) -> Result<(), ClientError> {
        self.send_toggle(&format!("/api/users/{user_id}/followers"), follow)
            .await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%post_id))]
    async fn bookmark_info(&self, post_id: &PostId) -> Result<BookmarkInfo, ClientError> {
        self.get_json(&format!("/api/posts/{post_id}/bookmark"), &[])
            .await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%post_id, bookmark))]
    async fn set_bookmarked(&self, post_id: &PostId, bookmark: bool) -> Result<(), ClientError> {
        self.send_toggle(&format!("/api/posts/{post_id}/bookmark"), bookmark)
            .await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use wiremock::{
        Mock,
        MockServer,
        ResponseTemplate,
        matchers::{header, header_exists, method, path, query_param},
    };

    use super::*;

    fn sut(server: &MockServer) -> HttpSocialApi {
        HttpSocialApi::new(ClientConfig::new(server.uri()).with_session("sess-1"))
    }

    #[tokio::test]
    async fn test_フィード取得はカーソルとページサイズとセッションcookieを送る() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/posts/following"))
            .and(query_param("cursor", "c1"))
            .and(query_param("pageSize", "5"))
            .and(header("cookie", "auth_session=sess-1"))
            .and(header_exists(REQUEST_ID_HEADER))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "items": [], "nextCursor": null })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let page = sut(&server)
            .fetch_feed(FeedKind::Following, Some("c1"), 5)
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_フォロー時はpostで解除時はdeleteを送る() {
        let server = MockServer::start().await;
        let user_id = UserId::new();
        let resource = format!("/api/users/{user_id}/followers");
        let body = serde_json::json!({ "followers": 1, "isFollowedByUser": true });
        Mock::given(method("POST"))
            .and(path(resource.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(resource.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;
        let sut = sut(&server);

        sut.set_following(&user_id, true).await.unwrap();
        sut.set_following(&user_id, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_フォロワー情報をデシリアライズできる() {
        let server = MockServer::start().await;
        let user_id = UserId::new();
        Mock::given(method("GET"))
            .and(path(format!("/api/users/{user_id}/followers")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "followers": 5, "isFollowedByUser": false })),
            )
            .mount(&server)
            .await;

        let info = sut(&server).follower_info(&user_id).await.unwrap();

        assert_eq!(
            info,
            FollowerInfo {
                followers:           5,
                is_followed_by_user: false,
            }
        );
    }

    #[rstest]
    #[case(401, ClientError::Unauthorized)]
    #[case(400, ClientError::Validation("bad cursor".to_string()))]
    #[case(404, ClientError::NotFound("bad cursor".to_string()))]
    #[case(500, ClientError::Server("bad cursor".to_string()))]
    #[tokio::test]
    async fn test_エラーステータスはclient_errorに変換される(
        #[case] status: u16,
        #[case] expected: ClientError,
    ) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "error": "Error",
                "status": status,
                "detail": "bad cursor",
            })))
            .mount(&server)
            .await;

        let err = sut(&server)
            .fetch_feed(FeedKind::ForYou, None, 10)
            .await
            .unwrap_err();

        assert_eq!(err, expected);
    }

    #[tokio::test]
    async fn test_接続できない場合はnetworkエラーになる() {
        let sut = HttpSocialApi::new(ClientConfig::new("http://127.0.0.1:1"));

        let err = sut.fetch_feed(FeedKind::ForYou, None, 10).await.unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
    }
}
