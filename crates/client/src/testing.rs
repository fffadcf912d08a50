//! テスト用のスタブ API と通知先

use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use conjob_domain::{
    post::PostId,
    toggle::{BookmarkInfo, FollowerInfo},
    user::UserId,
};
use conjob_shared::{CommentDto, CommentPage, CursorPage, PostDto, UserDto};
use tokio::sync::oneshot;

use crate::{api::SocialApi, error::ClientError, feed::FeedKind, toggle::Notifier};

fn locked<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn user_dto() -> UserDto {
    UserDto {
        id:           UserId::new().to_string(),
        username:     "alice".to_string(),
        display_name: "Alice".to_string(),
        avatar_url:   None,
    }
}

pub(crate) fn post_dto(id: &str) -> PostDto {
    PostDto {
        id:          id.to_string(),
        content:     format!("post {id}"),
        user:        user_dto(),
        attachments: Vec::new(),
        created_at:  "2026-01-01T00:00:00Z".to_string(),
    }
}

pub(crate) fn feed_page(ids: &[&str], next_cursor: Option<&str>) -> CursorPage<PostDto> {
    CursorPage {
        items:       ids.iter().map(|id| post_dto(id)).collect(),
        next_cursor: next_cursor.map(str::to_string),
    }
}

pub(crate) fn comment_dto(id: &str) -> CommentDto {
    CommentDto {
        id:         id.to_string(),
        post_id:    PostId::new().to_string(),
        content:    format!("comment {id}"),
        user:       user_dto(),
        created_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

pub(crate) fn comment_page(ids: &[&str], previous_cursor: Option<&str>) -> CommentPage<CommentDto> {
    CommentPage {
        comments:        ids.iter().map(|id| comment_dto(id)).collect(),
        previous_cursor: previous_cursor.map(str::to_string),
    }
}

/// 記録付きのスタブ API
///
/// 応答はキューに積んだ順に返す。
#[derive(Default)]
pub(crate) struct StubApi {
    feed_responses:    Mutex<VecDeque<Result<CursorPage<PostDto>, ClientError>>>,
    feed_calls:        Mutex<Vec<(FeedKind, Option<String>, u32)>>,
    comment_responses: Mutex<VecDeque<Result<CommentPage<CommentDto>, ClientError>>>,
    comment_calls:     Mutex<Vec<Option<String>>>,
    follower_info:     Mutex<Option<FollowerInfo>>,
    bookmark_info:     Mutex<Option<BookmarkInfo>>,
    info_calls:        Mutex<usize>,
    toggle_responses:  Mutex<VecDeque<Result<(), ClientError>>>,
    toggle_calls:      Mutex<Vec<bool>>,
    gate:              Mutex<Option<oneshot::Receiver<()>>>,
}

impl StubApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_feed(&self, response: Result<CursorPage<PostDto>, ClientError>) {
        locked(&self.feed_responses).push_back(response);
    }

    pub(crate) fn push_comments(&self, response: Result<CommentPage<CommentDto>, ClientError>) {
        locked(&self.comment_responses).push_back(response);
    }

    pub(crate) fn push_toggle(&self, response: Result<(), ClientError>) {
        locked(&self.toggle_responses).push_back(response);
    }

    pub(crate) fn set_follower_info(&self, info: FollowerInfo) {
        *locked(&self.follower_info) = Some(info);
    }

    pub(crate) fn set_bookmark_info(&self, info: BookmarkInfo) {
        *locked(&self.bookmark_info) = Some(info);
    }

    /// 次の API 呼び出しを `release` の送信まで待たせる
    pub(crate) fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *locked(&self.gate) = Some(rx);
        tx
    }

    pub(crate) fn feed_calls(&self) -> Vec<(FeedKind, Option<String>, u32)> {
        locked(&self.feed_calls).clone()
    }

    pub(crate) fn comment_calls(&self) -> Vec<Option<String>> {
        locked(&self.comment_calls).clone()
    }

    pub(crate) fn toggle_calls(&self) -> Vec<bool> {
        locked(&self.toggle_calls).clone()
    }

    pub(crate) fn info_calls(&self) -> usize {
        *locked(&self.info_calls)
    }

    async fn wait_gate(&self) {
        let gate = locked(&self.gate).take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }
}

#[async_trait]
impl SocialApi for StubApi {
    async fn fetch_feed(
        &self,
        kind: FeedKind,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<CursorPage<PostDto>, ClientError> {
        locked(&self.feed_calls).push((kind, cursor.map(str::to_string), page_size));
        self.wait_gate().await;
        locked(&self.feed_responses)
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Unexpected("no stubbed feed".to_string())))
    }

    async fn fetch_comments(
        &self,
        _post_id: &PostId,
        cursor: Option<&str>,
    ) -> Result<CommentPage<CommentDto>, ClientError> {
        locked(&self.comment_calls).push(cursor.map(str::to_string));
        self.wait_gate().await;
        locked(&self.comment_responses)
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Unexpected("no stubbed comments".to_string())))
    }

    async fn follower_info(&self, _user_id: &UserId) -> Result<FollowerInfo, ClientError> {
        *locked(&self.info_calls) += 1;
        self.wait_gate().await;
        (*locked(&self.follower_info)).ok_or_else(|| ClientError::NotFound("user".to_string()))
    }

    async fn set_following(&self, _user_id: &UserId, follow: bool) -> Result<(), ClientError> {
        locked(&self.toggle_calls).push(follow);
        self.wait_gate().await;
        locked(&self.toggle_responses).pop_front().unwrap_or(Ok(()))
    }

    async fn bookmark_info(&self, _post_id: &PostId) -> Result<BookmarkInfo, ClientError> {
        *locked(&self.info_calls) += 1;
        self.wait_gate().await;
        (*locked(&self.bookmark_info)).ok_or_else(|| ClientError::NotFound("post".to_string()))
    }

    async fn set_bookmarked(&self, _post_id: &PostId, bookmark: bool) -> Result<(), ClientError> {
        locked(&self.toggle_calls).push(bookmark);
        self.wait_gate().await;
        locked(&self.toggle_responses).pop_front().unwrap_or(Ok(()))
    }
}

/// 通知内容を記録する通知先
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    infos:  Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn infos(&self) -> Vec<String> {
        locked(&self.infos).clone()
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        locked(&self.errors).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        locked(&self.infos).push(message.to_string());
    }

    fn error(&self, message: &str) {
        locked(&self.errors).push(message.to_string());
    }
}
