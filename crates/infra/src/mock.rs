//! # テスト用モック
//!
//! ユースケース・ハンドラのテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすると他クレートからも利用できる。
//!
//! ```toml
//! [dev-dependencies]
//! conjob-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! ページングは [`conjob_domain::pagination`] のメモリ上実装を使い、
//! PostgreSQL 実装と同じ並び順・カーソル規則を再現する。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conjob_domain::{
    comment::Comment,
    media::{Media, MediaId},
    notification::{Notification, NotificationType},
    pagination::{
        Cursor,
        Order,
        Page,
        PageRequest,
        PageSize,
        Paginated,
        SortKey,
        paginate_backward,
        paginate_forward,
    },
    post::{NewPost, Post, PostId},
    toggle::{BookmarkInfo, FollowerInfo},
    user::{UserId, UserSummary},
};

use crate::{
    db::{TransactionManager, TxContext},
    error::InfraError,
    media_storage::MediaStorage,
    repository::{
        BookmarkRepository,
        CommentRepository,
        FollowRepository,
        MediaRepository,
        NotificationRepository,
        PostRepository,
        UserRepository,
    },
    session::{SessionData, SessionManager},
};

/// カーソルの要素を `items` から探してアンカーを決める
fn resolve_anchor<T: Paginated>(items: &[T], cursor: Option<Cursor>) -> Option<SortKey> {
    let cursor = cursor?;
    let stored = items
        .iter()
        .map(Paginated::sort_key)
        .find(|key| key.id == *cursor.as_uuid());
    cursor.anchor(stored)
}

// ===== MockTransactionManager =====

#[derive(Clone, Default)]
pub struct MockTransactionManager;

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<UserSummary>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: UserSummary) {
        self.users.lock().unwrap().push(user);
    }

    fn find(&self, id: &UserId) -> Option<UserSummary> {
        self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_summary(&self, id: &UserId) -> Result<Option<UserSummary>, InfraError> {
        Ok(self.find(id))
    }
}

// ===== MockFollowRepository =====

#[derive(Clone, Default)]
pub struct MockFollowRepository {
    /// (follower, following)
    follows: Arc<Mutex<Vec<(UserId, UserId)>>>,
}

impl MockFollowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_follow(&self, follower: UserId, following: UserId) {
        self.follows.lock().unwrap().push((follower, following));
    }

    pub fn following_of(&self, follower: &UserId) -> Vec<UserId> {
        self.follows
            .lock()
            .unwrap()
            .iter()
            .filter(|(f, _)| f == follower)
            .map(|(_, following)| *following)
            .collect()
    }
}

#[async_trait]
impl FollowRepository for MockFollowRepository {
    async fn follower_info(
        &self,
        user_id: &UserId,
        viewer: &UserId,
    ) -> Result<FollowerInfo, InfraError> {
        let follows = self.follows.lock().unwrap();
        let followers = follows.iter().filter(|(_, f)| f == user_id).count();
        Ok(FollowerInfo {
            followers:           u32::try_from(followers).unwrap_or(u32::MAX),
            is_followed_by_user: follows.iter().any(|(f, t)| f == viewer && t == user_id),
        })
    }

    async fn insert(
        &self,
        _tx: &mut TxContext,
        follower: &UserId,
        following: &UserId,
        _now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let mut follows = self.follows.lock().unwrap();
        if follows.iter().any(|(f, t)| f == follower && t == following) {
            return Ok(false);
        }
        follows.push((*follower, *following));
        Ok(true)
    }

    async fn delete(
        &self,
        _tx: &mut TxContext,
        follower: &UserId,
        following: &UserId,
    ) -> Result<bool, InfraError> {
        let mut follows = self.follows.lock().unwrap();
        let before = follows.len();
        follows.retain(|(f, t)| !(f == follower && t == following));
        Ok(follows.len() != before)
    }
}

// ===== MockPostRepository =====

/// 投稿のインメモリ実装
///
/// フォロー中フィードは共有した [`MockFollowRepository`] を参照する。
/// `insert` した投稿の投稿者は [`MockUserRepository`] から引く。
#[derive(Clone, Default)]
pub struct MockPostRepository {
    posts:   Arc<Mutex<Vec<Post>>>,
    follows: MockFollowRepository,
    users:   MockUserRepository,
}

impl MockPostRepository {
    pub fn new(follows: MockFollowRepository, users: MockUserRepository) -> Self {
        Self {
            posts: Arc::new(Mutex::new(Vec::new())),
            follows,
            users,
        }
    }

    pub fn add_post(&self, post: Post) {
        self.posts.lock().unwrap().push(post);
    }

    pub fn remove_post(&self, id: &PostId) {
        self.posts.lock().unwrap().retain(|p| p.id != *id);
    }

    pub fn count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

#[async_trait]
impl PostRepository for MockPostRepository {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, InfraError> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == *id).cloned())
    }

    async fn exists(&self, id: &PostId) -> Result<bool, InfraError> {
        Ok(self.posts.lock().unwrap().iter().any(|p| p.id == *id))
    }

    async fn find_for_you_page(&self, request: &PageRequest) -> Result<Page<Post>, InfraError> {
        let posts = self.posts.lock().unwrap();
        let anchor = resolve_anchor(&posts, request.cursor);
        Ok(paginate_forward(
            &posts,
            Order::NewestFirst,
            anchor.as_ref(),
            request.page_size,
        ))
    }

    async fn find_following_page(
        &self,
        viewer: &UserId,
        request: &PageRequest,
    ) -> Result<Page<Post>, InfraError> {
        let following = self.follows.following_of(viewer);
        let posts = self.posts.lock().unwrap();
        let anchor = resolve_anchor(&posts, request.cursor);
        let visible: Vec<Post> = posts
            .iter()
            .filter(|p| following.contains(&p.author.id))
            .cloned()
            .collect();
        Ok(paginate_forward(
            &visible,
            Order::NewestFirst,
            anchor.as_ref(),
            request.page_size,
        ))
    }

    async fn insert(&self, _tx: &mut TxContext, post: &NewPost) -> Result<(), InfraError> {
        let author = self
            .users
            .find(&post.author_id)
            .ok_or_else(|| InfraError::unexpected("author not registered in MockUserRepository"))?;
        self.add_post(Post {
            id: post.id,
            content: post.content.as_str().to_string(),
            author,
            attachments: Vec::new(),
            created_at: post.created_at,
        });
        Ok(())
    }
}

// ===== MockCommentRepository =====

#[derive(Clone, Default)]
pub struct MockCommentRepository {
    comments: Arc<Mutex<Vec<Comment>>>,
}

impl MockCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_comment(&self, comment: Comment) {
        self.comments.lock().unwrap().push(comment);
    }
}

#[async_trait]
impl CommentRepository for MockCommentRepository {
    async fn find_thread_page(
        &self,
        post_id: &PostId,
        cursor: Option<Cursor>,
    ) -> Result<Page<Comment>, InfraError> {
        let thread: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == *post_id)
            .cloned()
            .collect();
        let anchor = resolve_anchor(&thread, cursor);
        Ok(paginate_backward(
            &thread,
            anchor.as_ref(),
            PageSize::COMMENT_THREAD,
        ))
    }
}

// ===== MockBookmarkRepository =====

#[derive(Clone, Default)]
pub struct MockBookmarkRepository {
    bookmarks: Arc<Mutex<Vec<(UserId, PostId)>>>,
}

impl MockBookmarkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bookmark(&self, user_id: UserId, post_id: PostId) {
        self.bookmarks.lock().unwrap().push((user_id, post_id));
    }
}

#[async_trait]
impl BookmarkRepository for MockBookmarkRepository {
    async fn bookmark_info(
        &self,
        user_id: &UserId,
        post_id: &PostId,
    ) -> Result<BookmarkInfo, InfraError> {
        Ok(BookmarkInfo {
            is_bookmarked_by_user: self
                .bookmarks
                .lock()
                .unwrap()
                .iter()
                .any(|(u, p)| u == user_id && p == post_id),
        })
    }

    async fn insert(
        &self,
        _tx: &mut TxContext,
        user_id: &UserId,
        post_id: &PostId,
        _now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let mut bookmarks = self.bookmarks.lock().unwrap();
        if bookmarks.iter().any(|(u, p)| u == user_id && p == post_id) {
            return Ok(false);
        }
        bookmarks.push((*user_id, *post_id));
        Ok(true)
    }

    async fn delete(
        &self,
        _tx: &mut TxContext,
        user_id: &UserId,
        post_id: &PostId,
    ) -> Result<bool, InfraError> {
        let mut bookmarks = self.bookmarks.lock().unwrap();
        let before = bookmarks.len();
        bookmarks.retain(|(u, p)| !(u == user_id && p == post_id));
        Ok(bookmarks.len() != before)
    }
}

// ===== MockNotificationRepository =====

#[derive(Clone, Default)]
pub struct MockNotificationRepository {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_notification(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }

    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationRepository for MockNotificationRepository {
    async fn insert(
        &self,
        _tx: &mut TxContext,
        notification: &Notification,
    ) -> Result<(), InfraError> {
        self.add_notification(notification.clone());
        Ok(())
    }

    async fn delete_follow(
        &self,
        _tx: &mut TxContext,
        recipient: &UserId,
        issuer: &UserId,
    ) -> Result<u64, InfraError> {
        let mut notifications = self.notifications.lock().unwrap();
        let before = notifications.len();
        notifications.retain(|n| {
            !(n.recipient_id == *recipient
                && n.issuer_id == *issuer
                && n.kind == NotificationType::Follow)
        });
        Ok((before - notifications.len()) as u64)
    }

    async fn mark_all_read(
        &self,
        _tx: &mut TxContext,
        recipient: &UserId,
    ) -> Result<u64, InfraError> {
        let mut updated = 0;
        for n in self
            .notifications
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|n| n.recipient_id == *recipient && !n.read)
        {
            n.read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

// ===== MockMediaRepository =====

#[derive(Clone, Default)]
pub struct MockMediaRepository {
    media: Arc<Mutex<Vec<Media>>>,
}

impl MockMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_media(&self, media: Media) {
        self.media.lock().unwrap().push(media);
    }

    pub fn all(&self) -> Vec<Media> {
        self.media.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaRepository for MockMediaRepository {
    async fn attach_to_post(
        &self,
        _tx: &mut TxContext,
        post_id: &PostId,
        media_ids: &[MediaId],
    ) -> Result<u64, InfraError> {
        let mut attached = 0;
        for m in self
            .media
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|m| media_ids.contains(&m.id) && m.post_id.is_none())
        {
            m.post_id = Some(*post_id);
            attached += 1;
        }
        Ok(attached)
    }

    async fn find_orphans(
        &self,
        created_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Media>, InfraError> {
        Ok(self
            .media
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.is_orphan() && created_before.is_none_or(|c| m.created_at <= c))
            .cloned()
            .collect())
    }

    async fn delete_by_ids(
        &self,
        _tx: &mut TxContext,
        ids: &[MediaId],
    ) -> Result<u64, InfraError> {
        let mut media = self.media.lock().unwrap();
        let before = media.len();
        media.retain(|m| !ids.contains(&m.id));
        Ok((before - media.len()) as u64)
    }
}

// ===== MockMediaStorage =====

/// 削除要求を記録するメディアストレージ
///
/// `failing()` で作ると常にエラーを返す。
#[derive(Clone, Default)]
pub struct MockMediaStorage {
    deleted: Arc<Mutex<Vec<String>>>,
    fail:    bool,
}

impl MockMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            deleted: Arc::default(),
            fail:    true,
        }
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStorage for MockMediaStorage {
    async fn delete_files(&self, file_keys: &[String]) -> Result<u64, InfraError> {
        if self.fail {
            return Err(InfraError::media_provider("mock provider failure"));
        }
        self.deleted.lock().unwrap().extend_from_slice(file_keys);
        Ok(file_keys.len() as u64)
    }
}

// ===== MockSessionManager =====

#[derive(Clone, Default)]
pub struct MockSessionManager {
    sessions: Arc<Mutex<HashMap<String, SessionData>>>,
}

impl MockSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既知の ID でセッションを登録する
    pub fn insert(&self, session_id: impl Into<String>, data: SessionData) {
        self.sessions.lock().unwrap().insert(session_id.into(), data);
    }
}

#[async_trait]
impl SessionManager for MockSessionManager {
    async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        self.insert(session_id.clone(), data.clone());
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), InfraError> {
        Ok(())
    }
}
