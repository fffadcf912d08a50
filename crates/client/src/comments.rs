//! # コメントスレッドローダー
//!
//! 投稿のコメントを新しい方から 5 件ずつ取得し、
//! 「以前のコメントを表示」で古いページを先頭に追加していく。
//! スレッド内のコメントは常に作成日時の昇順で並ぶ。

use std::sync::Arc;

use conjob_domain::post::PostId;
use conjob_shared::{CommentDto, CommentPage};

use crate::{api::SocialApi, cache::QueryCache, error::ClientError, inflight::InFlight};

/// 取得済みのコメントスレッド
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentThread {
    pub comments:        Vec<CommentDto>,
    pub previous_cursor: Option<String>,
}

impl CommentThread {
    /// さらに古いコメントがあるか
    pub fn has_previous(&self) -> bool {
        self.previous_cursor.is_some()
    }

    fn prepend(&mut self, page: CommentPage<CommentDto>) {
        let mut comments = page.comments;
        comments.append(&mut self.comments);
        self.comments = comments;
        self.previous_cursor = page.previous_cursor;
    }
}

impl From<CommentPage<CommentDto>> for CommentThread {
    fn from(page: CommentPage<CommentDto>) -> Self {
        Self {
            comments:        page.comments,
            previous_cursor: page.previous_cursor,
        }
    }
}

/// 古いコメントの取得結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPrevious {
    Loaded { added: usize },
    NoMorePages,
    AlreadyLoading,
    NotLoaded,
}

/// コメントスレッドローダー
pub struct CommentThreadLoader<A> {
    api:       Arc<A>,
    cache:     Arc<QueryCache<PostId, CommentThread>>,
    in_flight: InFlight<PostId>,
}

impl<A: SocialApi> CommentThreadLoader<A> {
    pub fn new(api: Arc<A>, cache: Arc<QueryCache<PostId, CommentThread>>) -> Self {
        Self {
            api,
            cache,
            in_flight: InFlight::default(),
        }
    }

    pub fn thread(&self, post_id: &PostId) -> Option<CommentThread> {
        self.cache.get(post_id)
    }

    /// スレッドを開く。キャッシュがなければ最新のページを取得する
    #[tracing::instrument(skip_all, fields(%post_id))]
    pub async fn open(&self, post_id: PostId) -> Result<CommentThread, ClientError> {
        if let Some(thread) = self.cache.get(&post_id) {
            return Ok(thread);
        }
        let thread = CommentThread::from(self.api.fetch_comments(&post_id, None).await?);
        self.cache.set_confirmed(post_id, thread.clone());
        Ok(thread)
    }

    /// 古いコメントを 1 ページ取得して先頭に追加する
    #[tracing::instrument(skip_all, fields(%post_id))]
    pub async fn load_previous(&self, post_id: PostId) -> Result<LoadPrevious, ClientError> {
        let Some(thread) = self.cache.get(&post_id) else {
            return Ok(LoadPrevious::NotLoaded);
        };
        let Some(cursor) = thread.previous_cursor else {
            return Ok(LoadPrevious::NoMorePages);
        };
        let Some(_guard) = self.in_flight.try_acquire(post_id) else {
            return Ok(LoadPrevious::AlreadyLoading);
        };

        let page = self.api.fetch_comments(&post_id, Some(&cursor)).await?;
        let added = page.comments.len();

        let mut prepended = false;
        self.cache.update_confirmed(&post_id, |thread| {
            if thread.previous_cursor.as_deref() == Some(cursor.as_str()) {
                thread.prepend(page);
                prepended = true;
            }
        });

        Ok(if prepended {
            LoadPrevious::Loaded { added }
        } else {
            LoadPrevious::NotLoaded
        })
    }

    /// 自分が投稿したコメントを末尾に追加する
    pub fn push_local(&self, post_id: &PostId, comment: CommentDto) -> bool {
        self.cache
            .update_confirmed(post_id, |thread| thread.comments.push(comment))
    }
}
