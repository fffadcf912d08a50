//! # フィードローダー
//!
//! 「おすすめ」と「フォロー中」の 2 つのフィードについて、
//! 取得済みページをキャッシュに蓄積しながら無限スクロールを実現する。
//!
//! - フィードごとにキャッシュのキーが分かれ、カーソルやページが混ざることはない
//! - 初回取得は [`PAGE_SIZE_FIRST_LOAD`] 件、以降は [`PAGE_SIZE_AFTER_CACHE`] 件
//! - キャッシュがあれば `open` は再取得せずにキャッシュを返す
//! - `load_more` はフィードごとに同時に 1 つまで。次ページがなければ何もしない
//! - 初回・追加のどちらの取得に失敗しても状態は `Failed` になる

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use conjob_shared::{CursorPage, PostDto};

use crate::{
    api::SocialApi,
    cache::QueryCache,
    error::LOAD_FAILED_MESSAGE,
    inflight::InFlight,
};

/// 初回取得のページサイズ
pub const PAGE_SIZE_FIRST_LOAD: u32 = 10;

/// キャッシュ済みフィードの追加取得のページサイズ
pub const PAGE_SIZE_AFTER_CACHE: u32 = 5;

/// フィードの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// 全投稿
    ForYou,
    /// フォロー中のユーザーの投稿
    Following,
}

impl FeedKind {
    pub fn path(self) -> &'static str {
        match self {
            Self::ForYou => "/api/posts/for-you",
            Self::Following => "/api/posts/following",
        }
    }
}

/// 取得済みページの蓄積
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPages {
    pages: Vec<CursorPage<PostDto>>,
}

impl FeedPages {
    pub fn posts(&self) -> impl Iterator<Item = &PostDto> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    /// 最後に取得したページの次カーソル
    pub fn next_cursor(&self) -> Option<&str> {
        self.pages.last().and_then(|p| p.next_cursor.as_deref())
    }

    pub fn has_next(&self) -> bool {
        self.next_cursor().is_some()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn view(&self) -> FeedView {
        FeedView {
            posts:    self.posts().cloned().collect(),
            has_next: self.has_next(),
        }
    }
}

/// 画面に渡すフィードの内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    pub posts:    Vec<PostDto>,
    pub has_next: bool,
}

impl FeedView {
    /// 投稿がなく次ページもない（空のフィード）
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && !self.has_next
    }
}

/// フィードの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Pending,
    Ready(FeedView),
    Failed(String),
}

/// 追加取得の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMore {
    /// ページを追加した
    Loaded { added: usize },
    /// 次ページが存在しない
    NoMorePages,
    /// 同じフィードの取得が実行中
    AlreadyLoading,
    /// まだ初回取得していない
    NotLoaded,
    Failed(String),
}

/// フィードローダー
pub struct FeedLoader<A> {
    api:       Arc<A>,
    cache:     Arc<QueryCache<FeedKind, FeedPages>>,
    in_flight: InFlight<FeedKind>,
    failures:  Mutex<HashMap<FeedKind, String>>,
}

impl<A: SocialApi> FeedLoader<A> {
    pub fn new(api: Arc<A>, cache: Arc<QueryCache<FeedKind, FeedPages>>) -> Self {
        Self {
            api,
            cache,
            in_flight: InFlight::default(),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// 現在の状態
    ///
    /// 最後の取得（初回・追加とも）が失敗していれば、取得済みページがあっても `Failed`。
    pub fn status(&self, kind: FeedKind) -> FeedStatus {
        if let Some(message) = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
        {
            return FeedStatus::Failed(message.clone());
        }
        match self.cache.get(&kind) {
            Some(pages) => FeedStatus::Ready(pages.view()),
            None => FeedStatus::Pending,
        }
    }

    /// フィードを開く
    ///
    /// キャッシュがあれば再取得せずに現在の状態を返し、なければ初回ページを取得する。
    /// 同じフィードの取得が実行中なら `Pending` を返す。
    #[tracing::instrument(skip_all, fields(?kind))]
    pub async fn open(&self, kind: FeedKind) -> FeedStatus {
        if let Some(pages) = self.cache.get(&kind) {
            tracing::debug!(pages = pages.page_count(), "キャッシュ済みのフィードを使用");
            return self.status(kind);
        }
        let Some(_guard) = self.in_flight.try_acquire(kind) else {
            return FeedStatus::Pending;
        };

        match self.api.fetch_feed(kind, None, PAGE_SIZE_FIRST_LOAD).await {
            Ok(page) => {
                self.clear_failure(kind);
                let pages = FeedPages { pages: vec![page] };
                let view = pages.view();
                self.cache.set_confirmed(kind, pages);
                FeedStatus::Ready(view)
            }
            Err(e) => {
                tracing::warn!(error = %e, "フィードの取得に失敗");
                self.record_failure(kind);
                FeedStatus::Failed(LOAD_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// 次のページを取得して末尾に追加する
    #[tracing::instrument(skip_all, fields(?kind))]
    pub async fn load_more(&self, kind: FeedKind) -> LoadMore {
        let Some(pages) = self.cache.get(&kind) else {
            return LoadMore::NotLoaded;
        };
        let Some(cursor) = pages.next_cursor().map(str::to_string) else {
            return LoadMore::NoMorePages;
        };
        let Some(_guard) = self.in_flight.try_acquire(kind) else {
            tracing::debug!("取得中のため追加取得をスキップ");
            return LoadMore::AlreadyLoading;
        };

        let page = match self
            .api
            .fetch_feed(kind, Some(&cursor), PAGE_SIZE_AFTER_CACHE)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, "フィードの追加取得に失敗");
                self.record_failure(kind);
                return LoadMore::Failed(LOAD_FAILED_MESSAGE.to_string());
            }
        };
        self.clear_failure(kind);

        let added = page.items.len();
        let mut appended = false;
        self.cache.update_confirmed(&kind, |pages| {
            // 取得中にキャッシュが置き換えられていたら捨てる
            if pages.next_cursor() == Some(cursor.as_str()) {
                pages.pages.push(page);
                appended = true;
            }
        });

        if appended {
            LoadMore::Loaded { added }
        } else {
            LoadMore::NotLoaded
        }
    }

    /// フィードのキャッシュを破棄する（次の `open` で再取得される）
    pub fn invalidate(&self, kind: FeedKind) {
        self.cache.remove(&kind);
        self.clear_failure(kind);
    }

    fn record_failure(&self, kind: FeedKind) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, LOAD_FAILED_MESSAGE.to_string());
    }

    fn clear_failure(&self, kind: FeedKind) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind);
    }
}
