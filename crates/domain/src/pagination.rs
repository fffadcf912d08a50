//! # カーソルページネーション
//!
//! フィードとコメントスレッドで共有するページング規則を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Cursor`] | カーソル | 直前のページの境界にある要素の ID |
//! | [`SortKey`] | 並び順キー | `(created_at, id)` の全順序 |
//! | [`PageSize`] | ページサイズ | 1 以上、サーバー上限以下 |
//! | [`Page`] | ページ | 要素と次（前）カーソル |
//!
//! ## アルゴリズム
//!
//! 1. カーソルが指す要素の並び順キーを「アンカー」とする
//! 2. アンカーより厳密に後ろの要素を `page_size + 1` 件取得する
//! 3. `page_size + 1` 件返ってきたら続きがある。余分な 1 件を捨て、
//!    最後に返す要素の ID を次カーソルにする
//!
//! カーソルは排他的で、同じカーソルを渡せば常に同じ位置から再開する。
//!
//! ## 削除済みカーソル
//!
//! ID は UUID v7 なので、カーソルの要素が削除されていても
//! ID に埋め込まれた作成時刻からアンカーを復元できる（[`Cursor::anchor`]）。
//! 復元できない ID は先頭からの取得として扱う。

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

/// サーバーのページサイズ既定値
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// サーバーのページサイズ上限の既定値
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 50;

/// コメントスレッドの 1 ページの件数（固定）
pub const COMMENT_PAGE_SIZE: u32 = 5;

/// 並び順キー
///
/// 作成日時で並べ、同時刻は ID で決着させる全順序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SortKey {
    pub created_at: DateTime<Utc>,
    pub id:         Uuid,
}

impl SortKey {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }
}

/// ページングの対象になる要素
pub trait Paginated {
    fn sort_key(&self) -> SortKey;

    /// この要素の直後から再開するカーソル
    fn cursor(&self) -> Cursor {
        Cursor(self.sort_key().id)
    }
}

/// ページングカーソル
///
/// JSON 上は要素 ID の文字列として表現される。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct Cursor(Uuid);

impl Cursor {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// クエリパラメータからカーソルを読み取る
    ///
    /// 未指定と空文字列は「先頭から」を意味する。
    /// UUID として解釈できない値は補正せずに拒否する。
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, DomainError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Uuid::parse_str(value)
                .map(|uuid| Some(Self(uuid)))
                .map_err(|_| DomainError::Validation(format!("Invalid cursor: {value}"))),
        }
    }

    /// UUID v7 に埋め込まれた作成時刻から並び順キーを推定する
    ///
    /// v7 以外の UUID では `None`。
    pub fn implied_sort_key(&self) -> Option<SortKey> {
        if self.0.get_version() != Some(uuid::Version::SortRand) {
            return None;
        }
        let (secs, nanos) = self.0.get_timestamp()?.to_unix();
        let created_at = DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos)?;
        Some(SortKey::new(created_at, self.0))
    }

    /// 再開位置のアンカーを決める
    ///
    /// `stored` はカーソルの要素をストアで引いた結果。
    /// 見つからなければ ID の時刻から推定し、それも無理なら先頭から（`None`）。
    pub fn anchor(&self, stored: Option<SortKey>) -> Option<SortKey> {
        stored.or_else(|| self.implied_sort_key())
    }
}

/// 作成日時を ID に埋め込める精度（ミリ秒）に切り捨てる
///
/// 保存する `created_at` をこの値にそろえておけば、
/// [`Cursor::implied_sort_key`] の推定値がストアの並び順キーと一致する。
pub fn truncate_to_id_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

/// `created_at` を作成時刻として埋め込んだ UUID v7 を生成する
pub fn v7_id_at(created_at: DateTime<Utc>) -> Uuid {
    let secs = u64::try_from(created_at.timestamp()).unwrap_or_default();
    let nanos = created_at.timestamp_subsec_millis() * 1_000_000;
    Uuid::new_v7(uuid::Timestamp::from_unix(uuid::NoContext, secs, nanos))
}

/// ページサイズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(u32);

impl PageSize {
    /// コメントスレッドの固定ページサイズ
    pub const COMMENT_THREAD: Self = Self(COMMENT_PAGE_SIZE);

    /// 1 以上 `max` 以下であることを検証する
    pub fn new(value: i64, max: u32) -> Result<Self, DomainError> {
        match u32::try_from(value) {
            Ok(size) if (1..=max).contains(&size) => Ok(Self(size)),
            _ => Err(DomainError::Validation(format!(
                "pageSize must be between 1 and {max}, got {value}"
            ))),
        }
    }

    /// クエリパラメータからページサイズを読み取る
    ///
    /// 未指定・空文字列は `default`。数値でない値は拒否する。
    pub fn parse(raw: Option<&str>, default: u32, max: u32) -> Result<Self, DomainError> {
        match raw.map(str::trim) {
            None | Some("") => Self::new(i64::from(default), max),
            Some(value) => {
                let parsed = value.parse::<i64>().map_err(|_| {
                    DomainError::Validation(format!("pageSize must be an integer, got {value}"))
                })?;
                Self::new(parsed, max)
            }
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// 続きの有無を判定するため 1 件多く取得する件数
    pub fn fetch_limit(self) -> i64 {
        i64::from(self.0) + 1
    }
}

/// ページ取得リクエスト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor:    Option<Cursor>,
    pub page_size: PageSize,
}

impl PageRequest {
    pub fn new(cursor: Option<Cursor>, page_size: PageSize) -> Self {
        Self { cursor, page_size }
    }

    /// クエリパラメータ（`cursor`, `pageSize`）から組み立てる
    pub fn from_query(
        cursor: Option<&str>,
        page_size: Option<&str>,
        max_page_size: u32,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            cursor:    Cursor::parse(cursor)?,
            page_size: PageSize::parse(page_size, DEFAULT_PAGE_SIZE, max_page_size)?,
        })
    }
}

/// 走査順
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// 新しい順（フィード）
    NewestFirst,
    /// 古い順
    OldestFirst,
}

impl Order {
    /// 走査順における比較
    pub fn compare(self, a: &SortKey, b: &SortKey) -> Ordering {
        match self {
            Self::NewestFirst => b.cmp(a),
            Self::OldestFirst => a.cmp(b),
        }
    }

    /// `key` が `anchor` より走査順で厳密に後ろにあるか
    pub fn is_after(self, key: &SortKey, anchor: &SortKey) -> bool {
        self.compare(key, anchor) == Ordering::Greater
    }
}

/// 1 ページ分の結果
///
/// フィードは `next_cursor`、コメントスレッドは `previous_cursor` を使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items:           Vec<T>,
    pub next_cursor:     Option<Cursor>,
    pub previous_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items:           Vec::new(),
            next_cursor:     None,
            previous_cursor: None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items:           self.items.into_iter().map(f).collect(),
            next_cursor:     self.next_cursor,
            previous_cursor: self.previous_cursor,
        }
    }
}

impl<T: Paginated> Page<T> {
    /// 前方向の取得結果（走査順、最大 `page_size + 1` 件）からページを作る
    pub fn from_forward_fetch(mut rows: Vec<T>, page_size: PageSize) -> Self {
        let size = page_size.get() as usize;
        let next_cursor = if rows.len() > size {
            rows.truncate(size);
            rows.last().map(Paginated::cursor)
        } else {
            None
        };

        Self {
            items: rows,
            next_cursor,
            previous_cursor: None,
        }
    }

    /// 後方向の取得結果からページを作る
    ///
    /// `rows` はアンカーより古い要素を新しい順に最大 `page_size + 1` 件並べたもの。
    /// 返すページは古い順に並び、さらに古い要素があれば
    /// 最も古い返却要素を `previous_cursor` にする。
    pub fn from_backward_fetch(mut rows: Vec<T>, page_size: PageSize) -> Self {
        let size = page_size.get() as usize;
        let previous_cursor = if rows.len() > size {
            rows.truncate(size);
            rows.last().map(Paginated::cursor)
        } else {
            None
        };
        rows.reverse();

        Self {
            items: rows,
            next_cursor: None,
            previous_cursor,
        }
    }
}

/// メモリ上の要素列に前方向ページングを適用する
///
/// ストアを持たない実装（インメモリのモックなど）で SQL と同じ規則を再現する。
pub fn paginate_forward<T: Paginated + Clone>(
    items: &[T],
    order: Order,
    anchor: Option<&SortKey>,
    page_size: PageSize,
) -> Page<T> {
    let mut sorted: Vec<&T> = items
        .iter()
        .filter(|item| anchor.is_none_or(|a| order.is_after(&item.sort_key(), a)))
        .collect();
    sorted.sort_by(|a, b| order.compare(&a.sort_key(), &b.sort_key()));

    let rows = sorted
        .into_iter()
        .take(page_size.fetch_limit() as usize)
        .cloned()
        .collect();
    Page::from_forward_fetch(rows, page_size)
}

/// メモリ上の要素列に後方向ページングを適用する
pub fn paginate_backward<T: Paginated + Clone>(
    items: &[T],
    anchor: Option<&SortKey>,
    page_size: PageSize,
) -> Page<T> {
    let mut older: Vec<&T> = items
        .iter()
        .filter(|item| anchor.is_none_or(|a| item.sort_key() < *a))
        .collect();
    older.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));

    let rows = older
        .into_iter()
        .take(page_size.fetch_limit() as usize)
        .cloned()
        .collect();
    Page::from_backward_fetch(rows, page_size)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use uuid::{NoContext, Timestamp};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        name: String,
        key:  SortKey,
    }

    impl Paginated for Item {
        fn sort_key(&self) -> SortKey {
            self.key
        }
    }

    /// `offset_secs` 秒後に作成された要素（ID は同時刻の UUID v7）
    fn item(name: &str, offset_secs: u64) -> Item {
        let secs = 1_760_000_000 + offset_secs;
        let id = Uuid::new_v7(Timestamp::from_unix(NoContext, secs, 0));
        let created_at = DateTime::from_timestamp(secs as i64, 0).unwrap();
        Item {
            name: name.to_string(),
            key:  SortKey::new(created_at, id),
        }
    }

    fn names(page: &Page<Item>) -> Vec<&str> {
        page.items.iter().map(|i| i.name.as_str()).collect()
    }

    fn size(n: u32) -> PageSize {
        PageSize::new(i64::from(n), DEFAULT_MAX_PAGE_SIZE).unwrap()
    }

    /// 古い順に A..E
    #[fixture]
    fn a_to_e() -> Vec<Item> {
        ["A", "B", "C", "D", "E"]
            .iter()
            .zip(0..)
            .map(|(name, offset)| item(name, offset))
            .collect()
    }

    fn anchor_of(items: &[Item], cursor: Option<Cursor>) -> Option<SortKey> {
        let cursor = cursor?;
        let stored = items
            .iter()
            .find(|i| i.key.id == *cursor.as_uuid())
            .map(|i| i.key);
        cursor.anchor(stored)
    }

    #[rstest]
    fn test_古い順に2件ずつ辿ると3ページに分かれる(a_to_e: Vec<Item>) {
        let first = paginate_forward(&a_to_e, Order::OldestFirst, None, size(2));
        assert_eq!(names(&first), vec!["A", "B"]);
        assert_eq!(first.next_cursor, Some(a_to_e[1].cursor()));

        let anchor = anchor_of(&a_to_e, first.next_cursor);
        let second = paginate_forward(&a_to_e, Order::OldestFirst, anchor.as_ref(), size(2));
        assert_eq!(names(&second), vec!["C", "D"]);
        assert_eq!(second.next_cursor, Some(a_to_e[3].cursor()));

        let anchor = anchor_of(&a_to_e, second.next_cursor);
        let third = paginate_forward(&a_to_e, Order::OldestFirst, anchor.as_ref(), size(2));
        assert_eq!(names(&third), vec!["E"]);
        assert_eq!(third.next_cursor, None);
    }

    #[rstest]
    fn test_新しい順のフィードは最新から返る(a_to_e: Vec<Item>) {
        let first = paginate_forward(&a_to_e, Order::NewestFirst, None, size(2));

        assert_eq!(names(&first), vec!["E", "D"]);
        assert_eq!(first.next_cursor, Some(a_to_e[3].cursor()));
    }

    #[rstest]
    #[case(0, 3)]
    #[case(1, 3)]
    #[case(7, 1)]
    #[case(9, 3)]
    #[case(10, 5)]
    #[case(11, 10)]
    #[case(12, 50)]
    fn test_カーソルを最後まで辿ると全要素を重複なく順番通りに得られる(
        #[case] count: u64,
        #[case] page_size: u32,
        #[values(Order::NewestFirst, Order::OldestFirst)] order: Order,
    ) {
        let items: Vec<Item> = (0..count).map(|i| item(&format!("item-{i}"), i)).collect();
        let mut expected = items.clone();
        expected.sort_by(|a, b| order.compare(&a.key, &b.key));

        let mut collected = Vec::new();
        let mut cursor = None;
        loop {
            let anchor = anchor_of(&items, cursor);
            let page = paginate_forward(&items, order, anchor.as_ref(), size(page_size));
            assert!(page.items.len() <= page_size as usize);
            collected.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(collected, expected);
    }

    #[rstest]
    fn test_最後の要素をカーソルにすると空ページが返る(a_to_e: Vec<Item>) {
        let anchor = anchor_of(&a_to_e, Some(a_to_e[4].cursor()));

        let page = paginate_forward(&a_to_e, Order::OldestFirst, anchor.as_ref(), size(2));

        assert_eq!(page, Page::empty());
    }

    #[rstest]
    fn test_要素がちょうどページサイズ分なら次カーソルはない(a_to_e: Vec<Item>) {
        let page = paginate_forward(&a_to_e, Order::OldestFirst, None, size(5));

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.next_cursor, None);
    }

    #[rstest]
    fn test_削除済み要素のカーソルは直後の生存要素から再開する(a_to_e: Vec<Item>) {
        let deleted = a_to_e[2].cursor();
        let survivors: Vec<Item> = a_to_e.iter().filter(|i| i.name != "C").cloned().collect();

        let anchor = anchor_of(&survivors, Some(deleted));
        let page = paginate_forward(&survivors, Order::OldestFirst, anchor.as_ref(), size(2));

        assert_eq!(names(&page), vec!["D", "E"]);
    }

    #[test]
    fn test_同じミリ秒に作られた削除済み要素のカーソルでも生存要素を飛ばさない() {
        let base = DateTime::from_timestamp(1_760_000_000, 0).unwrap();
        let stamped = |name: &str, micros: i64| {
            let created_at =
                truncate_to_id_precision(base + chrono::Duration::microseconds(micros));
            Item {
                name: name.to_string(),
                key:  SortKey::new(created_at, v7_id_at(created_at)),
            }
        };
        let older = stamped("older", 0);
        let mut same_millis = [stamped("q", 1_200), stamped("d", 1_700)];
        same_millis.sort_by_key(|i| i.key);
        let [kept, deleted] = same_millis;
        let survivors = vec![older.clone(), kept.clone(), stamped("newer", 5_000)];

        let anchor = anchor_of(&survivors, Some(deleted.cursor()));
        let page = paginate_forward(&survivors, Order::NewestFirst, anchor.as_ref(), size(2));

        assert_eq!(anchor, Some(deleted.key));
        assert_eq!(page.items, vec![kept, older]);
    }

    #[rstest]
    fn test_v7でない未知のカーソルは先頭から取得する(a_to_e: Vec<Item>) {
        let unknown = Cursor::from_uuid(Uuid::new_v4());

        let anchor = anchor_of(&a_to_e, Some(unknown));
        let page = paginate_forward(&a_to_e, Order::NewestFirst, anchor.as_ref(), size(2));

        assert_eq!(anchor, None);
        assert_eq!(names(&page), vec!["E", "D"]);
    }

    #[test]
    fn test_コメントスレッドは古いページを昇順で遡る() {
        let comments: Vec<Item> = (0..12).map(|i| item(&format!("c{i}"), i)).collect();

        let latest = paginate_backward(&comments, None, PageSize::COMMENT_THREAD);
        assert_eq!(names(&latest), vec!["c7", "c8", "c9", "c10", "c11"]);
        assert_eq!(latest.previous_cursor, Some(comments[7].cursor()));
        assert_eq!(latest.next_cursor, None);

        let anchor = anchor_of(&comments, latest.previous_cursor);
        let older = paginate_backward(&comments, anchor.as_ref(), PageSize::COMMENT_THREAD);
        assert_eq!(names(&older), vec!["c2", "c3", "c4", "c5", "c6"]);
        assert_eq!(older.previous_cursor, Some(comments[2].cursor()));

        let anchor = anchor_of(&comments, older.previous_cursor);
        let oldest = paginate_backward(&comments, anchor.as_ref(), PageSize::COMMENT_THREAD);
        assert_eq!(names(&oldest), vec!["c0", "c1"]);
        assert_eq!(oldest.previous_cursor, None);
    }

    #[test]
    fn test_コメントが5件以下なら前カーソルはない() {
        let comments: Vec<Item> = (0..5).map(|i| item(&format!("c{i}"), i)).collect();

        let page = paginate_backward(&comments, None, PageSize::COMMENT_THREAD);

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.previous_cursor, None);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("  "))]
    fn test_カーソル未指定と空文字列は先頭からになる(#[case] raw: Option<&str>) {
        assert_eq!(Cursor::parse(raw), Ok(None));
    }

    #[test]
    fn test_uuidでないカーソルはバリデーションエラー() {
        let result = Cursor::parse(Some("not-a-uuid"));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_uuid_v7のカーソルから作成時刻を復元できる() {
        let source = item("x", 42);
        let cursor = source.cursor();

        assert_eq!(cursor.implied_sort_key(), Some(source.key));
    }

    #[test]
    fn test_見つかったカーソルはストアの並び順キーを優先する() {
        let source = item("x", 42);
        let stored = SortKey::new(source.key.created_at + chrono::Duration::milliseconds(7), source.key.id);

        assert_eq!(source.cursor().anchor(Some(stored)), Some(stored));
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some(""), 10)]
    #[case(Some("1"), 1)]
    #[case(Some("50"), 50)]
    fn test_有効なページサイズを受け付ける(#[case] raw: Option<&str>, #[case] expected: u32) {
        let size = PageSize::parse(raw, DEFAULT_PAGE_SIZE, DEFAULT_MAX_PAGE_SIZE).unwrap();

        assert_eq!(size.get(), expected);
        assert_eq!(size.fetch_limit(), i64::from(expected) + 1);
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("51")]
    #[case("ten")]
    #[case("2.5")]
    fn test_不正なページサイズは補正せずに拒否する(#[case] raw: &str) {
        let result = PageSize::parse(Some(raw), DEFAULT_PAGE_SIZE, DEFAULT_MAX_PAGE_SIZE);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_page_requestはクエリの不正値をエラーにする() {
        assert!(PageRequest::from_query(Some("bad"), None, DEFAULT_MAX_PAGE_SIZE).is_err());
        assert!(PageRequest::from_query(None, Some("0"), DEFAULT_MAX_PAGE_SIZE).is_err());

        let request = PageRequest::from_query(None, None, DEFAULT_MAX_PAGE_SIZE).unwrap();
        assert_eq!(request.cursor, None);
        assert_eq!(request.page_size.get(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_mapはカーソルを保ったまま要素を変換する() {
        let page = Page::from_forward_fetch(vec![item("a", 0), item("b", 1)], size(1));
        let cursor = page.next_cursor;

        let mapped = page.map(|i| i.name);

        assert_eq!(mapped.items, vec!["a".to_string()]);
        assert_eq!(mapped.next_cursor, cursor);
    }
}
