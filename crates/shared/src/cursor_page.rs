//! # カーソルページのワイヤー型
//!
//! フィード API とコメント API が返す JSON の形を定義する。
//! サーバーは `Serialize`、クライアントは `Deserialize` で同じ型を使う。

use serde::{Deserialize, Serialize};

/// 前方向（新しい順）にページングするレスポンス
///
/// ## JSON 形式
///
/// ```json
/// {
///   "items": [...],
///   "nextCursor": "0190a3c4-..."
/// }
/// ```
///
/// `nextCursor` が `null` の場合は最後のページを意味する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    pub items:       Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> CursorPage<T> {
    /// 後続ページが存在するか
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// 後方向（古いコメントへ）ページングするコメントスレッドのレスポンス
///
/// `comments` は常に作成日時の昇順で並ぶ。
/// `previousCursor` が `null` の場合、これより古いコメントは存在しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage<T> {
    pub comments:        Vec<T>,
    pub previous_cursor: Option<String>,
}
