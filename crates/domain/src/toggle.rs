//! # トグル状態
//!
//! フォローやブックマークのような「オン/オフ + 件数」の状態を表す値オブジェクト。
//!
//! | 型 | ドメイン用語 | JSON |
//! |---|------------|------|
//! | [`ToggleState`] | トグル状態 | （クライアント内部のみ） |
//! | [`FollowerInfo`] | フォロワー情報 | `{ followers, isFollowedByUser }` |
//! | [`BookmarkInfo`] | ブックマーク情報 | `{ isBookmarkedByUser }` |
//!
//! 件数は負にならない。

use serde::{Deserialize, Serialize};

/// トグル状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToggleState {
    pub is_active: bool,
    /// 件数を持たないトグル（ブックマーク）では `None`
    pub count:     Option<u32>,
}

impl ToggleState {
    pub fn new(is_active: bool, count: Option<u32>) -> Self {
        Self { is_active, count }
    }

    /// 反転した状態
    ///
    /// `is_active` を反転し、件数を ±1 する。0 から減らすことはない。
    pub fn toggled(self) -> Self {
        let count = self.count.map(|c| {
            if self.is_active {
                c.saturating_sub(1)
            } else {
                c.saturating_add(1)
            }
        });
        Self {
            is_active: !self.is_active,
            count,
        }
    }
}

/// ユーザーのフォロワー情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerInfo {
    pub followers:           u32,
    pub is_followed_by_user: bool,
}

impl From<FollowerInfo> for ToggleState {
    fn from(info: FollowerInfo) -> Self {
        Self::new(info.is_followed_by_user, Some(info.followers))
    }
}

impl From<ToggleState> for FollowerInfo {
    fn from(state: ToggleState) -> Self {
        Self {
            followers:           state.count.unwrap_or(0),
            is_followed_by_user: state.is_active,
        }
    }
}

/// 投稿のブックマーク情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkInfo {
    pub is_bookmarked_by_user: bool,
}

impl From<BookmarkInfo> for ToggleState {
    fn from(info: BookmarkInfo) -> Self {
        Self::new(info.is_bookmarked_by_user, None)
    }
}

impl From<ToggleState> for BookmarkInfo {
    fn from(state: ToggleState) -> Self {
        Self {
            is_bookmarked_by_user: state.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ToggleState::new(false, Some(5)), ToggleState::new(true, Some(6)))]
    #[case(ToggleState::new(true, Some(6)), ToggleState::new(false, Some(5)))]
    #[case(ToggleState::new(false, None), ToggleState::new(true, None))]
    fn test_反転で状態と件数が連動する(#[case] before: ToggleState, #[case] expected: ToggleState) {
        assert_eq!(before.toggled(), expected);
    }

    #[test]
    fn test_件数0のアクティブ状態を反転しても負にならない() {
        let sut = ToggleState::new(true, Some(0));

        assert_eq!(sut.toggled(), ToggleState::new(false, Some(0)));
    }

    #[test]
    fn test_2回反転すると元に戻る() {
        let sut = ToggleState::new(false, Some(5));

        assert_eq!(sut.toggled().toggled(), sut);
    }

    #[test]
    fn test_follower_infoのjson形状() {
        let info = FollowerInfo {
            followers:           3,
            is_followed_by_user: true,
        };

        let json = serde_json::to_value(info).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "followers": 3, "isFollowedByUser": true })
        );
    }

    #[test]
    fn test_follower_infoとトグル状態を相互変換できる() {
        let info = FollowerInfo {
            followers:           5,
            is_followed_by_user: false,
        };

        let state = ToggleState::from(info).toggled();

        assert_eq!(
            FollowerInfo::from(state),
            FollowerInfo {
                followers:           6,
                is_followed_by_user: true,
            }
        );
    }

    #[test]
    fn test_bookmark_infoのjson形状() {
        let info = BookmarkInfo::from(ToggleState::new(true, None));

        let json = serde_json::to_value(info).unwrap();

        assert_eq!(json, serde_json::json!({ "isBookmarkedByUser": true }));
    }
}
