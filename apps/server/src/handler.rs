//! # HTTP ハンドラ
//!
//! ユースケースを呼び出し、結果を共有 JSON 型に変換して返す。
//!
//! ## モジュール構成
//!
//! - `health` - ヘルスチェック
//! - `feed` - フィード取得と投稿作成
//! - `comment` - コメントスレッド
//! - `follow` - フォロワー情報とフォロー/解除
//! - `bookmark` - ブックマーク情報と登録/解除
//! - `notification` - 通知の既読化
//! - `media` - 未使用メディアのクリーンアップ（cron 用）

pub mod bookmark;
pub mod comment;
pub mod feed;
pub mod follow;
pub mod health;
pub mod media;
pub mod notification;

pub use bookmark::{BookmarkState, bookmark_post, get_bookmark_info, unbookmark_post};
pub use comment::{CommentState, list_comments};
pub use feed::{FeedState, PostState, create_post, following_feed, for_you_feed};
pub use follow::{FollowState, follow_user, get_follower_info, unfollow_user};
pub use health::{ReadinessState, health_check, readiness_check};
pub use media::{MediaCleanupState, clear_upload};
pub use notification::{NotificationState, mark_notifications_read};

use conjob_domain::{
    comment::Comment,
    media::Media,
    pagination::{Cursor, Page},
    post::Post,
    user::UserSummary,
};
use conjob_shared::{CommentDto, CommentPage, CursorPage, MediaDto, PostDto, UserDto};

fn user_dto(user: UserSummary) -> UserDto {
    UserDto {
        id:           user.id.to_string(),
        username:     user.username,
        display_name: user.display_name,
        avatar_url:   user.avatar_url,
    }
}

fn media_dto(media: Media) -> MediaDto {
    MediaDto {
        id:         media.id.to_string(),
        url:        media.url,
        media_type: media.media_type.to_string(),
    }
}

pub(crate) fn post_dto(post: Post) -> PostDto {
    PostDto {
        id:          post.id.to_string(),
        content:     post.content,
        user:        user_dto(post.author),
        attachments: post.attachments.into_iter().map(media_dto).collect(),
        created_at:  post.created_at.to_rfc3339(),
    }
}

fn comment_dto(comment: Comment) -> CommentDto {
    CommentDto {
        id:         comment.id.to_string(),
        post_id:    comment.post_id.to_string(),
        content:    comment.content,
        user:       user_dto(comment.author),
        created_at: comment.created_at.to_rfc3339(),
    }
}

fn cursor_string(cursor: Option<Cursor>) -> Option<String> {
    cursor.map(|c| c.to_string())
}

pub(crate) fn feed_page(page: Page<Post>) -> CursorPage<PostDto> {
    let next_cursor = cursor_string(page.next_cursor);
    CursorPage {
        items: page.items.into_iter().map(post_dto).collect(),
        next_cursor,
    }
}

pub(crate) fn comment_page(page: Page<Comment>) -> CommentPage<CommentDto> {
    let previous_cursor = cursor_string(page.previous_cursor);
    CommentPage {
        comments: page.items.into_iter().map(comment_dto).collect(),
        previous_cursor,
    }
}
