//! # アプリケーション構築
//!
//! DI（ユースケース・State）の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! ## ルートグループ
//!
//! | グループ | 認証 |
//! |---------|------|
//! | `/health`, `/health/ready` | なし |
//! | `/api/clear-upload` | `Authorization: Bearer <CRON_SECRET>` |
//! | その他の `/api/*` | `auth_session` Cookie |

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use conjob_domain::clock::Clock;
use conjob_infra::{
    MediaStorage,
    SessionManager,
    db::TransactionManager,
    repository::{
        BookmarkRepository,
        CommentRepository,
        FollowRepository,
        MediaRepository,
        NotificationRepository,
        PostRepository,
        UserRepository,
    },
};
use conjob_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use sqlx::PgPool;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::ServerConfig,
    handler::{
        BookmarkState,
        CommentState,
        FeedState,
        FollowState,
        MediaCleanupState,
        NotificationState,
        PostState,
        ReadinessState,
        bookmark_post,
        clear_upload,
        create_post,
        follow_user,
        following_feed,
        for_you_feed,
        get_bookmark_info,
        get_follower_info,
        health_check,
        list_comments,
        mark_notifications_read,
        readiness_check,
        unbookmark_post,
        unfollow_user,
    },
    middleware::{AuthState, require_session},
    usecase::{
        BookmarkUseCaseImpl,
        CommentUseCaseImpl,
        FeedUseCaseImpl,
        FollowUseCaseImpl,
        MediaCleanupUseCaseImpl,
        NotificationUseCaseImpl,
        PostUseCaseImpl,
    },
};

/// 初期化済みのインフラ依存
///
/// 本番では PostgreSQL / Redis 実装、テストでは `conjob_infra::mock` を渡す。
pub struct AppDeps {
    pub pool:                    PgPool,
    pub session_manager:         Arc<dyn SessionManager>,
    pub tx_manager:              Arc<dyn TransactionManager>,
    pub user_repository:         Arc<dyn UserRepository>,
    pub post_repository:         Arc<dyn PostRepository>,
    pub comment_repository:      Arc<dyn CommentRepository>,
    pub follow_repository:       Arc<dyn FollowRepository>,
    pub bookmark_repository:     Arc<dyn BookmarkRepository>,
    pub notification_repository: Arc<dyn NotificationRepository>,
    pub media_repository:        Arc<dyn MediaRepository>,
    pub media_storage:           Arc<dyn MediaStorage>,
    pub clock:                   Arc<dyn Clock>,
}

/// ユースケース → State → Router の順に組み立てる
pub fn build_app(config: &ServerConfig, deps: AppDeps) -> Router {
    let readiness_state = Arc::new(ReadinessState {
        pool:            deps.pool,
        session_manager: deps.session_manager.clone(),
    });
    let auth_state = AuthState {
        session_manager: deps.session_manager,
    };

    let feed_state = Arc::new(FeedState {
        usecase:       FeedUseCaseImpl::new(deps.post_repository.clone()),
        max_page_size: config.feed_max_page_size,
    });
    let post_state = Arc::new(PostState {
        usecase: PostUseCaseImpl::new(
            deps.post_repository.clone(),
            deps.media_repository.clone(),
            deps.tx_manager.clone(),
            deps.clock.clone(),
        ),
    });
    let comment_state = Arc::new(CommentState {
        usecase: CommentUseCaseImpl::new(deps.post_repository.clone(), deps.comment_repository),
    });
    let follow_state = Arc::new(FollowState {
        usecase: FollowUseCaseImpl::new(
            deps.user_repository,
            deps.follow_repository,
            deps.notification_repository.clone(),
            deps.tx_manager.clone(),
            deps.clock.clone(),
        ),
    });
    let bookmark_state = Arc::new(BookmarkState {
        usecase: BookmarkUseCaseImpl::new(
            deps.post_repository,
            deps.bookmark_repository,
            deps.tx_manager.clone(),
            deps.clock.clone(),
        ),
    });
    let notification_state = Arc::new(NotificationState {
        usecase: NotificationUseCaseImpl::new(
            deps.notification_repository,
            deps.tx_manager.clone(),
        ),
    });
    let media_cleanup_state = Arc::new(MediaCleanupState {
        usecase:     MediaCleanupUseCaseImpl::new(
            deps.media_repository,
            deps.media_storage,
            deps.tx_manager,
            deps.clock,
            config.media_app_id.clone(),
            config.production,
        ),
        cron_secret: config.cron_secret.clone(),
    });

    // セッション必須の API
    let session_api = Router::new()
        .route("/api/posts/for-you", get(for_you_feed))
        .route("/api/posts/following", get(following_feed))
        .with_state(feed_state)
        .route("/api/posts", post(create_post))
        .with_state(post_state)
        .route("/api/posts/{post_id}/comments", get(list_comments))
        .with_state(comment_state)
        .route(
            "/api/posts/{post_id}/bookmark",
            get(get_bookmark_info)
                .post(bookmark_post)
                .delete(unbookmark_post),
        )
        .with_state(bookmark_state)
        .route(
            "/api/users/{user_id}/followers",
            get(get_follower_info)
                .post(follow_user)
                .delete(unfollow_user),
        )
        .with_state(follow_state)
        .route(
            "/api/notifications/mark-as-read",
            patch(mark_notifications_read),
        )
        .with_state(notification_state)
        .layer(from_fn_with_state(auth_state, require_session));

    // Request ID + TraceLayer により、すべてのリクエストに request_id が付与される
    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(
            Router::new()
                .route("/api/clear-upload", get(clear_upload))
                .with_state(media_cleanup_state),
        )
        .merge(session_api)
        // レイヤー順序: 下に書いたものが外側
        // SetRequestId → Trace → CanonicalLogLine → PropagateRequestId → ルーター
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
