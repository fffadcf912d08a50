//! # Conjob サーバー
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `SERVER_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `SERVER_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `REDIS_URL` | **Yes** | セッションストアの Redis URL |
//! | `CRON_SECRET` | **Yes** | `/api/clear-upload` のベアラートークン |
//! | `MEDIA_API_URL` | No | メディアプロバイダ API のベース URL |
//! | `MEDIA_APP_ID` | **Yes** | メディアプロバイダのアプリ ID |
//! | `MEDIA_API_KEY` | **Yes** | メディアプロバイダの API キー |
//! | `APP_ENV` | No | `production` で未使用メディアの 24 時間猶予を適用 |
//! | `FEED_MAX_PAGE_SIZE` | No | フィードの `pageSize` 上限（デフォルト: 50） |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! cargo run -p conjob-server
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use conjob_domain::clock::SystemClock;
use conjob_infra::{
    HttpMediaStorage,
    RedisSessionManager,
    db::{self, PgTransactionManager},
    repository::{
        PostgresBookmarkRepository,
        PostgresCommentRepository,
        PostgresFollowRepository,
        PostgresMediaRepository,
        PostgresNotificationRepository,
        PostgresPostRepository,
        PostgresUserRepository,
    },
};
use conjob_server::{
    app_builder::{AppDeps, build_app},
    config::ServerConfig,
};
use conjob_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// サーバーのエントリーポイント
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. 設定の読み込み
/// 4. DB 接続・マイグレーション・Redis 接続
/// 5. ルーターの構築と HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
    dotenvy::dotenv().ok();

    init_tracing(&TracingConfig::from_env("conjob-server"));
    let _tracing_guard = tracing::info_span!("app", service = "conjob-server").entered();

    let config = ServerConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!("サーバーを起動します: {}:{}", config.host, config.port);

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベースへの接続に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの実行に失敗しました")?;
    tracing::info!("データベースに接続しました");

    let session_manager = RedisSessionManager::new(&config.redis_url)
        .await
        .context("Redis への接続に失敗しました")?;

    let deps = AppDeps {
        pool:                    pool.clone(),
        session_manager:         Arc::new(session_manager),
        tx_manager:              Arc::new(PgTransactionManager::new(pool.clone())),
        user_repository:         Arc::new(PostgresUserRepository::new(pool.clone())),
        post_repository:         Arc::new(PostgresPostRepository::new(pool.clone())),
        comment_repository:      Arc::new(PostgresCommentRepository::new(pool.clone())),
        follow_repository:       Arc::new(PostgresFollowRepository::new(pool.clone())),
        bookmark_repository:     Arc::new(PostgresBookmarkRepository::new(pool.clone())),
        notification_repository: Arc::new(PostgresNotificationRepository::new()),
        media_repository:        Arc::new(PostgresMediaRepository::new(pool)),
        media_storage:           Arc::new(HttpMediaStorage::new(
            &config.media_api_url,
            config.media_api_key.clone(),
        )),
        clock:                   Arc::new(SystemClock),
    };
    let app = build_app(&config, deps);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
