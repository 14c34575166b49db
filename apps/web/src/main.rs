//! # Meibo Web サーバー エントリポイント
//!
//! 起動の流れ:
//!
//! 1. `.env` 読み込みとトレーシング初期化
//! 2. 設定の読み込みと検証
//! 3. データベース接続・マイグレーション適用・既定ロールの種付け
//! 4. メール transport の選択（`MAIL_BACKEND`）
//! 5. ユースケースとルーターの組み立て・サーブ

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use axum::{
    Router,
    routing::get,
};
use axum_extra::extract::cookie::Key;
use meibo_domain::role::{Role, RoleId, RoleName, SEED_ROLE_NAMES};
use meibo_infra::{
    db,
    repository::{
        PostgresRoleRepository, PostgresSentEmailRepository, PostgresUserRepository,
        RoleRepository as _, SentEmailRepository, UserRepository,
    },
    transport::{EmailTransport, HttpEmailTransport, NoopEmailTransport},
};
use meibo_shared::observability::{TracingConfig, init_tracing};
use meibo_web::{
    config::{MailBackend, WebConfig},
    handler,
    page::PageRenderer,
    state::AppState,
    usecase::{NotificationService, NotificationSettings, RegistrationService},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(TracingConfig::from_env("web"));

    let config = WebConfig::from_env().context("設定の読み込みに失敗しました")?;

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの適用に失敗しました")?;
    tracing::info!("データベースに接続しました");

    seed_roles(&PostgresRoleRepository::new(pool.clone())).await?;

    let transport = build_transport(&config)?;
    let sent_emails: Arc<dyn SentEmailRepository> =
        Arc::new(PostgresSentEmailRepository::new(pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));

    let notifier = Arc::new(NotificationService::new(
        transport,
        sent_emails.clone(),
        NotificationSettings {
            from_address:   config.mail.from_address.clone(),
            subject_prefix: config.mail.subject_prefix.clone(),
            audit_policy:   config.mail.audit_policy,
        },
    ));
    let registration = Arc::new(RegistrationService::new(
        users.clone(),
        Arc::new(PostgresRoleRepository::new(pool.clone())),
        notifier,
        config.mail.admin_address.clone(),
        config.mail.opt_in_address.clone(),
    ));

    let state = AppState {
        registration,
        users,
        sent_emails,
        pages: Arc::new(PageRenderer::new().context("テンプレートの読み込みに失敗しました")?),
        cookie_key: Key::derive_from(config.secret_key.as_bytes()),
    };

    let app = Router::new()
        .route("/", get(handler::index::show_index).post(handler::index::register))
        .route("/emails", get(handler::emails::list_sent_emails))
        .route("/health", get(handler::health::health_check))
        .fallback(handler::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスのパースに失敗しました")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("アドレスのバインドに失敗しました")?;
    tracing::info!(%addr, "Web サーバーを起動しました");

    axum::serve(listener, app)
        .await
        .context("サーバーの実行中にエラーが発生しました")?;

    Ok(())
}

/// 既定ロールを冪等に種付けする
async fn seed_roles(roles: &PostgresRoleRepository) -> anyhow::Result<()> {
    for name in SEED_ROLE_NAMES {
        let role = Role::new(
            RoleId::new(),
            RoleName::new(name).context("既定ロール名が不正です")?,
        );
        roles
            .insert_if_absent(&role)
            .await
            .context("ロールの種付けに失敗しました")?;
    }
    Ok(())
}

/// `MAIL_BACKEND` 設定に応じた transport を構築する
fn build_transport(config: &WebConfig) -> anyhow::Result<Arc<dyn EmailTransport>> {
    match config.mail.backend {
        MailBackend::Noop => {
            tracing::info!("メール transport: noop（実際の送信は行われません）");
            Ok(Arc::new(NoopEmailTransport))
        }
        MailBackend::Http => {
            // 設定読み込み時に存在検証済み
            let api_url = config
                .mail
                .api_url
                .clone()
                .context("MAIL_API_URL が設定されていません")?;
            let api_key = config
                .mail
                .api_key
                .clone()
                .context("MAIL_API_KEY が設定されていません")?;
            let transport = HttpEmailTransport::new(api_url, api_key, config.mail.timeout)
                .context("メール transport の構築に失敗しました")?;
            tracing::info!("メール transport: http");
            Ok(Arc::new(transport))
        }
    }
}
