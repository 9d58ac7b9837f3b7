pub mod auth;
pub mod config;
pub mod error;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;

use std::sync::Arc;

use anyhow::Context as _;
use axum::http::header;
use axum::Router;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::deadpool::{Hook, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use tera::Tera;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_sessions::{cookie::Key, Expiry, MemoryStore, SessionManagerLayer};
use tracing::*;

use crate::auth::Hasher;
use crate::config::AppConfig;
use crate::middleware::logging::HttpLoggingExt;
use crate::routes::AppState;
use crate::services::posts::{PostService, PostServiceDb};
use crate::services::users::{UserService, UserServiceDb};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// The full application: routes, signed-cookie sessions, static asset
/// service, and request logging. Tests build this directly with in-memory
/// service implementations.
pub fn app<U: UserService, P: PostService>(
    state: AppState<U, P>,
    static_dir: &str,
    secret_key: &[u8],
) -> anyhow::Result<Router> {
    let key = Key::try_from(secret_key).context("secret_key is too short to sign cookies")?;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnSessionEnd)
        .with_signed(key);

    let app = routes::router(state)
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    header::HeaderValue::from_static("max-age=13420"),
                ))
                .layer(CompressionLayer::new())
                .service(tower_http::services::ServeDir::new(static_dir)),
        )
        .layer(session_layer)
        .with_http_logging();

    Ok(app)
}

pub async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    cfg.validate()?;

    // create a new connection pool with the default config
    let mgr =
        AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(&cfg.database_url);

    info!("Starting DB pool");
    let pool = Pool::builder(mgr)
        .max_size(10)
        .pre_recycle(Hook::async_fn(|conn, metrics| {
            tracing::trace_span!("db_pool::pre_recycle").in_scope(|| {
                let c = std::ptr::addr_of!(conn);
                tracing::trace!(?c, ?metrics, "Pre-recycle");
                Box::pin(std::future::ready(Ok(())))
            })
        }))
        .post_create(Hook::async_fn(|conn, metrics| {
            tracing::trace_span!("db_pool::post_create").in_scope(|| {
                let c = std::ptr::addr_of!(conn);
                tracing::trace!(?c, ?metrics, "Post-create");
                Box::pin(std::future::ready(Ok(())))
            })
        }))
        .runtime(deadpool::Runtime::Tokio1)
        .build()?;

    info!("Running pending migrations");
    run_migrations(&cfg.database_url).await?;

    let tera = Arc::new(Tera::new(&cfg.templates_glob)?);
    let hasher = Hasher::new(
        cfg.hash_memory_kib,
        cfg.hash_iterations,
        cfg.hash_parallelism,
    )?;

    let state = (
        UserServiceDb::new(pool.clone()),
        PostServiceDb::new(pool),
        tera,
        hasher,
    );
    let app = app(state, &cfg.static_dir, cfg.secret_key.as_bytes())?;

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    info!("starting listening at {}", cfg.listen_addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        use diesel::Connection;

        let mut conn =
            AsyncConnectionWrapper::<diesel_async::AsyncPgConnection>::establish(&url)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("migrations failed: {e}"))?;
        anyhow::Ok(())
    })
    .await?
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
