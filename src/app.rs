use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::{
    cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};
use tower_sessions::{
    cookie::{Key, SameSite},
    Expiry, SessionManagerLayer,
};
use tower_sessions_sqlx_store::PostgresStore;

use crate::{auth, pages, profile, state::AppState};

/// Assemble the whole request pipeline once at boot: routes, session layer,
/// static uploads, CORS, timeout, and tracing.
pub async fn build_app(state: AppState) -> anyhow::Result<Router> {
    let session_store = PostgresStore::new(state.db.clone());
    session_store
        .migrate()
        .await
        .context("migrate session store")?;

    let session_key = Key::try_from(state.config.session.secret.as_bytes())
        .context("SESSION_SECRET is not a usable signing key")?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.session.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(
            state.config.session.ttl_days,
        )))
        .with_signed(session_key);

    let uploads_dir = state.config.upload.dir.clone();

    let app = Router::new()
        .merge(pages::router())
        .merge(auth::router())
        .merge(profile::router())
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .with_state(state)
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(15)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        );

    Ok(app)
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
