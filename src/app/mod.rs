use std::future::Future;
use std::{io, net::IpAddr};

use anyhow::Context;
use axum::http::{HeaderValue, Request};
use axum::Router;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::token::TokenCodec;

mod book;
mod error;
mod extractor;
mod health;
mod user;

pub use book::schema::Book;

/// Everything a request handler can reach. Built once by [`App::with`].
#[derive(Clone)]
pub struct AppState {
    db: SqlitePool,
    tokens: TokenCodec,
}

fn app_router() -> Router<AppState> {
    health::router()
        .merge(user::router())
        .merge(book::router())
}

pub struct App {
    listener: TcpListener,
    tokens: TokenCodec,
    cors: CorsLayer,
}

impl App {
    pub async fn with(config: &Settings) -> anyhow::Result<Self> {
        let tokens = TokenCodec::new(
            &config.application.hmac_key,
            config.application.token_ttl(),
        );

        let origins = config
            .application
            .allowed_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin `{}`.", origin))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let cors = CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any);

        let listener = TcpListener::bind(format!(
            "{}:{}",
            config.application.host, config.application.port
        ))
        .await
        .context("The listener should be able to bind the address.")?;

        Ok(Self {
            listener,
            tokens,
            cors,
        })
    }

    pub fn host(&self) -> io::Result<IpAddr> {
        Ok(self.listener.local_addr()?.ip())
    }

    pub fn port(&self) -> io::Result<u16> {
        Ok(self.listener.local_addr()?.port())
    }

    /// Serve until `shutdown` resolves, then let in-flight requests finish.
    pub async fn serve_with_shutdown<F>(self, db: SqlitePool, shutdown: F) -> Result<(), io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = app_router()
            .with_state(AppState {
                db,
                tokens: self.tokens,
            })
            .layer(self.cors)
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                    let id = uuid::Uuid::new_v4();
                    tracing::info_span!(
                        "request",
                        method = ?request.method(),
                        uri = ?request.uri(),
                        %id,
                    )
                }),
            );

        axum::serve(self.listener, app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
    }

    pub async fn serve(self, db: SqlitePool) -> Result<(), io::Error> {
        self.serve_with_shutdown(db, std::future::pending()).await
    }
}
