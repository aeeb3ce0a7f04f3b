use anyhow::Context;
use bookshelf::{app::App, config::get_configuration, telemetry::get_subscriber};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_configuration().context("Failed to read configuration.")?;

    get_subscriber(&config.log_level, std::io::stderr).init();

    let db = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(config.database.connect_options())
        .await
        .context("Could not open the database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Could not run database migrations")?;

    let app = App::with(&config).await?;
    tracing::info!(host = %app.host()?, port = app.port()?, "starting server");

    app.serve_with_shutdown(db.clone(), shutdown_signal())
        .await
        .context("The server should be running")?;

    db.close().await;
    tracing::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(detail = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(detail = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
