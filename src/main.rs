use log::{info, warn};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use carpool_service::integration::{self, Config};
use carpool_service::state::AppState;

#[tokio::main]
async fn main() -> carpool_service::Result<()> {
    dotenv::dotenv().ok();
    integration::init_logger()?;

    let cfg = Config::env()?;
    let shutdown = CancellationToken::new();
    let state = AppState::init(&cfg, shutdown.clone()).await?;

    let app = carpool_service::app(state)
        .layer(
            CorsLayer::new()
                .allow_origin(cfg.env.allow_origin()?)
                .allow_methods(cfg.env.allow_methods())
                .allow_headers(cfg.env.allow_headers()),
        )
        .layer(TraceLayer::new_for_http());

    let addr = cfg.env.addr();
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {addr} ({:?})", cfg.env);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
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

    info!("shutting down, aborting in-flight feed loads");
    shutdown.cancel();
}
