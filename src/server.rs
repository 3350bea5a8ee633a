//! Server lifecycle shared by both binaries

use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;

/// How long in-flight requests may run after a shutdown signal
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Serve `app` until `shutdown` resolves, then drain for at most `drain`
///
/// Returns once every connection has finished or the drain window closes,
/// whichever comes first.
pub async fn serve_with_drain<S>(
    listener: TcpListener,
    app: Router,
    shutdown: S,
    drain: Duration,
) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let drain_deadline = async move {
        if signalled_rx.await.is_err() {
            // Server ended without a signal
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(drain).await;
    };

    tokio::select! {
        result = server => result,
        _ = drain_deadline => {
            tracing::warn!(
                "Requests still running after {:?}, forcing shutdown",
                drain
            );
            Ok(())
        }
    }
}

/// Graceful shutdown signal handler
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

/// Initialize tracing with `RUST_LOG`, falling back to `default_filter`
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    type ServerHandle = tokio::task::JoinHandle<std::io::Result<()>>;

    async fn spawn(app: Router, drain: Duration) -> (String, oneshot::Sender<()>, ServerHandle) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve_with_drain(
            listener,
            app,
            async move {
                let _ = stop_rx.await;
            },
            drain,
        ));
        (format!("http://{}", addr), stop_tx, handle)
    }

    #[tokio::test]
    async fn test_idle_server_stops_on_signal() {
        let app = Router::new().route("/health", get(|| async { "ok" }));
        let (base, stop, handle) = spawn(app, DRAIN_TIMEOUT).await;

        let body = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");

        stop.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(result.unwrap().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_drain_window_is_bounded() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "done"
            }),
        );
        let (base, stop, handle) = spawn(app, Duration::from_millis(200)).await;

        let request = tokio::spawn(reqwest::get(format!("{}/slow", base)));
        tokio::time::sleep(Duration::from_millis(100)).await;

        stop.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(result.is_ok(), "server did not stop after the drain window");
        request.abort();
    }
}
