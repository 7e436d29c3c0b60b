//! OS termination signal handling.
//!
//! The quit action itself belongs to the control surface, but the arena also
//! honors the platform's termination signals so a plain Ctrl-C tears the
//! simulation down cleanly.

/// Completes when the process receives a termination signal.
///
/// If signal listeners cannot be registered (no signal driver, restricted
/// environment), this parks forever and [`Arena::quit`](crate::Arena::quit)
/// remains the only exit.
#[cfg(unix)]
pub(crate) async fn quit_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(mut sigint), Ok(mut sigterm)) => {
            tokio::select! {
                _ = sigint.recv() => {}
                _ = sigterm.recv() => {}
            }
        }
        _ => std::future::pending::<()>().await,
    }
}

/// Completes when the process receives a termination signal.
#[cfg(not(unix))]
pub(crate) async fn quit_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
