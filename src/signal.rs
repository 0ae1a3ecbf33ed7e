/// Resolves when the process is asked to stop, by SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn shutdown() {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut sigint, mut sigterm) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(err), _) | (_, Err(err)) => {
            warn!(message = "set up signal handlers failed, fallback to ctrl-c", %err);
            return ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigint.recv() => info!(message = "Signal received", signal = "SIGINT"),
        _ = sigterm.recv() => info!(message = "Signal received", signal = "SIGTERM"),
    }
}

#[cfg(not(unix))]
pub async fn shutdown() {
    ctrl_c().await
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(message = "Signal received", signal = "ctrl-c"),
        Err(err) => {
            // never resolves, the process is stopped by other means then
            error!(message = "listen for ctrl-c failed", %err);
            std::future::pending::<()>().await
        }
    }
}
