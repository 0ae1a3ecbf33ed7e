use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

/// Run `cycle` every `interval`, the first run starts immediately.
///
/// A zero `interval` runs `cycle` exactly once and returns its result.
/// Otherwise errors are logged and the loop keeps going until `shutdown`
/// resolves, a running cycle is never interrupted.
pub async fn run<S, C, E>(interval: Duration, shutdown: S, mut cycle: C) -> Result<(), E>
where
    S: Future<Output = ()>,
    C: AsyncFnMut() -> Result<(), E>,
    E: Display,
{
    if interval.is_zero() {
        return cycle().await;
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut shutdown = std::pin::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        if let Err(err) = cycle().await {
            warn!(message = "generate failed, retry at next tick", %err, ?interval);
        }
    }

    info!(message = "scheduler stopped");

    Ok(())
}
