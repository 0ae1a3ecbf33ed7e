use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. `levels` is an `EnvFilter` directive like
/// `sacloud_sd=info,discovery=info`, an invalid one falls back to `info`.
///
/// Calling it more than once is harmless, only the first call takes effect.
pub fn init(color: bool, levels: &str) {
    let filter = EnvFilter::try_new(levels).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(color).with_target(false))
        .try_init();
}

/// Filter directives for the crates of this program at `level`.
pub fn levels(level: &str) -> String {
    [
        format!("sacloud_sd={level}"),
        format!("discovery={level}"),
    ]
    .join(",")
}
