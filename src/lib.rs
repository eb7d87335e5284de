pub mod types;
pub mod error;
pub mod scoring;
pub mod standings;
pub mod pairing;
pub mod swiss;
pub mod bracket;
pub mod league;
pub mod store;
pub mod export;

pub use error::LeagueError;
pub use league::{League, MatchOutcome};
pub use scoring::{is_valid_score, MatchResult, ScoringConfig};
pub use types::{LeagueState, Player, SharedLeague, Team};

use std::fs;

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initializes tracing with file output under logs/. The returned guard
/// must be held for the life of the process or buffered log lines are
/// dropped on exit.
pub fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let logs_dir = store::repo_root().join("logs");
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "league.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("Roundnet league manager starting");
    guard
}
