use std::time::Duration;

use tokio::task::JoinHandle;

use crate::state::AppState;

/// Spawn the periodic sweep that removes idle empty rooms and expired admin sessions.
///
/// The first sweep runs one full `period` after startup. Periods under a second are raised
/// to one second.
pub fn spawn(state: AppState, period: Duration) -> JoinHandle<()> {
    let period = period.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut ticker = tokio::time::interval_at(start, period);

        loop {
            ticker.tick().await;
            sweep(&state).await;
        }
    })
}

/// Run one sweep. Returns how many rooms were removed.
pub async fn sweep(state: &AppState) -> usize {
    let removed = state.gateway.cleanup_empty_rooms().await;
    if removed > 0 {
        tracing::info!(removed, "Cleaned up empty rooms");
    }

    let expired = state.admin_sessions.prune_expired();
    if expired > 0 {
        tracing::debug!(expired, "Pruned expired admin sessions");
    }

    removed
}
