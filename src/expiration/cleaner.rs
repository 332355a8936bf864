use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::tokens::session;
use crate::AppState;

/// Start the background expiration cleaner task
pub fn start_expiration_cleaner(state: Arc<AppState>) -> JoinHandle<()> {
    let interval = Duration::from_secs(state.config.cleanup_interval_seconds);

    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);

        loop {
            interval_timer.tick().await;
            run_cleanup(&state).await;
        }
    })
}

async fn run_cleanup(state: &AppState) {
    debug!("Running expiration cleanup");

    let db = state.db.clone();
    let result = tokio::task::spawn_blocking(move || {
        let sessions = session::delete_expired(&db);
        let tokens = db.cleanup_expired_tokens();
        (sessions, tokens)
    })
    .await;

    let (session_result, token_result) = match result {
        Ok(results) => results,
        Err(e) => {
            error!(error = %e, "Expiration cleanup task panicked");
            return;
        }
    };

    match session_result {
        Ok(count) if count > 0 => debug!(sessions_cleaned = count, "Expired sessions cleaned"),
        Err(e) => error!(error = %e, "Failed to clean up expired sessions"),
        _ => {}
    }

    match token_result {
        Ok(count) if count > 0 => {
            debug!(tokens_cleaned = count, "Expired revocation records pruned")
        }
        Err(e) => error!(error = %e, "Failed to prune expired revocation records"),
        _ => {}
    }
}
