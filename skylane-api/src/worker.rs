use std::sync::Arc;

use chrono::Utc;
use skylane_core::Datastore;
use skylane_scheduling::reconcile;
use tokio::time::{interval, Duration};
use tracing::{debug, error};

/// Periodic reconciler pass. Operations already reconcile inline before
/// they read, so this only bounds how stale an idle system can get; the
/// pass is idempotent, running both is safe.
pub async fn start_reconciler_worker(store: Arc<dyn Datastore>, every: Duration) {
    let mut ticker = interval(every);
    loop {
        ticker.tick().await;
        match reconcile(store.as_ref(), Utc::now()).await {
            Ok(()) => debug!("reconciler pass completed"),
            Err(err) => error!("reconciler pass failed: {err}"),
        }
    }
}
