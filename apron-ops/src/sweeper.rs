use crate::store::GroundOpsStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

pub type SharedStore = Arc<Mutex<GroundOpsStore>>;

/// Periodically runs due notification expiry tasks for a long-lived store.
///
/// Abort the returned handle to stop it.
pub fn spawn_expiry_sweeper(store: SharedStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Notification sweeper started ({:?} period)", period);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = match store.lock() {
                Ok(mut store) => store.sweep_notifications(),
                Err(_) => {
                    error!("Store lock poisoned, stopping notification sweeper");
                    break;
                }
            };
            if removed > 0 {
                debug!("Expired {} notifications", removed);
            }
        }
    })
}
