use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ws::hub::BroadcastHub;

/// Ping period that keeps idle subscriber sockets open through proxies.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn a task that pings every hub connection each `period`.
///
/// Ticks are skipped while nobody is connected. Runs until the returned
/// handle is aborted.
pub fn start_heartbeat(hub: Arc<BroadcastHub>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let count = hub.connection_count().await;
            if count == 0 {
                continue;
            }
            tracing::trace!(count, "Heartbeat ping");
            hub.ping_all().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use axum::extract::ws::Message;

    use super::*;

    #[tokio::test]
    async fn connections_receive_pings() {
        let hub = Arc::new(BroadcastHub::new());
        let mut rx = hub.register("a".into()).await;
        rx.recv().await.unwrap();

        let handle = start_heartbeat(Arc::clone(&hub), Duration::from_millis(10));
        let frame = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        handle.abort();

        assert!(matches!(frame, Message::Ping(_)));
    }
}
