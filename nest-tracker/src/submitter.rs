use crate::client::NestApiClient;
use crate::types::{ItemObservation, ObservationSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Sends observations to the service on background tasks so the event
/// loop never waits on the network. Failures end up in the log only.
#[derive(Clone)]
pub struct ApiSubmitter {
    client: Arc<NestApiClient>,
    runtime: Handle,
    in_flight: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl ApiSubmitter {
    pub fn new(client: Arc<NestApiClient>, runtime: Handle) -> Self {
        Self {
            client,
            runtime,
            in_flight: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
        }
    }

    /// Uses the runtime of the calling context.
    pub fn current(client: Arc<NestApiClient>) -> Self {
        Self::new(client, Handle::current())
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Spawns the POST; the task resolves to whether the service accepted it.
    pub fn spawn_submit(&self, observation: ItemObservation) -> JoinHandle<bool> {
        let client = self.client.clone();
        let in_flight = self.in_flight.clone();
        let idle = self.idle.clone();
        in_flight.fetch_add(1, Ordering::SeqCst);

        self.runtime.spawn(async move {
            let accepted = match client.submit(&observation).await {
                Ok(()) => {
                    debug!("Submitted observation for item {}", observation.item_id);
                    true
                }
                Err(e) => {
                    error!("Failed to submit observation for item {}: {}", observation.item_id, e);
                    false
                }
            };

            if in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                idle.notify_waiters();
            }
            accepted
        })
    }

    /// Waits until every submission spawned so far has finished.
    pub async fn flush(&self) {
        loop {
            let notified = self.idle.notified();
            if self.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl ObservationSink for ApiSubmitter {
    fn submit(&self, observation: ItemObservation) {
        // Fire and forget.
        drop(self.spawn_submit(observation));
    }
}
