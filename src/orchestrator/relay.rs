//! Background task forwarding job events to live observers.

use crate::job::EventQueue;

use super::Orchestrator;

impl Orchestrator {
    /// Start the event relay
    ///
    /// The relay runs until [`Orchestrator::shutdown`] is called. Each cycle
    /// it re-reads the current controller, drains its queue without blocking
    /// and forwards every event, in order, to all subscribers. When nothing
    /// was forwarded it sleeps for `relay.poll_interval`.
    pub fn spawn_event_relay(&self) -> tokio::task::JoinHandle<()> {
        let orchestrator = self.clone();
        tokio::spawn(async move { orchestrator.run_event_relay().await })
    }

    async fn run_event_relay(&self) {
        let poll_interval = self.config.relay.poll_interval;
        tracing::info!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Event relay started"
        );

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            if self.relay_once().await == 0 {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    _ = tokio::time::sleep(poll_interval) => {}
                }
            }
        }

        tracing::info!("Event relay stopped");
    }

    /// Run one drain cycle, returning the number of events forwarded
    pub(crate) async fn relay_once(&self) -> usize {
        let state = self.state.lock().await;
        let Some(controller) = &state.controller else {
            return 0;
        };

        let forwarded = self.forward_queued(controller.events());
        if forwarded > 0 {
            tracing::debug!(forwarded, "Relayed progress events");
        }
        forwarded
    }

    /// Pop every queued event and broadcast it; callers hold the state lock
    /// so two drains never interleave
    pub(crate) fn forward_queued(&self, queue: &EventQueue) -> usize {
        let mut forwarded = 0;
        while let Some(event) = queue.try_pop() {
            // Err only means nobody is listening right now
            if self.event_tx.send(event).is_err() {
                tracing::trace!("No live observers, progress event dropped");
            }
            forwarded += 1;
        }
        forwarded
    }
}
