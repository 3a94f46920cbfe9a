//! Waiting helpers for asynchronous job progress

use rmd_orchestrator::{Orchestrator, ProgressEvent};
use std::time::Duration;
use tokio::sync::broadcast;

/// Collect relayed events until one has `"type": "job_finished"`
///
/// Panics if the job does not finish within `timeout`.
pub async fn collect_until_finished(
    receiver: &mut broadcast::Receiver<ProgressEvent>,
    timeout: Duration,
) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let event = tokio::time::timeout_at(deadline, receiver.recv())
            .await
            .expect("job did not finish in time")
            .expect("event channel closed");
        let finished = event.payload()["type"] == "job_finished";
        events.push(event);
        if finished {
            return events;
        }
    }
}

/// Wait until no job is alive
pub async fn wait_until_idle(orchestrator: &Orchestrator, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    while orchestrator.is_job_alive().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "job still alive after {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
