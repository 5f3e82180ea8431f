use crate::throttle::Throttle;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::sleep_until;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Feeds every value from `receiver` through a [`Throttle`] and hands the
/// values that get through to `handler`. A deferred value still runs when
/// the channel closes; cancelling `shutdown` drops it.
pub fn spawn_throttled<A, F>(
    interval: Duration,
    mut receiver: UnboundedReceiver<A>,
    shutdown: CancellationToken,
    mut handler: F,
) -> JoinHandle<()>
where
    A: Send + 'static,
    F: FnMut(A) + Send + 'static,
{
    tokio::spawn(async move {
        let mut gate = Throttle::new(interval);
        loop {
            let deadline = gate.next_deadline();
            let wake_at = deadline.map_or_else(Instant::now, Instant::from_std);
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("throttle driver cancelled");
                    break;
                }
                received = receiver.recv() => {
                    let now = Instant::now().into_std();
                    let Some(args) = received else {
                        if let Some(deadline) = gate.next_deadline() {
                            sleep_until(Instant::from_std(deadline)).await;
                            if let Some(args) = gate.poll(Instant::now().into_std()) {
                                handler(args);
                            }
                        }
                        break;
                    };
                    if let Some(due) = gate.poll(now) {
                        handler(due);
                    }
                    if let Some(args) = gate.call(now, args) {
                        handler(args);
                    }
                }
                _ = sleep_until(wake_at), if deadline.is_some() => {
                    if let Some(args) = gate.poll(Instant::now().into_std()) {
                        handler(args);
                    }
                }
            }
        }
    })
}
