use super::{Shared, spawn_workers};
use std::sync::Arc;

/// The scaler loop: sample queue occupancy on a fixed tick and grow the
/// worker fleet.
///
/// Policy, applied in order on every tick (occupancy `o`, capacity `c`):
///
/// 1. `o` below the spare-capacity threshold - spawn the larger step, so a
///    lightly loaded pool keeps building throughput headroom,
/// 2. `o` above the rising-backlog threshold - spawn the smaller step,
/// 3. otherwise - no action this tick.
///
/// The loop exits as soon as the termination flag is set, without waiting
/// out the current tick. The fleet only ever grows; draining the pool is
/// what reclaims workers.
pub(super) async fn scaler_loop<T, U>(shared: Arc<Shared<T, U>>)
where
    T: Send + 'static,
    U: Send + 'static,
{
    let scale = shared.scale.clone();

    #[cfg(feature = "tracing")]
    tracing::trace!("Scaler started with tick {:?}", scale.tick);

    loop {
        tokio::select! {
            () = shared.shutdown.terminated() => break,
            () = tokio::time::sleep(scale.tick) => {}
        }
        // The flag may have been set while the tick slept; never grow the
        // fleet past termination.
        if shared.shutdown.is_terminated() {
            break;
        }

        let occupancy = shared.queue.occupancy();
        let capacity = shared.queue.capacity();

        if occupancy * 100 < capacity * scale.spare_pct {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "Occupancy {occupancy}/{capacity}: spare capacity, spawning {} worker(s)",
                scale.spare_step
            );
            spawn_workers(&shared, scale.spare_step);
        } else if occupancy * 100 > capacity * scale.busy_pct {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "Occupancy {occupancy}/{capacity}: rising backlog, spawning {} worker(s)",
                scale.busy_step
            );
            spawn_workers(&shared, scale.busy_step);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Scaler stopped");
}
