//! Periodic garbage collection of inactive peers.
use std::sync::Arc;

use peerhub_clock::clock::Time;
use peerhub_configuration::Core;
use peerhub_swarm_registry::Registry;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::CurrentClock;

/// Spawns the cleanup loop: every `gc_interval` it removes the peers that
/// have not announced within `peer_lifetime` and drops the swarms that end
/// up empty.
#[must_use]
pub fn start_job(config: &Core, swarm_registry: &Arc<Registry>, cancellation_token: CancellationToken) -> JoinHandle<()> {
    let gc_interval = config.gc_interval();
    let peer_lifetime = config.tracker_policy.peer_lifetime();
    let swarm_registry = swarm_registry.clone();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(gc_interval);

        // The first tick fires immediately; there is nothing to collect yet.
        interval.tick().await;

        loop {
            tokio::select! {
                () = cancellation_token.cancelled() => {
                    tracing::info!("swarm cleanup stopped");
                    break;
                }
                _ = interval.tick() => {
                    let current_cutoff = CurrentClock::now_sub(&peer_lifetime).unwrap_or_default();

                    let start_time = tokio::time::Instant::now();

                    let stats = swarm_registry.collect_garbage(current_cutoff).await;

                    tracing::info!(
                        peers_removed = stats.peers_removed,
                        swarms_removed = stats.swarms_removed,
                        duration = ?start_time.elapsed(),
                        "swarm cleanup pass finished"
                    );
                }
            }
        }
    })
}
