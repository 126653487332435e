//! The application jobs.
//!
//! One module per job, each returning the handles the [`JobManager`] needs
//! to stop it again:
//!
//! - HTTP tracker instances,
//! - UDP tracker instances,
//! - the connection-cookie IV rotation (one per UDP instance),
//! - the swarm registry garbage collector.
pub mod cookie_rotation;
pub mod http_tracker;
pub mod swarm_cleanup;
pub mod udp_tracker;

use std::net::SocketAddr;
use std::time::Duration;

use peerhub_http_server::signals::Halted;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Keeps track of every started job so shutdown can stop them all.
pub struct JobManager {
    cancellation_token: CancellationToken,
    jobs: Vec<JoinHandle<()>>,
    http_halt_channels: Vec<tokio::sync::oneshot::Sender<Halted>>,
    http_bindings: Vec<SocketAddr>,
    udp_bindings: Vec<SocketAddr>,
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}

impl JobManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancellation_token: CancellationToken::new(),
            jobs: Vec::new(),
            http_halt_channels: Vec::new(),
            http_bindings: Vec::new(),
            udp_bindings: Vec::new(),
        }
    }

    /// The token cancellation-aware jobs listen on.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn add_job(&mut self, job: JoinHandle<()>) {
        self.jobs.push(job);
    }

    pub fn add_http_halt_channel(&mut self, halt: tokio::sync::oneshot::Sender<Halted>) {
        self.http_halt_channels.push(halt);
    }

    pub fn add_http_binding(&mut self, binding: SocketAddr) {
        self.http_bindings.push(binding);
    }

    pub fn add_udp_binding(&mut self, binding: SocketAddr) {
        self.udp_bindings.push(binding);
    }

    /// The resolved addresses of the started HTTP tracker instances.
    #[must_use]
    pub fn http_bindings(&self) -> &[SocketAddr] {
        &self.http_bindings
    }

    /// The resolved addresses of the started UDP tracker instances.
    #[must_use]
    pub fn udp_bindings(&self) -> &[SocketAddr] {
        &self.udp_bindings
    }

    /// Asks every job to stop.
    pub fn cancel(&mut self) {
        self.cancellation_token.cancel();

        for halt in self.http_halt_channels.drain(..) {
            // A job that already died dropped its receiver; nothing to do.
            let _halt_result = halt.send(Halted::Normal);
        }
    }

    /// Waits for the jobs to finish, giving up after the timeout.
    pub async fn wait_for_all(&mut self, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;

        for job in self.jobs.drain(..) {
            tokio::select! {
                join_result = job => {
                    if let Err(error) = join_result {
                        tracing::warn!(%error, "job finished with an error");
                    }
                }
                () = tokio::time::sleep_until(deadline) => {
                    tracing::warn!("job did not finish before the shutdown timeout");
                    break;
                }
            }
        }
    }
}
