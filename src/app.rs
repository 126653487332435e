//! Application assembly.
//!
//! Jobs started depending on the configuration:
//!
//! - One job per configured HTTP tracker instance.
//! - One job (plus a cookie rotation job) per configured UDP tracker
//!   instance.
//! - The swarm cleanup job, always.
use peerhub_configuration::{Configuration, Info};

use crate::bootstrap::jobs::{http_tracker, swarm_cleanup, udp_tracker, JobManager};
use crate::bootstrap::{self};
use crate::container::AppContainer;

/// Sets the process up and starts every configured job.
pub async fn run(info: &Info) -> (AppContainer, JobManager) {
    let (configuration, app_container) = bootstrap::app::setup(info);

    let jobs = start(&configuration, &app_container).await;

    (app_container, jobs)
}

/// Starts the jobs for an already built container. Tests call this directly
/// with their own configuration.
pub async fn start(configuration: &Configuration, app_container: &AppContainer) -> JobManager {
    warn_if_no_services_enabled(configuration);

    let mut job_manager = JobManager::new();

    for http_tracker_config in &configuration.http_trackers {
        let started = http_tracker::start_job(http_tracker_config, app_container).await;

        job_manager.add_http_binding(started.binding);
        job_manager.add_http_halt_channel(started.halt);
        job_manager.add_job(started.task);
    }

    for udp_tracker_config in &configuration.udp_trackers {
        let (started, rotation_job) =
            udp_tracker::start_job(udp_tracker_config, app_container, job_manager.cancellation_token()).await;

        job_manager.add_udp_binding(started.binding);
        job_manager.add_job(started.task);
        job_manager.add_job(rotation_job);
    }

    let cleanup_job = swarm_cleanup::start_job(
        &configuration.core,
        &app_container.swarm_registry,
        job_manager.cancellation_token(),
    );
    job_manager.add_job(cleanup_job);

    job_manager
}

fn warn_if_no_services_enabled(configuration: &Configuration) {
    if configuration.http_trackers.is_empty() && configuration.udp_trackers.is_empty() {
        tracing::warn!("no HTTP or UDP trackers enabled in the configuration");
    }
}
