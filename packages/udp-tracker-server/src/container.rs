//! The services a running UDP tracker instance depends on.
use std::sync::Arc;

use peerhub_configuration::Core;
use peerhub_tracker_core::announce_handler::AnnounceHandler;
use peerhub_tracker_core::scrape_handler::ScrapeHandler;
use peerhub_tracker_core::statistics;
use peerhub_tracker_core::whitelist::authorization::WhitelistAuthorization;

use crate::connection_cookie::ConnectionCookie;

/// Everything the packet handlers need, wired once at bootstrap.
pub struct UdpTrackerServices {
    pub core_config: Arc<Core>,
    pub announce_handler: Arc<AnnounceHandler>,
    pub scrape_handler: Arc<ScrapeHandler>,
    pub whitelist_authorization: Arc<WhitelistAuthorization>,
    pub stats_repository: Arc<statistics::repository::Repository>,
    pub connection_cookie: Arc<ConnectionCookie>,
}
