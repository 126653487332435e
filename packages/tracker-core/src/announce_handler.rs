//! Announce handler.
//!
//! Handling `announce` requests is the most important task for a `BitTorrent`
//! tracker. A peer periodically reports its state for one torrent and
//! receives a page of other peers in the same swarm.
//!
//! The handler decides, from the announced event and the number of bytes
//! left, which swarm registry mutation the announce maps to:
//!
//! ```text
//!          announce(left>0)
//! absent ─────────────────────▶ leecher
//!          announce(left=0 or "completed")
//! absent ─────────────────────▶ seeder
//! leecher ── "completed"        ─▶ seeder      (graduate)
//! leecher ── "stopped"|"paused" ─▶ absent
//! seeder  ── "stopped"|"paused" ─▶ absent
//! seeder  ── announce           ─▶ seeder      (refresh)
//! leecher ── announce           ─▶ leecher     (refresh)
//! ```
//!
//! A `completed` event from a peer the tracker has never seen is accepted and
//! treated as started+completed: the peer is created as a seeder.
//!
//! The `remote_client_ip` argument is the resolved client IP. Trackers
//! commonly ignore the IP the peer claims in the request params and use the
//! address of the client making the request; resolving it (proxy headers,
//! spoofing policy) is the caller's job because it needs request metadata.
use std::net::IpAddr;
use std::sync::Arc;

use peerhub_clock::clock::Time;
use peerhub_configuration::Core;
use peerhub_primitives::announce_event::AnnounceEvent;
use peerhub_primitives::core::AnnounceData;
use peerhub_primitives::info_hash::InfoHash;
use peerhub_primitives::peer::Peer;
use peerhub_primitives::AddressFamily;
use peerhub_swarm_registry::registry::Error as RegistryError;
use peerhub_swarm_registry::Registry;

use crate::CurrentClock;

/// Handles `announce` requests from `BitTorrent` clients.
pub struct AnnounceHandler {
    config: Core,
    swarm_registry: Arc<Registry>,
}

impl AnnounceHandler {
    #[must_use]
    pub fn new(config: &Core, swarm_registry: &Arc<Registry>) -> Self {
        Self {
            config: config.clone(),
            swarm_registry: swarm_registry.clone(),
        }
    }

    /// Processes an announce request from a peer.
    ///
    /// The peer argument is mutable because the handler stamps the
    /// observation time and may rewrite a loopback IP to the configured
    /// external IP.
    ///
    /// The returned counts reflect the swarm state after this announce's
    /// mutation, and the peer lists never contain the announcing peer's own
    /// endpoint.
    pub fn announce(
        &self,
        info_hash: &InfoHash,
        peer: &mut Peer,
        remote_client_ip: &IpAddr,
        peers_wanted: &PeersWanted,
    ) -> AnnounceData {
        peer.updated = CurrentClock::now();
        peer.change_ip(&assign_ip_address_to_peer(remote_client_ip, self.config.net.external_ip));

        let family = peer.address_family();

        self.apply_swarm_mutation(info_hash, peer);

        let stats = self.swarm_registry.swarm_metadata(info_hash, family);

        let peers = if peer.event.is_terminal() {
            Vec::new()
        } else {
            let numwant = peers_wanted.limit(usize::from(self.config.max_numwant));
            self.swarm_registry.announce_peers(info_hash, peer, numwant)
        };

        let (peers_v4, peers_v6) = match family {
            AddressFamily::V4 => (peers, Vec::new()),
            AddressFamily::V6 => (Vec::new(), peers),
        };

        AnnounceData {
            peers_v4,
            peers_v6,
            stats,
            policy: self.config.announce_policy,
        }
    }

    fn apply_swarm_mutation(&self, info_hash: &InfoHash, peer: &Peer) {
        match peer.event {
            AnnounceEvent::Stopped | AnnounceEvent::Paused => {
                let removal = if peer.left.0 == 0 {
                    self.swarm_registry.remove_seeder(info_hash, peer)
                } else {
                    self.swarm_registry.remove_leecher(info_hash, peer)
                };

                // A peer the tracker never saw may announce `stopped`; that
                // still deserves a valid (empty) response.
                if let Err(RegistryError::TorrentNotFound | RegistryError::PeerNotFound) = removal {
                    tracing::debug!(%info_hash, peer_id = %peer.peer_id, "stop for an unknown peer");
                }
            }
            AnnounceEvent::Completed => {
                self.swarm_registry.graduate_leecher(info_hash, peer);
            }
            AnnounceEvent::None | AnnounceEvent::Started => {
                if peer.left.0 == 0 {
                    self.swarm_registry.upsert_seeder(info_hash, peer);
                } else {
                    self.swarm_registry.upsert_leecher(info_hash, peer);
                }
            }
        }
    }
}

/// Specifies how many peers a client wants in the announce response.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PeersWanted {
    /// Request as many peers as the tracker allows (default behavior).
    #[default]
    AsManyAsPossible,

    /// Request a specific number of peers.
    Only { amount: usize },
}

impl PeersWanted {
    /// The number of peers to return, clamped to the tracker's limit.
    #[must_use]
    pub fn limit(&self, max_peers: usize) -> usize {
        match self {
            PeersWanted::AsManyAsPossible => max_peers,
            PeersWanted::Only { amount } => (*amount).min(max_peers),
        }
    }
}

impl From<i32> for PeersWanted {
    fn from(value: i32) -> Self {
        if value <= 0 {
            return PeersWanted::AsManyAsPossible;
        }

        PeersWanted::Only {
            amount: usize::try_from(value).expect("the value is positive"),
        }
    }
}

impl From<Option<u32>> for PeersWanted {
    fn from(value: Option<u32>) -> Self {
        match value {
            None => PeersWanted::AsManyAsPossible,
            Some(0) => PeersWanted::Only { amount: 0 },
            Some(amount) => PeersWanted::Only {
                amount: amount as usize,
            },
        }
    }
}

/// The IP a peer is stored (and advertised) with.
///
/// A client announcing from the tracker host itself shows up with a loopback
/// address, which is useless to other peers. When the tracker knows its own
/// external IP it substitutes that instead.
#[must_use]
fn assign_ip_address_to_peer(remote_client_ip: &IpAddr, tracker_external_ip: Option<IpAddr>) -> IpAddr {
    if remote_client_ip.is_loopback() {
        if let Some(external_ip) = tracker_external_ip {
            return external_ip;
        }
    }

    *remote_client_ip
}

#[cfg(test)]
mod tests {

    mod the_peers_wanted_limit {
        use crate::announce_handler::PeersWanted;

        #[test]
        fn it_should_default_to_the_tracker_limit() {
            assert_eq!(PeersWanted::AsManyAsPossible.limit(50), 50);
            assert_eq!(PeersWanted::from(-1).limit(50), 50);
            assert_eq!(PeersWanted::from(0).limit(50), 50);
            assert_eq!(PeersWanted::from(None).limit(50), 50);
        }

        #[test]
        fn it_should_clamp_the_requested_amount_to_the_tracker_limit() {
            assert_eq!(PeersWanted::from(10).limit(50), 10);
            assert_eq!(PeersWanted::from(100).limit(50), 50);
            assert_eq!(PeersWanted::from(Some(100)).limit(50), 50);
        }

        #[test]
        fn an_explicit_zero_should_mean_no_peers() {
            assert_eq!(PeersWanted::from(Some(0)).limit(50), 0);
        }
    }

    mod the_ip_assignment {
        use std::net::{IpAddr, Ipv4Addr};

        use crate::announce_handler::assign_ip_address_to_peer;

        #[test]
        fn it_should_use_the_remote_ip_when_it_is_routable() {
            let remote = IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1));

            assert_eq!(
                assign_ip_address_to_peer(&remote, Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 196)))),
                remote
            );
        }

        #[test]
        fn it_should_replace_a_loopback_ip_with_the_configured_external_ip() {
            let external = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 196));

            assert_eq!(
                assign_ip_address_to_peer(&IpAddr::V4(Ipv4Addr::LOCALHOST), Some(external)),
                external
            );
        }

        #[test]
        fn it_should_keep_a_loopback_ip_when_no_external_ip_is_configured() {
            let loopback = IpAddr::V4(Ipv4Addr::LOCALHOST);

            assert_eq!(assign_ip_address_to_peer(&loopback, None), loopback);
        }
    }

    mod the_announce_handler {

        use peerhub_primitives::announce_event::AnnounceEvent;
        use peerhub_primitives::core::AnnounceData;
        use peerhub_primitives::info_hash::InfoHash;
        use peerhub_primitives::peer::Peer;

        use crate::announce_handler::PeersWanted;
        use crate::tests::{initialize_public_core_services, sample_info_hash, sample_peer, CoreServices};

        /// Announces a peer from its own address, like a client without a
        /// proxy in front would show up.
        fn announce_from(
            services: &CoreServices,
            info_hash: &InfoHash,
            peer: &mut Peer,
            peers_wanted: &PeersWanted,
        ) -> AnnounceData {
            let remote_ip = peer.ip();
            services.announce_handler.announce(info_hash, peer, &remote_ip, peers_wanted)
        }

        #[test]
        fn it_should_let_three_peers_progress_through_a_public_swarm() {
            let services = initialize_public_core_services();
            let info_hash = sample_info_hash();

            // A, a seeder, announces first: alone in the swarm.
            let mut peer_a = sample_peer(b"-TR2820-0000000peer1", 1, 6881, 0);
            let response = announce_from(&services, &info_hash, &mut peer_a, &PeersWanted::default());

            assert_eq!(response.stats.complete, 1);
            assert_eq!(response.stats.incomplete, 0);
            assert!(response.peers_v4.is_empty());

            // B, another seeder: sees no peers (seeders get leechers only).
            let mut peer_b = sample_peer(b"-TR2820-0000000peer2", 2, 6881, 0);
            let response = announce_from(&services, &info_hash, &mut peer_b, &PeersWanted::default());

            assert_eq!(response.stats.complete, 2);
            assert_eq!(response.stats.incomplete, 0);
            assert!(response.peers_v4.is_empty());

            // C, a leecher: gets both seeders.
            let mut peer_c = sample_peer(b"-TR2820-0000000peer3", 3, 6881, 1);
            let response = announce_from(&services, &info_hash, &mut peer_c, &PeersWanted::default());

            assert_eq!(response.stats.complete, 2);
            assert_eq!(response.stats.incomplete, 1);
            let mut returned: Vec<_> = response.peers_v4.iter().map(|peer| peer.peer_id).collect();
            returned.sort();
            assert_eq!(returned, vec![peer_a.peer_id, peer_b.peer_id]);

            // A stops: counts drop, response is valid with an empty list.
            let mut stopping_a = peer_a;
            stopping_a.event = AnnounceEvent::Stopped;
            let response = announce_from(&services, &info_hash, &mut stopping_a, &PeersWanted::default());

            assert_eq!(response.stats.complete, 1);
            assert_eq!(response.stats.incomplete, 1);
            assert!(response.peers_v4.is_empty());

            // C announces again: only B is left to hand out.
            let response = announce_from(&services, &info_hash, &mut peer_c, &PeersWanted::default());

            assert_eq!(response.stats.complete, 1);
            assert_eq!(response.stats.incomplete, 1);
            assert_eq!(
                response.peers_v4.iter().map(|peer| peer.peer_id).collect::<Vec<_>>(),
                vec![peer_b.peer_id]
            );
        }

        #[test]
        fn it_should_graduate_a_leecher_that_completes_the_download() {
            let services = initialize_public_core_services();
            let info_hash = sample_info_hash();

            let mut peer_d = sample_peer(b"-TR2820-0000000peerD", 4, 6881, 10);
            announce_from(&services, &info_hash, &mut peer_d, &PeersWanted::default());

            let mut completed_d = peer_d;
            completed_d.event = AnnounceEvent::Completed;
            completed_d.left = peerhub_primitives::NumberOfBytes::new(0);
            let response =
                announce_from(&services, &info_hash, &mut completed_d, &PeersWanted::default());

            assert_eq!(response.stats.complete, 1);
            assert_eq!(response.stats.incomplete, 0);

            // A leecher now finds D in the seeders portion of the response.
            let mut leecher = sample_peer(b"-TR2820-000000leech1", 5, 6881, 100);
            let response = announce_from(&services, &info_hash, &mut leecher, &PeersWanted::default());

            assert!(response
                .peers_v4
                .iter()
                .any(|peer| peer.peer_id == completed_d.peer_id && peer.is_seeder()));
        }

        #[test]
        fn it_should_accept_a_completed_event_from_an_unknown_peer_and_create_it_as_a_seeder() {
            let services = initialize_public_core_services();
            let info_hash = sample_info_hash();

            let mut unknown = sample_peer(b"-TR2820-00000unknown", 6, 6881, 0);
            unknown.event = AnnounceEvent::Completed;

            let response = announce_from(&services, &info_hash, &mut unknown, &PeersWanted::default());

            assert_eq!(response.stats.complete, 1);
            assert_eq!(response.stats.incomplete, 0);
        }

        #[test]
        fn it_should_never_return_the_announcing_peer_own_endpoint() {
            let services = initialize_public_core_services();
            let info_hash = sample_info_hash();

            let mut peer_e = sample_peer(b"-TR2820-0000000peerE", 7, 6881, 10);
            announce_from(&services, &info_hash, &mut peer_e, &PeersWanted::default());

            // Same endpoint announcing again with a different peer id.
            let mut same_endpoint = sample_peer(b"-TR2820-0000000peerF", 7, 6881, 10);
            let response =
                announce_from(&services, &info_hash, &mut same_endpoint, &PeersWanted::from(50));

            assert!(response
                .peers_v4
                .iter()
                .all(|peer| !peer.shares_endpoint_with(&same_endpoint.peer_addr)));
        }

        #[test]
        fn a_stopped_announce_from_an_unknown_peer_should_still_get_a_valid_empty_response() {
            let services = initialize_public_core_services();
            let info_hash = sample_info_hash();

            let mut unknown = sample_peer(b"-TR2820-00000unknown", 8, 6881, 10);
            unknown.event = AnnounceEvent::Stopped;

            let response = announce_from(&services, &info_hash, &mut unknown, &PeersWanted::default());

            assert_eq!(response.stats.complete, 0);
            assert_eq!(response.stats.incomplete, 0);
            assert!(response.peers_v4.is_empty());
            assert!(response.peers_v6.is_empty());
        }

        #[test]
        fn the_response_should_include_the_configured_announce_policy() {
            let services = initialize_public_core_services();

            let mut peer = sample_peer(b"-TR2820-0000000peerG", 9, 6881, 0);
            let response = announce_from(&services, &sample_info_hash(), &mut peer, &PeersWanted::default());

            assert_eq!(response.policy, services.core_config.announce_policy);
            assert!(response.policy.interval >= response.policy.interval_min);
        }

        #[test]
        fn it_should_clamp_the_number_of_returned_peers_to_numwant() {
            let services = initialize_public_core_services();
            let info_hash = sample_info_hash();

            for idx in 0..10u8 {
                let mut seeder = sample_peer(b"-TR2820-0000000seedX", 10 + idx, 6881, 0);
                seeder.peer_id.0[19] = idx;
                announce_from(&services, &info_hash, &mut seeder, &PeersWanted::default());
            }

            let mut leecher = sample_peer(b"-TR2820-000000leechY", 50, 6881, 100);
            let response = announce_from(&services, &info_hash, &mut leecher, &PeersWanted::from(3));

            assert_eq!(response.peers_v4.len(), 3);
        }
    }
}
