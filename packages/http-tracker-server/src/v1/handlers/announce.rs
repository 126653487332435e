//! HTTP tracker announce handler.
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use peerhub_http_protocol::v1::query::Query;
use peerhub_http_protocol::v1::requests::announce::{Announce, Compact};
use peerhub_http_protocol::v1::responses;
use peerhub_primitives::peer::Peer;
use peerhub_primitives::DurationSinceUnixEpoch;
use peerhub_tracker_core::announce_handler::PeersWanted;
use peerhub_tracker_core::statistics::Protocol;

use crate::container::HttpTrackerServices;
use crate::v1::extractors::client_ip_sources::extract_client_ip_sources;
use crate::v1::handlers::{check_key, client_error_response, internal_server_error_response, resolve_remote_client_ip};

/// Handles `GET /announce`.
pub async fn handle_without_key(
    State(services): State<Arc<HttpTrackerServices>>,
    ConnectInfo(client_socket_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Response {
    handle(&services, client_socket_addr, &headers, raw_query, None).await
}

/// Handles `GET /announce/{key}` (private mode).
pub async fn handle_with_key(
    State(services): State<Arc<HttpTrackerServices>>,
    Path(key): Path<String>,
    ConnectInfo(client_socket_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Response {
    handle(&services, client_socket_addr, &headers, raw_query, Some(key)).await
}

async fn handle(
    services: &Arc<HttpTrackerServices>,
    client_socket_addr: SocketAddr,
    headers: &HeaderMap,
    raw_query: Option<String>,
    opt_key: Option<String>,
) -> Response {
    if let Err(response) = check_key(services, opt_key.as_deref()) {
        return response;
    }

    let Some(raw_query) = raw_query else {
        return client_error_response("missing query params for announce request".to_string());
    };

    let query: Query = raw_query.parse().unwrap_or_default();

    let announce_request = match Announce::try_from(query) {
        Ok(announce_request) => announce_request,
        Err(error) => return client_error_response(error.to_string()),
    };

    if let Err(error) = services.whitelist_authorization.authorize(&announce_request.info_hash).await {
        return client_error_response(error.to_string());
    }

    let client_ip_sources = extract_client_ip_sources(headers, client_socket_addr);

    let resolved_ip = match resolve_remote_client_ip(services, &client_ip_sources) {
        Ok(resolved_ip) => resolved_ip,
        Err(response) => return response,
    };

    // The IP the client claims in the query is only honored when the
    // tracker is configured to allow spoofing.
    let remote_client_ip = match (services.core_config.net.allow_ip_spoofing, announce_request.ip) {
        (true, Some(declared_ip)) => declared_ip,
        _ => resolved_ip,
    };

    let mut peer = build_peer(&announce_request, &remote_client_ip);

    let peers_wanted: PeersWanted = announce_request.numwant.into();

    let announce_data = services
        .announce_handler
        .announce(&announce_request.info_hash, &mut peer, &remote_client_ip, &peers_wanted);

    services
        .stats_repository
        .record_announce(Protocol::Http, remote_client_ip.into());

    let body = match announce_request.compact {
        Some(Compact::Accepted) => responses::announce::Compact::from(&announce_data).body(),
        _ => responses::announce::NonCompact::from(&announce_data).body(),
    };

    match body {
        Ok(bytes) => (StatusCode::OK, bytes).into_response(),
        Err(error) => {
            tracing::error!(target: crate::HTTP_TRACKER_LOG_TARGET, %error, "failed to bencode announce response");
            internal_server_error_response()
        }
    }
}

fn build_peer(announce_request: &Announce, peer_ip: &IpAddr) -> Peer {
    Peer {
        peer_id: announce_request.peer_id,
        peer_addr: SocketAddr::new(*peer_ip, announce_request.port),
        updated: DurationSinceUnixEpoch::default(),
        uploaded: announce_request.uploaded,
        downloaded: announce_request.downloaded,
        left: announce_request.left,
        event: announce_request.event.unwrap_or_default(),
    }
}
