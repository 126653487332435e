//! HTTP tracker scrape handler.
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use peerhub_http_protocol::v1::query::Query;
use peerhub_http_protocol::v1::requests::scrape::Scrape;
use peerhub_http_protocol::v1::responses;
use peerhub_tracker_core::statistics::Protocol;

use crate::container::HttpTrackerServices;
use crate::v1::extractors::client_ip_sources::extract_client_ip_sources;
use crate::v1::handlers::{check_key, client_error_response, resolve_remote_client_ip};

/// Handles `GET /scrape`.
pub async fn handle_without_key(
    State(services): State<Arc<HttpTrackerServices>>,
    ConnectInfo(client_socket_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Response {
    handle(&services, client_socket_addr, &headers, raw_query, None).await
}

/// Handles `GET /scrape/{key}` (private mode).
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
        return client_error_response("missing query params for scrape request".to_string());
    };

    let query: Query = raw_query.parse().unwrap_or_default();

    let scrape_request = match Scrape::try_from(query) {
        Ok(scrape_request) => scrape_request,
        Err(error) => return client_error_response(error.to_string()),
    };

    let client_ip_sources = extract_client_ip_sources(headers, client_socket_addr);

    let remote_client_ip = match resolve_remote_client_ip(services, &client_ip_sources) {
        Ok(remote_client_ip) => remote_client_ip,
        Err(response) => return response,
    };

    let scrape_data = services
        .scrape_handler
        .scrape(&scrape_request.info_hashes, remote_client_ip.into())
        .await;

    services.stats_repository.record_scrape(Protocol::Http, remote_client_ip.into());

    (StatusCode::OK, responses::scrape::Scrape::from(&scrape_data).body()).into_response()
}
