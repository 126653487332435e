//! Route handlers and the helpers they share.
pub mod announce;
pub mod health_check;
pub mod scrape;

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use peerhub_http_protocol::v1::responses;
use peerhub_http_protocol::v1::services::peer_ip_resolver::{self, ClientIpSources};

use crate::container::HttpTrackerServices;

/// A client error: bencoded failure reason with HTTP status 200.
pub(crate) fn client_error_response(failure_reason: String) -> Response {
    (StatusCode::OK, responses::error::Error::new(failure_reason).body()).into_response()
}

/// An internal error: plain HTTP 500, no body. Details stay in the logs.
pub(crate) fn internal_server_error_response() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

/// Resolves the client IP for this request, honoring the reverse proxy
/// configuration.
pub(crate) fn resolve_remote_client_ip(
    services: &Arc<HttpTrackerServices>,
    client_ip_sources: &ClientIpSources,
) -> Result<IpAddr, Response> {
    peer_ip_resolver::resolve_remote_client_ip(services.core_config.net.reverse_proxy.into(), client_ip_sources)
        .map_err(|err| client_error_response(err.to_string()))
}

/// In private mode every announce and scrape must come through the
/// `/{key}` route aliases with a well-formed passkey. Resolving the key to
/// a user is an external collaborator's job; a missing or malformed key is
/// rejected here.
pub(crate) fn check_key(services: &Arc<HttpTrackerServices>, opt_key: Option<&str>) -> Result<(), Response> {
    if !services.core_config.private {
        return Ok(());
    }

    match opt_key {
        Some(key) if is_well_formed_key(key) => Ok(()),
        _ => Err(client_error_response("access denied".to_string())),
    }
}

fn is_well_formed_key(key: &str) -> bool {
    key.len() == 32 && key.chars().all(|character| character.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {

    mod the_key_check {
        use peerhub_configuration::Configuration;

        use crate::tests::initialize_services;
        use crate::v1::handlers::check_key;

        fn private_configuration() -> Configuration {
            let mut config = Configuration::default();
            config.core.private = true;
            config
        }

        #[test]
        fn it_should_accept_any_request_when_the_tracker_is_public() {
            let env = crate::tests::initialize_public_services();

            assert!(check_key(&env.services, None).is_ok());
            assert!(check_key(&env.services, Some("whatever")).is_ok());
        }

        #[test]
        fn it_should_require_a_well_formed_key_in_private_mode() {
            let env = initialize_services(&private_configuration());

            assert!(check_key(&env.services, Some("YZSl4lMZupRuOpSRC3krIKR5BPB14nrJ")).is_ok());
            assert!(check_key(&env.services, None).is_err());
            assert!(check_key(&env.services, Some("too-short")).is_err());
            assert!(check_key(&env.services, Some("invalid-key-with-32-characters!!")).is_err());
        }
    }
}
