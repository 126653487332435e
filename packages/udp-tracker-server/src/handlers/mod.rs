//! Handlers for the UDP server.
pub mod announce;
pub mod connect;
pub mod error;
pub mod scrape;

use std::net::SocketAddr;
use std::sync::Arc;

use peerhub_configuration::MAX_SCRAPE_TORRENTS;
use peerhub_udp_protocol::request::{Request, RequestParseError};
use peerhub_udp_protocol::response::Response;
use peerhub_udp_protocol::TransactionId;

use crate::container::UdpTrackerServices;
use crate::error::Error;
use crate::RawRequest;

/// Handles one incoming datagram: parse, dispatch, and turn failures into
/// error actions.
///
/// Returns `None` when the packet is dropped: either it was too mangled to
/// even echo a transaction ID, or the sender used the `connect` action with
/// a bogus protocol identifier (answering those would make the tracker a
/// reflection amplifier).
pub async fn handle_packet(udp_request: &RawRequest, services: &Arc<UdpTrackerServices>) -> Option<Response> {
    tracing::trace!(target: crate::UDP_TRACKER_LOG_TARGET, from = %udp_request.from, "handling packet");

    match Request::parse_bytes(&udp_request.payload, MAX_SCRAPE_TORRENTS) {
        Ok(request) => match handle_request(request, udp_request.from, services).await {
            Ok(response) => Some(response),
            Err((request_error, transaction_id)) => Some(error::handle_error(&request_error, transaction_id, services)),
        },
        Err(parse_error) => {
            if let RequestParseError::Sendable { transaction_id, .. } = &parse_error {
                let transaction_id = *transaction_id;
                Some(error::handle_error(&Error::from(parse_error), transaction_id, services))
            } else {
                tracing::debug!(target: crate::UDP_TRACKER_LOG_TARGET, from = %udp_request.from, %parse_error, "dropping packet");
                services.stats_repository.record_udp_error();
                None
            }
        }
    }
}

/// Dispatches a parsed request to its handler.
///
/// # Errors
///
/// Forwards the handler error together with the transaction ID so the caller
/// can build the error action.
pub async fn handle_request(
    request: Request,
    client_socket_addr: SocketAddr,
    services: &Arc<UdpTrackerServices>,
) -> Result<Response, (Error, TransactionId)> {
    match request {
        Request::Connect(connect_request) => Ok(connect::handle_connect(client_socket_addr, &connect_request, services)),
        Request::Announce(announce_request) => announce::handle_announce(client_socket_addr, &announce_request, services).await,
        Request::Scrape(scrape_request) => scrape::handle_scrape(client_socket_addr, &scrape_request, services).await,
    }
}

#[cfg(test)]
mod tests {

    mod when_handling_a_raw_packet {

        use peerhub_udp_protocol::request::{ConnectRequest, Request};
        use peerhub_udp_protocol::response::Response;
        use peerhub_udp_protocol::TransactionId;

        use crate::handlers::handle_packet;
        use crate::tests::{initialize_public_services, sample_ipv4_remote_addr};
        use crate::RawRequest;

        #[tokio::test]
        async fn a_well_formed_connect_packet_should_get_a_connect_response() {
            let env = initialize_public_services();

            let mut payload = Vec::new();
            Request::from(ConnectRequest {
                transaction_id: TransactionId(0x0102_0304),
            })
            .write_bytes(&mut payload)
            .unwrap();

            let response = handle_packet(
                &RawRequest {
                    payload,
                    from: sample_ipv4_remote_addr(),
                },
                &env.services,
            )
            .await
            .expect("a connect packet deserves a response");

            match response {
                Response::Connect(connect_response) => {
                    assert_eq!(connect_response.transaction_id, TransactionId(0x0102_0304));
                }
                other => panic!("expected a connect response, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn a_packet_too_short_for_a_header_should_be_dropped() {
            let env = initialize_public_services();

            let response = handle_packet(
                &RawRequest {
                    payload: vec![0u8; 7],
                    from: sample_ipv4_remote_addr(),
                },
                &env.services,
            )
            .await;

            assert!(response.is_none());
        }

        #[tokio::test]
        async fn a_connect_packet_without_the_protocol_magic_should_be_dropped() {
            let env = initialize_public_services();

            let mut payload = Vec::new();
            Request::from(ConnectRequest {
                transaction_id: TransactionId(1),
            })
            .write_bytes(&mut payload)
            .unwrap();
            payload[0] = 0xFF;

            let response = handle_packet(
                &RawRequest {
                    payload,
                    from: sample_ipv4_remote_addr(),
                },
                &env.services,
            )
            .await;

            assert!(response.is_none());
        }

        #[tokio::test]
        async fn a_truncated_announce_should_get_an_error_action_echoing_the_transaction_id() {
            let env = initialize_public_services();

            // Header claims an announce, body is missing.
            let mut payload = Vec::new();
            payload.extend_from_slice(&1i64.to_be_bytes());
            payload.extend_from_slice(&1i32.to_be_bytes());
            payload.extend_from_slice(&0x0102_0304i32.to_be_bytes());

            let response = handle_packet(
                &RawRequest {
                    payload,
                    from: sample_ipv4_remote_addr(),
                },
                &env.services,
            )
            .await
            .expect("a recoverable transaction id deserves an error action");

            match response {
                Response::Error(error_response) => {
                    assert_eq!(error_response.transaction_id, TransactionId(0x0102_0304));
                    assert_eq!(error_response.message, "bad request");
                }
                other => panic!("expected an error response, got {other:?}"),
            }
        }
    }
}
