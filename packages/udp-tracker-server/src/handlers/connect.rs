//! UDP tracker connect handler.
use std::net::SocketAddr;
use std::sync::Arc;

use peerhub_udp_protocol::request::ConnectRequest;
use peerhub_udp_protocol::response::{ConnectResponse, Response};

use crate::container::UdpTrackerServices;

/// Handles a `connect` request: mints a connection-ID cookie for the source
/// address and echoes the transaction ID.
pub fn handle_connect(
    client_socket_addr: SocketAddr,
    request: &ConnectRequest,
    services: &Arc<UdpTrackerServices>,
) -> Response {
    let connection_id = services.connection_cookie.generate(&client_socket_addr.ip());

    services.stats_repository.record_connection(client_socket_addr.ip().into());

    tracing::trace!(target: crate::UDP_TRACKER_LOG_TARGET, from = %client_socket_addr, "connect handled");

    Response::from(ConnectResponse {
        transaction_id: request.transaction_id,
        connection_id,
    })
}

#[cfg(test)]
mod tests {

    mod the_connect_handler {

        use peerhub_udp_protocol::request::ConnectRequest;
        use peerhub_udp_protocol::response::Response;
        use peerhub_udp_protocol::TransactionId;

        use crate::handlers::connect::handle_connect;
        use crate::tests::{initialize_public_services, sample_ipv4_remote_addr, sample_ipv6_remote_addr};

        #[test]
        fn the_response_should_contain_the_same_transaction_id_as_the_request() {
            let env = initialize_public_services();

            let response = handle_connect(
                sample_ipv4_remote_addr(),
                &ConnectRequest {
                    transaction_id: TransactionId(0x0102_0304),
                },
                &env.services,
            );

            match response {
                Response::Connect(connect_response) => {
                    assert_eq!(connect_response.transaction_id, TransactionId(0x0102_0304));
                }
                other => panic!("expected a connect response, got {other:?}"),
            }
        }

        #[test]
        fn the_response_should_contain_a_cookie_that_verifies_for_the_client_ip() {
            let env = initialize_public_services();

            let response = handle_connect(
                sample_ipv4_remote_addr(),
                &ConnectRequest {
                    transaction_id: TransactionId(1),
                },
                &env.services,
            );

            match response {
                Response::Connect(connect_response) => {
                    assert!(env
                        .services
                        .connection_cookie
                        .check(&connect_response.connection_id, &sample_ipv4_remote_addr().ip())
                        .is_ok());
                }
                other => panic!("expected a connect response, got {other:?}"),
            }
        }

        #[test]
        fn it_should_count_the_handshakes_per_address_family() {
            let env = initialize_public_services();

            handle_connect(
                sample_ipv4_remote_addr(),
                &ConnectRequest {
                    transaction_id: TransactionId(1),
                },
                &env.services,
            );
            handle_connect(
                sample_ipv6_remote_addr(),
                &ConnectRequest {
                    transaction_id: TransactionId(2),
                },
                &env.services,
            );

            let metrics = env.services.stats_repository.metrics();

            assert_eq!(metrics.udp4_connections_handled, 1);
            assert_eq!(metrics.udp6_connections_handled, 1);
        }
    }
}
