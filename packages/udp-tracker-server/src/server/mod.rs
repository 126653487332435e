//! The UDP server: a bound socket, a receiver loop and one task per
//! datagram.
pub mod bound_socket;
pub mod processor;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::container::UdpTrackerServices;
use crate::server::bound_socket::BoundSocket;
use crate::server::processor::Processor;
use crate::RawRequest;

/// The largest datagram the server reads. A full scrape request is 1496
/// bytes; anything larger is cut off and will fail to parse.
pub const MAX_PACKET_SIZE: usize = 2048;

/// A running UDP tracker instance.
pub struct Started {
    /// The resolved local address (useful when binding to port 0).
    pub binding: SocketAddr,

    /// The receiver loop task. It finishes when the cancellation token
    /// fires.
    pub task: JoinHandle<()>,
}

/// Binds the socket and spawns the receiver loop.
///
/// Every datagram is handed to its own task so a slow swarm cannot stall
/// the socket.
///
/// # Errors
///
/// Returns an error when the socket cannot be bound.
pub async fn start(
    bind_address: SocketAddr,
    services: Arc<UdpTrackerServices>,
    cancellation_token: CancellationToken,
) -> io::Result<Started> {
    let socket = Arc::new(BoundSocket::new(bind_address).await?);

    let binding = socket.address();

    tracing::info!(target: crate::UDP_TRACKER_LOG_TARGET, %binding, "UDP tracker started");

    let task = tokio::spawn(run_receiver_loop(socket, services, cancellation_token));

    Ok(Started { binding, task })
}

async fn run_receiver_loop(socket: Arc<BoundSocket>, services: Arc<UdpTrackerServices>, cancellation_token: CancellationToken) {
    let mut buffer = [0u8; MAX_PACKET_SIZE];

    loop {
        tokio::select! {
            () = cancellation_token.cancelled() => {
                tracing::info!(target: crate::UDP_TRACKER_LOG_TARGET, binding = %socket.address(), "UDP tracker stopped");
                break;
            }
            received = socket.recv_from(&mut buffer) => {
                match received {
                    Ok((len, from)) => {
                        let request = RawRequest {
                            payload: buffer[..len].to_vec(),
                            from,
                        };

                        let processor = Processor::new(socket.clone(), services.clone());

                        tokio::spawn(async move { processor.process_request(request).await });
                    }
                    Err(error) => {
                        // Transient receive errors (e.g. ICMP port
                        // unreachable bounced back on some platforms) must
                        // not kill the receiver loop.
                        tracing::warn!(target: crate::UDP_TRACKER_LOG_TARGET, %error, "failed to receive a datagram");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use std::net::SocketAddr;

    use tokio_util::sync::CancellationToken;

    use crate::server::start;
    use crate::tests::initialize_public_services;

    #[tokio::test]
    async fn it_should_bind_to_an_ephemeral_port_and_stop_on_cancellation() {
        let env = initialize_public_services();

        let bind_address: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let cancellation_token = CancellationToken::new();

        let started = start(bind_address, env.services.clone(), cancellation_token.clone())
            .await
            .unwrap();

        assert_ne!(started.binding.port(), 0);

        cancellation_token.cancel();

        started.task.await.unwrap();
    }
}
