//! Handles one datagram from parse to response.
use std::io::Cursor;
use std::sync::Arc;

use crate::container::UdpTrackerServices;
use crate::handlers;
use crate::server::bound_socket::BoundSocket;
use crate::RawRequest;

pub struct Processor {
    socket: Arc<BoundSocket>,
    services: Arc<UdpTrackerServices>,
}

impl Processor {
    #[must_use]
    pub fn new(socket: Arc<BoundSocket>, services: Arc<UdpTrackerServices>) -> Self {
        Self { socket, services }
    }

    pub async fn process_request(self, request: RawRequest) {
        let client_socket_addr = request.from;

        let Some(response) = handlers::handle_packet(&request, &self.services).await else {
            // Unsendable packets are dropped silently.
            return;
        };

        let mut writer = Cursor::new(Vec::with_capacity(200));

        match response.write_bytes(&mut writer) {
            Ok(()) => {
                let payload = writer.get_ref();

                match self.socket.send_to(payload, &client_socket_addr).await {
                    Ok(sent_bytes) => {
                        tracing::trace!(target: crate::UDP_TRACKER_LOG_TARGET, to = %client_socket_addr, %sent_bytes, "response sent");
                    }
                    // It doesn't matter if the response reaches the client;
                    // UDP trackers make no delivery promises.
                    Err(error) => {
                        tracing::warn!(target: crate::UDP_TRACKER_LOG_TARGET, to = %client_socket_addr, %error, "failed to send response");
                    }
                }
            }
            Err(error) => {
                tracing::error!(target: crate::UDP_TRACKER_LOG_TARGET, %error, "failed to serialize response");
            }
        }
    }
}
