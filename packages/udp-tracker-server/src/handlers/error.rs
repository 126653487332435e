//! Turns pipeline failures into error actions.
use std::sync::Arc;

use peerhub_udp_protocol::response::{ErrorResponse, Response};
use peerhub_udp_protocol::TransactionId;

use crate::container::UdpTrackerServices;
use crate::error::Error;

/// Builds the error action for a failed request, echoing the transaction ID
/// of the offending packet.
pub fn handle_error(error: &Error, transaction_id: TransactionId, services: &Arc<UdpTrackerServices>) -> Response {
    tracing::debug!(target: crate::UDP_TRACKER_LOG_TARGET, %error, "request failed");

    services.stats_repository.record_udp_error();

    Response::from(ErrorResponse {
        transaction_id,
        message: error.client_message(),
    })
}
