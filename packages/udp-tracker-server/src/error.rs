//! The error type of the UDP request pipeline.
use peerhub_tracker_core::whitelist::authorization::WhitelistError;
use peerhub_udp_protocol::request::RequestParseError;
use thiserror::Error;

use crate::connection_cookie::ConnectionCookieError;

/// Everything that can go wrong while serving one datagram.
///
/// Each variant maps to the message of the error action sent back to the
/// client; packets too mangled to carry a transaction ID are dropped before
/// this type is ever built.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid request: {source}")]
    InvalidRequest {
        #[from]
        source: RequestParseError,
    },

    #[error("{source}")]
    ConnectionCookie {
        #[from]
        source: ConnectionCookieError,
    },

    #[error("access denied: {source}")]
    Unauthorized {
        #[from]
        source: WhitelistError,
    },
}

impl Error {
    /// The message sent to the client in the error action.
    ///
    /// Cookie failures use the exact wording clients grep for; everything
    /// else is kept generic on purpose.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidRequest { .. } => "bad request".to_string(),
            Error::ConnectionCookie { .. } => "bad connection ID".to_string(),
            Error::Unauthorized { .. } => "access denied".to_string(),
        }
    }
}
