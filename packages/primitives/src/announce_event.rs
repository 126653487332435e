//! The event reported by a peer in an announce request.
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// This is a key that maps to `started`, `completed`, `stopped` or `paused`.
/// An absent key is the same as [`AnnounceEvent::None`].
///
/// `paused` only exists on the HTTP tracker (BEP 21 partial seeds announce it
/// to signal they stopped leeching); the UDP wire format has no code for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnounceEvent {
    #[default]
    None,
    Started,
    Completed,
    Stopped,
    Paused,
}

impl AnnounceEvent {
    /// True for the events that remove the peer from the swarm.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnnounceEvent::Stopped | AnnounceEvent::Paused)
    }
}

impl std::fmt::Display for AnnounceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnounceEvent::None => write!(f, "empty"),
            AnnounceEvent::Started => write!(f, "started"),
            AnnounceEvent::Completed => write!(f, "completed"),
            AnnounceEvent::Stopped => write!(f, "stopped"),
            AnnounceEvent::Paused => write!(f, "paused"),
        }
    }
}

impl FromStr for AnnounceEvent {
    type Err = ParseAnnounceEventError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "" => Ok(AnnounceEvent::None),
            "started" => Ok(AnnounceEvent::Started),
            "completed" => Ok(AnnounceEvent::Completed),
            "stopped" => Ok(AnnounceEvent::Stopped),
            "paused" => Ok(AnnounceEvent::Paused),
            _ => Err(ParseAnnounceEventError::UnknownEvent { raw: raw.to_string() }),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ParseAnnounceEventError {
    #[error("unknown announce event: {raw}")]
    UnknownEvent { raw: String },
}

#[cfg(test)]
mod tests {

    mod the_announce_event {
        use std::str::FromStr;

        use crate::announce_event::AnnounceEvent;

        #[test]
        fn it_should_be_parsed_from_the_http_event_param() {
            assert_eq!(AnnounceEvent::from_str("started").unwrap(), AnnounceEvent::Started);
            assert_eq!(AnnounceEvent::from_str("completed").unwrap(), AnnounceEvent::Completed);
            assert_eq!(AnnounceEvent::from_str("stopped").unwrap(), AnnounceEvent::Stopped);
            assert_eq!(AnnounceEvent::from_str("paused").unwrap(), AnnounceEvent::Paused);
        }

        #[test]
        fn it_should_treat_an_empty_param_as_no_event() {
            assert_eq!(AnnounceEvent::from_str("").unwrap(), AnnounceEvent::None);
        }

        #[test]
        fn it_should_reject_unknown_events() {
            assert!(AnnounceEvent::from_str("finished").is_err());
        }

        #[test]
        fn stopped_and_paused_should_be_terminal() {
            assert!(AnnounceEvent::Stopped.is_terminal());
            assert!(AnnounceEvent::Paused.is_terminal());
            assert!(!AnnounceEvent::Started.is_terminal());
            assert!(!AnnounceEvent::None.is_terminal());
            assert!(!AnnounceEvent::Completed.is_terminal());
        }
    }
}
