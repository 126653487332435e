//! Percent-decoding for the binary query parameters.
//!
//! `info_hash` and `peer_id` are 20 raw bytes percent-encoded into the query
//! string; decoding them as UTF-8 text would mangle them.
use peerhub_primitives::info_hash::{ConversionError, InfoHash};
use peerhub_primitives::peer::{IdConversionError, PeerId};
use percent_encoding::percent_decode_str;

/// Decodes a percent-encoded infohash param value.
///
/// # Errors
///
/// Fails when the decoded value is not exactly 20 bytes.
pub fn percent_decode_info_hash(raw: &str) -> Result<InfoHash, ConversionError> {
    let bytes: Vec<u8> = percent_decode_str(raw).collect();
    InfoHash::try_from(bytes.as_slice())
}

/// Decodes a percent-encoded peer id param value.
///
/// # Errors
///
/// Fails when the decoded value is not exactly 20 bytes.
pub fn percent_decode_peer_id(raw: &str) -> Result<PeerId, IdConversionError> {
    let bytes: Vec<u8> = percent_decode_str(raw).collect();
    PeerId::try_from(bytes.as_slice())
}
