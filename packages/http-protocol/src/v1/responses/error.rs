//! Client error response body.
//!
//! `BitTorrent` clients expect tracker failures as a bencoded dictionary with
//! a `failure reason` key and HTTP status 200, not as an HTTP error status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub failure_reason: String,
}

impl Error {
    #[must_use]
    pub fn new(failure_reason: String) -> Self {
        Self { failure_reason }
    }

    /// The bencoded body: `d14:failure reason<len>:<reason>e`.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        format!("d14:failure reason{}:{}e", self.failure_reason.len(), self.failure_reason).into_bytes()
    }
}
