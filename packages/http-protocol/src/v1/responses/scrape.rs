//! `Scrape` response body.
use std::collections::BTreeMap;

use peerhub_primitives::core::ScrapeData;

/// Bencoded scrape response: a `files` dictionary keyed by the raw 20-byte
/// infohashes.
///
/// ```text
/// d5:filesd<infohash>d8:completei1e10:downloadedi0e10:incompletei2eeee
/// ```
///
/// The infohash keys are arbitrary bytes, which bencoded dictionaries allow
/// but textual serializers do not, so the body is written out directly.
/// Bencoded dictionaries are sorted by their raw key bytes; the `BTreeMap`
/// provides that order.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Scrape {
    pub files: BTreeMap<[u8; 20], File>,
}

/// Aggregate counts for one torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct File {
    /// Number of seeders.
    pub complete: u32,

    /// Number of recorded completions. Owned by an external collaborator, so
    /// the core always reports zero.
    pub downloaded: u32,

    /// Number of leechers.
    pub incomplete: u32,
}

impl Scrape {
    /// The bencoded body.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = b"d5:filesd".to_vec();

        for (info_hash, file) in &self.files {
            bytes.extend_from_slice(b"20:");
            bytes.extend_from_slice(info_hash);
            bytes.extend_from_slice(
                format!(
                    "d8:completei{}e10:downloadedi{}e10:incompletei{}ee",
                    file.complete, file.downloaded, file.incomplete
                )
                .as_bytes(),
            );
        }

        bytes.extend_from_slice(b"ee");

        bytes
    }
}

impl From<&ScrapeData> for Scrape {
    fn from(scrape_data: &ScrapeData) -> Self {
        let files = scrape_data
            .files
            .iter()
            .map(|entry| {
                (
                    entry.info_hash.bytes(),
                    File {
                        complete: entry.stats.complete,
                        downloaded: entry.stats.downloaded,
                        incomplete: entry.stats.incomplete,
                    },
                )
            })
            .collect();

        Self { files }
    }
}
