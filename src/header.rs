use std::path::Path;

use crate::error::StoreError;
use crate::store::client::StoreClient;
use crate::store::{StoreKey, StorePrimitive};

pub use crate::store::HEADER_SENTINEL;

/// Sentinel-prefixed list of record names, in store order.
///
/// `entries()[0]` is always [`HEADER_SENTINEL`]; `entries()[n]` names record `n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    entries: Vec<String>,
}

impl Header {
    /// A header with no records.
    pub fn empty() -> Self {
        Self {
            entries: vec![HEADER_SENTINEL.to_string()],
        }
    }

    /// Returns `None` unless the first entry is the sentinel.
    pub fn from_entries(entries: Vec<String>) -> Option<Self> {
        if entries.first().map(String::as_str) == Some(HEADER_SENTINEL) {
            Some(Self { entries })
        } else {
            None
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Record names without the sentinel.
    pub fn names(&self) -> &[String] {
        &self.entries[1..]
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name at 1-based `position`.
    pub fn get(&self, position: usize) -> Option<&str> {
        if position == 0 {
            return None;
        }
        self.entries.get(position).map(String::as_str)
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.names().iter().position(|n| n == name).map(|i| i + 1)
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::empty()
    }
}

/// In-memory mirror of a store's header. Only ever replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct HeaderCache {
    header: Header,
    stale: bool,
}

impl HeaderCache {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            stale: false,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// True after a committed change whose reload failed.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Re-read the header. On failure the previous header is kept.
    pub fn refresh<P: StorePrimitive>(
        &mut self,
        client: &StoreClient<P>,
        path: &Path,
        key: &StoreKey,
    ) -> Result<(), StoreError> {
        let header = client.read_header(path, key)?;
        log::debug!("header refreshed: {} records", header.len());
        self.header = header;
        self.stale = false;
        Ok(())
    }
}
