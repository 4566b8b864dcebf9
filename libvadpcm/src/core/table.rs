//! sound table: many SSND payloads packed into one bank
//!
//! identical payloads are stored once, keyed by their blake3 hash.

use std::collections::HashMap;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use super::types::AifcFile;

/// entries start on this boundary inside the bank
pub const TABLE_ALIGNMENT: usize = 16;

/// where a payload ended up in the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub offset: usize,
    pub length: usize,
}

/// growable sound bank
#[derive(Debug, Default)]
pub struct SoundTable {
    data: Vec<u8>,
    entries: Vec<TableEntry>,
    seen: HashMap<[u8; 32], TableEntry>,
}

impl SoundTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// add a payload, returns the existing entry for duplicates
    pub fn insert(&mut self, payload: &[u8]) -> TableEntry {
        let key = payload_hash(payload);
        if let Some(entry) = self.seen.get(&key) {
            log::debug!(
                "sound table: {} byte payload already at offset {}",
                payload.len(),
                entry.offset
            );
            self.entries.push(*entry);
            return *entry;
        }

        let padding = (TABLE_ALIGNMENT - self.data.len() % TABLE_ALIGNMENT) % TABLE_ALIGNMENT;
        self.data.resize(self.data.len() + padding, 0);

        let entry = TableEntry {
            offset: self.data.len(),
            length: payload.len(),
        };
        self.data.extend_from_slice(payload);
        self.seen.insert(key, entry);
        self.entries.push(entry);
        entry
    }

    /// add the sound data of a parsed file
    pub fn insert_file(&mut self, file: &AifcFile) -> TableEntry {
        self.insert(file.sound_data())
    }

    /// one entry per insert call, in call order
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// number of distinct payloads stored
    pub fn unique_count(&self) -> usize {
        self.seen.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

fn payload_hash(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(&(payload.len() as u64).to_le_bytes());
    hasher.update(payload);
    hasher.finalize().into()
}
