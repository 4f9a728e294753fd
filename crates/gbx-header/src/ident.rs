//! Identifier ("lookback string") decoding.
//!
//! GBX chunks compress repeated strings into 32-bit identifiers:
//!
//! - `0xFFFFFFFF`: no value
//! - top two bits `00`: numeric collection id in the low 30 bits
//! - top two bits set, low bits `0`: a new string follows inline and is
//!   appended to the table
//! - top two bits set, low bits `n`: the `n`-th string seen so far (1-based)
//!
//! The table also carries the context version, read from the stream before
//! the first identifier (and before every identifier while it is below 3).

use gbx_common::GbxReader;

use crate::collection::{collection_name, UNASSIGNED};
use crate::{Error, Result};

const INDEX_MASK: u32 = 0x3FFF_FFFF;
const KIND_MASK: u32 = 0xC000_0000;

/// A decoded identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identifier {
    /// Resolved name, empty when unassigned or unresolvable.
    pub name: String,
    /// Raw 32-bit value as stored in the file.
    pub raw: u32,
}

/// Per-file identifier context.
#[derive(Debug, Clone, Default)]
pub struct IdentifierTable {
    version: u32,
    entries: Vec<String>,
}

impl IdentifierTable {
    /// Create an empty table with an unread version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context version, 0 until read.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Strings learned so far, in table order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Look up a 1-based table index.
    pub fn get(&self, index: u32) -> Option<&str> {
        let slot = usize::try_from(index).ok()?.checked_sub(1)?;
        self.entries.get(slot).map(String::as_str)
    }

    /// Forget the version and every learned string.
    pub fn reset(&mut self) {
        self.version = 0;
        self.entries.clear();
    }

    /// Decode one identifier from `r`.
    pub fn read(&mut self, r: &mut GbxReader<'_>) -> Result<Identifier> {
        if self.version < 3 {
            let version = r.nat32()?;
            if version < 2 {
                return Err(Error::IdentifierVersion(version));
            }
            self.version = version;
        }

        let raw = r.nat32()?;
        let name = if raw == UNASSIGNED {
            String::new()
        } else if raw & KIND_MASK == 0 {
            collection_name(raw & INDEX_MASK)
        } else if self.version == 2 || raw & INDEX_MASK == 0 {
            let name = r.string()?;
            if !name.is_empty() {
                self.entries.push(name.clone());
            }
            name
        } else {
            self.get(raw & INDEX_MASK).unwrap_or_default().to_string()
        };

        Ok(Identifier { name, raw })
    }
}
