//! Header chunk directory.
//!
//! The user-data block starts with a chunk table:
//!
//! ```text
//! count:  nat32
//! count × { id: nat32, size: nat32 (top bit is a flag) }
//! chunk payloads, back to back, in table order
//! ```
//!
//! Offsets are not stored; they follow from the sizes, starting right
//! after the table.

use gbx_common::{Error as CommonError, GbxReader};

use crate::chunks::ChunkKind;
use crate::class::ClassCategory;
use crate::{Error, Result};

/// Largest number of header chunks accepted.
pub const MAX_HEADER_CHUNKS: u32 = 255;

const SIZE_MASK: u32 = 0x7FFF_FFFF;
const ENTRY_SIZE: usize = 8;

/// One entry of the header chunk table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChunkRecord {
    pub id: u32,
    /// Payload size with the flag bit cleared.
    pub size: u32,
    /// Absolute offset of the payload in the file.
    pub offset: u32,
    /// Decoder for this id, when the id is known for the file's category.
    pub kind: Option<ChunkKind>,
}

impl ChunkRecord {
    /// The payload bytes within `data`.
    ///
    /// A payload that runs past the end of `data` is cut to the bytes that
    /// exist; one that starts past the end is empty.
    pub fn bytes<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let start = (self.offset as usize).min(data.len());
        let end = start.saturating_add(self.size as usize).min(data.len());
        &data[start..end]
    }

    /// End offset (exclusive).
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }
}

/// All header chunk entries, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChunkDirectory {
    entries: Vec<ChunkRecord>,
}

impl ChunkDirectory {
    /// Read the chunk table at the reader's position.
    ///
    /// The reader is left after the table, at the first payload.
    pub fn read(r: &mut GbxReader<'_>, category: ClassCategory) -> Result<Self> {
        let count = r.nat32()?;
        if count == 0 {
            return Err(Error::NoChunks);
        }
        if count > MAX_HEADER_CHUNKS {
            return Err(CommonError::limit("header chunk count", count, MAX_HEADER_CHUNKS + 1).into());
        }

        let base = r.position();
        let mut offset = (base + count as usize * ENTRY_SIZE) as u32;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = r.nat32()?;
            let size = r.nat32()? & SIZE_MASK;
            let kind = category.chunk_kind(id);
            tracing::debug!(
                id = format_args!("{id:#010x}"),
                size,
                offset,
                kind = kind.map(ChunkKind::name),
                "header chunk"
            );
            entries.push(ChunkRecord {
                id,
                size,
                offset,
                kind,
            });
            offset = offset.wrapping_add(size);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ChunkRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose id has a decoder.
    pub fn known(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.entries.iter().filter(|entry| entry.kind.is_some())
    }

    /// Entry with the given id.
    pub fn find(&self, id: u32) -> Option<&ChunkRecord> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}
