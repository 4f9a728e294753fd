//! GBX decode session.

use std::fs::File;
use std::path::Path;

use gbx_common::{Encoding, GbxReader};
use memmap2::Mmap;

use crate::chunks::{decode_chunk, ChunkReader, DecodedChunk, Describe};
use crate::directory::ChunkDirectory;
use crate::header::{BodyInfo, GbxHeader};
use crate::ident::IdentifierTable;
use crate::reftable::{parse_ref_table, RefTable};
use crate::{Error, Result};

/// Everything decoded from a GBX file header.
///
/// Only failures of the fixed header fields abort decoding. The chunk
/// directory, each chunk, the reference table and the body sizes carry
/// their own outcome.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GbxFile {
    pub header: GbxHeader,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::error::serde_error::outcome"))]
    pub directory: std::result::Result<ChunkDirectory, Error>,
    pub chunks: Vec<DecodedChunk>,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::error::serde_error::outcome"))]
    pub ref_table: std::result::Result<RefTable, Error>,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::error::serde_error::outcome"))]
    pub body: std::result::Result<BodyInfo, Error>,
}

impl GbxFile {
    /// Memory-map and decode a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::parse(&mmap)
    }

    /// Decode a GBX header from `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = GbxReader::new(data, Encoding::Binary);
        let mut header = GbxHeader::read(&mut r)?;

        let user_start = r.position();
        r.raw(header.user_data_size as usize)?;
        let user_end = r.position();

        let (directory, chunks) = if header.user_data_size == 0 {
            (Ok(ChunkDirectory::default()), Vec::new())
        } else {
            decode_user_data(&data[..user_end], user_start, &header)
        };

        header.read_counts(&mut r)?;

        let ref_table = parse_ref_table(
            &mut r,
            header.version,
            header.ref_table_compressed,
            header.num_external_refs,
        );
        if let Err(e) = &ref_table {
            tracing::warn!("reference table not decoded: {e}");
        }

        let body = if header.encoding == Encoding::Text {
            Err(Error::TextBody)
        } else if ref_table.is_err() {
            Err(Error::RefTableUnavailable)
        } else {
            BodyInfo::read(&mut r, &header)
        };
        if let Err(e) = &body {
            tracing::debug!("body sizes unavailable: {e}");
        }

        Ok(Self {
            header,
            directory,
            chunks,
            ref_table,
            body,
        })
    }

    /// The decoded chunk with the given id.
    pub fn chunk(&self, id: u32) -> Option<&DecodedChunk> {
        self.chunks.iter().find(|chunk| chunk.record.id == id)
    }

    /// True when every decoded part succeeded.
    pub fn is_complete(&self) -> bool {
        self.directory.is_ok()
            && self.chunks.iter().all(DecodedChunk::is_complete)
            && self.ref_table.is_ok()
            && self.body.is_ok()
    }

    /// Display lines for all decoded chunks, `label=value` per field.
    pub fn describe_chunks(&self) -> Vec<String> {
        self.chunks
            .iter()
            .flat_map(|chunk| chunk.data.describe())
            .map(|field| field.to_string())
            .collect()
    }
}

/// Read the chunk table and decode every known chunk.
///
/// `data` ends at the end of the user-data block, so chunk payloads are cut
/// to the block.
fn decode_user_data(
    data: &[u8],
    start: usize,
    header: &GbxHeader,
) -> (std::result::Result<ChunkDirectory, Error>, Vec<DecodedChunk>) {
    let mut r = GbxReader::new(data, header.encoding);
    r.seek(start);

    let directory = match ChunkDirectory::read(&mut r, header.category) {
        Ok(directory) => directory,
        Err(e) => {
            tracing::warn!("header chunk table not decoded: {e}");
            return (Err(e), Vec::new());
        }
    };

    let mut idents = IdentifierTable::new();
    let mut chunks = Vec::new();
    for record in directory.entries() {
        let Some(kind) = record.kind else {
            continue;
        };
        idents.reset();
        let mut reader = ChunkReader::new(record.bytes(data), header.encoding, &mut idents);
        let (chunk, error) = decode_chunk(kind, &mut reader);
        match &error {
            Some(e) => tracing::warn!(id = format_args!("{:#010x}", record.id), %kind, "chunk decode failed: {e}"),
            None => tracing::debug!(
                id = format_args!("{:#010x}", record.id),
                %kind,
                identifiers = idents.entries().len(),
                "chunk decoded"
            ),
        }
        chunks.push(DecodedChunk {
            record: *record,
            data: chunk,
            error,
        });
    }

    (Ok(directory), chunks)
}
