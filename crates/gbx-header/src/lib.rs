//! GBX header decoder.
//!
//! GBX ("GameBox") is the container format of Nadeo's TrackMania and
//! ManiaPlanet games: maps, replays, items, skins and collections. This
//! crate decodes everything up to the body: the fixed header, the header
//! chunks in the user-data block, the external reference table and the
//! body sizes.
//!
//! # File Format
//!
//! - 3 bytes: Magic (`GBX`)
//! - 2 bytes: Version (3 to 6)
//! - 3-4 bytes: Storage settings (text/binary, compression flags)
//! - Class id of the root node
//! - User-data block (version 6): header chunk table and chunk payloads
//! - Node count and external reference count
//! - Reference table
//! - Body (compressed or not; only its sizes are reported)
//!
//! # Example
//!
//! ```no_run
//! use gbx_header::{Describe, GbxFile};
//!
//! let file = GbxFile::open("A01-Race.Challenge.Gbx")?;
//! println!("{} ({})", file.header.category, file.header.version);
//! for chunk in &file.chunks {
//!     for field in chunk.data.describe() {
//!         println!("  {field}");
//!     }
//! }
//! # Ok::<(), gbx_header::Error>(())
//! ```

pub mod chunks;
mod class;
mod collection;
mod directory;
mod error;
mod file;
mod header;
mod ident;
mod pack;
mod reftable;
mod time;

pub use chunks::{decode_chunk, ChunkData, ChunkKind, ChunkReader, DecodedChunk, Describe, Field};
pub use class::{class_name, classify, known_classes, ClassCategory, KnownChunk};
pub use collection::{collection_name, known_collection, UNASSIGNED};
pub use directory::{ChunkDirectory, ChunkRecord, MAX_HEADER_CHUNKS};
pub use error::{Error, Result};
pub use file::GbxFile;
pub use header::{
    BodyInfo, GbxHeader, RawPrelude, MAGIC, MAX_EXTERNAL_REFS, MAX_USER_DATA_SIZE, MAX_VERSION,
    MIN_VERSION,
};
pub use ident::{Identifier, IdentifierTable};
pub use pack::PackMask;
pub use reftable::{
    parse_ref_table, ExternalRef, FolderNode, RefTable, RefTarget, MAX_FOLDERS, MAX_FOLDER_DEPTH,
};
pub use time::{filetime_to_unix, format_time, format_unix};

// Re-export the primitive layer
pub use gbx_common::{Encoding, ErrorKind, GbxReader};
