//! GBX - Nadeo GameBox file decoding library.
//!
//! This crate provides a unified interface to the GBX crates.
//!
//! # Crates
//!
//! - [`gbx_common`] - Primitive reading (byte cursor, binary and text codecs)
//! - [`gbx_header`] - Header, chunk, identifier and reference table decoding
//!
//! # Example
//!
//! ```no_run
//! use gbx::prelude::*;
//!
//! let file = GbxFile::open("Replay.Replay.Gbx")?;
//! if file.header.category == ClassCategory::Replay {
//!     for line in file.describe_chunks() {
//!         println!("{line}");
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use gbx_common as common;
pub use gbx_header as header;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use gbx_common::{ByteReader, Encoding, GbxReader};
    pub use gbx_header::{
        class_name, classify, collection_name, format_time, BodyInfo, ChunkData, ChunkDirectory,
        ChunkKind, ClassCategory, DecodedChunk, Describe, GbxFile, GbxHeader, PackMask, RefTable,
    };
}

// Re-export commonly used types at the crate root
pub use gbx_header::{Error, GbxFile};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
