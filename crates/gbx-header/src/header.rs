//! GBX file header.
//!
//! ```text
//! magic:       "GBX"
//! version:     u16 LE (3..=6)
//! storage:     3 bytes (version 3) or 4 bytes (version >= 4)
//!              [0] 'T' text / 'B' binary
//!              [1] 'C' / 'U' compressed reference table
//!              [2] 'C' / 'U' compressed body
//!              [3] extra flag byte, kept as-is
//! class id:    nat32 (hex line in text files)
//! user data:   version >= 6 only: nat32 size, then the chunk block
//! ```

use gbx_common::{Encoding, Error as CommonError, GbxReader};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::class::{class_name, classify, ClassCategory};
use crate::{Error, Result};

/// Magic bytes at the start of every GBX file.
pub const MAGIC: [u8; 3] = *b"GBX";

/// Oldest and newest supported format versions.
pub const MIN_VERSION: u16 = 3;
pub const MAX_VERSION: u16 = 6;

/// Exclusive bound on the user-data block size.
pub const MAX_USER_DATA_SIZE: u32 = 0x40_0000;

/// Exclusive bound on the number of external references.
pub const MAX_EXTERNAL_REFS: u32 = 50_000;

/// First five bytes of a GBX file.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RawPrelude {
    pub magic: [u8; 3],
    pub version: u16,
}

impl RawPrelude {
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Decoded GBX header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GbxHeader {
    pub version: u16,
    pub encoding: Encoding,
    pub ref_table_compressed: bool,
    pub body_compressed: bool,
    /// Fourth storage byte (version 4 and later).
    pub storage_extra: Option<u8>,
    pub class_id: u32,
    pub class_name: Option<&'static str>,
    pub category: ClassCategory,
    /// Size of the user-data block, 0 before version 6.
    pub user_data_size: u32,
    pub num_nodes: u32,
    pub num_external_refs: u32,
}

fn compression_flag(byte: u8, storage: &[u8]) -> Result<bool> {
    match byte {
        b'C' => Ok(true),
        b'U' => Ok(false),
        _ => Err(Error::InvalidStorageSettings(
            String::from_utf8_lossy(storage).into_owned(),
        )),
    }
}

impl GbxHeader {
    /// Read the header up to and including the user-data size.
    ///
    /// The reader is switched to the file's encoding and left at the start
    /// of the user-data block. Node and reference counts are read later,
    /// after the block.
    pub fn read(r: &mut GbxReader<'_>) -> Result<Self> {
        let raw = r.raw(RawPrelude::SIZE)?;
        let prelude = RawPrelude::read_from_bytes(raw).map_err(|_| CommonError::Truncated {
            needed: RawPrelude::SIZE,
            available: raw.len(),
        })?;

        if prelude.magic != MAGIC {
            return Err(Error::InvalidMagic {
                actual: prelude.magic.to_vec(),
            });
        }
        let version = prelude.version;
        if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
            return Err(Error::UnsupportedVersion(version));
        }

        let storage_len = if version < 4 { 3 } else { 4 };
        let storage = r.raw(storage_len)?;
        let encoding = match storage[0] {
            b'B' => Encoding::Binary,
            b'T' => Encoding::Text,
            _ => {
                return Err(Error::InvalidStorageSettings(
                    String::from_utf8_lossy(storage).into_owned(),
                ))
            }
        };
        let ref_table_compressed = compression_flag(storage[1], storage)?;
        let body_compressed = compression_flag(storage[2], storage)?;
        let storage_extra = storage.get(3).copied();
        r.set_encoding(encoding);

        let class_id = r.mask()?;
        let category = classify(class_id);

        let user_data_size = if version >= 6 {
            let size = r.nat32()?;
            if size >= MAX_USER_DATA_SIZE {
                return Err(CommonError::limit("user data size", size, MAX_USER_DATA_SIZE).into());
            }
            size
        } else {
            0
        };

        tracing::debug!(
            version,
            %encoding,
            class_id = format_args!("{class_id:#010x}"),
            %category,
            user_data_size,
            "GBX header"
        );

        Ok(Self {
            version,
            encoding,
            ref_table_compressed,
            body_compressed,
            storage_extra,
            class_id,
            class_name: class_name(class_id),
            category,
            user_data_size,
            num_nodes: 0,
            num_external_refs: 0,
        })
    }

    /// Read the node count and external reference count that follow the
    /// user-data block.
    pub fn read_counts(&mut self, r: &mut GbxReader<'_>) -> Result<()> {
        self.num_nodes = r.nat32()?;
        let refs = r.nat32()?;
        if refs >= MAX_EXTERNAL_REFS {
            return Err(CommonError::limit("external reference count", refs, MAX_EXTERNAL_REFS).into());
        }
        self.num_external_refs = refs;
        Ok(())
    }

    /// Storage settings as the letters stored in the file.
    pub fn storage_string(&self) -> String {
        let mut out = String::with_capacity(4);
        out.push(match self.encoding {
            Encoding::Binary => 'B',
            Encoding::Text => 'T',
        });
        out.push(if self.ref_table_compressed { 'C' } else { 'U' });
        out.push(if self.body_compressed { 'C' } else { 'U' });
        if let Some(extra) = self.storage_extra {
            out.push(char::from(extra));
        }
        out
    }
}

/// Size information of the body following the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BodyInfo {
    Compressed {
        uncompressed_size: u32,
        compressed_size: u32,
    },
    /// Bytes left in the file after the reference table.
    Uncompressed { len: usize },
}

impl BodyInfo {
    /// Read the body size fields at the reader's position.
    pub fn read(r: &mut GbxReader<'_>, header: &GbxHeader) -> Result<Self> {
        if header.encoding == Encoding::Text {
            return Err(Error::TextBody);
        }
        if header.body_compressed {
            Ok(Self::Compressed {
                uncompressed_size: r.nat32()?,
                compressed_size: r.nat32()?,
            })
        } else {
            Ok(Self::Uncompressed { len: r.remaining() })
        }
    }
}

#[cfg(test)]
mod tests {
    use gbx_common::ErrorKind;
    use pretty_assertions::assert_eq;

    use super::*;

    fn header_bytes(version: u16, storage: &[u8], class_id: u32) -> Vec<u8> {
        let mut data = b"GBX".to_vec();
        data.extend_from_slice(&version.to_le_bytes());
        data.extend_from_slice(storage);
        data.extend_from_slice(&class_id.to_le_bytes());
        data
    }

    #[test]
    fn test_prelude_layout() {
        assert_eq!(RawPrelude::SIZE, 5);
    }

    #[test]
    fn test_version_6_header() {
        let mut data = header_bytes(6, b"BUCR", 0x03043000);
        data.extend_from_slice(&100u32.to_le_bytes());
        let mut r = GbxReader::new(&data, Encoding::Binary);
        let header = GbxHeader::read(&mut r).unwrap();

        assert_eq!(header.version, 6);
        assert_eq!(header.encoding, Encoding::Binary);
        assert!(!header.ref_table_compressed);
        assert!(header.body_compressed);
        assert_eq!(header.storage_extra, Some(b'R'));
        assert_eq!(header.category, ClassCategory::Challenge);
        assert_eq!(header.class_name, Some("CGameCtnChallenge"));
        assert_eq!(header.user_data_size, 100);
        assert_eq!(header.storage_string(), "BUCR");
        assert_eq!(r.position(), data.len());
    }

    #[test]
    fn test_version_3_has_three_storage_bytes() {
        let data = header_bytes(3, b"BUU", 0x03093000);
        let mut r = GbxReader::new(&data, Encoding::Binary);
        let header = GbxHeader::read(&mut r).unwrap();

        assert_eq!(header.storage_extra, None);
        assert_eq!(header.category, ClassCategory::Replay);
        assert_eq!(header.user_data_size, 0);
    }

    #[test]
    fn test_text_class_id() {
        let mut data = b"GBX".to_vec();
        data.extend_from_slice(&6u16.to_le_bytes());
        data.extend_from_slice(b"TUUR");
        data.extend_from_slice(b"03043000\r\n0\r\n");
        let mut r = GbxReader::new(&data, Encoding::Binary);
        let header = GbxHeader::read(&mut r).unwrap();

        assert_eq!(header.encoding, Encoding::Text);
        assert_eq!(header.class_id, 0x03043000);
        assert_eq!(header.user_data_size, 0);
    }

    #[test]
    fn test_bad_magic() {
        let mut data = header_bytes(6, b"BUUR", 0);
        data[0] = b'X';
        let mut r = GbxReader::new(&data, Encoding::Binary);
        assert!(matches!(
            GbxHeader::read(&mut r),
            Err(Error::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_version_range() {
        for version in [2u16, 7] {
            let data = header_bytes(version, b"BUUR", 0);
            let mut r = GbxReader::new(&data, Encoding::Binary);
            let err = GbxHeader::read(&mut r).unwrap_err();
            assert!(matches!(err, Error::UnsupportedVersion(v) if v == version));
            assert_eq!(err.kind(), ErrorKind::Unsupported);
        }
    }

    #[test]
    fn test_bad_storage() {
        let data = header_bytes(6, b"XUUR", 0);
        let mut r = GbxReader::new(&data, Encoding::Binary);
        assert!(matches!(
            GbxHeader::read(&mut r),
            Err(Error::InvalidStorageSettings(_))
        ));

        let data = header_bytes(6, b"BXUR", 0);
        let mut r = GbxReader::new(&data, Encoding::Binary);
        assert!(matches!(
            GbxHeader::read(&mut r),
            Err(Error::InvalidStorageSettings(_))
        ));
    }

    #[test]
    fn test_user_data_bound() {
        let mut data = header_bytes(6, b"BUUR", 0x03043000);
        data.extend_from_slice(&0x40_0000u32.to_le_bytes());
        let mut r = GbxReader::new(&data, Encoding::Binary);
        assert_eq!(
            GbxHeader::read(&mut r).unwrap_err().kind(),
            ErrorKind::Malformed
        );
    }

    #[test]
    fn test_external_ref_bound() {
        let mut data = header_bytes(6, b"BUUR", 0x03043000);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&50_000u32.to_le_bytes());
        let mut r = GbxReader::new(&data, Encoding::Binary);
        let mut header = GbxHeader::read(&mut r).unwrap();
        assert_eq!(header.read_counts(&mut r).unwrap_err().kind(), ErrorKind::Malformed);
        assert_eq!(header.num_nodes, 1);
    }

    #[test]
    fn test_body_info() {
        let mut data = header_bytes(6, b"BUCR", 0);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(&400u32.to_le_bytes());
        let mut r = GbxReader::new(&data, Encoding::Binary);
        let header = GbxHeader::read(&mut r).unwrap();
        assert_eq!(
            BodyInfo::read(&mut r, &header).unwrap(),
            BodyInfo::Compressed {
                uncompressed_size: 1000,
                compressed_size: 400
            }
        );
    }
}
