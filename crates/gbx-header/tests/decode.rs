//! End-to-end decoding of synthetic GBX files.

use gbx_header::{
    collection_name, BodyInfo, ChunkData, ChunkDirectory, ChunkKind, ClassCategory, Describe,
    Encoding, Error, ErrorKind, GbxFile, GbxReader, IdentifierTable,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const CHALLENGE: u32 = 0x03043000;

#[derive(Default, Clone)]
struct Bytes(Vec<u8>);

impl Bytes {
    fn new() -> Self {
        Self::default()
    }

    fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn raw(mut self, v: &[u8]) -> Self {
        self.0.extend_from_slice(v);
        self
    }

    fn str(self, s: &str) -> Self {
        self.u32(s.len() as u32).raw(s.as_bytes())
    }
}

/// A version 6 binary file with the given header chunks.
struct FileBuilder {
    storage: &'static [u8],
    class_id: u32,
    chunks: Vec<(u32, Vec<u8>)>,
    num_refs: u32,
    after_counts: Vec<u8>,
}

impl FileBuilder {
    fn new(class_id: u32) -> Self {
        Self {
            storage: b"BUUR",
            class_id,
            chunks: Vec::new(),
            num_refs: 0,
            after_counts: Vec::new(),
        }
    }

    fn chunk(mut self, id: u32, payload: Vec<u8>) -> Self {
        self.chunks.push((id, payload));
        self
    }

    fn user_data(&self) -> Vec<u8> {
        let mut table = Bytes::new().u32(self.chunks.len() as u32);
        for (id, payload) in &self.chunks {
            table = table.u32(*id).u32(payload.len() as u32);
        }
        for (_, payload) in &self.chunks {
            table = table.raw(payload);
        }
        table.0
    }

    fn build_with_user_data(&self, user_data: &[u8]) -> Vec<u8> {
        Bytes::new()
            .raw(b"GBX")
            .raw(&6u16.to_le_bytes())
            .raw(self.storage)
            .u32(self.class_id)
            .u32(user_data.len() as u32)
            .raw(user_data)
            .u32(1)
            .u32(self.num_refs)
            .raw(&self.after_counts)
            .0
    }

    fn build(&self) -> Vec<u8> {
        self.build_with_user_data(&self.user_data())
    }
}

fn tm_desc_payload() -> Vec<u8> {
    Bytes::new()
        .u8(1)
        .u32(3)
        .u32(0x4000_0000)
        .str("Dq2eNJ1KYKKrVHpyUrbzDLtl5Vb")
        .u32(6)
        .u32(0x4000_0000)
        .str("Nadeo")
        .str("A01-Race")
        .u32(0)
        .u32(60_000)
        .u32(50_000)
        .u32(40_000)
        .u32(30_000)
        .0
}

fn common_payload(pack_mask: u128) -> Vec<u8> {
    Bytes::new()
        .u8(5)
        .u32(3)
        .u32(0x4000_0000)
        .str("uid")
        .u32(4)
        .u32(0xFFFF_FFFF)
        .str("Bay map")
        .u8(1)
        .u32(0)
        .str("")
        .u32(0xFFFF_FFFF)
        .u32(0xFFFF_FFFF)
        .u32(0xFFFF_FFFF)
        .raw(&[0; 16])
        .raw(&pack_mask.to_le_bytes())
        .0
}

#[test]
fn decodes_map_description() {
    let data = FileBuilder::new(CHALLENGE)
        .chunk(0x03043002, tm_desc_payload())
        .build();
    let file = GbxFile::parse(&data).unwrap();

    assert_eq!(file.header.version, 6);
    assert_eq!(file.header.category, ClassCategory::Challenge);
    assert_eq!(file.header.storage_extra, Some(b'R'));
    assert_eq!(file.header.num_nodes, 1);
    assert_eq!(file.header.num_external_refs, 0);
    assert_eq!(file.chunks.len(), 1);

    let chunk = &file.chunks[0];
    assert!(chunk.error.is_none());
    assert_eq!(chunk.record.kind, Some(ChunkKind::TmDesc));
    let ChunkData::TmDesc(desc) = &chunk.data else {
        panic!("expected a map description, got {:?}", chunk.data.kind());
    };
    assert_eq!(desc.environment.as_deref(), Some("Stadium"));
    assert_eq!(desc.author.as_deref(), Some("Nadeo"));
    assert_eq!(desc.name.as_deref(), Some("A01-Race"));

    let lines = file.describe_chunks();
    assert!(lines.contains(&"Bronze=60000 (1:00.000)".to_string()));
    assert!(lines.contains(&"Silver=50000 (0:50.000)".to_string()));
    assert!(lines.contains(&"Gold=40000 (0:40.000)".to_string()));
    assert!(lines.contains(&"BestTime=30000 (0:30.000)".to_string()));

    assert!(file.ref_table.as_ref().unwrap().refs.is_empty());
    assert_eq!(file.body.as_ref().unwrap(), &BodyInfo::Uncompressed { len: 0 });
    assert!(file.is_complete());
}

#[test]
fn pack_mask_alias() {
    let data = FileBuilder::new(CHALLENGE)
        .chunk(0x03043003, common_payload(0x7F))
        .build();
    let file = GbxFile::parse(&data).unwrap();

    let lines = file.describe_chunks();
    assert!(lines.contains(&"Packs=United".to_string()), "{lines:?}");
    assert!(lines.contains(&"Environment=Bay".to_string()));
}

#[test]
fn pack_mask_flags_use_environment() {
    let data = FileBuilder::new(CHALLENGE)
        .chunk(0x03043003, common_payload(0x10 | 0x2000))
        .build();
    let file = GbxFile::parse(&data).unwrap();
    assert!(file
        .describe_chunks()
        .contains(&"Packs=Bay, Paris".to_string()));
}

#[test]
fn zero_chunks_is_not_fatal() {
    let data = FileBuilder::new(CHALLENGE).build();
    let file = GbxFile::parse(&data).unwrap();

    assert!(matches!(file.directory, Err(Error::NoChunks)));
    assert!(file.chunks.is_empty());
    assert!(file.ref_table.is_ok());
}

#[test]
fn chunk_count_boundary() {
    let builder = FileBuilder::new(0x12345678);
    let mut user_data = Bytes::new().u32(256);
    for i in 0..256 {
        user_data = user_data.u32(i).u32(0);
    }
    let data = builder.build_with_user_data(&user_data.0);
    let file = GbxFile::parse(&data).unwrap();
    assert_eq!(
        file.directory.as_ref().unwrap_err().kind(),
        ErrorKind::Malformed
    );

    let mut builder = FileBuilder::new(0x12345678);
    for i in 0..255 {
        builder = builder.chunk(i, Vec::new());
    }
    let file = GbxFile::parse(&builder.build()).unwrap();
    assert_eq!(file.directory.as_ref().unwrap().len(), 255);
}

#[test]
fn external_ref_bound_is_fatal() {
    let mut builder = FileBuilder::new(CHALLENGE).chunk(0x03043002, tm_desc_payload());
    builder.num_refs = 50_000;
    let err = GbxFile::parse(&builder.build()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);

    builder.num_refs = 49_999;
    let file = GbxFile::parse(&builder.build()).unwrap();
    assert_eq!(file.ref_table.unwrap_err().kind(), ErrorKind::Truncated);
    assert!(matches!(file.body, Err(Error::RefTableUnavailable)));
}

#[test]
fn failing_chunk_does_not_affect_others() {
    // Author chunk cut after its version fields.
    let broken = Bytes::new().u32(0).u32(0).u32(200).0;
    let author = Bytes::new()
        .u32(0)
        .u32(1)
        .str("login")
        .str("Nick")
        .str("World|Europe")
        .str("")
        .0;
    let data = FileBuilder::new(CHALLENGE)
        .chunk(0x03043008, broken)
        .chunk(0x03043002, tm_desc_payload())
        .chunk(0x24003008, author)
        .build();
    let file = GbxFile::parse(&data).unwrap();

    assert_eq!(file.chunks.len(), 3);
    assert_eq!(
        file.chunks[0].error.as_ref().map(Error::kind),
        Some(ErrorKind::Truncated)
    );
    assert!(file.chunks[1].is_complete());
    assert!(file.chunks[2].is_complete());
    let ChunkData::Author(info) = &file.chunks[2].data else {
        panic!("expected author info");
    };
    assert_eq!(info.zone.as_deref(), Some("World|Europe"));
    assert!(!file.is_complete());
}

#[test]
fn identifiers_do_not_leak_between_chunks() {
    // Second chunk refers to index 1 without defining it.
    let second = Bytes::new().u8(0).u32(3).u32(0x4000_0001).u32(1).0;
    let data = FileBuilder::new(0x03033000)
        .chunk(0x03033000, Bytes::new().u32(3).u32(0x4000_0000).str("Alpine").str("x").u32(0).0)
        .chunk(0x03033001, second)
        .build();
    let file = GbxFile::parse(&data).unwrap();

    let ChunkData::CollectionDesc(desc) = &file.chunks[1].data else {
        panic!("expected collection description");
    };
    assert_eq!(desc.collection.as_deref(), Some(""));
    assert_eq!(desc.need_unlock, Some(true));
}

#[test]
fn unknown_chunks_are_listed_but_not_decoded() {
    let data = FileBuilder::new(CHALLENGE)
        .chunk(0x03043042, vec![1, 2, 3, 4])
        .chunk(0x03043002, tm_desc_payload())
        .build();
    let file = GbxFile::parse(&data).unwrap();

    let directory = file.directory.as_ref().unwrap();
    assert_eq!(directory.len(), 2);
    assert_eq!(directory.entries()[0].kind, None);
    assert_eq!(file.chunks.len(), 1);
    assert_eq!(file.chunks[0].record.id, 0x03043002);
}

#[test]
fn chunk_past_user_data_is_cut() {
    let builder = FileBuilder::new(CHALLENGE);
    // Claims 100 bytes, only 5 exist.
    let user_data = Bytes::new()
        .u32(1)
        .u32(0x03043004)
        .u32(100)
        .raw(&[7, 0, 0, 0, 9])
        .0;
    let data = builder.build_with_user_data(&user_data);
    let file = GbxFile::parse(&data).unwrap();

    assert!(file.chunks[0].is_complete());
    assert_eq!(file.chunks[0].data.describe()[0].to_string(), "Version=7");
}

#[test]
fn compressed_body_sizes() {
    let mut builder = FileBuilder::new(CHALLENGE).chunk(0x03043004, Bytes::new().u32(6).0);
    builder.storage = b"BUCR";
    builder.after_counts = Bytes::new().u32(123_456).u32(7_890).raw(&[0; 16]).0;
    let file = GbxFile::parse(&builder.build()).unwrap();

    assert_eq!(
        file.body.unwrap(),
        BodyInfo::Compressed {
            uncompressed_size: 123_456,
            compressed_size: 7_890
        }
    );
}

#[test]
fn compressed_ref_table_is_unsupported() {
    let mut builder = FileBuilder::new(CHALLENGE).chunk(0x03043004, Bytes::new().u32(6).0);
    builder.storage = b"BCUR";
    builder.num_refs = 2;
    let file = GbxFile::parse(&builder.build()).unwrap();

    assert_eq!(file.ref_table.unwrap_err().kind(), ErrorKind::Unsupported);
}

#[test]
fn version_3_file_has_no_user_data() {
    let data = Bytes::new()
        .raw(b"GBX")
        .raw(&3u16.to_le_bytes())
        .raw(b"BUU")
        .u32(0x03093000)
        .u32(4)
        .u32(0)
        .raw(&[1, 2, 3])
        .0;
    let file = GbxFile::parse(&data).unwrap();

    assert_eq!(file.header.category, ClassCategory::Replay);
    assert_eq!(file.header.num_nodes, 4);
    assert!(file.directory.as_ref().unwrap().is_empty());
    assert_eq!(file.body.unwrap(), BodyInfo::Uncompressed { len: 3 });
}

#[test]
fn text_body_is_not_described() {
    let mut data = Bytes::new()
        .raw(b"GBX")
        .raw(&6u16.to_le_bytes())
        .raw(b"TUUR")
        .0;
    data.extend_from_slice(b"03043000\r\n0\r\n2\r\n0\r\n");
    let file = GbxFile::parse(&data).unwrap();

    assert_eq!(file.header.encoding, Encoding::Text);
    assert_eq!(file.header.num_nodes, 2);
    assert!(matches!(file.body, Err(Error::TextBody)));
}

#[test]
fn truncated_header_is_fatal() {
    let data = FileBuilder::new(CHALLENGE)
        .chunk(0x03043002, tm_desc_payload())
        .build();
    let err = GbxFile::parse(&data[..20]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncated);
}

#[test]
fn decoding_is_repeatable() {
    let data = FileBuilder::new(CHALLENGE)
        .chunk(0x03043002, tm_desc_payload())
        .chunk(0x03043003, common_payload(0x38))
        .build();
    let first = GbxFile::parse(&data).unwrap();
    let second = GbxFile::parse(&data).unwrap();

    assert_eq!(first.header, second.header);
    assert_eq!(first.describe_chunks(), second.describe_chunks());
}

proptest! {
    #[test]
    fn offsets_follow_sizes(sizes in proptest::collection::vec(0u32..0x7FFF_FFFF, 1..64), flags in any::<u64>()) {
        let mut data = Bytes::new().u32(sizes.len() as u32);
        for (i, size) in sizes.iter().enumerate() {
            let flag = if flags >> (i % 64) & 1 == 1 { 0x8000_0000 } else { 0 };
            data = data.u32(i as u32).u32(size | flag);
        }
        let mut r = GbxReader::new(&data.0, Encoding::Binary);
        let directory = ChunkDirectory::read(&mut r, ClassCategory::Other).unwrap();

        let entries = directory.entries();
        prop_assert_eq!(entries[0].offset as usize, 4 + sizes.len() * 8);
        for (entry, size) in entries.iter().zip(&sizes) {
            prop_assert_eq!(entry.size, *size);
        }
        for pair in entries.windows(2) {
            prop_assert_eq!(pair[1].offset, pair[0].offset.wrapping_add(pair[0].size));
        }
    }

    #[test]
    fn identifier_table_round_trip(names in proptest::collection::vec("[A-Za-z0-9]{1,12}", 1..20)) {
        let mut data = Bytes::new().u32(3);
        for name in &names {
            data = data.u32(0x4000_0000).str(name);
        }
        for index in (1..=names.len()).rev() {
            data = data.u32(0x4000_0000 | index as u32);
        }

        let mut r = GbxReader::new(&data.0, Encoding::Binary);
        let mut table = IdentifierTable::new();
        for name in &names {
            prop_assert_eq!(&table.read(&mut r).unwrap().name, name);
        }
        for name in names.iter().rev() {
            prop_assert_eq!(&table.read(&mut r).unwrap().name, name);
        }
        prop_assert!(r.is_exhausted());
    }

    #[test]
    fn unknown_collections_render_as_decimal(id in 300u32..10_000) {
        prop_assert_eq!(collection_name(id), id.to_string());
    }
}
