//! Chunks shared by several categories.

use gbx_common::Error as CommonError;

use super::{ChunkReader, Describe, Field, Fields};
use crate::Result;

/// Folder dependency count bound (exclusive).
const MAX_FOLDER_DEPS: u32 = 0xFFFF;

/// A chunk holding only a version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VersionChunk {
    pub version: Option<u32>,
}

impl Describe for VersionChunk {
    fn describe(&self) -> Vec<Field> {
        Fields::new().opt("Version", &self.version).build()
    }
}

pub(super) fn read_version(r: &mut ChunkReader<'_, '_>, out: &mut VersionChunk) -> Result<()> {
    out.version = Some(r.nat32()?);
    Ok(())
}

/// A chunk whose layout past the version is not decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnknownChunk {
    pub version: Option<u32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Vec<u8>,
}

impl Describe for UnknownChunk {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .opt("Version", &self.version)
            .add("DataSize", self.data.len())
            .build()
    }
}

pub(super) fn read_unknown(r: &mut ChunkReader<'_, '_>, out: &mut UnknownChunk) -> Result<()> {
    out.version = Some(r.nat32()?);
    out.data = r.rest().to_vec();
    Ok(())
}

/// Folders a zone genealogy depends on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FolderDep {
    pub folders: Vec<String>,
}

impl Describe for FolderDep {
    fn describe(&self) -> Vec<Field> {
        self.folders
            .iter()
            .fold(Fields::new().add("Count", self.folders.len()), |fields, folder| {
                fields.add("Folder", folder)
            })
            .build()
    }
}

pub(super) fn read_folder_dep(r: &mut ChunkReader<'_, '_>, out: &mut FolderDep) -> Result<()> {
    let count = r.nat32()?;
    if count >= MAX_FOLDER_DEPS {
        return Err(CommonError::limit("folder dependency count", count, MAX_FOLDER_DEPS).into());
    }
    for _ in 0..count {
        out.folders.push(r.string()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gbx_common::{Encoding, ErrorKind};
    use pretty_assertions::assert_eq;

    use super::super::test_support::Payload;
    use super::*;
    use crate::IdentifierTable;

    #[test]
    fn test_unknown_keeps_rest() {
        let data = Payload::new().u32(2).bytes(&[1, 2, 3]).0;
        let mut idents = IdentifierTable::new();
        let mut r = ChunkReader::new(&data, Encoding::Binary, &mut idents);
        let mut chunk = UnknownChunk::default();
        read_unknown(&mut r, &mut chunk).unwrap();

        assert_eq!(chunk.version, Some(2));
        assert_eq!(chunk.data, [1, 2, 3]);
    }

    #[test]
    fn test_folder_dep() {
        let data = Payload::new().u32(2).str("Blocks\\").str("Items\\").0;
        let mut idents = IdentifierTable::new();
        let mut r = ChunkReader::new(&data, Encoding::Binary, &mut idents);
        let mut dep = FolderDep::default();
        read_folder_dep(&mut r, &mut dep).unwrap();

        assert_eq!(dep.folders, ["Blocks\\", "Items\\"]);
        let fields: Vec<String> = dep.describe().iter().map(ToString::to_string).collect();
        assert_eq!(fields, ["Count=2", "Folder=Blocks\\", "Folder=Items\\"]);
    }

    #[test]
    fn test_folder_dep_bound() {
        let data = Payload::new().u32(0xFFFF).0;
        let mut idents = IdentifierTable::new();
        let mut r = ChunkReader::new(&data, Encoding::Binary, &mut idents);
        let err = read_folder_dep(&mut r, &mut FolderDep::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }
}
