//! External reference table.
//!
//! Files that depend on other files (textures, sounds, solids, ...) list
//! them after the header. References point either at a file, located
//! through a folder tree relative to an ancestor directory, or at a game
//! resource by index.
//!
//! ```text
//! ancestor_level: nat32
//! folders:        nat32 count, then per folder { name: string, folders }
//! refs × {
//!     flags:       nat32
//!     target:      string (file name) | nat32 (resource index, flag bit 2)
//!     node_index:  nat32
//!     use_file:    bool (version >= 5)
//!     folder:      nat32 (file refs only), 0xFFFFFFFF followed by a nat64
//! }
//! ```

use gbx_common::{Error as CommonError, GbxReader};

use crate::{Error, Result};

/// Exclusive bound on the number of subfolders of one folder.
pub const MAX_FOLDERS: u32 = 50_000;

/// Deepest folder nesting accepted.
pub const MAX_FOLDER_DEPTH: usize = 64;

const FLAG_RESOURCE: u32 = 0x4;
const FOLDER_EXTENDED: u32 = 0xFFFF_FFFF;

/// A folder of the reference tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FolderNode {
    pub name: String,
    /// Parent path, this folder's name and a trailing backslash.
    pub path: String,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    fn collect<'a>(&'a self, out: &mut Vec<&'a FolderNode>) {
        out.push(self);
        for child in &self.children {
            child.collect(out);
        }
    }
}

/// What an external reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RefTarget {
    File(String),
    Resource(u32),
}

/// One external reference.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExternalRef {
    pub flags: u32,
    pub target: RefTarget,
    pub node_index: u32,
    pub use_file: Option<bool>,
    /// 1-based folder index, file references only.
    pub folder_index: Option<u32>,
    pub folder_extra: Option<u64>,
}

/// The external reference table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RefTable {
    pub ancestor_level: u32,
    pub folders: Vec<FolderNode>,
    pub refs: Vec<ExternalRef>,
}

impl RefTable {
    /// All folders in pre-order.
    pub fn flattened(&self) -> Vec<&FolderNode> {
        let mut out = Vec::new();
        for folder in &self.folders {
            folder.collect(&mut out);
        }
        out
    }

    /// Path of a 1-based folder index; 0 is the ancestor root.
    pub fn folder_path(&self, folder_index: u32) -> Option<&str> {
        if folder_index == 0 {
            return Some("");
        }
        let slot = usize::try_from(folder_index - 1).ok()?;
        self.flattened().get(slot).map(|folder| folder.path.as_str())
    }

    /// Path of a file reference relative to the ancestor directory.
    pub fn resolve(&self, reference: &ExternalRef) -> Option<String> {
        let RefTarget::File(name) = &reference.target else {
            return None;
        };
        let folder = self.folder_path(reference.folder_index.unwrap_or(0))?;
        Some(format!("{folder}{name}"))
    }
}

fn read_folders(r: &mut GbxReader<'_>, parent: &str, depth: usize) -> Result<Vec<FolderNode>> {
    let count = r.nat32()?;
    if count >= MAX_FOLDERS {
        return Err(CommonError::limit("folder count", count, MAX_FOLDERS).into());
    }
    if count > 0 && depth > MAX_FOLDER_DEPTH {
        return Err(Error::FolderTooDeep(MAX_FOLDER_DEPTH));
    }

    let mut folders = Vec::new();
    for _ in 0..count {
        let name = r.string()?;
        let path = format!("{parent}{name}\\");
        let children = read_folders(r, &path, depth + 1)?;
        folders.push(FolderNode {
            name,
            path,
            children,
        });
    }
    Ok(folders)
}

fn read_ref(r: &mut GbxReader<'_>, version: u16) -> Result<ExternalRef> {
    let flags = r.nat32()?;
    let target = if flags & FLAG_RESOURCE != 0 {
        RefTarget::Resource(r.nat32()?)
    } else {
        RefTarget::File(r.string()?)
    };
    let node_index = r.nat32()?;
    let use_file = if version >= 5 { Some(r.bool()?) } else { None };

    let (folder_index, folder_extra) = match target {
        RefTarget::File(_) => {
            let index = r.nat32()?;
            let extra = if index == FOLDER_EXTENDED {
                Some(r.nat64()?)
            } else {
                None
            };
            (Some(index), extra)
        }
        RefTarget::Resource(_) => (None, None),
    };

    Ok(ExternalRef {
        flags,
        target,
        node_index,
        use_file,
        folder_index,
        folder_extra,
    })
}

/// Parse the reference table at the reader's position.
pub fn parse_ref_table(
    r: &mut GbxReader<'_>,
    version: u16,
    ref_table_compressed: bool,
    num_external_refs: u32,
) -> Result<RefTable> {
    if num_external_refs == 0 {
        return Ok(RefTable::default());
    }
    if ref_table_compressed {
        return Err(Error::CompressedRefTable);
    }

    let ancestor_level = r.nat32()?;
    let folders = read_folders(r, "", 1)?;
    let mut refs = Vec::with_capacity(num_external_refs as usize);
    for _ in 0..num_external_refs {
        refs.push(read_ref(r, version)?);
    }
    tracing::debug!(ancestor_level, refs = refs.len(), "reference table");

    Ok(RefTable {
        ancestor_level,
        folders,
        refs,
    })
}

#[cfg(test)]
mod tests {
    use gbx_common::{Encoding, ErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct Bytes(Vec<u8>);

    impl Bytes {
        fn u32(mut self, v: u32) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }

        fn u64(mut self, v: u64) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }

        fn str(self, s: &str) -> Self {
            let mut this = self.u32(s.len() as u32);
            this.0.extend_from_slice(s.as_bytes());
            this
        }
    }

    fn parse(data: &[u8], version: u16, refs: u32) -> Result<RefTable> {
        let mut r = GbxReader::new(data, Encoding::Binary);
        parse_ref_table(&mut r, version, false, refs)
    }

    #[test]
    fn test_folder_tree_and_refs() {
        // Media\ { Texture\ } Sound\
        let data = Bytes::default()
            .u32(1)
            .u32(2)
            .str("Media")
            .u32(1)
            .str("Texture")
            .u32(0)
            .str("Sound")
            .u32(0)
            // file ref in Media\Texture\
            .u32(0)
            .str("Grass.dds")
            .u32(3)
            .u32(1)
            .u32(2)
            // resource ref
            .u32(FLAG_RESOURCE)
            .u32(17)
            .u32(4)
            .u32(0)
            // file ref with extended folder index
            .u32(0)
            .str("Loose.ogg")
            .u32(5)
            .u32(1)
            .u32(FOLDER_EXTENDED)
            .u64(0xABCD)
            .0;
        let table = parse(&data, 6, 3).unwrap();

        assert_eq!(table.ancestor_level, 1);
        assert_eq!(table.folders.len(), 2);
        assert_eq!(table.folders[0].children[0].path, "Media\\Texture\\");

        assert_eq!(table.folder_path(0), Some(""));
        assert_eq!(table.folder_path(1), Some("Media\\"));
        assert_eq!(table.folder_path(2), Some("Media\\Texture\\"));
        assert_eq!(table.folder_path(3), Some("Sound\\"));
        assert_eq!(table.folder_path(4), None);

        assert_eq!(table.refs[0].target, RefTarget::File("Grass.dds".into()));
        assert_eq!(table.refs[0].use_file, Some(true));
        assert_eq!(
            table.resolve(&table.refs[0]).as_deref(),
            Some("Media\\Texture\\Grass.dds")
        );
        assert_eq!(table.refs[1].target, RefTarget::Resource(17));
        assert_eq!(table.refs[1].folder_index, None);
        assert_eq!(table.refs[2].folder_extra, Some(0xABCD));
    }

    #[test]
    fn test_version_4_has_no_use_file() {
        let data = Bytes::default()
            .u32(0)
            .u32(0)
            .u32(0)
            .str("a.gbx")
            .u32(1)
            .u32(0)
            .0;
        let table = parse(&data, 4, 1).unwrap();
        assert_eq!(table.refs[0].use_file, None);
        assert_eq!(table.refs[0].folder_index, Some(0));
    }

    #[test]
    fn test_no_refs_reads_nothing() {
        let table = parse(&[], 6, 0).unwrap();
        assert_eq!(table, RefTable::default());
    }

    #[test]
    fn test_compressed() {
        let mut r = GbxReader::new(&[], Encoding::Binary);
        let err = parse_ref_table(&mut r, 6, true, 1).unwrap_err();
        assert!(matches!(err, Error::CompressedRefTable));
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_folder_count_bound() {
        let data = Bytes::default().u32(0).u32(50_000).0;
        assert_eq!(parse(&data, 6, 1).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_depth_bound() {
        let mut bytes = Bytes::default().u32(0);
        for _ in 0..MAX_FOLDER_DEPTH + 1 {
            bytes = bytes.u32(1).str("d");
        }
        let data = bytes.u32(0).0;
        let err = parse(&data, 6, 1).unwrap_err();
        assert!(matches!(err, Error::FolderTooDeep(MAX_FOLDER_DEPTH)));
    }

    #[test]
    fn test_max_depth_is_accepted() {
        let mut bytes = Bytes::default().u32(0);
        for _ in 0..MAX_FOLDER_DEPTH {
            bytes = bytes.u32(1).str("d");
        }
        let data = bytes
            .u32(0)
            .u32(4)
            .u32(9)
            .u32(0)
            .u32(1)
            .0;
        let table = parse(&data, 6, 1).unwrap();
        assert_eq!(table.flattened().len(), MAX_FOLDER_DEPTH);
        assert_eq!(
            table.folder_path(MAX_FOLDER_DEPTH as u32).map(str::len),
            Some(MAX_FOLDER_DEPTH * 2)
        );
    }
}
