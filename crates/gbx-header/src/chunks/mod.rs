//! Header chunk records.
//!
//! Every known header chunk is decoded into a typed record. Decoders read
//! inside a [`ChunkReader`] bounded to the chunk's bytes, so a decoder can
//! never run into its neighbour. A failing decoder keeps whatever it had
//! read so far and the failure is attached to that chunk only.
//!
//! # Structure Overview
//!
//! - [`ChunkKind`]: which decoder a chunk id maps to
//! - [`ChunkData`]: the decoded record, one variant per kind
//! - [`DecodedChunk`]: record plus directory entry and optional error
//! - [`Describe`]: ordered `label=value` fields for display

mod challenge;
mod collection;
mod collector;
mod community;
mod ladder;
mod misc;
mod profile;
mod replay;

use std::fmt;
use std::ops::{Deref, DerefMut};

use gbx_common::{Encoding, GbxReader};

pub use challenge::{
    AuthorInfo, Decoration, MapCommon, MapKind, MedalTimes, RaceMode, Thumbnail, TmDesc, TrackType,
    VskDesc,
};
pub use collection::{CollectionDesc, CollectionFolders, MenuIcon, MenuIcons, OldCollectionDesc};
pub use collector::{CollectorDesc, GameSkin, Icon, IconImage, ItemType, Mood, ProdState, SkinDesc, Timestamp};
pub use community::{Community, XmlElement};
pub use misc::{FolderDep, UnknownChunk, VersionChunk};
pub use profile::Profile;
pub use replay::ReplayVersion;

use crate::directory::ChunkRecord;
use crate::ident::{Identifier, IdentifierTable};
use crate::{Error, Result};

/// Decoder selected for a header chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ChunkKind {
    TmDesc,
    Common,
    Version,
    Community,
    Thumbnail,
    Author,
    VskDesc,
    ReplayVersion,
    CollectorDesc,
    Icon,
    Time,
    Skin,
    ItemType,
    GameSkin,
    Mood,
    Unknown,
    OldDesc,
    CollectionDesc,
    Folders,
    MenuIcons,
    Profile,
    FolderDep,
}

impl ChunkKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::TmDesc => "TmDesc",
            Self::Common => "Common",
            Self::Version => "Version",
            Self::Community => "Community",
            Self::Thumbnail => "Thumbnail",
            Self::Author => "Author",
            Self::VskDesc => "VskDesc",
            Self::ReplayVersion => "ReplayVersion",
            Self::CollectorDesc => "CollectorDesc",
            Self::Icon => "Icon",
            Self::Time => "Time",
            Self::Skin => "Skin",
            Self::ItemType => "ItemType",
            Self::GameSkin => "GameSkin",
            Self::Mood => "Mood",
            Self::Unknown => "Unknown",
            Self::OldDesc => "OldDesc",
            Self::CollectionDesc => "CollectionDesc",
            Self::Folders => "Folders",
            Self::MenuIcons => "MenuIcons",
            Self::Profile => "Profile",
            Self::FolderDep => "FolderDep",
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One displayable field of a decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.value)
    }
}

/// Ordered display fields of a record.
pub trait Describe {
    fn describe(&self) -> Vec<Field>;
}

/// Collects [`Field`]s, skipping values that were never read.
#[derive(Default)]
pub(crate) struct Fields(Vec<Field>);

impl Fields {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(mut self, label: &'static str, value: impl fmt::Display) -> Self {
        self.0.push(Field {
            label,
            value: value.to_string(),
        });
        self
    }

    pub(crate) fn opt<T: fmt::Display>(self, label: &'static str, value: &Option<T>) -> Self {
        match value {
            Some(value) => self.add(label, value),
            None => self,
        }
    }

    pub(crate) fn build(self) -> Vec<Field> {
        self.0
    }
}

/// A [`GbxReader`] over one chunk's bytes, with the identifier context.
pub struct ChunkReader<'a, 't> {
    reader: GbxReader<'a>,
    idents: &'t mut IdentifierTable,
}

impl<'a, 't> ChunkReader<'a, 't> {
    pub fn new(data: &'a [u8], encoding: Encoding, idents: &'t mut IdentifierTable) -> Self {
        Self {
            reader: GbxReader::new(data, encoding),
            idents,
        }
    }

    /// Read an identifier.
    pub fn ident(&mut self) -> Result<Identifier> {
        self.idents.read(&mut self.reader)
    }

    /// Read an identifier and keep only its name.
    pub fn ident_name(&mut self) -> Result<String> {
        self.ident().map(|ident| ident.name)
    }

    /// Expect a literal marker such as `<Comments>`.
    pub fn expect_tag(&mut self, tag: &'static str) -> Result<()> {
        let (matched, actual) = self.reader.bytes_mut().read_literal(tag.as_bytes())?;
        if matched {
            Ok(())
        } else {
            Err(Error::UnexpectedTag {
                expected: tag,
                actual: String::from_utf8_lossy(actual).into_owned(),
            })
        }
    }

    /// All bytes left in the chunk.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = self.reader.bytes().remaining_bytes();
        self.reader.bytes_mut().advance(rest.len());
        rest
    }
}

impl<'a> Deref for ChunkReader<'a, '_> {
    type Target = GbxReader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl<'a> DerefMut for ChunkReader<'a, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

/// A decoded header chunk record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "fields"))]
pub enum ChunkData {
    TmDesc(TmDesc),
    Common(MapCommon),
    Version(VersionChunk),
    Community(Community),
    Thumbnail(Thumbnail),
    Author(AuthorInfo),
    VskDesc(VskDesc),
    ReplayVersion(ReplayVersion),
    CollectorDesc(CollectorDesc),
    Icon(Icon),
    Time(Timestamp),
    Skin(SkinDesc),
    ItemType(ItemType),
    GameSkin(GameSkin),
    Mood(Mood),
    Unknown(UnknownChunk),
    OldDesc(OldCollectionDesc),
    CollectionDesc(CollectionDesc),
    Folders(CollectionFolders),
    MenuIcons(MenuIcons),
    Profile(Profile),
    FolderDep(FolderDep),
}

impl ChunkData {
    pub fn kind(&self) -> ChunkKind {
        match self {
            Self::TmDesc(_) => ChunkKind::TmDesc,
            Self::Common(_) => ChunkKind::Common,
            Self::Version(_) => ChunkKind::Version,
            Self::Community(_) => ChunkKind::Community,
            Self::Thumbnail(_) => ChunkKind::Thumbnail,
            Self::Author(_) => ChunkKind::Author,
            Self::VskDesc(_) => ChunkKind::VskDesc,
            Self::ReplayVersion(_) => ChunkKind::ReplayVersion,
            Self::CollectorDesc(_) => ChunkKind::CollectorDesc,
            Self::Icon(_) => ChunkKind::Icon,
            Self::Time(_) => ChunkKind::Time,
            Self::Skin(_) => ChunkKind::Skin,
            Self::ItemType(_) => ChunkKind::ItemType,
            Self::GameSkin(_) => ChunkKind::GameSkin,
            Self::Mood(_) => ChunkKind::Mood,
            Self::Unknown(_) => ChunkKind::Unknown,
            Self::OldDesc(_) => ChunkKind::OldDesc,
            Self::CollectionDesc(_) => ChunkKind::CollectionDesc,
            Self::Folders(_) => ChunkKind::Folders,
            Self::MenuIcons(_) => ChunkKind::MenuIcons,
            Self::Profile(_) => ChunkKind::Profile,
            Self::FolderDep(_) => ChunkKind::FolderDep,
        }
    }

    fn as_describe(&self) -> &dyn Describe {
        match self {
            Self::TmDesc(c) => c,
            Self::Common(c) => c,
            Self::Version(c) => c,
            Self::Community(c) => c,
            Self::Thumbnail(c) => c,
            Self::Author(c) => c,
            Self::VskDesc(c) => c,
            Self::ReplayVersion(c) => c,
            Self::CollectorDesc(c) => c,
            Self::Icon(c) => c,
            Self::Time(c) => c,
            Self::Skin(c) => c,
            Self::ItemType(c) => c,
            Self::GameSkin(c) => c,
            Self::Mood(c) => c,
            Self::Unknown(c) => c,
            Self::OldDesc(c) => c,
            Self::CollectionDesc(c) => c,
            Self::Folders(c) => c,
            Self::MenuIcons(c) => c,
            Self::Profile(c) => c,
            Self::FolderDep(c) => c,
        }
    }
}

impl Describe for ChunkData {
    fn describe(&self) -> Vec<Field> {
        self.as_describe().describe()
    }
}

/// A header chunk together with its decoded record.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedChunk {
    pub record: ChunkRecord,
    pub data: ChunkData,
    /// Why decoding stopped early, if it did.
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::error::serde_error::option"))]
    pub error: Option<Error>,
}

impl DecodedChunk {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

fn decode_into<T: Default>(
    r: &mut ChunkReader<'_, '_>,
    read: fn(&mut ChunkReader<'_, '_>, &mut T) -> Result<()>,
    wrap: fn(T) -> ChunkData,
) -> (ChunkData, Option<Error>) {
    let mut record = T::default();
    let error = read(r, &mut record).err();
    (wrap(record), error)
}

/// Decode one chunk of the given kind.
///
/// Always yields a record; on failure the record holds the fields read
/// before the error.
pub fn decode_chunk(kind: ChunkKind, r: &mut ChunkReader<'_, '_>) -> (ChunkData, Option<Error>) {
    match kind {
        ChunkKind::TmDesc => decode_into(r, challenge::read_tm_desc, ChunkData::TmDesc),
        ChunkKind::Common => decode_into(r, challenge::read_common, ChunkData::Common),
        ChunkKind::Version => decode_into(r, misc::read_version, ChunkData::Version),
        ChunkKind::Community => decode_into(r, community::read_community, ChunkData::Community),
        ChunkKind::Thumbnail => decode_into(r, challenge::read_thumbnail, ChunkData::Thumbnail),
        ChunkKind::Author => decode_into(r, challenge::read_author, ChunkData::Author),
        ChunkKind::VskDesc => decode_into(r, challenge::read_vsk_desc, ChunkData::VskDesc),
        ChunkKind::ReplayVersion => {
            decode_into(r, replay::read_replay_version, ChunkData::ReplayVersion)
        }
        ChunkKind::CollectorDesc => {
            decode_into(r, collector::read_collector_desc, ChunkData::CollectorDesc)
        }
        ChunkKind::Icon => decode_into(r, collector::read_icon, ChunkData::Icon),
        ChunkKind::Time => decode_into(r, collector::read_time, ChunkData::Time),
        ChunkKind::Skin => decode_into(r, collector::read_skin, ChunkData::Skin),
        ChunkKind::ItemType => decode_into(r, collector::read_item_type, ChunkData::ItemType),
        ChunkKind::GameSkin => decode_into(r, collector::read_game_skin, ChunkData::GameSkin),
        ChunkKind::Mood => decode_into(r, collector::read_mood, ChunkData::Mood),
        ChunkKind::Unknown => decode_into(r, misc::read_unknown, ChunkData::Unknown),
        ChunkKind::OldDesc => decode_into(r, collection::read_old_desc, ChunkData::OldDesc),
        ChunkKind::CollectionDesc => {
            decode_into(r, collection::read_collection_desc, ChunkData::CollectionDesc)
        }
        ChunkKind::Folders => decode_into(r, collection::read_folders, ChunkData::Folders),
        ChunkKind::MenuIcons => decode_into(r, collection::read_menu_icons, ChunkData::MenuIcons),
        ChunkKind::Profile => decode_into(r, profile::read_profile, ChunkData::Profile),
        ChunkKind::FolderDep => decode_into(r, misc::read_folder_dep, ChunkData::FolderDep),
    }
}
