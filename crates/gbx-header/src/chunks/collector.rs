//! Collector (block, item, decoration) header chunks.

use std::fmt;

use super::ladder::{run_steps, Gate, Step};
use super::{ChunkReader, Describe, Field, Fields};
use crate::time::{filetime_to_unix, format_unix};
use crate::Result;

/// Production state of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ProdState {
    Aborted,
    GameBox,
    DevBuild,
    Release,
    Unknown(u8),
}

impl ProdState {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Aborted,
            1 => Self::GameBox,
            2 => Self::DevBuild,
            3 => Self::Release,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for ProdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "Unknown({raw})"),
            known => fmt::Debug::fmt(known, f),
        }
    }
}

/// Catalog description of a collector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CollectorDesc {
    pub uid: Option<String>,
    pub collection: Option<String>,
    pub author: Option<String>,
    pub version: Option<u32>,
    pub page_name: Option<String>,
    pub product_flags: Option<u32>,
    pub catalog_position: Option<u16>,
    pub name: Option<String>,
    pub prod_state: Option<ProdState>,
}

impl Describe for CollectorDesc {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .opt("Uid", &self.uid)
            .opt("Collection", &self.collection)
            .opt("Author", &self.author)
            .opt("Version", &self.version)
            .opt("PageName", &self.page_name)
            .opt("ProductFlags", &self.product_flags.map(|f| format!("{f:#x}")))
            .opt("CatalogPosition", &self.catalog_position)
            .opt("Name", &self.name)
            .opt("ProdState", &self.prod_state)
            .build()
    }
}

fn collector_page(r: &mut ChunkReader<'_, '_>, out: &mut CollectorDesc) -> Result<()> {
    out.page_name = Some(r.string()?);
    Ok(())
}

fn collector_unused(r: &mut ChunkReader<'_, '_>, _: &mut CollectorDesc) -> Result<()> {
    r.nat32()?;
    Ok(())
}

fn collector_flags(r: &mut ChunkReader<'_, '_>, out: &mut CollectorDesc) -> Result<()> {
    out.product_flags = Some(r.nat32()?);
    Ok(())
}

fn collector_position(r: &mut ChunkReader<'_, '_>, out: &mut CollectorDesc) -> Result<()> {
    out.catalog_position = Some(r.nat16()?);
    Ok(())
}

fn collector_name(r: &mut ChunkReader<'_, '_>, out: &mut CollectorDesc) -> Result<()> {
    out.name = Some(r.string()?);
    Ok(())
}

fn collector_prod_state(r: &mut ChunkReader<'_, '_>, out: &mut CollectorDesc) -> Result<()> {
    out.prod_state = Some(ProdState::from_raw(r.nat8()?));
    Ok(())
}

static COLLECTOR_STEPS: &[Step<CollectorDesc>] = &[
    Step::new(Gate::Always, collector_page),
    Step::new(Gate::Exactly(5), collector_unused),
    Step::new(Gate::AtLeast(4), collector_flags),
    Step::new(Gate::AtLeast(3), collector_position),
    Step::new(Gate::AtLeast(7), collector_name),
    Step::new(Gate::AtLeast(8), collector_prod_state),
];

pub(super) fn read_collector_desc(
    r: &mut ChunkReader<'_, '_>,
    out: &mut CollectorDesc,
) -> Result<()> {
    out.uid = Some(r.ident_name()?);
    out.collection = Some(r.ident_name()?);
    out.author = Some(r.ident_name()?);
    let version = r.nat32()?;
    out.version = Some(version);
    run_steps(r, version, out, COLLECTOR_STEPS)
}

const WEBP_FLAG: u16 = 0x8000;

/// Pixel payload of an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IconImage {
    /// Uncompressed RGBA, `width * height * 4` bytes.
    Rgba {
        #[cfg_attr(feature = "serde", serde(skip))]
        data: Vec<u8>,
    },
    /// WebP container bytes.
    WebP {
        version: u16,
        #[cfg_attr(feature = "serde", serde(skip))]
        data: Vec<u8>,
    },
}

/// Catalog icon of a collector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Icon {
    pub width: u16,
    pub height: u16,
    pub image: Option<IconImage>,
}

impl Icon {
    pub fn is_webp(&self) -> bool {
        matches!(self.image, Some(IconImage::WebP { .. }))
    }

    /// Encoded image bytes.
    pub fn data(&self) -> &[u8] {
        match &self.image {
            Some(IconImage::Rgba { data }) | Some(IconImage::WebP { data, .. }) => data.as_slice(),
            None => &[],
        }
    }
}

impl Describe for Icon {
    fn describe(&self) -> Vec<Field> {
        let format = match &self.image {
            Some(IconImage::Rgba { .. }) => Some("RGBA".to_string()),
            Some(IconImage::WebP { version, .. }) => Some(format!("WebP (version {version})")),
            None => None,
        };
        Fields::new()
            .add("Size", format!("{}x{}", self.width, self.height))
            .opt("Format", &format)
            .add("DataSize", self.data().len())
            .build()
    }
}

pub(super) fn read_icon(r: &mut ChunkReader<'_, '_>, out: &mut Icon) -> Result<()> {
    let width = r.nat16()?;
    let height = r.nat16()?;
    if width & WEBP_FLAG != 0 && height & WEBP_FLAG != 0 {
        out.width = width & !WEBP_FLAG;
        out.height = height & !WEBP_FLAG;
        let version = r.nat16()?;
        let size = r.nat32()?;
        out.image = Some(IconImage::WebP {
            version,
            data: r.raw(size as usize)?.to_vec(),
        });
    } else {
        out.width = width;
        out.height = height;
        let size = usize::from(width) * usize::from(height) * 4;
        out.image = Some(IconImage::Rgba {
            data: r.raw(size)?.to_vec(),
        });
    }
    Ok(())
}

/// Last modification time of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Timestamp {
    /// Windows FILETIME.
    pub filetime: Option<u64>,
}

impl Timestamp {
    pub fn unix_seconds(&self) -> Option<i64> {
        self.filetime.map(filetime_to_unix)
    }
}

impl Describe for Timestamp {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .opt("Time", &self.unix_seconds().and_then(format_unix))
            .build()
    }
}

pub(super) fn read_time(r: &mut ChunkReader<'_, '_>, out: &mut Timestamp) -> Result<()> {
    out.filetime = Some(r.nat64()?);
    Ok(())
}

/// Block skin description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SkinDesc {
    pub version: u32,
    pub text: Option<String>,
    pub pack_desc: Option<String>,
}

impl Describe for SkinDesc {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("Text", &self.text)
            .opt("PackDesc", &self.pack_desc)
            .build()
    }
}

fn skin_text(r: &mut ChunkReader<'_, '_>, out: &mut SkinDesc) -> Result<()> {
    out.text = Some(r.string()?);
    Ok(())
}

fn skin_pack_desc(r: &mut ChunkReader<'_, '_>, out: &mut SkinDesc) -> Result<()> {
    out.pack_desc = Some(r.string()?);
    Ok(())
}

static SKIN_STEPS: &[Step<SkinDesc>] = &[
    Step::new(Gate::Always, skin_text),
    Step::new(Gate::AtLeast(1), skin_pack_desc),
];

pub(super) fn read_skin(r: &mut ChunkReader<'_, '_>, out: &mut SkinDesc) -> Result<()> {
    out.version = r.nat32()?;
    run_steps(r, out.version, out, SKIN_STEPS)
}

static ITEM_TYPES: [&str; 16] = [
    "Undefined",
    "Ornament",
    "PickUp",
    "Character",
    "Vehicle",
    "Spot",
    "Cannon",
    "Group",
    "Decal",
    "Turret",
    "Wagon",
    "Block",
    "EntitySpawner",
    "DeprecV",
    "Procedural",
    "Generic",
];

/// Item model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ItemType {
    pub raw: Option<u32>,
}

impl ItemType {
    pub fn name(&self) -> Option<&'static str> {
        let raw = usize::try_from(self.raw?).ok()?;
        ITEM_TYPES.get(raw).copied()
    }
}

impl Describe for ItemType {
    fn describe(&self) -> Vec<Field> {
        let value = match (self.name(), self.raw) {
            (Some(name), _) => Some(name.to_string()),
            (None, Some(raw)) => Some(format!("Unknown({raw})")),
            (None, None) => None,
        };
        Fields::new().opt("ItemType", &value).build()
    }
}

pub(super) fn read_item_type(r: &mut ChunkReader<'_, '_>, out: &mut ItemType) -> Result<()> {
    out.raw = Some(r.nat32()?);
    Ok(())
}

/// Vehicle/game skin folders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GameSkin {
    pub version: u8,
    pub directory: Option<String>,
    pub texture: Option<String>,
    pub sound_directory: Option<String>,
}

impl Describe for GameSkin {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("Directory", &self.directory)
            .opt("Texture", &self.texture)
            .opt("SoundDirectory", &self.sound_directory)
            .build()
    }
}

fn game_skin_dir(r: &mut ChunkReader<'_, '_>, out: &mut GameSkin) -> Result<()> {
    out.directory = Some(r.string()?);
    Ok(())
}

fn game_skin_texture(r: &mut ChunkReader<'_, '_>, out: &mut GameSkin) -> Result<()> {
    out.texture = Some(r.string()?);
    Ok(())
}

fn game_skin_sound(r: &mut ChunkReader<'_, '_>, out: &mut GameSkin) -> Result<()> {
    out.sound_directory = Some(r.string()?);
    Ok(())
}

static GAME_SKIN_STEPS: &[Step<GameSkin>] = &[
    Step::new(Gate::Always, game_skin_dir),
    Step::new(Gate::AtLeast(1), game_skin_texture),
    Step::new(Gate::AtLeast(2), game_skin_sound),
];

pub(super) fn read_game_skin(r: &mut ChunkReader<'_, '_>, out: &mut GameSkin) -> Result<()> {
    out.version = r.nat8()?;
    run_steps(r, out.version.into(), out, GAME_SKIN_STEPS)
}

/// Decoration mood.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mood {
    pub mood: Option<String>,
    pub decoration: Option<String>,
}

impl Describe for Mood {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .opt("Mood", &self.mood)
            .opt("Decoration", &self.decoration)
            .build()
    }
}

pub(super) fn read_mood(r: &mut ChunkReader<'_, '_>, out: &mut Mood) -> Result<()> {
    out.mood = Some(r.ident_name()?);
    if !r.is_exhausted() {
        out.decoration = Some(r.string()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gbx_common::Encoding;
    use pretty_assertions::assert_eq;

    use super::super::test_support::Payload;
    use super::*;
    use crate::IdentifierTable;

    fn run<T: Default>(
        data: &[u8],
        read: fn(&mut ChunkReader<'_, '_>, &mut T) -> Result<()>,
    ) -> (T, Result<()>) {
        let mut idents = IdentifierTable::new();
        let mut r = ChunkReader::new(data, Encoding::Binary, &mut idents);
        let mut out = T::default();
        let result = read(&mut r, &mut out);
        (out, result)
    }

    #[test]
    fn test_collector_desc_version_8() {
        let data = Payload::new()
            .new_ident(true, "GateCheckpoint")
            .u32(26)
            .new_ident(false, "Nadeo")
            .u32(8)
            .str("Items/Gates")
            .u32(0x10)
            .u16(7)
            .str("Gate")
            .u8(3)
            .0;
        let (desc, result) = run(&data, read_collector_desc);
        result.unwrap();

        assert_eq!(desc.uid.as_deref(), Some("GateCheckpoint"));
        assert_eq!(desc.collection.as_deref(), Some("Stadium"));
        assert_eq!(desc.page_name.as_deref(), Some("Items/Gates"));
        assert_eq!(desc.product_flags, Some(0x10));
        assert_eq!(desc.catalog_position, Some(7));
        assert_eq!(desc.name.as_deref(), Some("Gate"));
        assert_eq!(desc.prod_state, Some(ProdState::Release));
    }

    #[test]
    fn test_collector_desc_version_5_skips_word() {
        let data = Payload::new()
            .u32(3)
            .u32(0xFFFF_FFFF)
            .u32(0xFFFF_FFFF)
            .u32(0xFFFF_FFFF)
            .u32(5)
            .str("")
            .u32(0xDEAD)
            .u32(0x2)
            .u16(1)
            .0;
        let (desc, result) = run(&data, read_collector_desc);
        result.unwrap();
        assert_eq!(desc.product_flags, Some(0x2));
        assert_eq!(desc.catalog_position, Some(1));
        assert_eq!(desc.name, None);
    }

    #[test]
    fn test_icon_rgba() {
        let data = Payload::new().u16(2).u16(1).bytes(&[7; 8]).0;
        let (icon, result) = run(&data, read_icon);
        result.unwrap();
        assert_eq!((icon.width, icon.height), (2, 1));
        assert!(!icon.is_webp());
        assert_eq!(icon.data(), &[7; 8]);
    }

    #[test]
    fn test_icon_webp() {
        let data = Payload::new()
            .u16(0x8040)
            .u16(0x8040)
            .u16(1)
            .u32(4)
            .bytes(b"RIFF")
            .0;
        let (icon, result) = run(&data, read_icon);
        result.unwrap();
        assert_eq!((icon.width, icon.height), (64, 64));
        assert!(icon.is_webp());
        assert_eq!(icon.data(), b"RIFF");
    }

    #[test]
    fn test_icon_truncated() {
        let data = Payload::new().u16(64).u16(64).bytes(&[0; 10]).0;
        let (icon, result) = run(&data, read_icon);
        assert!(result.is_err());
        assert_eq!(icon.width, 64);
        assert_eq!(icon.image, None);
    }

    #[test]
    fn test_time() {
        let data = Payload::new().u64(132_223_104_000_000_000).0;
        let (time, result) = run(&data, read_time);
        result.unwrap();
        assert_eq!(time.unix_seconds(), Some(1_577_836_800));
        assert_eq!(time.describe()[0].to_string(), "Time=2020-01-01 00:00:00");
    }

    #[test]
    fn test_item_type() {
        let (item, _) = run(&Payload::new().u32(11).0, read_item_type);
        assert_eq!(item.name(), Some("Block"));
        let (item, _) = run(&Payload::new().u32(99).0, read_item_type);
        assert_eq!(item.describe()[0].to_string(), "ItemType=Unknown(99)");
    }

    #[test]
    fn test_mood_optional_decoration() {
        let (mood, result) = run(&Payload::new().new_ident(true, "Night").0, read_mood);
        result.unwrap();
        assert_eq!(mood.mood.as_deref(), Some("Night"));
        assert_eq!(mood.decoration, None);

        let data = Payload::new().new_ident(true, "Night").str("48x48Night").0;
        let (mood, result) = run(&data, read_mood);
        result.unwrap();
        assert_eq!(mood.decoration.as_deref(), Some("48x48Night"));
    }

    #[test]
    fn test_game_skin() {
        let data = Payload::new()
            .u8(2)
            .str("Skins\\Models\\CarCommon")
            .str("Skin.zip")
            .str("Sounds")
            .0;
        let (skin, result) = run(&data, read_game_skin);
        result.unwrap();
        assert_eq!(skin.sound_directory.as_deref(), Some("Sounds"));
    }

    #[test]
    fn test_skin_version_zero() {
        let data = Payload::new().u32(0).str("text").str("ignored").0;
        let (skin, result) = run(&data, read_skin);
        result.unwrap();
        assert_eq!(skin.text.as_deref(), Some("text"));
        assert_eq!(skin.pack_desc, None);
    }
}
