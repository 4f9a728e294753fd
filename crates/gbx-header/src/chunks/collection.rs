//! Collection (environment) header chunks.

use gbx_common::Error as CommonError;

use super::ladder::{run_steps, Gate, Step};
use super::{ChunkReader, Describe, Field, Fields};
use crate::Result;

/// Upper bound on menu icons in one chunk.
const MAX_MENU_ICONS: u32 = 0x1000;

fn point(value: &Option<(f32, f32)>) -> Option<String> {
    value.map(|(x, y)| format!("({x}, {y})"))
}

/// Collection description used by the oldest games.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OldCollectionDesc {
    pub collection: Option<String>,
    pub name: Option<String>,
    pub need_unlock: Option<bool>,
}

impl Describe for OldCollectionDesc {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .opt("Collection", &self.collection)
            .opt("Name", &self.name)
            .opt("NeedUnlock", &self.need_unlock)
            .build()
    }
}

pub(super) fn read_old_desc(r: &mut ChunkReader<'_, '_>, out: &mut OldCollectionDesc) -> Result<()> {
    out.collection = Some(r.ident_name()?);
    out.name = Some(r.string()?);
    out.need_unlock = Some(r.bool()?);
    Ok(())
}

/// Collection description.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CollectionDesc {
    pub version: u8,
    pub collection: Option<String>,
    pub need_unlock: Option<bool>,
    pub icon_env: Option<String>,
    pub icon_collection: Option<String>,
    pub sort_index: Option<u32>,
    pub default_zone: Option<String>,
    pub vehicle: Option<[String; 3]>,
    pub map_fid: Option<String>,
    pub map_coord_elem: Option<(f32, f32)>,
    pub map_coord_icon: Option<(f32, f32)>,
    pub load_screen: Option<String>,
    pub map_coord_desc: Option<(f32, f32)>,
}

impl Describe for CollectionDesc {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("Collection", &self.collection)
            .opt("NeedUnlock", &self.need_unlock)
            .opt("IconEnv", &self.icon_env)
            .opt("IconCollection", &self.icon_collection)
            .opt("SortIndex", &self.sort_index)
            .opt("DefaultZone", &self.default_zone)
            .opt("Vehicle", &self.vehicle.as_ref().map(|v| v.join(" / ")))
            .opt("MapFid", &self.map_fid)
            .opt("MapCoordElem", &point(&self.map_coord_elem))
            .opt("MapCoordIcon", &point(&self.map_coord_icon))
            .opt("LoadScreen", &self.load_screen)
            .opt("MapCoordDesc", &point(&self.map_coord_desc))
            .build()
    }
}

fn desc_base(r: &mut ChunkReader<'_, '_>, out: &mut CollectionDesc) -> Result<()> {
    out.collection = Some(r.ident_name()?);
    out.need_unlock = Some(r.bool()?);
    Ok(())
}

fn desc_icons(r: &mut ChunkReader<'_, '_>, out: &mut CollectionDesc) -> Result<()> {
    out.icon_env = Some(r.string()?);
    out.icon_collection = Some(r.string()?);
    Ok(())
}

fn desc_sort_index(r: &mut ChunkReader<'_, '_>, out: &mut CollectionDesc) -> Result<()> {
    out.sort_index = Some(r.nat32()?);
    Ok(())
}

fn desc_default_zone(r: &mut ChunkReader<'_, '_>, out: &mut CollectionDesc) -> Result<()> {
    out.default_zone = Some(r.ident_name()?);
    Ok(())
}

fn desc_vehicle(r: &mut ChunkReader<'_, '_>, out: &mut CollectionDesc) -> Result<()> {
    out.vehicle = Some([r.ident_name()?, r.ident_name()?, r.ident_name()?]);
    Ok(())
}

fn desc_map_fid(r: &mut ChunkReader<'_, '_>, out: &mut CollectionDesc) -> Result<()> {
    out.map_fid = Some(r.string()?);
    Ok(())
}

fn desc_map_coords(r: &mut ChunkReader<'_, '_>, out: &mut CollectionDesc) -> Result<()> {
    out.map_coord_elem = Some((r.real()?, r.real()?));
    out.map_coord_icon = Some((r.real()?, r.real()?));
    Ok(())
}

fn desc_load_screen(r: &mut ChunkReader<'_, '_>, out: &mut CollectionDesc) -> Result<()> {
    out.load_screen = Some(r.string()?);
    Ok(())
}

fn desc_map_coord_desc(r: &mut ChunkReader<'_, '_>, out: &mut CollectionDesc) -> Result<()> {
    out.map_coord_desc = Some((r.real()?, r.real()?));
    Ok(())
}

static DESC_STEPS: &[Step<CollectionDesc>] = &[
    Step::new(Gate::Always, desc_base),
    Step::new(Gate::AtLeast(1), desc_icons),
    Step::new(Gate::AtLeast(2), desc_sort_index),
    Step::new(Gate::AtLeast(3), desc_default_zone),
    Step::new(Gate::AtLeast(4), desc_vehicle),
    Step::new(Gate::AtLeast(5), desc_map_fid),
    Step::new(Gate::AtLeast(6), desc_map_coords),
    Step::new(Gate::AtLeast(7), desc_load_screen),
    Step::new(Gate::AtLeast(8), desc_map_coord_desc),
];

pub(super) fn read_collection_desc(
    r: &mut ChunkReader<'_, '_>,
    out: &mut CollectionDesc,
) -> Result<()> {
    out.version = r.nat8()?;
    run_steps(r, out.version.into(), out, DESC_STEPS)
}

/// Folder layout of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CollectionFolders {
    pub version: u8,
    pub block_info: Option<String>,
    pub item: Option<String>,
    pub decoration: Option<String>,
    pub menu_icons: Option<String>,
    pub display_name: Option<String>,
}

impl Describe for CollectionFolders {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("BlockInfoFolder", &self.block_info)
            .opt("ItemFolder", &self.item)
            .opt("DecorationFolder", &self.decoration)
            .opt("MenuIconsFolder", &self.menu_icons)
            .opt("DisplayName", &self.display_name)
            .build()
    }
}

fn folders_base(r: &mut ChunkReader<'_, '_>, out: &mut CollectionFolders) -> Result<()> {
    out.block_info = Some(r.string()?);
    out.item = Some(r.string()?);
    out.decoration = Some(r.string()?);
    Ok(())
}

fn folders_menu_icons(r: &mut ChunkReader<'_, '_>, out: &mut CollectionFolders) -> Result<()> {
    out.menu_icons = Some(r.string()?);
    Ok(())
}

fn folders_display_name(r: &mut ChunkReader<'_, '_>, out: &mut CollectionFolders) -> Result<()> {
    out.display_name = Some(r.string()?);
    Ok(())
}

static FOLDER_STEPS: &[Step<CollectionFolders>] = &[
    Step::new(Gate::Always, folders_base),
    Step::new(Gate::AtLeast(1), folders_menu_icons),
    Step::new(Gate::AtLeast(3), folders_display_name),
];

pub(super) fn read_folders(r: &mut ChunkReader<'_, '_>, out: &mut CollectionFolders) -> Result<()> {
    out.version = r.nat8()?;
    run_steps(r, out.version.into(), out, FOLDER_STEPS)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MenuIcon {
    pub name: String,
    pub path: String,
}

/// Menu icons of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MenuIcons {
    pub version: u8,
    pub icons: Vec<MenuIcon>,
}

impl Describe for MenuIcons {
    fn describe(&self) -> Vec<Field> {
        let mut fields = Fields::new()
            .add("Version", self.version)
            .add("Count", self.icons.len());
        for icon in &self.icons {
            fields = fields.add("Icon", format!("{}: {}", icon.name, icon.path));
        }
        fields.build()
    }
}

pub(super) fn read_menu_icons(r: &mut ChunkReader<'_, '_>, out: &mut MenuIcons) -> Result<()> {
    out.version = r.nat8()?;
    let count = r.nat32()?;
    if count > MAX_MENU_ICONS {
        return Err(CommonError::limit("menu icon count", count, MAX_MENU_ICONS + 1).into());
    }
    for _ in 0..count {
        let name = r.ident_name()?;
        let path = r.string()?;
        out.icons.push(MenuIcon { name, path });
    }
    Ok(())
}
