//! Map (challenge) header chunks.

use std::fmt;

use super::ladder::{run_steps, Gate, Step};
use super::{ChunkReader, Describe, Field, Fields};
use crate::pack::PackMask;
use crate::time::format_time;
use crate::Result;

/// Race style of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TrackType {
    Race,
    Platform,
    Puzzle,
    Crazy,
    Shortcut,
    Stunts,
    Script,
    Unknown(u32),
}

impl TrackType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Race,
            1 => Self::Platform,
            2 => Self::Puzzle,
            3 => Self::Crazy,
            4 => Self::Shortcut,
            5 => Self::Stunts,
            6 => Self::Script,
            other => Self::Unknown(other),
        }
    }

    /// Whether medal values of this track type are times. Platform counts
    /// respawns and Stunts counts points.
    pub fn times_as_time(self) -> bool {
        !matches!(self, Self::Platform | Self::Stunts)
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Race => f.write_str("Race"),
            Self::Platform => f.write_str("Platform"),
            Self::Puzzle => f.write_str("Puzzle"),
            Self::Crazy => f.write_str("Crazy"),
            Self::Shortcut => f.write_str("Shortcut"),
            Self::Stunts => f.write_str("Stunts"),
            Self::Script => f.write_str("Script"),
            Self::Unknown(raw) => write!(f, "Unknown({raw})"),
        }
    }
}

/// Medal thresholds in milliseconds (or respawns / points).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MedalTimes {
    pub bronze: u32,
    pub silver: u32,
    pub gold: u32,
    pub author: u32,
}

fn medal(value: u32, as_time: bool) -> String {
    if as_time {
        format!("{value} ({})", format_time(value as i32))
    } else {
        value.to_string()
    }
}

const EDITOR_SIMPLE: u32 = 0x1;
const EDITOR_GHOST_BLOCKS: u32 = 0x4;

/// Map description: medals, track type and lap settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TmDesc {
    pub version: u8,
    pub uid: Option<String>,
    pub environment: Option<String>,
    pub author: Option<String>,
    pub name: Option<String>,
    pub times: Option<MedalTimes>,
    pub price: Option<u32>,
    pub lap_race: Option<bool>,
    pub is_virtual: Option<bool>,
    pub track_type: Option<TrackType>,
    pub author_score: Option<u32>,
    pub editor_mode: Option<u32>,
    pub checkpoints: Option<u32>,
    pub laps: Option<u32>,
}

impl TmDesc {
    /// Formatting hint for the medal fields.
    pub fn times_as_time(&self) -> bool {
        self.track_type.map_or(true, TrackType::times_as_time)
    }

    pub fn simple_editor(&self) -> Option<bool> {
        self.editor_mode.map(|mode| mode & EDITOR_SIMPLE != 0)
    }

    pub fn has_ghost_blocks(&self) -> Option<bool> {
        self.editor_mode.map(|mode| mode & EDITOR_GHOST_BLOCKS != 0)
    }
}

impl Describe for TmDesc {
    fn describe(&self) -> Vec<Field> {
        let as_time = self.times_as_time();
        let mut fields = Fields::new()
            .add("Version", self.version)
            .opt("Uid", &self.uid)
            .opt("Environment", &self.environment)
            .opt("Author", &self.author)
            .opt("Name", &self.name);
        if let Some(times) = &self.times {
            fields = fields
                .add("Bronze", medal(times.bronze, as_time))
                .add("Silver", medal(times.silver, as_time))
                .add("Gold", medal(times.gold, as_time))
                .add("BestTime", medal(times.author, as_time));
        }
        fields = fields
            .opt("Price", &self.price)
            .opt("LapRace", &self.lap_race)
            .opt("Virtual", &self.is_virtual)
            .opt("TrackType", &self.track_type)
            .opt("AuthorScore", &self.author_score);
        if let Some(mode) = self.editor_mode {
            let editor = if mode & EDITOR_SIMPLE != 0 { "Simple" } else { "Advanced" };
            let value = if mode & EDITOR_GHOST_BLOCKS != 0 {
                format!("{editor}, GhostBlocks")
            } else {
                editor.to_string()
            };
            fields = fields.add("EditorMode", value);
        }
        fields
            .opt("Checkpoints", &self.checkpoints)
            .opt("Laps", &self.laps)
            .build()
    }
}

fn tm_legacy(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.uid = Some(r.ident_name()?);
    out.environment = Some(r.ident_name()?);
    out.author = Some(r.ident_name()?);
    out.name = Some(r.string()?);
    Ok(())
}

fn skip_bool(r: &mut ChunkReader<'_, '_>, _: &mut TmDesc) -> Result<()> {
    r.bool()?;
    Ok(())
}

fn skip_nat8(r: &mut ChunkReader<'_, '_>, _: &mut TmDesc) -> Result<()> {
    r.nat8()?;
    Ok(())
}

fn skip_nat32(r: &mut ChunkReader<'_, '_>, _: &mut TmDesc) -> Result<()> {
    r.nat32()?;
    Ok(())
}

fn tm_times(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.times = Some(MedalTimes {
        bronze: r.nat32()?,
        silver: r.nat32()?,
        gold: r.nat32()?,
        author: r.nat32()?,
    });
    Ok(())
}

fn tm_price(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.price = Some(r.nat32()?);
    Ok(())
}

fn tm_lap_race(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.lap_race = Some(r.bool()?);
    Ok(())
}

fn tm_virtual(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.is_virtual = Some(r.bool()?);
    Ok(())
}

fn tm_track_type(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.track_type = Some(TrackType::from_raw(r.nat32()?));
    Ok(())
}

fn tm_author_score(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.author_score = Some(r.nat32()?);
    Ok(())
}

fn tm_editor_mode(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.editor_mode = Some(r.nat32()?);
    Ok(())
}

fn tm_checkpoints(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.checkpoints = Some(r.nat32()?);
    out.laps = Some(r.nat32()?);
    Ok(())
}

static TM_DESC_STEPS: &[Step<TmDesc>] = &[
    Step::new(Gate::Below(3), tm_legacy),
    Step::new(Gate::Always, skip_bool),
    Step::new(Gate::AtLeast(1), tm_times),
    Step::new(Gate::Exactly(2), skip_nat8),
    Step::new(Gate::AtLeast(4), tm_price),
    Step::new(Gate::AtLeast(5), tm_lap_race),
    Step::new(Gate::Exactly(6), tm_virtual),
    Step::new(Gate::AtLeast(7), tm_track_type),
    Step::new(Gate::AtLeast(9), skip_nat32),
    Step::new(Gate::AtLeast(10), tm_author_score),
    Step::new(Gate::AtLeast(11), tm_editor_mode),
    Step::new(Gate::AtLeast(12), skip_nat32),
    Step::new(Gate::AtLeast(13), tm_checkpoints),
];

pub(super) fn read_tm_desc(r: &mut ChunkReader<'_, '_>, out: &mut TmDesc) -> Result<()> {
    out.version = r.nat8()?;
    run_steps(r, out.version.into(), out, TM_DESC_STEPS)
}

/// Map kind stored in the common chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MapKind {
    #[default]
    EndMarker,
    Campaign,
    Puzzle,
    Retro,
    TimeAttack,
    Rounds,
    InProgress,
    CampaignOld,
    Multi,
    Solo,
    Site,
    SoloNadeo,
    MultiNadeo,
    Unknown(u8),
}

impl MapKind {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::EndMarker,
            1 => Self::Campaign,
            2 => Self::Puzzle,
            3 => Self::Retro,
            4 => Self::TimeAttack,
            5 => Self::Rounds,
            6 => Self::InProgress,
            7 => Self::CampaignOld,
            8 => Self::Multi,
            9 => Self::Solo,
            10 => Self::Site,
            11 => Self::SoloNadeo,
            12 => Self::MultiNadeo,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "Unknown({raw})"),
            known => fmt::Debug::fmt(known, f),
        }
    }
}

/// Decoration (mood) of a map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Decoration {
    pub id: String,
    pub collection: String,
    pub author: String,
}

/// Common map information.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MapCommon {
    pub version: u8,
    pub uid: Option<String>,
    pub environment: Option<String>,
    pub author: Option<String>,
    pub name: Option<String>,
    pub kind: Option<MapKind>,
    pub locked: Option<bool>,
    pub password: Option<String>,
    pub decoration: Option<Decoration>,
    pub origin: Option<(f32, f32)>,
    pub target: Option<(f32, f32)>,
    pub pack_mask: Option<PackMask>,
    pub map_type: Option<String>,
    pub map_style: Option<String>,
    pub lightmap_cache_uid: Option<u64>,
    pub lightmap_version: Option<u8>,
    pub title_id: Option<String>,
}

impl MapCommon {
    /// The pack mask rendered against this map's environment.
    pub fn pack_mask_name(&self) -> Option<String> {
        let environment = self.environment.as_deref().unwrap_or_default();
        self.pack_mask.map(|mask| mask.describe(environment))
    }
}

fn pair(value: &Option<(f32, f32)>) -> Option<String> {
    value.map(|(x, y)| format!("({x}, {y})"))
}

impl Describe for MapCommon {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("Uid", &self.uid)
            .opt("Environment", &self.environment)
            .opt("Author", &self.author)
            .opt("Name", &self.name)
            .opt("Kind", &self.kind)
            .opt("Locked", &self.locked)
            .opt("Password", &self.password)
            .opt("Decoration", &self.decoration.as_ref().map(|d| d.id.clone()))
            .opt("DecorationCollection", &self.decoration.as_ref().map(|d| d.collection.clone()))
            .opt("Origin", &pair(&self.origin))
            .opt("Target", &pair(&self.target))
            .opt("Packs", &self.pack_mask_name())
            .opt("MapType", &self.map_type)
            .opt("MapStyle", &self.map_style)
            .opt("LightmapCacheUid", &self.lightmap_cache_uid.map(|uid| format!("{uid:#018x}")))
            .opt("LightmapVersion", &self.lightmap_version)
            .opt("TitleId", &self.title_id)
            .build()
    }
}

fn common_base(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.uid = Some(r.ident_name()?);
    out.environment = Some(r.ident_name()?);
    out.author = Some(r.ident_name()?);
    out.name = Some(r.string()?);
    out.kind = Some(MapKind::from_raw(r.nat8()?));
    Ok(())
}

fn common_lock(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.locked = Some(r.bool()?);
    out.password = Some(r.string()?);
    Ok(())
}

fn common_decoration(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.decoration = Some(Decoration {
        id: r.ident_name()?,
        collection: r.ident_name()?,
        author: r.ident_name()?,
    });
    Ok(())
}

fn common_origin(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.origin = Some((r.real()?, r.real()?));
    Ok(())
}

fn common_target(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.target = Some((r.real()?, r.real()?));
    Ok(())
}

fn common_pack_mask(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.pack_mask = Some(PackMask(r.nat128()?));
    Ok(())
}

fn common_map_type(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.map_type = Some(r.string()?);
    out.map_style = Some(r.string()?);
    Ok(())
}

fn common_lightmap_cache(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.lightmap_cache_uid = Some(r.nat64()?);
    Ok(())
}

fn common_lightmap_version(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.lightmap_version = Some(r.nat8()?);
    Ok(())
}

fn common_title(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.title_id = Some(r.ident_name()?);
    Ok(())
}

static COMMON_STEPS: &[Step<MapCommon>] = &[
    Step::new(Gate::Always, common_base),
    Step::new(Gate::AtLeast(1), common_lock),
    Step::new(Gate::AtLeast(2), common_decoration),
    Step::new(Gate::AtLeast(3), common_origin),
    Step::new(Gate::AtLeast(4), common_target),
    Step::new(Gate::AtLeast(5), common_pack_mask),
    Step::new(Gate::AtLeast(6), common_map_type),
    Step::new(Gate::Within(6, 8), common_lightmap_cache),
    Step::new(Gate::AtLeast(8), common_lightmap_version),
    Step::new(Gate::AtLeast(11), common_title),
];

pub(super) fn read_common(r: &mut ChunkReader<'_, '_>, out: &mut MapCommon) -> Result<()> {
    out.version = r.nat8()?;
    run_steps(r, out.version.into(), out, COMMON_STEPS)
}

/// Embedded JPEG thumbnail and map comments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Thumbnail {
    pub version: u32,
    pub size: Option<u32>,
    /// Raw JPEG bytes.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Vec<u8>,
    pub comments: Option<String>,
}

impl Describe for Thumbnail {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("ThumbnailSize", &self.size)
            .opt("Comments", &self.comments)
            .build()
    }
}

const THUMBNAIL_OPEN: &str = "<Thumbnail.jpg>";
const THUMBNAIL_CLOSE: &str = "</Thumbnail.jpg>";
const COMMENTS_OPEN: &str = "<Comments>";
const COMMENTS_CLOSE: &str = "</Comments>";

pub(super) fn read_thumbnail(r: &mut ChunkReader<'_, '_>, out: &mut Thumbnail) -> Result<()> {
    out.version = r.nat32()?;
    if out.version == 0 {
        return Ok(());
    }
    let size = r.nat32()?;
    out.size = Some(size);
    r.expect_tag(THUMBNAIL_OPEN)?;
    out.data = r.raw(size as usize)?.to_vec();
    r.expect_tag(THUMBNAIL_CLOSE)?;
    r.expect_tag(COMMENTS_OPEN)?;
    out.comments = Some(r.string()?);
    r.expect_tag(COMMENTS_CLOSE)?;
    Ok(())
}

/// Author details.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AuthorInfo {
    pub version: u32,
    pub author_version: Option<u32>,
    pub login: Option<String>,
    pub nick: Option<String>,
    pub zone: Option<String>,
    pub extra: Option<String>,
}

impl Describe for AuthorInfo {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("AuthorVersion", &self.author_version)
            .opt("Login", &self.login)
            .opt("Nick", &self.nick)
            .opt("Zone", &self.zone)
            .opt("Extra", &self.extra)
            .build()
    }
}

pub(super) fn read_author(r: &mut ChunkReader<'_, '_>, out: &mut AuthorInfo) -> Result<()> {
    out.version = r.nat32()?;
    out.author_version = Some(r.nat32()?);
    out.login = Some(r.string()?);
    out.nick = Some(r.string()?);
    out.zone = Some(r.string()?);
    out.extra = Some(r.string()?);
    Ok(())
}

/// Virtual Skipper race mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RaceMode {
    Fleet,
    Match,
    Team,
    Unknown(u32),
}

impl RaceMode {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Fleet,
            1 => Self::Match,
            2 => Self::Team,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for RaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "Unknown({raw})"),
            known => fmt::Debug::fmt(known, f),
        }
    }
}

/// Virtual Skipper regatta parameters.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VskDesc {
    pub version: u8,
    pub race_mode: Option<RaceMode>,
    pub laps: Option<u32>,
    pub wind_direction: Option<u32>,
    pub wind_speed: Option<f32>,
    pub buoys: Option<u32>,
}

impl Describe for VskDesc {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("RaceMode", &self.race_mode)
            .opt("Laps", &self.laps)
            .opt("WindDirection", &self.wind_direction)
            .opt("WindSpeed", &self.wind_speed)
            .opt("Buoys", &self.buoys)
            .build()
    }
}

fn vsk_race(r: &mut ChunkReader<'_, '_>, out: &mut VskDesc) -> Result<()> {
    out.race_mode = Some(RaceMode::from_raw(r.nat32()?));
    out.laps = Some(r.nat32()?);
    Ok(())
}

fn vsk_wind(r: &mut ChunkReader<'_, '_>, out: &mut VskDesc) -> Result<()> {
    out.wind_direction = Some(r.nat32()?);
    out.wind_speed = Some(r.real()?);
    Ok(())
}

fn vsk_buoys(r: &mut ChunkReader<'_, '_>, out: &mut VskDesc) -> Result<()> {
    out.buoys = Some(r.nat32()?);
    Ok(())
}

static VSK_STEPS: &[Step<VskDesc>] = &[
    Step::new(Gate::Always, vsk_race),
    Step::new(Gate::AtLeast(1), vsk_wind),
    Step::new(Gate::AtLeast(2), vsk_buoys),
];

pub(super) fn read_vsk_desc(r: &mut ChunkReader<'_, '_>, out: &mut VskDesc) -> Result<()> {
    out.version = r.nat8()?;
    run_steps(r, out.version.into(), out, VSK_STEPS)
}
