//! Class id dispatch.
//!
//! Every GBX file names the engine class of its root node. The class id
//! determines the coarse [`ClassCategory`] of the file, and the category
//! determines which header chunks are known and decoded.
//!
//! Both mappings are static data: adding a class or a chunk alias is a
//! table edit, not a new branch.

use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::LazyLock;

use hashbrown::HashMap;
use rustc_hash::FxHasher;

use crate::chunks::ChunkKind;

type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Coarse kind of GBX file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ClassCategory {
    #[default]
    Other,
    Challenge,
    Replay,
    Collector,
    Collection,
    Profile,
    Skin,
    Plug,
    Hms,
}

impl ClassCategory {
    /// All categories.
    pub const ALL: [ClassCategory; 9] = [
        Self::Other,
        Self::Challenge,
        Self::Replay,
        Self::Collector,
        Self::Collection,
        Self::Profile,
        Self::Skin,
        Self::Plug,
        Self::Hms,
    ];

    /// Header chunks decoded for files of this category.
    pub fn known_chunks(self) -> &'static [KnownChunk] {
        match self {
            Self::Other => OTHER_CHUNKS,
            Self::Challenge => CHALLENGE_CHUNKS,
            Self::Replay => REPLAY_CHUNKS,
            Self::Collector => COLLECTOR_CHUNKS,
            Self::Collection => COLLECTION_CHUNKS,
            Self::Profile => PROFILE_CHUNKS,
            Self::Skin => SKIN_CHUNKS,
            Self::Plug => PLUG_CHUNKS,
            Self::Hms => HMS_CHUNKS,
        }
    }

    /// The chunk kind of `chunk_id` for this category, if known.
    pub fn chunk_kind(self, chunk_id: u32) -> Option<ChunkKind> {
        self.known_chunks()
            .iter()
            .find(|known| known.id == chunk_id)
            .map(|known| known.kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Other => "Other",
            Self::Challenge => "Challenge",
            Self::Replay => "Replay",
            Self::Collector => "Collector",
            Self::Collection => "Collection",
            Self::Profile => "Profile",
            Self::Skin => "Skin",
            Self::Plug => "Plug",
            Self::Hms => "Hms",
        }
    }
}

impl fmt::Display for ClassCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A header chunk id known for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownChunk {
    pub id: u32,
    pub kind: ChunkKind,
}

const fn known(id: u32, kind: ChunkKind) -> KnownChunk {
    KnownChunk { id, kind }
}

static CHALLENGE_CHUNKS: &[KnownChunk] = &[
    known(0x03043002, ChunkKind::TmDesc),
    known(0x24003002, ChunkKind::TmDesc),
    known(0x03043003, ChunkKind::Common),
    known(0x24003003, ChunkKind::Common),
    known(0x03043004, ChunkKind::Version),
    known(0x24003004, ChunkKind::Version),
    known(0x03043005, ChunkKind::Community),
    known(0x24003005, ChunkKind::Community),
    known(0x03043007, ChunkKind::Thumbnail),
    known(0x24003007, ChunkKind::Thumbnail),
    known(0x03043008, ChunkKind::Author),
    known(0x24003008, ChunkKind::Author),
    known(0x21080001, ChunkKind::VskDesc),
];

static REPLAY_CHUNKS: &[KnownChunk] = &[
    known(0x03093000, ChunkKind::ReplayVersion),
    known(0x2403F000, ChunkKind::ReplayVersion),
    known(0x03093001, ChunkKind::Community),
    known(0x2403F001, ChunkKind::Community),
    known(0x03093002, ChunkKind::Author),
    known(0x2403F002, ChunkKind::Author),
];

static COLLECTOR_CHUNKS: &[KnownChunk] = &[
    known(0x2E001003, ChunkKind::CollectorDesc),
    known(0x2E001004, ChunkKind::Icon),
    known(0x2E001005, ChunkKind::Unknown),
    known(0x2E001006, ChunkKind::Time),
    known(0x03059002, ChunkKind::Skin),
    known(0x2E002000, ChunkKind::ItemType),
    known(0x2E002001, ChunkKind::Version),
    known(0x090F4000, ChunkKind::GameSkin),
    known(0x03038000, ChunkKind::Mood),
];

static COLLECTION_CHUNKS: &[KnownChunk] = &[
    known(0x03033000, ChunkKind::OldDesc),
    known(0x03033001, ChunkKind::CollectionDesc),
    known(0x03033002, ChunkKind::Folders),
    known(0x03033003, ChunkKind::MenuIcons),
];

static PROFILE_CHUNKS: &[KnownChunk] = &[known(0x0308C000, ChunkKind::Profile)];

static SKIN_CHUNKS: &[KnownChunk] = &[
    known(0x090F4000, ChunkKind::GameSkin),
    known(0x03059002, ChunkKind::Skin),
];

static PLUG_CHUNKS: &[KnownChunk] = &[
    known(0x09005000, ChunkKind::Version),
    known(0x090BB000, ChunkKind::Version),
    known(0x09145000, ChunkKind::Version),
];

static HMS_CHUNKS: &[KnownChunk] = &[
    known(0x06003000, ChunkKind::Version),
    known(0x0600F000, ChunkKind::Version),
];

static OTHER_CHUNKS: &[KnownChunk] = &[known(0x0311D000, ChunkKind::FolderDep)];

use ClassCategory::{Challenge, Collection, Collector, Hms, Other, Plug, Profile, Replay, Skin};

/// Known engine classes: id, class name, category.
static CLASSES: &[(u32, &str, ClassCategory)] = &[
    // System
    (0x01001000, "CMwNod", Other),
    (0x0B005000, "CSystemConfig", Other),
    (0x0B008000, "CSystemPackDesc", Other),
    (0x0B00D000, "CSystemFidsFolder", Other),
    // Functions
    (0x05002000, "CFuncKeysReal", Other),
    (0x05003000, "CFuncKeysPath", Other),
    (0x0500A000, "CFuncKeysNatural", Other),
    (0x05015000, "CFuncShaderLayerUV", Other),
    // Hms
    (0x06001000, "CHmsLight", Hms),
    (0x06003000, "CHmsItem", Hms),
    (0x06005000, "CHmsCorpus", Hms),
    (0x0600F000, "CHmsZone", Hms),
    (0x06010000, "CHmsPortal", Hms),
    (0x06011000, "CHmsZoneDynamic", Hms),
    (0x06012000, "CHmsAmbientOcc", Hms),
    (0x06013000, "CHmsSoundSource", Hms),
    (0x06014000, "CHmsLightMap", Hms),
    (0x06015000, "CHmsLightProbeGrid", Hms),
    (0x06016000, "CHmsLightArray", Hms),
    // Controls
    (0x07001000, "CControlBase", Other),
    (0x07002000, "CControlContainer", Other),
    (0x07010000, "CControlFrame", Other),
    (0x07031000, "CControlLabel", Other),
    // Plug
    (0x09002000, "CPlugShader", Plug),
    (0x09003000, "CPlugCrystal", Plug),
    (0x09004000, "CPlugShaderGeneric", Plug),
    (0x09005000, "CPlugSolid", Plug),
    (0x09006000, "CPlugVisual", Plug),
    (0x0900C000, "CPlugSurface", Plug),
    (0x0900F000, "CPlugSurfaceGeom", Plug),
    (0x09011000, "CPlugBitmap", Plug),
    (0x09013000, "CPlugFileWav", Plug),
    (0x09014000, "CPlugLight", Plug),
    (0x0901A000, "CPlugSound", Plug),
    (0x0901E000, "CPlugVisualIndexedTriangles", Plug),
    (0x09022000, "CPlugFileDds", Plug),
    (0x09026000, "CPlugShaderApply", Plug),
    (0x0902A000, "CPlugFileImg", Plug),
    (0x0902C000, "CPlugVisual3D", Plug),
    (0x09030000, "CPlugFileTga", Plug),
    (0x09031000, "CPlugFileJpg", Plug),
    (0x09033000, "CPlugFilePng", Plug),
    (0x0903A000, "CPlugMaterialCustom", Plug),
    (0x09044000, "CPlugFileOggVorbis", Plug),
    (0x0904F000, "CPlugTree", Plug),
    (0x09051000, "CPlugTreeGenerator", Plug),
    (0x09057000, "CPlugVisualIndexed", Plug),
    (0x09067000, "CPlugShaderPass", Plug),
    (0x09079000, "CPlugMaterial", Plug),
    (0x090BA000, "CPlugSkel", Plug),
    (0x090BB000, "CPlugSolid2Model", Plug),
    (0x090D4000, "CPlugAnimFile", Plug),
    (0x090F9000, "CPlugLightUserModel", Plug),
    (0x090FD000, "CPlugMaterialUserInst", Plug),
    (0x0910D000, "CPlugFxSystem", Plug),
    (0x0910E000, "CPlugParticleEmitterModel", Plug),
    (0x0911F000, "CPlugEntRecordData", Plug),
    (0x09128000, "CPlugRoadChunk", Plug),
    (0x09141000, "CPlugVegetTreeModel", Plug),
    (0x09144000, "CPlugDynaObjectModel", Plug),
    (0x09145000, "CPlugPrefab", Plug),
    (0x0914A000, "CPlugEditorHelper", Plug),
    (0x09159000, "CPlugStaticObjectModel", Plug),
    (0x09178000, "CPlugSpawnModel", Plug),
    // Scene
    (0x0A005000, "CSceneMobil", Other),
    (0x0A014000, "CSceneFxNod", Other),
    (0x0A01B000, "CSceneObjectLink", Other),
    (0x0A02B000, "CSceneVehicleCarMarksModel", Other),
    (0x0A03D000, "CSceneSoundSource", Other),
    // Virtual Skipper
    (0x21080000, "CGameCtnChallenge", Challenge),
    // Game
    (0x03011000, "CGameCtnCollectorList", Other),
    (0x0301A000, "CGameCtnCollector", Collector),
    (0x0301B000, "CGameCtnObjectInfo", Collector),
    (0x03024000, "CGameCtnMediaBlock3dStereo", Other),
    (0x03029000, "CGameCtnMediaBlockTriangles", Other),
    (0x03031000, "CGameCtnDecorationTerrainModifier", Collector),
    (0x03033000, "CGameCtnCollection", Collection),
    (0x03036000, "CGameCtnBlockUnitInfo", Other),
    (0x03038000, "CGameCtnDecoration", Collector),
    (0x03039000, "CGameCtnDecorationAudio", Other),
    (0x0303A000, "CGameCtnDecorationMood", Other),
    (0x0303B000, "CGameCtnDecorationSize", Other),
    (0x0303F000, "CGameGhost", Other),
    (0x03043000, "CGameCtnChallenge", Challenge),
    (0x0304B000, "CGameCtnMediaBlockTriangles2D", Other),
    (0x0304C000, "CGameCtnMediaBlockTriangles3D", Other),
    (0x0304E000, "CGameCtnBlockInfo", Collector),
    (0x0304F000, "CGameCtnBlockInfoFrontier", Collector),
    (0x03051000, "CGameCtnBlockInfoFlat", Collector),
    (0x03052000, "CGameCtnBlockInfoRoad", Collector),
    (0x03053000, "CGameCtnBlockInfoClip", Collector),
    (0x03054000, "CGameCtnBlockInfoSlope", Collector),
    (0x03055000, "CGameCtnBlockInfoPylon", Collector),
    (0x03057000, "CGameCtnBlock", Other),
    (0x03059000, "CGameCtnBlockSkin", Skin),
    (0x0305B000, "CGameCtnChallengeParameters", Other),
    (0x03078000, "CGameCtnMediaTrack", Other),
    (0x03079000, "CGameCtnMediaClip", Other),
    (0x0307A000, "CGameCtnMediaClipGroup", Other),
    (0x03080000, "CGameCtnMediaBlockFxColors", Other),
    (0x03081000, "CGameCtnMediaBlockFxBlurDepth", Other),
    (0x03082000, "CGameCtnMediaBlockFxBlurMotion", Other),
    (0x03083000, "CGameCtnMediaBlockFxBloom", Other),
    (0x03084000, "CGameCtnMediaBlockCameraGame", Other),
    (0x03085000, "CGameCtnMediaBlockTime", Other),
    (0x0308C000, "CGamePlayerProfile", Profile),
    (0x0308F000, "CGameCtnChallengeGroup", Other),
    (0x03092000, "CGameCtnGhost", Other),
    (0x03093000, "CGameCtnReplayRecord", Replay),
    (0x03099000, "CGameCtnChapter", Other),
    (0x0309A000, "CGameCtnCampaign", Other),
    (0x030A1000, "CGameCtnMediaBlockCameraPath", Other),
    (0x030A2000, "CGameCtnMediaBlockCameraCustom", Other),
    (0x030A3000, "CGameCtnMediaBlockCameraOrbital", Other),
    (0x030A4000, "CGameCtnMediaBlockCameraEffectShake", Other),
    (0x030A5000, "CGameCtnMediaBlockImage", Other),
    (0x030A6000, "CGameCtnMediaBlockMusicEffect", Other),
    (0x030A7000, "CGameCtnMediaBlockSound", Other),
    (0x030A8000, "CGameCtnMediaBlockText", Other),
    (0x030A9000, "CGameCtnMediaBlockTrails", Other),
    (0x030AB000, "CGameCtnMediaBlockTransitionFade", Other),
    (0x030E5000, "CGameCtnMediaBlockGhost", Other),
    (0x03101000, "CGameCtnAnchoredObject", Other),
    (0x0310D000, "CGameCtnMacroBlockInfo", Collector),
    (0x03110000, "CGameCtnCollectorVehicle", Collector),
    (0x03118000, "CGameCtnArticle", Collector),
    (0x0311D000, "CGameCtnZoneGenealogy", Other),
    (0x03120000, "CGameCtnAutoTerrain", Other),
    (0x03122000, "CGameCtnBlockInfoMobil", Collector),
    (0x03126000, "CGameCtnMediaBlockDOF", Other),
    (0x03127000, "CGameCtnMediaBlockToneMapping", Other),
    (0x03128000, "CGameCtnMediaBlockBloomHdr", Other),
    (0x03129000, "CGameCtnMediaBlockTimeSpeed", Other),
    (0x0312A000, "CGameCtnMediaBlockManialink", Other),
    (0x0312C000, "CGameUserProfile", Profile),
    (0x03133000, "CGameCtnMediaBlockVehicleLight", Other),
    (0x0313B000, "CGameWaypointSpecialProperty", Other),
    (0x0315B000, "CGameCtnBlockInfoClassic", Collector),
    (0x0315C000, "CGameCtnBlockInfoVariant", Other),
    (0x0315D000, "CGameCtnBlockInfoVariantAir", Other),
    (0x0315E000, "CGameCtnBlockInfoVariantGround", Other),
    (0x03165000, "CGameCtnMediaBlockDirtyLens", Other),
    (0x03186000, "CGameCtnMediaBlockColorGrading", Other),
    (0x03195000, "CGameCtnMediaBlockInterface", Other),
    (0x03199000, "CGameCtnMediaBlockFog", Other),
    (0x0329F000, "CGameCtnMediaBlockEntity", Other),
    (0x0337A000, "CGameCtnMediaBlockSpectators", Other),
    (0x0338B000, "CGameCtnMediaBlockOpponentVisibility", Other),
    // Skins
    (0x090F4000, "CPlugGameSkin", Skin),
    (0x09181000, "CPlugGameSkinAndFolder", Skin),
    // TrackMania Sunrise/Original aliases
    (0x24003000, "CGameCtnChallenge", Challenge),
    (0x2403F000, "CGameCtnReplayRecord", Replay),
    // Game data
    (0x2E001000, "CGameCtnCollector", Collector),
    (0x2E002000, "CGameItemModel", Collector),
    (0x2E007000, "CGameObjectPhyModel", Other),
    (0x2E008000, "CGameObjectVisModel", Other),
    (0x2E020000, "CGameItemPlacementParam", Other),
    (0x2E025000, "CGameBlockItem", Other),
    (0x2E026000, "CGameCommonItemEntityModelEdition", Other),
    (0x2E027000, "CGameCommonItemEntityModel", Other),
];

static CLASS_LOOKUP: LazyLock<FxHashMap<u32, (&'static str, ClassCategory)>> =
    LazyLock::new(|| {
        let mut map = FxHashMap::with_capacity_and_hasher(CLASSES.len(), Default::default());
        for &(id, name, category) in CLASSES {
            map.insert(id, (name, category));
        }
        map
    });

/// Category of a class id, [`ClassCategory::Other`] when unknown.
pub fn classify(class_id: u32) -> ClassCategory {
    CLASS_LOOKUP
        .get(&class_id)
        .map_or(ClassCategory::Other, |&(_, category)| category)
}

/// Engine class name of a class id.
pub fn class_name(class_id: u32) -> Option<&'static str> {
    CLASS_LOOKUP.get(&class_id).map(|&(name, _)| name)
}

/// All known classes.
pub fn known_classes() -> impl Iterator<Item = (u32, &'static str, ClassCategory)> {
    CLASSES.iter().copied()
}
