//! Replay header chunks.

use super::ladder::{run_steps, Gate, Step};
use super::{ChunkReader, Describe, Field, Fields};
use crate::time::format_time;
use crate::Result;

/// Replay summary: the map it was driven on and the best time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReplayVersion {
    pub version: u32,
    pub map_uid: Option<String>,
    pub environment: Option<String>,
    pub map_author: Option<String>,
    pub best_time: Option<u32>,
    pub nickname: Option<String>,
    pub login: Option<String>,
    pub title_id: Option<String>,
}

impl Describe for ReplayVersion {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("MapUid", &self.map_uid)
            .opt("Environment", &self.environment)
            .opt("MapAuthor", &self.map_author)
            .opt(
                "BestTime",
                &self
                    .best_time
                    .map(|ms| format!("{ms} ({})", format_time(ms as i32))),
            )
            .opt("Nickname", &self.nickname)
            .opt("Login", &self.login)
            .opt("TitleId", &self.title_id)
            .build()
    }
}

fn replay_map(r: &mut ChunkReader<'_, '_>, out: &mut ReplayVersion) -> Result<()> {
    out.map_uid = Some(r.ident_name()?);
    out.environment = Some(r.ident_name()?);
    out.map_author = Some(r.ident_name()?);
    out.best_time = Some(r.nat32()?);
    out.nickname = Some(r.string()?);
    Ok(())
}

fn replay_login(r: &mut ChunkReader<'_, '_>, out: &mut ReplayVersion) -> Result<()> {
    out.login = Some(r.string()?);
    Ok(())
}

fn replay_title(r: &mut ChunkReader<'_, '_>, out: &mut ReplayVersion) -> Result<()> {
    r.nat8()?;
    out.title_id = Some(r.ident_name()?);
    Ok(())
}

static REPLAY_STEPS: &[Step<ReplayVersion>] = &[
    Step::new(Gate::AtLeast(2), replay_map),
    Step::new(Gate::AtLeast(6), replay_login),
    Step::new(Gate::AtLeast(8), replay_title),
];

pub(super) fn read_replay_version(
    r: &mut ChunkReader<'_, '_>,
    out: &mut ReplayVersion,
) -> Result<()> {
    out.version = r.nat32()?;
    run_steps(r, out.version, out, REPLAY_STEPS)
}
