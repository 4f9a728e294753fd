//! Player profile header chunk.

use super::ladder::{run_steps, Gate, Step};
use super::{ChunkReader, Describe, Field, Fields};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Profile {
    pub version: u32,
    pub login: Option<String>,
    pub online_support_key: Option<String>,
}

impl Describe for Profile {
    fn describe(&self) -> Vec<Field> {
        Fields::new()
            .add("Version", self.version)
            .opt("Login", &self.login)
            .opt("OnlineSupportKey", &self.online_support_key)
            .build()
    }
}

fn profile_login(r: &mut ChunkReader<'_, '_>, out: &mut Profile) -> Result<()> {
    out.login = Some(r.string()?);
    Ok(())
}

fn profile_support_key(r: &mut ChunkReader<'_, '_>, out: &mut Profile) -> Result<()> {
    out.online_support_key = Some(r.string()?);
    Ok(())
}

static PROFILE_STEPS: &[Step<Profile>] = &[
    Step::new(Gate::Always, profile_login),
    Step::new(Gate::AtLeast(1), profile_support_key),
];

pub(super) fn read_profile(r: &mut ChunkReader<'_, '_>, out: &mut Profile) -> Result<()> {
    out.version = r.nat32()?;
    run_steps(r, out.version, out, PROFILE_STEPS)
}

#[cfg(test)]
mod tests {
    use gbx_common::Encoding;

    use super::super::test_support::Payload;
    use super::*;
    use crate::IdentifierTable;

    #[test]
    fn test_profile() {
        let data = Payload::new().u32(1).str("player").str("KEY-123").0;
        let mut idents = IdentifierTable::new();
        let mut r = ChunkReader::new(&data, Encoding::Binary, &mut idents);
        let mut profile = Profile::default();
        read_profile(&mut r, &mut profile).unwrap();

        assert_eq!(profile.login.as_deref(), Some("player"));
        assert_eq!(profile.online_support_key.as_deref(), Some("KEY-123"));
    }
}
