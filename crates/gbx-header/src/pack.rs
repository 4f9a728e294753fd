//! Content pack masks.
//!
//! Maps record which title packs they need as a 128-bit mask. Only the low
//! 21 bits have names; anything wider is shown as hex.

/// Largest low word rendered as flag names.
const MAX_NAMED: u32 = 0x1F_FFFF;

/// Combined values with historical names.
const ALIASES: &[(u32, &str)] = &[(0x07, "Original"), (0x38, "Sunrise"), (0x7F, "United")];

/// Environments whose maps use the Galaxy/Orbital names for the context bits.
const GALAXY_ENVIRONMENTS: &[&str] = &["Galaxy", "Society", "History"];

#[derive(Clone, Copy)]
enum Flag {
    Fixed(&'static str),
    /// Galaxy-family name, other name.
    Context(&'static str, &'static str),
}

const FLAGS: [Flag; 21] = [
    Flag::Fixed("Snow"),
    Flag::Fixed("Rally"),
    Flag::Fixed("Desert"),
    Flag::Fixed("Island"),
    Flag::Fixed("Bay"),
    Flag::Fixed("Coast"),
    Flag::Fixed("Stadium"),
    Flag::Fixed("Canyon"),
    Flag::Fixed("Valley"),
    Flag::Fixed("Lagoon"),
    Flag::Fixed("Storm"),
    Flag::Fixed("Cryo"),
    Flag::Fixed("Meteor"),
    Flag::Context("Galaxy", "Paris"),
    Flag::Fixed("Gothic"),
    Flag::Fixed("Sandbox"),
    Flag::Fixed("Laboratory"),
    Flag::Fixed("TMCommon"),
    Flag::Fixed("SMCommon"),
    Flag::Fixed("Vehicles"),
    Flag::Context("Orbital", "Actors"),
];

/// A 128-bit pack mask as stored in the file (little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PackMask(pub [u8; 16]);

impl PackMask {
    /// Build a mask from its numeric value.
    pub fn from_u128(value: u128) -> Self {
        Self(value.to_le_bytes())
    }

    pub fn value(&self) -> u128 {
        u128::from_le_bytes(self.0)
    }

    /// The low 32 bits.
    pub fn low(&self) -> u32 {
        self.value() as u32
    }

    /// True when the mask is rendered as flag names rather than hex.
    pub fn is_named(&self) -> bool {
        self.value() >> 32 == 0 && self.low() <= MAX_NAMED
    }

    /// Render the mask. `environment` selects between the two names of the
    /// context-dependent bits.
    pub fn describe(&self, environment: &str) -> String {
        if !self.is_named() {
            return self.hex();
        }
        let low = self.low();
        if low == 0 {
            return "None".to_string();
        }
        if let Some(&(_, alias)) = ALIASES.iter().find(|&&(value, _)| value == low) {
            return alias.to_string();
        }

        let galaxy = GALAXY_ENVIRONMENTS.contains(&environment);
        FLAGS
            .iter()
            .enumerate()
            .filter(|&(bit, _)| low & (1 << bit) != 0)
            .map(|(_, flag)| match *flag {
                Flag::Fixed(name) => name,
                Flag::Context(galaxy_name, _) if galaxy => galaxy_name,
                Flag::Context(_, other) => other,
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `0x` followed by 32 hex digits, most significant first.
    pub fn hex(&self) -> String {
        format!("0x{}", hex::encode_upper(self.value().to_be_bytes()))
    }
}
