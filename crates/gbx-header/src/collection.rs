//! Numeric collection (environment) names.
//!
//! Identifiers whose two top bits are clear carry a numeric collection id
//! instead of a string. This module maps those ids to the environment
//! names the games use.

/// Raw identifier value meaning "no value".
pub const UNASSIGNED: u32 = 0xFFFF_FFFF;

/// Known collection ids and their names.
static COLLECTIONS: &[(u32, &str)] = &[
    (0, "Desert"),
    (1, "Snow"),
    (2, "Rally"),
    (3, "Island"),
    (4, "Bay"),
    (5, "Coast"),
    (6, "Stadium"),
    (7, "Basic"),
    (8, "Plain"),
    (9, "Moon"),
    (10, "Toy"),
    (11, "Valley"),
    (12, "Canyon"),
    (13, "Lagoon"),
    // Deprecated id, still found in early ManiaPlanet betas
    (14, "Arena"),
    (15, "TMCommon"),
    (16, "Canyon4"),
    (17, "Canyon256"),
    (18, "Valley4"),
    (19, "Valley256"),
    (20, "Lagoon4"),
    (21, "Lagoon256"),
    (22, "Stadium4"),
    (23, "Stadium256"),
    (24, "Stadium64"),
    (25, "Valley64"),
    (26, "Stadium"),
    (27, "Lagoon64"),
    (100, "History"),
    (101, "Society"),
    (102, "Galaxy"),
    (103, "Gothic"),
    (104, "Paris"),
    (105, "Sandbox"),
    (200, "Storm"),
    (201, "Cryo"),
    (202, "Meteor"),
    (203, "Meteor4"),
    (204, "Meteor64"),
    (205, "Meteor256"),
    (206, "Laboratory"),
    (207, "Laboratory4"),
    (299, "SMCommon"),
    (10000, "Vehicles"),
    (10001, "Orbital"),
    (10002, "Actors"),
    (10003, "Common"),
    (UNASSIGNED, "_Unassigned"),
];

/// Look up the name of a known collection id.
pub fn known_collection(id: u32) -> Option<&'static str> {
    COLLECTIONS
        .binary_search_by_key(&id, |&(key, _)| key)
        .ok()
        .map(|index| COLLECTIONS[index].1)
}

/// Name of a collection id, or its decimal form when unknown.
pub fn collection_name(id: u32) -> String {
    known_collection(id)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(COLLECTIONS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_known_names() {
        assert_eq!(collection_name(0), "Desert");
        assert_eq!(collection_name(6), "Stadium");
        assert_eq!(collection_name(26), "Stadium");
        assert_eq!(collection_name(14), "Arena");
        assert_eq!(collection_name(299), "SMCommon");
        assert_eq!(collection_name(10003), "Common");
        assert_eq!(collection_name(UNASSIGNED), "_Unassigned");
    }

    #[test]
    fn test_unknown_falls_back_to_decimal() {
        assert_eq!(collection_name(28), "28");
        assert_eq!(collection_name(106), "106");
        assert_eq!(collection_name(9999), "9999");
    }
}
