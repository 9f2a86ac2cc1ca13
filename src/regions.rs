//! Static region definitions for every region the tracker knows about

/// A region and the game versions whose encounter data count for it
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Position in the enumeration, starting at 1
    pub ordinal: u32,
    /// API slug, also the prefix carried by raw location names
    pub slug: &'static str,
    /// Name stored in the `regions` table
    pub display_name: &'static str,
    /// Versions whose encounters are kept. Empty means no filtering.
    pub versions: &'static [&'static str],
}

impl Region {
    /// Whether an encounter reported for `version` should be kept
    pub fn allows_version(&self, version: &str) -> bool {
        self.versions.is_empty() || self.versions.iter().any(|v| *v == version)
    }
}

// =============================================================================
// Region Table
// =============================================================================

pub static KANTO: Region = Region {
    ordinal: 1,
    slug: "kanto",
    display_name: "Kanto",
    versions: &["red", "blue", "yellow", "firered", "leafgreen"],
};

pub static JOHTO: Region = Region {
    ordinal: 2,
    slug: "johto",
    display_name: "Johto",
    versions: &["gold", "silver", "crystal", "heartgold", "soulsilver"],
};

pub static HOENN: Region = Region {
    ordinal: 3,
    slug: "hoenn",
    display_name: "Hoenn",
    versions: &["ruby", "sapphire", "emerald", "omega-ruby", "alpha-sapphire"],
};

pub static SINNOH: Region = Region {
    ordinal: 4,
    slug: "sinnoh",
    display_name: "Sinnoh",
    versions: &["diamond", "pearl", "platinum"],
};

pub static UNOVA: Region = Region {
    ordinal: 5,
    slug: "unova",
    display_name: "Unova",
    versions: &["black", "white", "black-2", "white-2"],
};

pub static KALOS: Region = Region {
    ordinal: 6,
    slug: "kalos",
    display_name: "Kalos",
    versions: &["x", "y"],
};

pub static ALOLA: Region = Region {
    ordinal: 7,
    slug: "alola",
    display_name: "Alola",
    versions: &["sun", "moon", "ultra-sun", "ultra-moon"],
};

pub static GALAR: Region = Region {
    ordinal: 8,
    slug: "galar",
    display_name: "Galar",
    versions: &["sword", "shield"],
};

// Scarlet/Violet encounter tables are sparse upstream, so nothing is filtered.
pub static PALDEA: Region = Region {
    ordinal: 9,
    slug: "paldea",
    display_name: "Paldea",
    versions: &[],
};

/// All regions in traversal order
pub static ALL_REGIONS: &[&Region] = &[
    &KANTO, &JOHTO, &HOENN, &SINNOH, &UNOVA, &KALOS, &ALOLA, &GALAR, &PALDEA,
];

/// Look up a region by its API slug
pub fn get_region(slug: &str) -> Option<&'static Region> {
    ALL_REGIONS.iter().copied().find(|r| r.slug == slug)
}

/// Slugs of all regions, in traversal order
pub fn region_slugs() -> impl Iterator<Item = &'static str> {
    ALL_REGIONS.iter().map(|r| r.slug)
}

/// Resolve an optional slug filter into regions, keeping enumeration order.
///
/// The order the caller lists slugs in does not matter; the checkpoint counter
/// is only meaningful when regions are always walked in the same order.
pub fn resolve_regions(filter: Option<&[String]>) -> Result<Vec<&'static Region>, String> {
    let Some(filter) = filter else {
        return Ok(ALL_REGIONS.to_vec());
    };

    for slug in filter {
        if get_region(slug).is_none() {
            return Err(format!("Unknown region: {}", slug));
        }
    }

    Ok(ALL_REGIONS
        .iter()
        .copied()
        .filter(|r| filter.iter().any(|s| s == r.slug))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_regions_in_order() {
        assert_eq!(ALL_REGIONS.len(), 9);
        for (i, region) in ALL_REGIONS.iter().enumerate() {
            assert_eq!(region.ordinal as usize, i + 1);
        }
    }

    #[test]
    fn test_allows_version() {
        assert!(KANTO.allows_version("red"));
        assert!(!KANTO.allows_version("gold"));
        // empty set means no filter
        assert!(PALDEA.allows_version("scarlet"));
        assert!(PALDEA.allows_version("anything"));
    }

    #[test]
    fn test_resolve_regions_keeps_enumeration_order() {
        let filter = vec!["sinnoh".to_string(), "kanto".to_string()];
        let regions = resolve_regions(Some(filter.as_slice())).unwrap();
        let slugs: Vec<_> = regions.iter().map(|r| r.slug).collect();
        assert_eq!(slugs, vec!["kanto", "sinnoh"]);
    }

    #[test]
    fn test_resolve_regions_unknown() {
        let filter = vec!["orre".to_string()];
        assert!(resolve_regions(Some(filter.as_slice())).is_err());
        assert_eq!(resolve_regions(None).unwrap().len(), 9);
    }
}
