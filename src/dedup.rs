//! Reduce an area's raw encounter table to unique rows

use std::collections::HashSet;

use crate::api::PokemonEncounter;
use crate::normalize::title_case;
use crate::regions::Region;

/// One encounter ready for insertion
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncounterRow {
    /// Title-cased species name
    pub species: String,
    /// Chance rendered as `"<n>%"`
    pub rate: String,
    pub method: String,
}

impl EncounterRow {
    pub fn new(species: impl Into<String>, chance: u32, method: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            rate: format_rate(chance),
            method: method.into(),
        }
    }
}

pub fn format_rate(chance: u32) -> String {
    format!("{}%", chance)
}

/// Collect the unique (species, chance, method) rows an area offers in `region`.
///
/// A detail counts only when its version is allowed by the region and it
/// carries a non-zero chance. Output keeps first-seen order. An empty result
/// means the area has nothing worth tracking.
pub fn dedup_encounters(encounters: &[PokemonEncounter], region: &Region) -> Vec<EncounterRow> {
    let mut seen: HashSet<(String, u32, &str)> = HashSet::new();
    let mut rows = Vec::new();

    for encounter in encounters {
        let species = title_case(&encounter.pokemon.name);

        for version in &encounter.version_details {
            if !region.allows_version(&version.version.name) {
                continue;
            }

            for detail in &version.encounter_details {
                let chance = match detail.chance {
                    Some(chance) if chance > 0 => chance,
                    _ => continue,
                };

                let method = detail.method.name.as_str();
                if seen.insert((species.clone(), chance, method)) {
                    rows.push(EncounterRow::new(species.clone(), chance, method));
                }
            }
        }
    }

    rows
}
