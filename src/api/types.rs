//! Payloads returned by the encounter API and the source abstraction over it

use serde::Deserialize;
use thiserror::Error;

/// A `{name, url}` reference to another API resource
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// `region/{slug}`
#[derive(Debug, Clone, Deserialize)]
pub struct RegionPayload {
    pub name: String,
    #[serde(default)]
    pub locations: Vec<NamedResource>,
}

/// `location/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct LocationPayload {
    pub name: String,
    #[serde(default)]
    pub areas: Vec<NamedResource>,
}

/// `location-area/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct AreaPayload {
    pub name: String,
    #[serde(default)]
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedResource,
    #[serde(default)]
    pub version_details: Vec<VersionDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionDetail {
    pub version: NamedResource,
    #[serde(default)]
    pub encounter_details: Vec<EncounterDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncounterDetail {
    pub method: NamedResource,
    #[serde(default)]
    pub chance: Option<u32>,
}

/// Why a single lookup produced nothing usable.
///
/// The traversal treats every variant as "skip this item"; none of them end a run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} not found")]
    NotFound(String),
}

/// The three lookups the traversal needs from the outside world
pub trait EncounterSource {
    /// Region detail with its ordered location list
    fn region(&self, slug: &str) -> Result<RegionPayload, FetchError>;

    /// Location detail with its area list
    fn location(&self, location: &NamedResource) -> Result<LocationPayload, FetchError>;

    /// Area detail with its encounter table
    fn area(&self, area: &NamedResource) -> Result<AreaPayload, FetchError>;
}
