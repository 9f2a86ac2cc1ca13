pub mod schema;
pub mod sqlite;

pub use sqlite::*;

use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

/// Write side of the route database, as used by the ingestion traversal.
///
/// Writes become durable only at `commit`.
pub trait RouteStore {
    /// Id of the region row with this name, inserting it if needed
    fn get_or_create_region(&mut self, name: &str) -> Result<i64>;

    /// Names of every route already stored for a region
    fn list_route_names(&mut self, region_id: i64) -> Result<HashSet<String>>;

    fn insert_route(&mut self, name: &str, region_id: i64) -> Result<i64>;

    /// Delete a route together with its encounters
    fn delete_route(&mut self, route_id: i64) -> Result<()>;

    fn insert_encounter(&mut self, route_id: i64, species: &str, rate: &str, method: &str)
        -> Result<()>;

    fn commit(&mut self) -> Result<()>;
}

/// A route as served to the web page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteView {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub completed: bool,
    pub pokemon: Vec<EncounterView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EncounterView {
    pub name: String,
    pub rate: String,
    pub method: String,
}
