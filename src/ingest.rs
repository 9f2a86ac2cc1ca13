//! Region traversal: walk regions → locations → areas → encounters and
//! persist one route per unique area name.
//!
//! Progress is committed once per top-level location, and only after the
//! commit succeeds is the checkpoint advanced. The checkpoint counts locations
//! across all selected regions in enumeration order, so a restarted run
//! fast-forwards past everything already committed without fetching it again.

use anyhow::Result;
use std::collections::HashSet;
use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{EncounterSource, NamedResource};
use crate::checkpoint::CheckpointStore;
use crate::dedup::dedup_encounters;
use crate::normalize::normalize_area_name;
use crate::regions::{Region, ALL_REGIONS};
use crate::store::{RouteStore, SqliteStore};
use crate::ui::{Phase, Ui};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Regions to walk, in enumeration order
    pub regions: Vec<&'static Region>,
    /// Pause after every area fetch
    pub delay: Duration,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            regions: ALL_REGIONS.to_vec(),
            delay: DEFAULT_DELAY,
        }
    }
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub routes_created: u64,
    pub encounters_created: u64,
    /// Areas whose route was rolled back for having no valid encounters
    pub areas_rolled_back: u64,
    /// Areas whose name was already taken in their region
    pub duplicate_areas: u64,
    /// Locations passed over because the checkpoint was already beyond them
    pub locations_fast_forwarded: u64,
    pub locations_processed: u64,
    pub locations_failed: u64,
    pub areas_failed: u64,
    /// Checkpoint value when the run ended
    pub checkpoint: u64,
    /// Region whose location list could not be fetched; nothing after it ran
    pub halted_at: Option<String>,
    pub interrupted: bool,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} routes, {} encounters ({} empty areas, {} duplicates, {} locations and {} areas skipped), checkpoint {}",
            self.routes_created,
            self.encounters_created,
            self.areas_rolled_back,
            self.duplicate_areas,
            self.locations_failed,
            self.areas_failed,
            self.checkpoint
        )
    }
}

/// Forget all progress and empty the database.
///
/// The checkpoint goes first: if anything fails after that, the next run
/// starts from 0 over the old rows, which adds nothing twice.
pub fn start_fresh(store: &mut SqliteStore, checkpoint: &CheckpointStore) -> Result<()> {
    checkpoint.clear()?;
    store.reset()?;
    info!("Starting fresh: checkpoint cleared and database reset");
    Ok(())
}

/// Result of handling one area
#[derive(Debug, Clone, PartialEq, Eq)]
enum AreaOutcome {
    Stored { route: String, encounters: u64 },
    RolledBack(String),
    Duplicate(String),
    FetchFailed(String),
}

/// Drives one ingestion run over an encounter source into a route store
pub struct Ingestor<'a, S, R, U> {
    source: &'a S,
    store: &'a mut R,
    checkpoint: &'a CheckpointStore,
    ui: &'a mut U,
    options: IngestOptions,
    summary: IngestSummary,
}

impl<'a, S, R, U> Ingestor<'a, S, R, U>
where
    S: EncounterSource,
    R: RouteStore,
    U: Ui,
{
    pub fn new(
        source: &'a S,
        store: &'a mut R,
        checkpoint: &'a CheckpointStore,
        ui: &'a mut U,
        options: IngestOptions,
    ) -> Self {
        Self {
            source,
            store,
            checkpoint,
            ui,
            options,
            summary: IngestSummary::default(),
        }
    }

    /// Walk every selected region, resuming from the stored checkpoint.
    ///
    /// Fetch failures are logged and skipped. Storage and checkpoint write
    /// failures abort the run; the last commit and checkpoint stay valid.
    pub fn run(mut self) -> Result<IngestSummary> {
        let resume_from = self.checkpoint.load();
        self.summary.checkpoint = resume_from;
        if resume_from > 0 {
            info!("Resuming from checkpoint {}", resume_from);
        }

        self.ui.set_phase(Phase::Traversing);

        // Global index of the first location in the current region
        let mut position: u64 = 0;
        let regions = self.options.regions.clone();

        for region in regions {
            let payload = match self.source.region(region.slug) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Halting: could not fetch region {}: {}", region.slug, e);
                    self.ui
                        .log(format!("Could not fetch {}, stopping", region.display_name));
                    self.summary.halted_at = Some(region.slug.to_string());
                    break;
                }
            };

            let total = payload.locations.len() as u64;
            if position + total <= resume_from {
                debug!("Fast-forwarding past {} ({} locations)", region.slug, total);
                self.summary.locations_fast_forwarded += total;
                position += total;
                continue;
            }

            let finished = self.walk_region(region, &payload.locations, position, resume_from)?;
            self.store.commit()?;
            position += total;

            if !finished {
                self.summary.interrupted = true;
                info!("Stopped at checkpoint {}", self.summary.checkpoint);
                break;
            }
        }

        self.ui.set_tally(&self.summary);
        info!("Ingestion finished: {}", self.summary);
        Ok(self.summary)
    }

    /// Process a region's locations from `resume_from` on. Returns false if interrupted.
    fn walk_region(
        &mut self,
        region: &Region,
        locations: &[NamedResource],
        position: u64,
        resume_from: u64,
    ) -> Result<bool> {
        let region_id = self.store.get_or_create_region(region.display_name)?;
        let mut seen = self.store.list_route_names(region_id)?;
        let total = locations.len() as u64;

        info!(
            "Region {}: {} locations, {} routes already stored",
            region.display_name,
            total,
            seen.len()
        );
        self.ui.set_info(format!(
            "{} (checkpoint {})",
            region.display_name, self.summary.checkpoint
        ));

        for (offset, location) in locations.iter().enumerate() {
            let index = position + offset as u64;
            if index < resume_from {
                self.summary.locations_fast_forwarded += 1;
                continue;
            }

            if self.ui.interrupted() {
                return Ok(false);
            }

            self.ui
                .set_progress(offset as u64 + 1, total, region.display_name);

            let detail = match self.source.location(location) {
                Ok(detail) => detail,
                Err(e) => {
                    warn!("Skipping location {}: {}", location.name, e);
                    self.ui.log(format!("Skipped location {}", location.name));
                    self.summary.locations_failed += 1;
                    continue;
                }
            };

            for area in &detail.areas {
                let outcome = self.process_area(region, region_id, &mut seen, area)?;
                self.record(outcome);
                self.pause();
            }

            self.store.commit()?;
            self.checkpoint.save(index + 1)?;
            self.summary.checkpoint = index + 1;
            self.summary.locations_processed += 1;
            self.ui.set_tally(&self.summary);
        }

        Ok(true)
    }

    fn process_area(
        &mut self,
        region: &Region,
        region_id: i64,
        seen: &mut HashSet<String>,
        area_ref: &NamedResource,
    ) -> Result<AreaOutcome> {
        let area = match self.source.area(area_ref) {
            Ok(area) => area,
            Err(e) => {
                warn!("Skipping area {}: {}", area_ref.name, e);
                return Ok(AreaOutcome::FetchFailed(area_ref.name.clone()));
            }
        };

        let name = normalize_area_name(&area.name);
        if seen.contains(&name) {
            return Ok(AreaOutcome::Duplicate(name));
        }

        let route_id = self.store.insert_route(&name, region_id)?;
        seen.insert(name.clone());

        let rows = dedup_encounters(&area.pokemon_encounters, region);
        for row in &rows {
            self.store
                .insert_encounter(route_id, &row.species, &row.rate, &row.method)?;
        }

        if rows.is_empty() {
            self.store.delete_route(route_id)?;
            seen.remove(&name);
            return Ok(AreaOutcome::RolledBack(name));
        }

        Ok(AreaOutcome::Stored {
            route: name,
            encounters: rows.len() as u64,
        })
    }

    fn record(&mut self, outcome: AreaOutcome) {
        match outcome {
            AreaOutcome::Stored { route, encounters } => {
                info!("Processed: {} ({} encounters)", route, encounters);
                self.ui.log(format!("Processed: {}", route));
                self.summary.routes_created += 1;
                self.summary.encounters_created += encounters;
            }
            AreaOutcome::RolledBack(route) => {
                info!("No usable encounters for {}, not stored", route);
                self.ui.log(format!("Empty: {}", route));
                self.summary.areas_rolled_back += 1;
            }
            AreaOutcome::Duplicate(route) => {
                debug!("Already stored: {}", route);
                self.summary.duplicate_areas += 1;
            }
            AreaOutcome::FetchFailed(area) => {
                self.ui.log(format!("Skipped area {}", area));
                self.summary.areas_failed += 1;
            }
        }
    }

    fn pause(&self) {
        if !self.options.delay.is_zero() {
            thread::sleep(self.options.delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AreaPayload, FetchError, LocationPayload, RegionPayload};
    use crate::regions::KANTO;
    use crate::ui::SilentUi;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Source with one region ("kanto") whose locations each hold one area
    struct OneRegion {
        areas: Vec<(&'static str, serde_json::Value)>,
    }

    impl EncounterSource for OneRegion {
        fn region(&self, slug: &str) -> Result<RegionPayload, FetchError> {
            let locations = self
                .areas
                .iter()
                .map(|(name, _)| json!({"name": name}))
                .collect::<Vec<_>>();
            Ok(serde_json::from_value(json!({"name": slug, "locations": locations})).unwrap())
        }

        fn location(&self, location: &NamedResource) -> Result<LocationPayload, FetchError> {
            Ok(serde_json::from_value(json!({
                "name": location.name,
                "areas": [{"name": location.name}]
            }))
            .unwrap())
        }

        fn area(&self, area: &NamedResource) -> Result<AreaPayload, FetchError> {
            let by_name: HashMap<_, _> = self.areas.iter().cloned().collect();
            let encounters = by_name
                .get(area.name.as_str())
                .cloned()
                .ok_or_else(|| FetchError::NotFound(area.name.clone()))?;
            Ok(serde_json::from_value(json!({
                "name": area.name,
                "pokemon_encounters": encounters
            }))
            .unwrap())
        }
    }

    fn walk(chance: Option<u32>) -> serde_json::Value {
        json!([{
            "pokemon": {"name": "pidgey"},
            "version_details": [{
                "version": {"name": "red"},
                "encounter_details": [{"method": {"name": "walk"}, "chance": chance}]
            }]
        }])
    }

    fn options() -> IngestOptions {
        IngestOptions {
            regions: vec![&KANTO],
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_empty_area_rolled_back() {
        let dir = TempDir::new().unwrap();
        let checkpoint = CheckpointStore::new(dir.path().join("checkpoint.txt"));
        let mut store = SqliteStore::open_in_memory().unwrap();
        let source = OneRegion {
            areas: vec![
                ("kanto-route-1-area", walk(Some(30))),
                ("kanto-route-2-area", walk(None)),
            ],
        };

        let mut ui = SilentUi::new();
        let summary = Ingestor::new(&source, &mut store, &checkpoint, &mut ui, options())
            .run()
            .unwrap();

        assert_eq!(summary.routes_created, 1);
        assert_eq!(summary.areas_rolled_back, 1);
        assert_eq!(summary.checkpoint, 2);
        assert_eq!(checkpoint.load(), 2);

        let routes = store.list_routes().unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].name, "Route 1");
    }

    #[test]
    fn test_duplicate_names_within_region_skipped() {
        let dir = TempDir::new().unwrap();
        let checkpoint = CheckpointStore::new(dir.path().join("checkpoint.txt"));
        let mut store = SqliteStore::open_in_memory().unwrap();
        let source = OneRegion {
            areas: vec![
                ("kanto-route-1-area", walk(Some(30))),
                ("route-1", walk(Some(45))),
            ],
        };

        let mut ui = SilentUi::new();
        let summary = Ingestor::new(&source, &mut store, &checkpoint, &mut ui, options())
            .run()
            .unwrap();

        assert_eq!(summary.routes_created, 1);
        assert_eq!(summary.duplicate_areas, 1);
        assert_eq!(store.count_encounters().unwrap(), 1);
    }

    #[test]
    fn test_area_fetch_failure_is_skipped() {
        struct MissingArea;

        impl EncounterSource for MissingArea {
            fn region(&self, slug: &str) -> Result<RegionPayload, FetchError> {
                Ok(serde_json::from_value(json!({"name": slug, "locations": [{"name": "a"}]}))
                    .unwrap())
            }
            fn location(&self, _: &NamedResource) -> Result<LocationPayload, FetchError> {
                Ok(serde_json::from_value(json!({"name": "a", "areas": [{"name": "gone"}]}))
                    .unwrap())
            }
            fn area(&self, area: &NamedResource) -> Result<AreaPayload, FetchError> {
                Err(FetchError::Status {
                    url: area.name.clone(),
                    status: 500,
                })
            }
        }

        let dir = TempDir::new().unwrap();
        let checkpoint = CheckpointStore::new(dir.path().join("checkpoint.txt"));
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut ui = SilentUi::new();

        let summary = Ingestor::new(&MissingArea, &mut store, &checkpoint, &mut ui, options())
            .run()
            .unwrap();

        assert_eq!(summary.areas_failed, 1);
        assert_eq!(summary.locations_processed, 1);
        assert_eq!(store.count_routes().unwrap(), 0);

        let mut ui = LogRecorder::default();
        Ingestor::new(&MissingArea, &mut store, &checkpoint, &mut ui, options())
            .run()
            .unwrap();
        // checkpoint is already past the only location
        assert!(ui.lines.is_empty());

        checkpoint.clear().unwrap();
        Ingestor::new(&MissingArea, &mut store, &checkpoint, &mut ui, options())
            .run()
            .unwrap();
        assert_eq!(ui.lines, vec!["Skipped area gone"]);
    }

    #[derive(Default)]
    struct LogRecorder {
        lines: Vec<String>,
    }

    impl Ui for LogRecorder {
        fn set_phase(&mut self, _phase: Phase) {}
        fn set_info(&mut self, _info: impl Into<String>) {}
        fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
        fn set_tally(&mut self, _summary: &IngestSummary) {}
        fn log(&mut self, message: impl Into<String>) {
            self.lines.push(message.into());
        }
    }

    #[test]
    fn test_start_fresh_clears_then_resets() {
        let dir = TempDir::new().unwrap();
        let checkpoint = CheckpointStore::new(dir.path().join("checkpoint.txt"));
        let mut store = SqliteStore::open_in_memory().unwrap();
        let source = OneRegion {
            areas: vec![("kanto-route-1-area", walk(Some(30)))],
        };
        let mut ui = SilentUi::new();
        Ingestor::new(&source, &mut store, &checkpoint, &mut ui, options())
            .run()
            .unwrap();
        assert_eq!(checkpoint.load(), 1);

        start_fresh(&mut store, &checkpoint).unwrap();
        assert_eq!(checkpoint.load(), 0);
        assert_eq!(store.count_routes().unwrap(), 0);
    }

    #[test]
    fn test_start_fresh_keeps_rows_when_checkpoint_cannot_be_cleared() {
        let dir = TempDir::new().unwrap();
        // a non-empty directory where the checkpoint file should be
        let blocked = dir.path().join("checkpoint.txt");
        std::fs::create_dir_all(blocked.join("inner")).unwrap();
        let checkpoint = CheckpointStore::new(&blocked);

        let mut store = SqliteStore::open_in_memory().unwrap();
        let kanto = store.get_or_create_region("Kanto").unwrap();
        let route = store.insert_route("Route 1", kanto).unwrap();
        store.insert_encounter(route, "Pidgey", "30%", "walk").unwrap();
        store.commit().unwrap();

        assert!(start_fresh(&mut store, &checkpoint).is_err());
        assert_eq!(store.count_routes().unwrap(), 1);
        assert_eq!(store.count_encounters().unwrap(), 1);
    }

    #[test]
    fn test_summary_display() {
        let summary = IngestSummary {
            routes_created: 3,
            encounters_created: 12,
            checkpoint: 4,
            ..Default::default()
        };
        let text = summary.to_string();
        assert!(text.starts_with("3 routes, 12 encounters"));
        assert!(text.ends_with("checkpoint 4"));
    }
}
