use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use super::schema::{create_statements, drop_statements};
use super::{EncounterView, RouteStore, RouteView};

/// SQLite-backed route database.
///
/// Ingestion writes go through one explicit transaction that opens on the
/// first write and closes at `commit`.
pub struct SqliteStore {
    conn: Connection,
    in_tx: bool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        let store = Self::from_connection(conn)?;
        debug!("Opened route database at {:?}", db_path);
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create database")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn, in_tx: false };
        store.create_tables()?;
        Ok(store)
    }

    fn create_tables(&self) -> Result<()> {
        for sql in create_statements() {
            self.conn
                .execute(sql, [])
                .with_context(|| format!("Failed to run: {}", sql))?;
        }
        Ok(())
    }

    /// Drop and recreate every table
    pub fn reset(&mut self) -> Result<()> {
        self.rollback()?;
        for sql in drop_statements() {
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to run: {}", sql))?;
        }
        self.create_tables()?;
        info!("Route database reset");
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        if !self.in_tx {
            self.conn
                .execute_batch("BEGIN IMMEDIATE")
                .context("Failed to begin transaction")?;
            self.in_tx = true;
        }
        Ok(())
    }

    /// Discard uncommitted writes
    pub fn rollback(&mut self) -> Result<()> {
        if self.in_tx {
            self.conn
                .execute_batch("ROLLBACK")
                .context("Failed to roll back transaction")?;
            self.in_tx = false;
        }
        Ok(())
    }

    /// Every route with its encounters, in insertion order
    pub fn list_routes(&self) -> Result<Vec<RouteView>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT r.id, r.name, g.name, r.completed, e.pokemon, e.rate, e.method
             FROM routes r
             JOIN regions g ON g.id = r.region_id
             LEFT JOIN encounters e ON e.route_id = r.id
             ORDER BY r.id, e.id",
        )?;

        let mut rows = stmt.query([])?;
        let mut routes: Vec<RouteView> = Vec::new();

        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;

            if routes.last().map(|r| r.id) != Some(id) {
                routes.push(RouteView {
                    id,
                    name: row.get(1)?,
                    region: row.get(2)?,
                    completed: row.get::<_, i64>(3)? != 0,
                    pokemon: Vec::new(),
                });
            }

            let pokemon: Option<String> = row.get(4)?;
            if let (Some(name), Some(route)) = (pokemon, routes.last_mut()) {
                route.pokemon.push(EncounterView {
                    name,
                    rate: row.get(5)?,
                    method: row.get(6)?,
                });
            }
        }

        Ok(routes)
    }

    /// Mark a route complete. Returns false when no such route exists.
    pub fn mark_route_complete(&self, route_id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("UPDATE routes SET completed = 1 WHERE id = ?1", params![route_id])
            .with_context(|| format!("Failed to mark route {} complete", route_id))?;
        Ok(changed > 0)
    }

    pub fn count_routes(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM routes")
    }

    pub fn count_encounters(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM encounters")
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Let SQLite refresh its planner statistics
    pub fn finalize(mut self) -> Result<()> {
        self.commit()?;
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

impl RouteStore for SqliteStore {
    fn get_or_create_region(&mut self, name: &str) -> Result<i64> {
        let existing = self
            .conn
            .query_row("SELECT id FROM regions WHERE name = ?1", params![name], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        self.begin()?;
        self.conn
            .execute("INSERT INTO regions (name) VALUES (?1)", params![name])
            .with_context(|| format!("Failed to insert region: {}", name))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_route_names(&mut self, region_id: i64) -> Result<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name FROM routes WHERE region_id = ?1")?;
        let names = stmt
            .query_map(params![region_id], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(names)
    }

    fn insert_route(&mut self, name: &str, region_id: i64) -> Result<i64> {
        self.begin()?;
        self.conn
            .execute(
                "INSERT INTO routes (name, region_id) VALUES (?1, ?2)",
                params![name, region_id],
            )
            .with_context(|| format!("Failed to insert route: {}", name))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn delete_route(&mut self, route_id: i64) -> Result<()> {
        self.begin()?;
        self.conn
            .execute("DELETE FROM routes WHERE id = ?1", params![route_id])
            .with_context(|| format!("Failed to delete route {}", route_id))?;
        Ok(())
    }

    fn insert_encounter(
        &mut self,
        route_id: i64,
        species: &str,
        rate: &str,
        method: &str,
    ) -> Result<()> {
        self.begin()?;
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO encounters (route_id, pokemon, rate, method) VALUES (?1, ?2, ?3, ?4)",
        )?;
        stmt.execute(params![route_id, species, rate, method])
            .with_context(|| format!("Failed to insert encounter {} on route {}", species, route_id))?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.in_tx {
            self.conn
                .execute_batch("COMMIT")
                .context("Failed to commit transaction")?;
            self.in_tx = false;
        }
        Ok(())
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        if self.in_tx {
            warn!("Discarding uncommitted route writes");
            self.conn.execute_batch("ROLLBACK").ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (SqliteStore, i64) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let region = store.get_or_create_region("Kanto").unwrap();
        (store, region)
    }

    #[test]
    fn test_get_or_create_region_is_stable() {
        let (mut store, kanto) = seeded();
        assert_eq!(store.get_or_create_region("Kanto").unwrap(), kanto);
        let johto = store.get_or_create_region("Johto").unwrap();
        assert_ne!(kanto, johto);
    }

    #[test]
    fn test_delete_route_cascades() {
        let (mut store, kanto) = seeded();
        let route = store.insert_route("Route 1", kanto).unwrap();
        store.insert_encounter(route, "Pidgey", "30%", "walk").unwrap();
        store.insert_encounter(route, "Rattata", "20%", "walk").unwrap();
        assert_eq!(store.count_encounters().unwrap(), 2);

        store.delete_route(route).unwrap();
        store.commit().unwrap();
        assert_eq!(store.count_routes().unwrap(), 0);
        assert_eq!(store.count_encounters().unwrap(), 0);
    }

    #[test]
    fn test_route_names_scoped_to_region() {
        let (mut store, kanto) = seeded();
        let johto = store.get_or_create_region("Johto").unwrap();
        store.insert_route("Route 1", kanto).unwrap();
        store.insert_route("Route 29", johto).unwrap();
        store.commit().unwrap();

        let names = store.list_route_names(kanto).unwrap();
        assert_eq!(names.len(), 1);
        assert!(names.contains("Route 1"));
    }

    #[test]
    fn test_duplicate_route_name_rejected() {
        let (mut store, kanto) = seeded();
        store.insert_route("Route 1", kanto).unwrap();
        assert!(store.insert_route("Route 1", kanto).is_err());
    }

    #[test]
    fn test_rollback_discards_uncommitted() {
        let (mut store, kanto) = seeded();
        store.commit().unwrap();
        store.insert_route("Route 1", kanto).unwrap();
        store.rollback().unwrap();
        assert_eq!(store.count_routes().unwrap(), 0);
    }

    #[test]
    fn test_list_routes_and_mark_complete() {
        let (mut store, kanto) = seeded();
        let r1 = store.insert_route("Route 1", kanto).unwrap();
        store.insert_encounter(r1, "Pidgey", "30%", "walk").unwrap();
        store.insert_encounter(r1, "Rattata", "20%", "walk").unwrap();
        let r2 = store.insert_route("Viridian Forest", kanto).unwrap();
        store.insert_encounter(r2, "Caterpie", "5%", "walk").unwrap();
        store.commit().unwrap();

        assert!(store.mark_route_complete(r2).unwrap());
        assert!(!store.mark_route_complete(9999).unwrap());

        let routes = store.list_routes().unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].name, "Route 1");
        assert_eq!(routes[0].region, "Kanto");
        assert!(!routes[0].completed);
        assert_eq!(routes[0].pokemon.len(), 2);
        assert_eq!(routes[0].pokemon[0].name, "Pidgey");
        assert_eq!(routes[0].pokemon[0].rate, "30%");
        assert!(routes[1].completed);
        assert_eq!(routes[1].pokemon[0].method, "walk");
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut store, kanto) = seeded();
        let r1 = store.insert_route("Route 1", kanto).unwrap();
        store.insert_encounter(r1, "Pidgey", "30%", "walk").unwrap();
        store.commit().unwrap();

        store.reset().unwrap();
        assert_eq!(store.count_routes().unwrap(), 0);
        assert!(store.list_routes().unwrap().is_empty());
    }
}
