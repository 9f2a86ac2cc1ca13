//! Table definitions for the route database

/// A table and the statements that create it
#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: &'static str,
    pub create: &'static str,
    pub indexes: &'static [&'static str],
}

pub static REGIONS: TableDef = TableDef {
    name: "regions",
    create: "CREATE TABLE IF NOT EXISTS regions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)",
    indexes: &[],
};

pub static ROUTES: TableDef = TableDef {
    name: "routes",
    create: "CREATE TABLE IF NOT EXISTS routes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    region_id INTEGER NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    UNIQUE (region_id, name),
    FOREIGN KEY (region_id) REFERENCES regions(id)
)",
    indexes: &[],
};

pub static ENCOUNTERS: TableDef = TableDef {
    name: "encounters",
    create: "CREATE TABLE IF NOT EXISTS encounters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    route_id INTEGER NOT NULL,
    pokemon TEXT NOT NULL,
    rate TEXT NOT NULL,
    method TEXT NOT NULL,
    FOREIGN KEY (route_id) REFERENCES routes(id) ON DELETE CASCADE
)",
    indexes: &["CREATE INDEX IF NOT EXISTS idx_encounters_route_id ON encounters(route_id)"],
};

/// Tables in dependency order (parents before children)
pub static ALL_TABLES: &[&TableDef] = &[&REGIONS, &ROUTES, &ENCOUNTERS];

/// Statements that create every table and index
pub fn create_statements() -> Vec<&'static str> {
    ALL_TABLES
        .iter()
        .flat_map(|t| std::iter::once(t.create).chain(t.indexes.iter().copied()))
        .collect()
}

/// Statements that drop every table, children first
pub fn drop_statements() -> Vec<String> {
    ALL_TABLES
        .iter()
        .rev()
        .map(|t| format!("DROP TABLE IF EXISTS {}", t.name))
        .collect()
}
