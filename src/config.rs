use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

const DB_FILE: &str = "encounters.db";
const CHECKPOINT_FILE: &str = "checkpoint.txt";

/// Where the database and checkpoint live
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub db: PathBuf,
    pub checkpoint: PathBuf,
}

impl DataPaths {
    /// Fill in whatever was not given on the command line.
    ///
    /// A custom database keeps its checkpoint beside it; otherwise both go in
    /// the platform data directory.
    pub fn resolve(db: Option<PathBuf>, checkpoint: Option<PathBuf>) -> Result<Self> {
        let db = match db {
            Some(db) => db,
            None => default_data_dir()?.join(DB_FILE),
        };

        let checkpoint = match checkpoint {
            Some(path) => path,
            None => db.with_file_name(CHECKPOINT_FILE),
        };

        Ok(Self { db, checkpoint })
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "route-tracker")
        .context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
