use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;

use crate::dispatch::{Course, Driver};

/// Load the driver pool from a JSON file holding an array of driver records.
pub fn load_drivers(path: &Path) -> Result<Vec<Driver>> {
    read_json(path, "drivers")
}

/// Load a single course record from a JSON file.
pub fn load_course(path: &Path) -> Result<Course> {
    read_json(path, "course")
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file at {}", what, path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("Failed to load {} from {}", what, path.display()))
}
