//! Catalog configuration loading from config.toml
//!
//! The catalog file describes the guest surcharge, the add-on services, the feature list
//! and the initial rooms. It is used to seed the database on first run or when entries
//! are missing.

use crate::entities::RoomCategory;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CATALOG_PATH: &str = "config.toml";

/// Configuration structure representing the entire catalog file
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    /// Surcharge charged per named guest
    pub guest_surcharge: f64,
    /// Add-on services offered at check-in
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    /// Feature names available to rooms
    #[serde(default)]
    pub features: Vec<String>,
    /// Rooms to create
    #[serde(default)]
    pub rooms: Vec<RoomConfig>,
}

/// Configuration for a single add-on service
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Service type (e.g. "breakfast")
    #[serde(rename = "type")]
    pub service_type: String,
    /// Catalog price
    pub price: f64,
}

/// Configuration for a single room
#[derive(Debug, Deserialize, Clone)]
pub struct RoomConfig {
    /// Room number
    pub number: i32,
    /// Category, written as the stored upper-case name (e.g. `"SUITE_PREMIUM"`)
    pub category: RoomCategory,
    /// Nightly price
    pub price: f64,
    /// Optional cover image
    pub image: Option<String>,
    /// Names of features to attach; each must appear in the feature list
    #[serde(default)]
    pub features: Vec<String>,
}

/// Loads catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file: {e}"),
    })
}

/// Loads catalog configuration from `CATALOG_CONFIG`, or `./config.toml` when unset
pub fn load_default_config() -> Result<CatalogConfig> {
    let path =
        std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string());
    load_config(path)
}
