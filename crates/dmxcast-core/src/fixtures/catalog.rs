use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::Fixture;
use crate::DMX_CHANNELS;

/// Packaged default catalog, the in-crate counterpart of a site-specific
/// `fixtures.json`.
const DEFAULT_CATALOG_JSON: &str = include_str!("../../data/fixtures.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("fixtures file not found at {path}")]
    NotFound { path: PathBuf },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixtures JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("fixture {fixture}: arm value references unknown logical channel {logical:?}")]
    ArmChannel { fixture: String, logical: String },
    #[error("fixture {fixture}: logical channel {logical:?} is patched to {channel} (1..=512)")]
    ChannelRange {
        fixture: String,
        logical: String,
        channel: u16,
    },
}

/// Loaded fixture catalog.
///
/// # Examples
/// ```
/// use dmxcast_core::fixtures::Catalog;
///
/// let catalog = Catalog::embedded()?;
/// assert!(catalog.fixture("head_el150").is_some());
/// # Ok::<(), dmxcast_core::fixtures::CatalogError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub fixtures: Vec<Fixture>,
}

impl Catalog {
    /// Load a catalog. Order: the explicit `path` when given, else a
    /// `fixtures.json` in the current directory, else the packaged default.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CatalogError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Self::from_file(path)
            }
            None => {
                let fallback = Path::new("fixtures.json");
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Self::embedded()
                }
            }
        }
    }

    /// The packaged default catalog.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_CATALOG_JSON, Path::new("<embedded>"))
    }

    fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    fn from_json(text: &str, origin: &Path) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(text).map_err(|source| CatalogError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for fixture in &self.fixtures {
            for (logical, &channel) in &fixture.channels {
                if channel == 0 || channel as usize > DMX_CHANNELS {
                    return Err(CatalogError::ChannelRange {
                        fixture: fixture.id.clone(),
                        logical: logical.clone(),
                        channel,
                    });
                }
            }
            for logical in fixture.arm.keys() {
                if !fixture.channels.contains_key(logical) {
                    return Err(CatalogError::ArmChannel {
                        fixture: fixture.id.clone(),
                        logical: logical.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a fixture by id.
    pub fn fixture(&self, id: &str) -> Option<&Fixture> {
        self.fixtures.iter().find(|fixture| fixture.id == id)
    }
}
