//! Where snapshots come from.
//!
//! A [`SnapshotSource`] answers "give me version `v` (or the current version)
//! of product `p`". Two sources ship with the crate:
//!
//! - [`DirectorySource`] reads a catalog directory laid out as
//!   `<root>/<product>/v<N>.json`
//! - [`MemorySource`] serves snapshots registered in memory

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use thiserror::Error;

use tributary_core::lineage::Snapshot;
use tributary_snapshot::SnapshotError;

/// Failure to obtain a snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unknown data product `{0}`")]
    UnknownProduct(String),

    #[error("version {version} of `{product}` does not exist")]
    UnknownVersion { product: String, version: u32 },

    #[error("invalid data product name `{0}`")]
    InvalidProduct(String),

    #[error("I/O error reading `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{path}` is not a valid snapshot: {source}")]
    Decode {
        path: PathBuf,
        src: String,
        #[source]
        source: SnapshotError,
    },
}

/// A store of versioned lineage snapshots.
pub trait SnapshotSource {
    /// Fetches `version` of `product`, or its current version when `version`
    /// is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the product or version does not exist or
    /// the snapshot cannot be read.
    fn fetch(&self, product: &str, version: Option<u32>) -> Result<Snapshot, FetchError>;
}

/// Catalog directory with one subdirectory per product and one
/// `v<N>.json` file per version.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the version numbers stored for `product`, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnknownProduct`] if the product directory does
    /// not exist.
    pub fn versions(&self, product: &str) -> Result<Vec<u32>, FetchError> {
        let dir = self.product_dir(product)?;
        let entries = fs::read_dir(&dir).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => FetchError::UnknownProduct(product.to_string()),
            _ => FetchError::Io {
                path: dir.clone(),
                source: err,
            },
        })?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FetchError::Io {
                path: dir.clone(),
                source,
            })?;
            if let Some(version) = parse_version_file(&entry.file_name().to_string_lossy()) {
                versions.push(version);
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }

    fn product_dir(&self, product: &str) -> Result<PathBuf, FetchError> {
        let valid = !product.is_empty()
            && product != "."
            && product != ".."
            && !product.contains(['/', '\\']);
        if !valid {
            return Err(FetchError::InvalidProduct(product.to_string()));
        }
        Ok(self.root.join(product))
    }
}

/// Parses `v<N>.json` into `N`.
fn parse_version_file(name: &str) -> Option<u32> {
    name.strip_prefix('v')?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

impl SnapshotSource for DirectorySource {
    fn fetch(&self, product: &str, version: Option<u32>) -> Result<Snapshot, FetchError> {
        let available = self.versions(product)?;

        let version = match version {
            Some(version) if available.contains(&version) => version,
            Some(version) => {
                return Err(FetchError::UnknownVersion {
                    product: product.to_string(),
                    version,
                });
            }
            None => *available
                .last()
                .ok_or_else(|| FetchError::UnknownProduct(product.to_string()))?,
        };

        let path = self.product_dir(product)?.join(format!("v{version}.json"));
        info!(product = product, version = version; "Reading snapshot");

        let src = fs::read_to_string(&path).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        let snapshot = tributary_snapshot::parse(&src).map_err(|source| FetchError::Decode {
            path: path.clone(),
            src: src.clone(),
            source,
        })?;

        debug!(
            nodes = snapshot.nodes().len(),
            edges = snapshot.edges().len();
            "Snapshot read"
        );
        Ok(snapshot)
    }
}

/// In-memory store keyed by product and version.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    products: HashMap<String, Vec<Snapshot>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `snapshot` under `product`, replacing any snapshot with the
    /// same version (builder style).
    pub fn with_snapshot(mut self, product: impl Into<String>, snapshot: Snapshot) -> Self {
        self.insert(product, snapshot);
        self
    }

    pub fn insert(&mut self, product: impl Into<String>, snapshot: Snapshot) {
        let snapshots = self.products.entry(product.into()).or_default();
        snapshots.retain(|existing| existing.version() != snapshot.version());
        snapshots.push(snapshot);
    }
}

impl SnapshotSource for MemorySource {
    fn fetch(&self, product: &str, version: Option<u32>) -> Result<Snapshot, FetchError> {
        let snapshots = self
            .products
            .get(product)
            .ok_or_else(|| FetchError::UnknownProduct(product.to_string()))?;

        let found = match version {
            Some(version) => snapshots.iter().find(|s| s.version() == version),
            None => snapshots.iter().max_by_key(|s| s.version()),
        };

        found.cloned().ok_or_else(|| match version {
            Some(version) => FetchError::UnknownVersion {
                product: product.to_string(),
                version,
            },
            None => FetchError::UnknownProduct(product.to_string()),
        })
    }
}
