//! Version selection for one data product at a time.
//!
//! A [`VersionSelector`] tracks which product is selected, which of its
//! versions should be fetched next, and the version history reported by the
//! last loaded snapshot.
//!
//! ```text
//! NoVersionSelected --on_loaded(v)--> VersionLoaded(v) --pin(v')/on_loaded(v')--> VersionLoaded(v')
//!        ^                                                                                |
//!        +----------------------------- select_product(p) --------------------------------+
//! ```

use log::debug;
use thiserror::Error;

use tributary_core::lineage::{LineageVersion, Snapshot};

/// Rejected selector transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("no data product is selected")]
    NoProduct,

    #[error("version {version} is not available for `{product}`")]
    UnknownVersion { product: String, version: u32 },
}

/// Which version the selector points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorState {
    /// Nothing pinned; the store decides which version to return.
    #[default]
    NoVersionSelected,

    /// A version is pinned, either by the user or by the first load.
    VersionLoaded(u32),
}

#[derive(Debug, Clone, Default)]
pub struct VersionSelector {
    product: Option<String>,
    state: SelectorState,
    versions: Vec<LineageVersion>,
}

impl VersionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// Versions reported by the last loaded snapshot of the current product.
    pub fn versions(&self) -> &[LineageVersion] {
        &self.versions
    }

    /// Switches to `product`, dropping the pin and the version history of
    /// the previous one.
    pub fn select_product(&mut self, product: impl Into<String>) {
        let product = product.into();
        debug!(product = product.as_str(); "Data product selected");
        self.product = Some(product);
        self.state = SelectorState::NoVersionSelected;
        self.versions.clear();
    }

    /// Pins `version` for the current product.
    ///
    /// Before the product's first snapshot has loaded the history is unknown,
    /// so any version is accepted and left for the store to validate.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::NoProduct`] if no product is selected and
    /// [`SelectorError::UnknownVersion`] if `version` is not in the loaded
    /// history.
    pub fn pin(&mut self, version: u32) -> Result<(), SelectorError> {
        let Some(product) = &self.product else {
            return Err(SelectorError::NoProduct);
        };

        if !self.versions.is_empty() && !self.versions.iter().any(|v| v.version() == version) {
            return Err(SelectorError::UnknownVersion {
                product: product.clone(),
                version,
            });
        }

        debug!(product = product.as_str(), version = version; "Version pinned");
        self.state = SelectorState::VersionLoaded(version);
        Ok(())
    }

    /// The version to request, or `None` to let the store pick its current one.
    pub fn requested_version(&self) -> Option<u32> {
        match self.state {
            SelectorState::NoVersionSelected => None,
            SelectorState::VersionLoaded(version) => Some(version),
        }
    }

    /// Records a successfully loaded snapshot of the current product.
    ///
    /// The snapshot's version becomes the pinned one and its history
    /// replaces the known versions.
    pub fn on_loaded(&mut self, snapshot: &Snapshot) {
        self.state = SelectorState::VersionLoaded(snapshot.version());
        self.versions = snapshot.versions().to_vec();
    }
}
