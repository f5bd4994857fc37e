//! View state of an interactive lineage browser.
//!
//! Fetching a snapshot is the only step that can take time, and users switch
//! products faster than stores answer. Every fetch is therefore issued as a
//! [`FetchRequest`] stamped with a [`RequestToken`]; only the response to
//! the most recently issued request is applied, older ones are dropped.
//!
//! # Example
//!
//! ```
//! # use tributary::{config::LayoutConfig, source::{MemorySource, SnapshotSource}, view::{LineageView, Resolution}};
//! # use tributary_core::lineage::Snapshot;
//! let source = MemorySource::new()
//!     .with_snapshot("orders", Snapshot::new(Vec::new(), Vec::new(), 1, Vec::new()));
//! let mut view = LineageView::new(LayoutConfig::default());
//!
//! let slow = view.select_product("orders");
//! let fast = view.select_product("orders");
//!
//! let fetched = source.fetch(fast.product(), fast.version());
//! assert_eq!(view.resolve(&fast, fetched), Resolution::Applied);
//!
//! let fetched = source.fetch(slow.product(), slow.version());
//! assert_eq!(view.resolve(&slow, fetched), Resolution::Stale);
//! ```

use log::{debug, info, warn};

use tributary_core::lineage::Snapshot;

use crate::{
    config::LayoutConfig,
    error::TributaryError,
    layout::{LayoutEngine, LayoutResult},
    source::{FetchError, SnapshotSource},
    version::{SelectorError, VersionSelector},
};

/// Sequence number of an issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Hands out increasing tokens and remembers the latest.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    last: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a token newer than every token issued before.
    pub fn next(&mut self) -> RequestToken {
        self.last += 1;
        RequestToken(self.last)
    }

    /// Returns true only for the most recently issued token.
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.last
    }
}

/// A snapshot fetch the caller should perform and hand back to
/// [`LineageView::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    token: RequestToken,
    product: String,
    version: Option<u32>,
}

impl FetchRequest {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    /// Version to fetch; `None` asks for the current one.
    pub fn version(&self) -> Option<u32> {
        self.version
    }
}

/// What the view currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState {
    /// No product selected yet.
    #[default]
    Empty,

    /// Waiting for the response to `token`.
    Loading { token: RequestToken },

    Ready(Box<LayoutResult>),

    /// The last fetch failed; nothing was laid out.
    Failed { message: String },
}

/// Whether a response changed the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,

    /// A newer request was issued in the meantime; the response was dropped.
    Stale,
}

/// Selected product, version and layout of one lineage view.
#[derive(Debug, Clone, Default)]
pub struct LineageView {
    selector: VersionSelector,
    sequencer: RequestSequencer,
    engine: LayoutEngine,
    state: ViewState,
}

impl LineageView {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            engine: LayoutEngine::new(config),
            ..Self::default()
        }
    }

    pub fn selector(&self) -> &VersionSelector {
        &self.selector
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The layout on display, if the last applied fetch succeeded.
    pub fn layout(&self) -> Option<&LayoutResult> {
        match &self.state {
            ViewState::Ready(layout) => Some(layout.as_ref()),
            _ => None,
        }
    }

    /// Switches to `product` and requests its current version.
    pub fn select_product(&mut self, product: impl Into<String>) -> FetchRequest {
        self.selector.select_product(product);
        self.issue()
    }

    /// Pins `version` of the selected product and requests it.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] if no product is selected or the version is
    /// not in the product's known history. The view is left unchanged.
    pub fn select_version(&mut self, version: u32) -> Result<FetchRequest, SelectorError> {
        self.selector.pin(version)?;
        Ok(self.issue())
    }

    fn issue(&mut self) -> FetchRequest {
        let token = self.sequencer.next();
        let request = FetchRequest {
            token,
            product: self.selector.product().unwrap_or_default().to_string(),
            version: self.selector.requested_version(),
        };
        debug!(
            token = token.0,
            product = request.product.as_str(),
            version:? = request.version;
            "Fetch issued"
        );
        self.state = ViewState::Loading { token };
        request
    }

    /// Applies the response to `request` unless a newer request was issued.
    ///
    /// A successful fetch is laid out and shown; a failed one leaves the
    /// view in [`ViewState::Failed`] without laying anything out.
    pub fn resolve(
        &mut self,
        request: &FetchRequest,
        fetched: Result<Snapshot, FetchError>,
    ) -> Resolution {
        if !self.sequencer.is_current(request.token) {
            debug!(token = request.token.0; "Dropping stale response");
            return Resolution::Stale;
        }

        match fetched {
            Ok(snapshot) => self.show(&snapshot),
            Err(err) => self.fail(&err),
        }
        Resolution::Applied
    }

    /// Selects `product`, optionally pins `version`, and fetches from
    /// `source` through the same request protocol.
    ///
    /// # Errors
    ///
    /// Returns [`TributaryError::Selection`] if the pin is rejected and
    /// [`TributaryError::Fetch`] if the fetch fails; the view is left in
    /// [`ViewState::Failed`] in the latter case.
    pub fn load(
        &mut self,
        source: &impl SnapshotSource,
        product: &str,
        version: Option<u32>,
    ) -> Result<(), TributaryError> {
        let mut request = self.select_product(product);
        if let Some(version) = version {
            request = self.select_version(version)?;
        }

        match source.fetch(request.product(), request.version()) {
            Ok(snapshot) => {
                self.resolve(&request, Ok(snapshot));
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err.into())
            }
        }
    }

    fn show(&mut self, snapshot: &Snapshot) {
        self.selector.on_loaded(snapshot);
        let layout = self.engine.compute(snapshot);
        info!(
            product = self.selector.product().unwrap_or_default(),
            version = layout.version(),
            nodes = layout.nodes().len();
            "Lineage view updated"
        );
        self.state = ViewState::Ready(Box::new(layout));
    }

    fn fail(&mut self, err: &FetchError) {
        warn!("Snapshot fetch failed: {err}");
        self.state = ViewState::Failed {
            message: err.to_string(),
        };
    }
}
