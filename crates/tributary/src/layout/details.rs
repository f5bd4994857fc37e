//! Transformation details keyed by rendered edge.
//!
//! Every positioned edge carries a [`RenderId`], a stable string the
//! renderer attaches to the drawn path. Hovering a path looks its id up in
//! the [`TransformationIndex`] to find the transformation text.

use std::{borrow::Borrow, collections::HashMap, fmt};

use serde::Serialize;

use tributary_core::lineage::LineageEdge;

/// Stable identifier of a rendered edge.
///
/// `"{source}->{target}"` for the first edge between two nodes and
/// `"{source}->{target}#{n}"` for the `n`-th parallel edge after it. When
/// node ids contain `->` or `#` and the formatted id is already taken, `n`
/// is raised until it is unique within the layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RenderId(String);

impl RenderId {
    pub(crate) fn new(edge: &LineageEdge, parallel: usize) -> Self {
        if parallel == 0 {
            Self(format!("{}->{}", edge.source(), edge.target()))
        } else {
            Self(format!("{}->{}#{parallel}", edge.source(), edge.target()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RenderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Result of a detail lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail<'a> {
    /// The edge has a transformation description.
    Logic(&'a str),

    /// The edge exists but carries no description.
    Absent,

    /// No rendered edge has this id.
    UnknownEdge,
}

/// Constant-time lookup from [`RenderId`] to transformation text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransformationIndex {
    entries: HashMap<RenderId, Option<String>>,
}

impl TransformationIndex {
    /// Indexes `edge` under the first unused id from its `parallel`-th
    /// ordinal on, and returns that id.
    ///
    /// Node ids may themselves contain `->` or `#`, so two different edges
    /// can format to the same string; the ordinal is bumped until the id is
    /// unique within the index.
    pub(crate) fn assign(&mut self, edge: &LineageEdge, parallel: usize) -> RenderId {
        let mut ordinal = parallel;
        let mut render_id = RenderId::new(edge, ordinal);
        while self.entries.contains_key(&render_id) {
            ordinal += 1;
            render_id = RenderId::new(edge, ordinal);
        }
        self.entries.insert(
            render_id.clone(),
            edge.transformation_logic().map(str::to_string),
        );
        render_id
    }

    /// Looks up the description of the edge rendered under `render_id`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tributary::layout::{Detail, TransformationIndex};
    /// let index = TransformationIndex::default();
    /// assert_eq!(index.lookup("a->b"), Detail::UnknownEdge);
    /// ```
    pub fn lookup(&self, render_id: &str) -> Detail<'_> {
        match self.entries.get(render_id) {
            Some(Some(logic)) => Detail::Logic(logic),
            Some(None) => Detail::Absent,
            None => Detail::UnknownEdge,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
