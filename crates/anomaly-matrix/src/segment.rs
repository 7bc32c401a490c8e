//! Segments, ordered segment lists, and composed segment filters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MatrixResult};

// ── Segment Identification ──────────────────────────────────────────────

/// Identifies a segment, e.g. `"mobile_users"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub String);

impl SegmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SegmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ── Segment ─────────────────────────────────────────────────────────────

/// A segment as declared in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentEntry {
    pub id: SegmentId,
    pub name: String,
}

impl SegmentEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: SegmentId::new(id),
            name: name.into(),
        }
    }
}

/// A segment with its position in the declaring list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub name: String,
    /// Zero-based row/column position for the renderer.
    pub ordinal: usize,
}

/// An ordered, immutable list of segments with unique ids.
///
/// Serialized as its entries; ordinals are reassigned and the list is
/// revalidated on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SegmentEntry>", into = "Vec<SegmentEntry>")]
pub struct SegmentList {
    segments: Vec<Segment>,
}

impl SegmentList {
    /// Build a list from configured entries, assigning ordinals by position.
    ///
    /// `key` names the configuration key in errors. Empty lists and
    /// duplicate ids are rejected.
    pub fn from_entries(key: &str, entries: &[SegmentEntry]) -> MatrixResult<Self> {
        if entries.is_empty() {
            return Err(MatrixError::config(key, "segment list is empty"));
        }

        let mut seen = HashSet::new();
        let mut segments = Vec::with_capacity(entries.len());
        for (ordinal, entry) in entries.iter().enumerate() {
            if !seen.insert(&entry.id) {
                return Err(MatrixError::config(
                    key,
                    format!("duplicate segment id `{}`", entry.id),
                ));
            }
            segments.push(Segment {
                id: entry.id.clone(),
                name: entry.name.clone(),
                ordinal,
            });
        }

        Ok(Self { segments })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn get(&self, id: &SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| &s.id == id)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }
}

impl TryFrom<Vec<SegmentEntry>> for SegmentList {
    type Error = MatrixError;

    fn try_from(entries: Vec<SegmentEntry>) -> Result<Self, Self::Error> {
        Self::from_entries("segments", &entries)
    }
}

impl From<SegmentList> for Vec<SegmentEntry> {
    fn from(list: SegmentList) -> Self {
        list.segments
            .into_iter()
            .map(|s| SegmentEntry {
                id: s.id,
                name: s.name,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a SegmentList {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

// ── Segment Filter ──────────────────────────────────────────────────────

/// A segment expression handed to the provider.
///
/// `All(vec![])` matches every visitor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentFilter {
    Segment(SegmentId),
    All(Vec<SegmentFilter>),
}

impl SegmentFilter {
    /// The unrestricted filter.
    pub fn everything() -> Self {
        SegmentFilter::All(Vec::new())
    }

    /// Conjunction, flattening nested `All` terms.
    pub fn and(self, other: SegmentFilter) -> Self {
        let mut terms = Vec::new();
        for part in [self, other] {
            match part {
                SegmentFilter::All(inner) => terms.extend(inner),
                single => terms.push(single),
            }
        }
        SegmentFilter::All(terms)
    }

    /// Effective filter for one matrix cell: `base AND a AND b`.
    pub fn for_cell(base: &SegmentFilter, a: &Segment, b: &Segment) -> Self {
        Self::for_ids(base, &a.id, &b.id)
    }

    /// Same as [`SegmentFilter::for_cell`], from bare ids.
    pub fn for_ids(base: &SegmentFilter, a: &SegmentId, b: &SegmentId) -> Self {
        base.clone()
            .and(SegmentFilter::Segment(a.clone()))
            .and(SegmentFilter::Segment(b.clone()))
    }

    /// Segment ids referenced by this filter, in order.
    pub fn segment_ids(&self) -> Vec<&SegmentId> {
        match self {
            SegmentFilter::Segment(id) => vec![id],
            SegmentFilter::All(terms) => terms.iter().flat_map(|t| t.segment_ids()).collect(),
        }
    }
}

impl Default for SegmentFilter {
    fn default() -> Self {
        Self::everything()
    }
}

impl std::fmt::Display for SegmentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentFilter::Segment(id) => write!(f, "{}", id),
            SegmentFilter::All(terms) if terms.is_empty() => write!(f, "*"),
            SegmentFilter::All(terms) => {
                let parts: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", parts.join(" AND "))
            }
        }
    }
}
