//! Axis building and ordering.
//!
//! Rows and columns are built the same way: distinct values in first-seen
//! order, each with an optional numeric order hint, then sorted by
//! `compare_entries`.
//!
//! Key invariants:
//! - a value appears at most once per axis
//! - the order hint is captured once (first valid hint wins) and never replaced
//! - sorting is stable, so values with equal keys keep first-seen order

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization as _;

/// One distinct axis value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisEntry {
    pub value: String,
    /// Always finite when present
    pub order: Option<f64>,
}

impl AxisEntry {
    pub fn new(value: impl Into<String>, order: Option<f64>) -> Self {
        Self {
            value: value.into(),
            order: order.filter(|o| o.is_finite()),
        }
    }
}

/// Collects distinct values of one axis during the record pass.
#[derive(Debug, Clone, Default)]
pub struct OrderedAxisBuilder {
    entries: Vec<AxisEntry>,
    index: FxHashMap<String, usize>,
}

impl OrderedAxisBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting of `value` with an optional order hint.
    ///
    /// NaN and infinite hints are treated as absent. Empty values are ignored.
    pub fn observe(&mut self, value: &str, hint: Option<f64>) {
        if value.is_empty() {
            return;
        }
        let hint = hint.filter(|h| h.is_finite());

        match self.index.get(value) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                if entry.order.is_none() {
                    entry.order = hint;
                }
            }
            None => {
                self.index.insert(value.to_string(), self.entries.len());
                self.entries.push(AxisEntry::new(value, hint));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(value)
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[AxisEntry] {
        &self.entries
    }

    /// Consume the builder and return the entries sorted for display.
    pub fn into_sorted(self) -> Vec<AxisEntry> {
        let mut entries = self.entries;
        sort_entries(&mut entries);
        entries
    }

    /// Sorted values only.
    pub fn into_sorted_values(self) -> Vec<String> {
        self.into_sorted().into_iter().map(|e| e.value).collect()
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Axis order:
/// 1. both ordered → ascending by order
/// 2. only one ordered → the ordered one first
/// 3. neither → `locale_compare` on the value
pub fn compare_entries(a: &AxisEntry, b: &AxisEntry) -> Ordering {
    match (a.order, b.order) {
        (Some(x), Some(y)) => OrderedFloat(x).cmp(&OrderedFloat(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => locale_compare(&a.value, &b.value),
    }
}

/// Stable sort by `compare_entries`.
pub fn sort_entries(entries: &mut [AxisEntry]) {
    entries.sort_by(compare_entries);
}

/// Alphabetic comparison approximating a root-locale collator.
///
/// Levels, each deciding only on a tie of the previous one:
/// 1. base letters, ignoring accents and case (`éclair` sorts with `e`)
/// 2. accents (`e` before `é`)
/// 3. case, lowercase first at the first differing position
/// 4. raw code points
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let base = |s: &str| -> Vec<char> { s.nfd().filter(|c| !is_combining_mark(*c)).collect() };
    let marks = |s: &str| -> Vec<char> { s.nfd().filter(|c| is_combining_mark(*c)).collect() };
    let (base_a, base_b) = (base(a), base(b));

    base_a
        .iter()
        .flat_map(|c| c.to_lowercase())
        .cmp(base_b.iter().flat_map(|c| c.to_lowercase()))
        .then_with(|| marks(a).cmp(&marks(b)))
        .then_with(|| {
            let upper = |chars: &[char]| chars.iter().map(|c| c.is_uppercase()).collect::<Vec<_>>();
            upper(&base_a).cmp(&upper(&base_b))
        })
        .then_with(|| a.cmp(b))
}
