//! Reusable scratch storage for multi-literal matching.
//!
//! Every buffer here is cleared, never shrunk, between searches, so a
//! long-lived workspace stops allocating once it has seen the largest
//! clauses of a run.

use crate::logic::{Term, VariableId};

/// Lower-triangular matrix addressed by `(row, col)` with `col <= row`.
#[derive(Debug, Clone, Default)]
pub struct TriangularArray<T> {
    side: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> TriangularArray<T> {
    pub fn new() -> Self {
        TriangularArray {
            side: 0,
            data: Vec::new(),
        }
    }

    /// Resize to `side` rows and reset every cell to the default value
    pub fn set_side(&mut self, side: usize) {
        self.side = side;
        self.data.clear();
        self.data.resize(side * (side + 1) / 2, T::default());
    }

    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(col <= row && row < self.side, "({row}, {col}) outside triangle");
        row * (row + 1) / 2 + col
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.index(row, col)].clone()
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let i = self.index(row, col);
        self.data[i] = value;
    }
}

/// What a base literal is mapped onto by one of its alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AltTarget {
    /// Literal at this position of the instance clause
    Literal(usize),
    /// Complement of the resolved literal
    Complementary,
}

/// Match record cell: which slot currently claims an instance target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordEntry {
    #[default]
    Unconsumed,
    ConsumedBy(usize),
}

/// One placement of a base literal; its variable bindings live at
/// `start..start + var_count` of the search's term store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AltBinding {
    pub target: AltTarget,
    pub start: usize,
}

/// Caller-owned scratch for [`can_be_matched`](super::ml_matcher::can_be_matched).
///
/// One search may use a workspace at a time; `&mut` access enforces that.
#[derive(Debug, Default)]
pub struct MatchWorkspace {
    /// Slot to base literal index, after reordering
    pub(crate) order: Vec<usize>,
    /// Distinct variables of each slot's literal in first-occurrence order
    pub(crate) vars: Vec<Vec<VariableId>>,
    pub(crate) initialized: Vec<bool>,
    /// Alternatives of each slot; pruned ones are swapped past the live range
    pub(crate) alts: Vec<Vec<AltBinding>>,
    /// `remaining(i, j)`: live alternatives of slot `i` once slots `0..j`
    /// are committed
    pub(crate) remaining: TriangularArray<usize>,
    /// `intersections(j, i)` for `i < j`: range of `pairs` listing the
    /// variable positions slots `i` and `j` share
    pub(crate) intersections: TriangularArray<Option<(usize, usize)>>,
    pub(crate) pairs: Vec<(usize, usize)>,
    /// Next alternative to try per slot; the committed one is at `next - 1`
    pub(crate) next_alts: Vec<usize>,
    pub(crate) record: Vec<RecordEntry>,
    /// Allocation of the binding-row store, kept empty between searches
    pub(crate) term_store: Vec<Option<&'static Term>>,
}

impl MatchWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for a search over `slots` base literals and `record_len`
    /// match record cells.
    pub(crate) fn reset(&mut self, slots: usize, record_len: usize) {
        self.order.clear();
        reset_nested(&mut self.vars, slots);
        reset_nested(&mut self.alts, slots);
        self.initialized.clear();
        self.initialized.resize(slots, false);
        self.remaining.set_side(slots);
        self.intersections.set_side(slots);
        self.pairs.clear();
        self.next_alts.clear();
        self.next_alts.resize(slots, 0);
        self.record.clear();
        self.record.resize(record_len, RecordEntry::Unconsumed);
    }
}

fn reset_nested<T>(lists: &mut Vec<Vec<T>>, len: usize) {
    for list in lists.iter_mut() {
        list.clear();
    }
    if lists.len() < len {
        lists.resize_with(len, Vec::new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangular_array_layout() {
        let mut tri: TriangularArray<usize> = TriangularArray::new();
        tri.set_side(3);
        for row in 0..3 {
            for col in 0..=row {
                tri.set(row, col, row * 10 + col);
            }
        }
        assert_eq!(tri.get(0, 0), 0);
        assert_eq!(tri.get(2, 1), 21);
        assert_eq!(tri.get(1, 1), 11);

        tri.set_side(2);
        assert_eq!(tri.get(1, 0), 0);
    }

    #[test]
    fn test_reset_keeps_nested_capacity() {
        let mut ws = MatchWorkspace::new();
        ws.reset(4, 2);
        ws.alts[3].extend((0..16).map(|start| AltBinding {
            target: AltTarget::Complementary,
            start,
        }));
        let capacity = ws.alts[3].capacity();

        ws.reset(2, 5);
        assert!(ws.alts.iter().all(Vec::is_empty));
        assert_eq!(ws.alts[3].capacity(), capacity);
        assert_eq!(ws.record, vec![RecordEntry::Unconsumed; 5]);
        assert_eq!(ws.initialized, vec![false, false]);
    }
}
