//! Clause-level matching: the multi-literal matcher and the subsumption
//! checks built on it.

pub mod ml_matcher;
pub mod subsumption;
pub mod workspace;

#[cfg(test)]
mod proptest_tests;

pub use ml_matcher::{can_be_matched, MatchProblem};
pub use subsumption::{literal_alternatives, Resolution, Subsumption, SubsumptionIndex};
pub use workspace::{AltTarget, MatchWorkspace, RecordEntry, TriangularArray};
