//! Error types for clausematch

use thiserror::Error;

/// Abnormal termination of a matching search.
///
/// Structural mismatches and exhaustion are ordinary results (backtracking,
/// `false`, an empty iterator) and never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("time limit exceeded after {iterations} search iterations")]
    TimeLimitExceeded { iterations: u64 },
}

pub type Result<T> = std::result::Result<T, MatchError>;
