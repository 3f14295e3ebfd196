//! clausematch: indexing and matching core for first-order clauses
//!
//! This library provides the retrieval side of a saturation prover:
//! code trees that find stored terms or clauses generalizing a query, and a
//! multi-literal matcher deciding subsumption and subsumption resolution.
//!
//! ## Modules
//!
//! - `logic`: terms, literals, clauses, interning, single-literal matching
//! - `index`: flattened query terms and code trees
//! - `simplifying`: the multi-literal matcher and subsumption front ends
//! - `config` / `error`: matcher configuration and error types

pub mod config;
pub mod error;
pub mod index;
pub mod logic;
pub mod simplifying;

pub use config::MatcherConfig;
pub use error::{MatchError, Result};

pub use logic::{
    Clause, Constant, Deadline, FunctionSymbol, Interner, Literal, PredicateId, PredicateSymbol,
    Symbol, Term, TimeLimit, Unlimited, Variable, VariableId,
};

pub use index::{ClauseCodeTree, CodeTree, FlatTerm, TermCodeTree};

pub use simplifying::{
    can_be_matched, literal_alternatives, MatchProblem, MatchWorkspace, Resolution, Subsumption,
    SubsumptionIndex,
};
