//! Indexing of stored terms and clauses.
//!
//! - `flat_term`: the preorder query view instructions execute against
//! - `code_tree`: compiled instruction tries over terms and clauses

pub mod code_tree;
pub mod flat_term;

pub use code_tree::{
    compile_clause, compile_term, ClauseCodeTree, ClauseMatches, CodeTree, CompiledCode,
    InstrId, Instruction, Op, TermCodeTree, TermMatches,
};
pub use flat_term::{FlatEntry, FlatTerm};
