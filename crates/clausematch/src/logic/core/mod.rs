//! Core FOL types: terms, literals, clauses and head symbols

pub mod clause;
pub mod literal;
pub mod symbol;
pub mod term;
