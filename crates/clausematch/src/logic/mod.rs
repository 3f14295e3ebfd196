//! First-order logic representation
//!
//! Terms, literals and clauses, symbol interning, single-literal matching,
//! and the cooperative time-limit oracle used by the search procedures.

pub mod core;
pub mod interner;
pub mod matching;
pub mod time_limit;

pub use self::core::clause::{Clause, ClauseDisplay};
pub use self::core::literal::{Literal, LiteralDisplay, PredicateSymbol};
pub use self::core::symbol::Symbol;
pub use self::core::term::{Constant, FunctionSymbol, Term, TermDisplay, Variable};
pub use interner::{ConstantId, FunctionId, Interner, PredicateId, VariableId};
pub use matching::{literal_matches, match_args, match_reversed_args, match_terms, Binder, ListBinder};
pub use time_limit::{Deadline, TimeLimit, Unlimited};
