//! Head symbols as seen by the code-tree instructions

use super::literal::PredicateSymbol;
use super::term::{FunctionSymbol, Term};
use crate::logic::interner::ConstantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The head symbol of a non-variable term or of a literal.
///
/// Literal heads carry their polarity so `P(x)` and `~P(x)` never share a
/// `CheckFun` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Constant(ConstantId),
    Function(FunctionSymbol),
    Predicate(PredicateSymbol, bool),
}

impl Symbol {
    /// Head symbol of a term, `None` for variables
    pub fn of_term(term: &Term) -> Option<Symbol> {
        match term {
            Term::Variable(_) => None,
            Term::Constant(c) => Some(Symbol::Constant(c.id)),
            Term::Function(f, _) => Some(Symbol::Function(*f)),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Constant(c) => write!(f, "{}", c),
            Symbol::Function(func) => write!(f, "{}/{}", func.id, func.arity),
            Symbol::Predicate(p, true) => write!(f, "{}/{}", p.id, p.arity),
            Symbol::Predicate(p, false) => write!(f, "~{}/{}", p.id, p.arity),
        }
    }
}
