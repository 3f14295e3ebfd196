//! Literals in first-order logic

use super::symbol::Symbol;
use super::term::Term;
use crate::logic::interner::{Interner, PredicateId, VariableId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A predicate symbol with arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredicateSymbol {
    pub id: PredicateId,
    pub arity: u8,
}

impl PredicateSymbol {
    pub fn new(id: PredicateId, arity: u8) -> Self {
        PredicateSymbol { id, arity }
    }
}

/// A literal (positive or negative atomic formula)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub predicate: PredicateSymbol,
    pub args: Vec<Term>,
    pub polarity: bool, // true = positive, false = negative
}

impl Literal {
    pub fn positive(predicate: PredicateSymbol, args: Vec<Term>) -> Self {
        Literal {
            predicate,
            args,
            polarity: true,
        }
    }

    pub fn negative(predicate: PredicateSymbol, args: Vec<Term>) -> Self {
        Literal {
            predicate,
            args,
            polarity: false,
        }
    }

    /// Predicate and polarity as a single symbol
    pub fn header(&self) -> Symbol {
        Symbol::Predicate(self.predicate, self.polarity)
    }

    /// Header of the complement of this literal
    pub fn complementary_header(&self) -> Symbol {
        Symbol::Predicate(self.predicate, !self.polarity)
    }

    /// Check if this is an equality literal.
    ///
    /// `eq` is the interned id of `=`, looked up once by the caller.
    pub fn is_equality(&self, eq: Option<PredicateId>) -> bool {
        eq == Some(self.predicate.id) && self.predicate.arity == 2
    }

    pub fn complement(&self) -> Literal {
        Literal {
            predicate: self.predicate,
            args: self.args.clone(),
            polarity: !self.polarity,
        }
    }

    /// Distinct variables in order of first occurrence
    pub fn distinct_variables(&self) -> Vec<VariableId> {
        let mut vars = Vec::new();
        for arg in &self.args {
            arg.for_each_variable(&mut |v| {
                if !vars.contains(&v) {
                    vars.push(v);
                }
            });
        }
        vars
    }

    /// Format this literal with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> LiteralDisplay<'a> {
        LiteralDisplay {
            literal: self,
            interner,
        }
    }
}

/// Display wrapper for Literal that includes an interner for name resolution
pub struct LiteralDisplay<'a> {
    literal: &'a Literal,
    interner: &'a Interner,
}

impl<'a> fmt::Display for LiteralDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.literal.polarity {
            write!(f, "~")?;
        }
        let pred_name = self.interner.resolve_predicate(self.literal.predicate.id);
        if pred_name == "=" && self.literal.args.len() == 2 {
            write!(
                f,
                "{} = {}",
                self.literal.args[0].display(self.interner),
                self.literal.args[1].display(self.interner)
            )
        } else {
            write!(f, "{}(", pred_name)?;
            for (i, arg) in self.literal.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", arg.display(self.interner))?;
            }
            write!(f, ")")
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.polarity {
            write!(f, "~")?;
        }
        write!(f, "{}(", self.predicate.id)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}
