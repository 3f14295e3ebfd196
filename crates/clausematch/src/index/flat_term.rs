//! Flattened preorder view of a term or literal.
//!
//! Code-tree instructions address the query by position. Each function or
//! constant entry records how many entries its whole subterm spans, so a
//! variable binding can jump over it in one step, and keeps a reference to
//! the subterm itself so the binding does not have to rebuild it.

use crate::logic::{Literal, Symbol, Term};

/// One position of a flattened term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatEntry<'a> {
    /// Literal header (predicate with polarity); never bindable
    Header(Symbol),
    /// Function or constant subterm occupying `span` entries
    Fun {
        symbol: Symbol,
        term: &'a Term,
        span: usize,
    },
    /// Variable of the query
    Var(&'a Term),
}

impl<'a> FlatEntry<'a> {
    /// Head symbol, `None` for variables
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            FlatEntry::Header(symbol) | FlatEntry::Fun { symbol, .. } => Some(*symbol),
            FlatEntry::Var(_) => None,
        }
    }

    /// The whole subterm starting here and the number of entries it spans
    pub fn subterm(&self) -> Option<(&'a Term, usize)> {
        match *self {
            FlatEntry::Header(_) => None,
            FlatEntry::Fun { term, span, .. } => Some((term, span)),
            FlatEntry::Var(term) => Some((term, 1)),
        }
    }
}

/// Preorder array encoding of a term or literal.
#[derive(Debug, Clone, Default)]
pub struct FlatTerm<'a> {
    entries: Vec<FlatEntry<'a>>,
}

impl<'a> FlatTerm<'a> {
    pub fn of_term(term: &'a Term) -> Self {
        let mut flat = FlatTerm {
            entries: Vec::with_capacity(term.weight()),
        };
        flat.push_term(term);
        flat
    }

    pub fn of_literal(literal: &'a Literal) -> Self {
        let mut flat = FlatTerm::with_header(literal);
        for arg in &literal.args {
            flat.push_term(arg);
        }
        flat
    }

    /// Flatten a binary literal with its two arguments swapped
    pub fn of_literal_reversed(literal: &'a Literal) -> Self {
        let mut flat = FlatTerm::with_header(literal);
        for arg in literal.args.iter().rev() {
            flat.push_term(arg);
        }
        flat
    }

    fn with_header(literal: &'a Literal) -> Self {
        let weight: usize = literal.args.iter().map(Term::weight).sum();
        let mut entries = Vec::with_capacity(weight + 1);
        entries.push(FlatEntry::Header(literal.header()));
        FlatTerm { entries }
    }

    fn push_term(&mut self, term: &'a Term) {
        let Some(symbol) = Symbol::of_term(term) else {
            self.entries.push(FlatEntry::Var(term));
            return;
        };
        let start = self.entries.len();
        self.entries.push(FlatEntry::Fun {
            symbol,
            term,
            span: 0,
        });
        for arg in term.args() {
            self.push_term(arg);
        }
        let end = self.entries.len();
        if let FlatEntry::Fun { span, .. } = &mut self.entries[start] {
            *span = end - start;
        }
    }

    pub fn get(&self, pos: usize) -> Option<&FlatEntry<'a>> {
        self.entries.get(pos)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
