//! Term code trees: retrieval of stored generalizations of a query term

use super::{compile_term, Bindings, ChoicePoint, CodeTree, Op};
use crate::index::flat_term::FlatTerm;
use crate::logic::Term;

/// Code tree over terms.
///
/// `generalizations(t)` yields the payload of every stored term `s` with
/// `sσ = t` for some substitution σ, once per stored copy.
#[derive(Debug, Clone)]
pub struct TermCodeTree<T> {
    tree: CodeTree<T>,
}

impl<T> Default for TermCodeTree<T> {
    fn default() -> Self {
        TermCodeTree {
            tree: CodeTree::new(),
        }
    }
}

impl<T> TermCodeTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(&self) -> &CodeTree<T> {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn generalizations<'t, 'q>(&'t self, query: &'q Term) -> TermMatches<'t, 'q, T> {
        TermMatches {
            tree: &self.tree,
            query: FlatTerm::of_term(query),
            bindings: Bindings::new(self.tree.max_var_count()),
            stack: Vec::new(),
            started: false,
        }
    }
}

impl<T: PartialEq> TermCodeTree<T> {
    pub fn insert(&mut self, term: &Term, payload: T) {
        self.tree.incorporate(compile_term(term, payload));
    }

    /// Remove one stored copy of `term` carrying `payload`
    pub fn remove(&mut self, term: &Term, payload: T) -> bool {
        self.tree.remove(&compile_term(term, payload))
    }
}

/// Lazy stream of matches for one query against a [`TermCodeTree`].
///
/// Holds a shared borrow of the tree, so the tree cannot change while the
/// stream is alive.
pub struct TermMatches<'t, 'q, T> {
    tree: &'t CodeTree<T>,
    query: FlatTerm<'q>,
    bindings: Bindings<'q>,
    stack: Vec<ChoicePoint>,
    started: bool,
}

impl<'t, 'q, T> TermMatches<'t, 'q, T> {
    /// Variable slots after the last yielded match.
    ///
    /// Slot `i` holds the binding of the `i`-th distinct variable of the
    /// matched stored term; slots past its variable count are stale.
    pub fn bindings(&self) -> &[Option<&'q Term>] {
        self.bindings.as_slice()
    }
}

impl<'t, 'q, T> Iterator for TermMatches<'t, 'q, T> {
    type Item = &'t T;

    fn next(&mut self) -> Option<&'t T> {
        let tree = self.tree;
        let mut cur = if self.started {
            None
        } else {
            self.started = true;
            tree.root()
        };
        let mut tp = 0;

        loop {
            let id = match cur {
                Some(id) => id,
                None => {
                    let choice = self.stack.pop()?;
                    tp = choice.tp;
                    choice.op
                }
            };
            let instr = tree.instruction(id);
            if let Some(alt) = instr.alternative {
                self.stack.push(ChoicePoint { op: alt, tp });
            }
            cur = match &instr.op {
                Op::Success(payload) => return Some(payload),
                Op::Fail => None,
                op => {
                    if self.bindings.step(op, &self.query, &mut tp) {
                        Some(id.next())
                    } else {
                        None
                    }
                }
            };
        }
    }
}
