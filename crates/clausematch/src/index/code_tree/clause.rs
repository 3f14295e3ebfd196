//! Clause code trees: retrieval of stored clauses that match into a query
//! clause literal by literal.

use super::{compile_clause, Bindings, CodeTree, InstrId, Op};
use crate::index::flat_term::FlatTerm;
use crate::logic::{Clause, Deadline, PredicateId, Term, TimeLimit};
use tracing::debug;

/// Code tree over clauses.
///
/// `subsumers(d)` yields every stored clause `C` whose literals each match
/// some literal of `d` under one common substitution. Several literals of
/// `C` may land on the same literal of `d`, so multiset subsumption still
/// has to be confirmed by the literal matcher. A stored clause is yielded
/// at least once. Once an entry has been yielded, retries of literal
/// placements that could only reach that same entry again are dropped.
#[derive(Debug, Clone)]
pub struct ClauseCodeTree<T> {
    tree: CodeTree<T>,
    equality: Option<PredicateId>,
}

impl<T> Default for ClauseCodeTree<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> ClauseCodeTree<T> {
    /// `equality` is the interned `=` predicate; equality literals of a
    /// query are then also tried with their arguments swapped.
    pub fn new(equality: Option<PredicateId>) -> Self {
        ClauseCodeTree {
            tree: CodeTree::new(),
            equality,
        }
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

    pub fn subsumers<'t, 'q>(&'t self, query: &'q Clause) -> ClauseMatches<'t, 'q, T> {
        let mut literals = Vec::with_capacity(query.len());
        for literal in &query.literals {
            literals.push(FlatTerm::of_literal(literal));
            if literal.is_equality(self.equality) {
                literals.push(FlatTerm::of_literal_reversed(literal));
            }
        }
        ClauseMatches {
            tree: &self.tree,
            literals,
            bindings: Bindings::new(self.tree.max_var_count()),
            stack: Vec::new(),
            started: false,
            deadline: None,
            check_interval: 1,
            steps: 0,
            expired: false,
        }
    }
}

impl<T: PartialEq> ClauseCodeTree<T> {
    pub fn insert(&mut self, clause: &Clause, payload: T) {
        self.tree.incorporate(compile_clause(clause, payload));
    }

    /// Remove one stored copy of `clause` carrying `payload`
    pub fn remove(&mut self, clause: &Clause, payload: T) -> bool {
        self.tree.remove(&compile_clause(clause, payload))
    }
}

#[derive(Debug, Clone, Copy)]
enum ClauseChoice {
    /// Resume at `op`, inside query literal `lit` at position `tp`
    Alternative { op: InstrId, lit: usize, tp: usize },
    /// Retry the literal starting at the `NextLit` at `op` on query literal `next`
    Literal { op: InstrId, next: usize },
}

/// Lazy stream of stored clauses matching into one query clause.
pub struct ClauseMatches<'t, 'q, T> {
    tree: &'t CodeTree<T>,
    /// Query literals, equalities followed by their swapped copy
    literals: Vec<FlatTerm<'q>>,
    bindings: Bindings<'q>,
    stack: Vec<ClauseChoice>,
    started: bool,
    deadline: Option<Deadline>,
    check_interval: u64,
    /// Instructions executed so far
    steps: u64,
    expired: bool,
}

impl<'t, 'q, T> ClauseMatches<'t, 'q, T> {
    /// Variable slots after the last yielded match, numbered by first
    /// occurrence across the stored clause's literals.
    pub fn bindings(&self) -> &[Option<&'q Term>] {
        self.bindings.as_slice()
    }

    /// Stop the stream once `deadline` has passed, consulting it every
    /// `check_interval` executed instructions. Check [`Self::expired`]
    /// after the stream ends.
    pub fn within(mut self, deadline: Deadline, check_interval: u32) -> Self {
        self.deadline = Some(deadline);
        self.check_interval = u64::from(check_interval.max(1));
        self
    }

    /// Whether the stream ended because its deadline passed
    pub fn expired(&self) -> bool {
        self.expired
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn out_of_time(&self) -> bool {
        match &self.deadline {
            Some(deadline) => self.steps % self.check_interval == 0 && deadline.exceeded(),
            None => false,
        }
    }

    /// Drop literal retries whose remaining code is a single branch-free
    /// path. It ends at the entry just reached, so retrying can only yield
    /// that entry again.
    fn cut_linear_retries(&mut self) {
        while let Some(&ClauseChoice::Literal { op, .. }) = self.stack.last() {
            if !self.tree.is_linear_after(op) {
                break;
            }
            self.stack.pop();
        }
    }

    /// Enter the literal code following the `NextLit` at `op` on query
    /// literal `lit`, leaving a choice point for the literals after it.
    fn enter_literal(&mut self, op: InstrId, lit: usize) -> InstrId {
        if lit + 1 < self.literals.len() {
            self.stack.push(ClauseChoice::Literal { op, next: lit + 1 });
        }
        op.next()
    }
}

impl<'t, 'q, T> Iterator for ClauseMatches<'t, 'q, T> {
    type Item = &'t T;

    fn next(&mut self) -> Option<&'t T> {
        let tree = self.tree;
        let mut cur = if self.started {
            None
        } else {
            self.started = true;
            tree.root()
        };
        let mut lit = 0;
        let mut tp = 0;

        loop {
            let id = match cur {
                Some(id) => id,
                None => match self.stack.pop()? {
                    ClauseChoice::Alternative { op, lit: l, tp: t } => {
                        lit = l;
                        tp = t;
                        op
                    }
                    ClauseChoice::Literal { op, next } => {
                        lit = next;
                        tp = 0;
                        cur = Some(self.enter_literal(op, next));
                        continue;
                    }
                },
            };
            self.steps += 1;
            if self.out_of_time() {
                debug!(steps = self.steps, "clause retrieval out of time");
                self.expired = true;
                self.stack.clear();
                return None;
            }
            let instr = tree.instruction(id);
            if let Some(alt) = instr.alternative {
                self.stack.push(ClauseChoice::Alternative { op: alt, lit, tp });
            }
            cur = match &instr.op {
                Op::Success(payload) => {
                    self.cut_linear_retries();
                    return Some(payload);
                }
                Op::Fail => None,
                Op::NextLit if self.literals.is_empty() => None,
                Op::NextLit => {
                    lit = 0;
                    tp = 0;
                    Some(self.enter_literal(id, 0))
                }
                op => {
                    let query = &self.literals[lit];
                    if self.bindings.step(op, query, &mut tp) {
                        Some(id.next())
                    } else {
                        None
                    }
                }
            };
        }
    }
}
