//! One-way matching of single terms and literals
//!
//! Only pattern-side variables are bound; a variable in the matched term is
//! an opaque constant. Bindings are reported to a [`Binder`], which decides
//! where they are stored and rejects inconsistent rebinding.

use super::core::literal::Literal;
use super::core::term::Term;
use super::interner::{PredicateId, VariableId};

/// Receiver of variable bindings produced by matching.
pub trait Binder<'a> {
    /// Bind `var` to `term`. Returns false if `var` is already bound to a
    /// different term.
    fn bind(&mut self, var: VariableId, term: &'a Term) -> bool;
}

/// Binder backed by a small association list.
///
/// Clause-level scratch rarely holds more than a handful of variables, so a
/// linear scan beats hashing here.
#[derive(Debug, Default, Clone)]
pub struct ListBinder<'a> {
    bindings: Vec<(VariableId, &'a Term)>,
}

impl<'a> ListBinder<'a> {
    pub fn new() -> Self {
        ListBinder {
            bindings: Vec::new(),
        }
    }

    pub fn get(&self, var: VariableId) -> Option<&'a Term> {
        self.bindings
            .iter()
            .find(|(v, _)| *v == var)
            .map(|(_, t)| *t)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> Binder<'a> for ListBinder<'a> {
    fn bind(&mut self, var: VariableId, term: &'a Term) -> bool {
        match self.get(var) {
            Some(bound) => bound == term,
            None => {
                self.bindings.push((var, term));
                true
            }
        }
    }
}

/// Match `pattern` onto `term`, reporting bindings to `binder`.
pub fn match_terms<'a, B: Binder<'a>>(pattern: &Term, term: &'a Term, binder: &mut B) -> bool {
    match (pattern, term) {
        (Term::Variable(v), t) => binder.bind(v.id, t),
        (Term::Constant(c1), Term::Constant(c2)) => c1.id == c2.id,
        (Term::Function(f1, args1), Term::Function(f2, args2)) => {
            if f1.id != f2.id || args1.len() != args2.len() {
                return false;
            }
            args1
                .iter()
                .zip(args2.iter())
                .all(|(p, t)| match_terms(p, t, binder))
        }
        _ => false,
    }
}

/// Match the arguments of `base` onto those of `instance`, left to right.
///
/// Headers are not compared; callers check predicate and polarity first.
pub fn match_args<'a, B: Binder<'a>>(base: &Literal, instance: &'a Literal, binder: &mut B) -> bool {
    base.args.len() == instance.args.len()
        && base
            .args
            .iter()
            .zip(instance.args.iter())
            .all(|(p, t)| match_terms(p, t, binder))
}

/// Match the two arguments of a binary `base` onto the swapped arguments of
/// `instance`. Used for the symmetric orientation of equalities.
pub fn match_reversed_args<'a, B: Binder<'a>>(
    base: &Literal,
    instance: &'a Literal,
    binder: &mut B,
) -> bool {
    match (base.args.as_slice(), instance.args.as_slice()) {
        ([l, r], [il, ir]) => match_terms(l, ir, binder) && match_terms(r, il, binder),
        _ => false,
    }
}

/// Check whether `base` can be matched onto `instance` as a whole literal:
/// same predicate and polarity, and arguments match in some orientation
/// (both orientations are tried when `base` is an equality).
pub fn literal_matches(base: &Literal, instance: &Literal, eq: Option<PredicateId>) -> bool {
    if base.header() != instance.header() {
        return false;
    }
    if match_args(base, instance, &mut ListBinder::new()) {
        return true;
    }
    base.is_equality(eq) && match_reversed_args(base, instance, &mut ListBinder::new())
}
