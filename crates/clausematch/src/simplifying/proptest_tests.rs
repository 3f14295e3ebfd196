//! Property-based tests for multi-literal matching using proptest.
//!
//! The matcher is compared against an exhaustive search over all
//! placements of base literals.

use super::{literal_alternatives, Subsumption};
use crate::config::MatcherConfig;
use crate::logic::{
    match_args, match_reversed_args, Clause, Constant, FunctionSymbol, Interner, ListBinder,
    Literal, PredicateId, PredicateSymbol, Term, Variable,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum TermDesc {
    Var(u8),
    Const(u8),
    Func(u8, Vec<TermDesc>),
}

fn arb_leaf(vars: bool) -> BoxedStrategy<TermDesc> {
    if vars {
        prop_oneof![
            3 => (0..3u8).prop_map(TermDesc::Var),
            2 => (0..2u8).prop_map(TermDesc::Const),
        ]
        .boxed()
    } else {
        (0..2u8).prop_map(TermDesc::Const).boxed()
    }
}

fn arb_term_desc(max_depth: u32, vars: bool) -> BoxedStrategy<TermDesc> {
    if max_depth == 0 {
        arb_leaf(vars)
    } else {
        prop_oneof![
            4 => arb_leaf(vars),
            1 => arb_term_desc(max_depth - 1, vars).prop_map(|arg| TermDesc::Func(0, vec![arg])),
        ]
        .boxed()
    }
}

/// (predicate: 0 and 1 are `p`/`q`, 2 is `=`, polarity, two arguments)
type LiteralDesc = (u8, bool, TermDesc, TermDesc);

fn arb_literal_desc(vars: bool) -> impl Strategy<Value = LiteralDesc> {
    (0..3u8, any::<bool>(), arb_term_desc(1, vars), arb_term_desc(1, vars))
}

fn build_term(desc: &TermDesc, interner: &mut Interner) -> Term {
    match desc {
        TermDesc::Var(i) => Term::Variable(Variable::new(interner.intern_variable(&format!("X{}", i)))),
        TermDesc::Const(i) => Term::Constant(Constant::new(interner.intern_constant(&format!("c{}", i)))),
        TermDesc::Func(f, args) => {
            let id = interner.intern_function(&format!("f{}", f));
            let args: Vec<Term> = args.iter().map(|a| build_term(a, interner)).collect();
            Term::Function(FunctionSymbol::new(id, args.len() as u8), args)
        }
    }
}

fn build_clause(descs: &[LiteralDesc], interner: &mut Interner) -> Clause {
    let literals = descs
        .iter()
        .map(|(p, polarity, l, r)| {
            let name = match p {
                0 => "p",
                1 => "q",
                _ => "=",
            };
            let id = interner.intern_predicate(name);
            let args = vec![build_term(l, interner), build_term(r, interner)];
            Literal {
                predicate: PredicateSymbol::new(id, 2),
                args,
                polarity: *polarity,
            }
        })
        .collect();
    Clause::new(literals)
}

/// Placement target in the oracle: instance literal or complement of the
/// resolved literal
#[derive(Clone, Copy, PartialEq)]
enum Target {
    Literal(usize),
    Complement,
}

fn place<'a>(
    base: &Literal,
    target: &'a Literal,
    eq: Option<PredicateId>,
    binder: &ListBinder<'a>,
) -> Vec<ListBinder<'a>> {
    let mut out = Vec::new();
    let mut forward = binder.clone();
    if match_args(base, target, &mut forward) {
        out.push(forward);
    }
    if base.is_equality(eq) || target.is_equality(eq) {
        let mut reversed = binder.clone();
        if match_reversed_args(base, target, &mut reversed) {
            out.push(reversed);
        }
    }
    out
}

/// Exhaustive search for a placement of `base[k..]`
#[allow(clippy::too_many_arguments)]
fn oracle<'a>(
    base: &[Literal],
    k: usize,
    instance: &'a Clause,
    resolved: Option<usize>,
    multiset: bool,
    eq: Option<PredicateId>,
    used: &mut Vec<Target>,
    binder: ListBinder<'a>,
) -> bool {
    if k == base.len() {
        return resolved.is_none() || used.contains(&Target::Complement);
    }
    let b = &base[k];
    for (i, lit) in instance.literals.iter().enumerate() {
        if resolved == Some(i) || b.header() != lit.header() {
            continue;
        }
        if multiset && used.contains(&Target::Literal(i)) {
            continue;
        }
        for extended in place(b, lit, eq, &binder) {
            used.push(Target::Literal(i));
            let found = oracle(base, k + 1, instance, resolved, multiset, eq, used, extended);
            used.pop();
            if found {
                return true;
            }
        }
    }
    if let Some(r) = resolved {
        let lit = &instance.literals[r];
        if b.header() == lit.complementary_header() {
            for extended in place(b, lit, eq, &binder) {
                used.push(Target::Complement);
                let found = oracle(base, k + 1, instance, resolved, multiset, eq, used, extended);
                used.pop();
                if found {
                    return true;
                }
            }
        }
    }
    false
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Subsumption agrees with exhaustive search, multiset or not
    #[test]
    fn subsumption_agrees_with_exhaustive_search(
        base in proptest::collection::vec(arb_literal_desc(true), 1..4),
        instance in proptest::collection::vec(arb_literal_desc(false), 1..5),
        multiset in any::<bool>(),
    ) {
        let mut interner = Interner::new();
        let c = build_clause(&base, &mut interner);
        let d = build_clause(&instance, &mut interner);
        let eq = interner.equality();

        let config = MatcherConfig { multiset, ..MatcherConfig::default() };
        let mut checker = Subsumption::new(config, eq);
        let expected = oracle(&c.literals, 0, &d, None, multiset, eq, &mut Vec::new(), ListBinder::new());
        prop_assert_eq!(checker.subsumes(&c, &d), Ok(expected));
    }

    /// Subsumption resolution agrees with exhaustive search
    #[test]
    fn resolution_agrees_with_exhaustive_search(
        base in proptest::collection::vec(arb_literal_desc(true), 1..4),
        instance in proptest::collection::vec(arb_literal_desc(false), 1..5),
        resolved in any::<proptest::sample::Index>(),
    ) {
        let mut interner = Interner::new();
        let c = build_clause(&base, &mut interner);
        let d = build_clause(&instance, &mut interner);
        let eq = interner.equality();
        let resolved = resolved.index(d.len());

        let mut checker = Subsumption::new(MatcherConfig::default(), eq);
        let expected = oracle(&c.literals, 0, &d, Some(resolved), false, eq, &mut Vec::new(), ListBinder::new());
        prop_assert_eq!(checker.resolves(&c, &d, resolved), Ok(expected));
    }

    /// The candidate lists handed to the matcher are exactly the literals
    /// that match on their own
    #[test]
    fn alternatives_are_single_literal_matches(
        base in proptest::collection::vec(arb_literal_desc(true), 1..4),
        instance in proptest::collection::vec(arb_literal_desc(false), 0..5),
    ) {
        let mut interner = Interner::new();
        let c = build_clause(&base, &mut interner);
        let d = build_clause(&instance, &mut interner);
        let eq = interner.equality();

        let refs: Vec<&Literal> = c.literals.iter().collect();
        let alternatives = literal_alternatives(&refs, &d, eq);
        for (b, alts) in c.literals.iter().zip(&alternatives) {
            for (i, lit) in d.literals.iter().enumerate() {
                let single = b.header() == lit.header()
                    && !place(b, lit, eq, &ListBinder::new()).is_empty();
                prop_assert_eq!(alts.contains(&i), single);
            }
        }
    }
}
