//! Integration tests for multi-literal matching

use clausematch::{
    can_be_matched, literal_alternatives, Clause, Constant, Deadline, Interner, Literal,
    MatchError, MatchProblem, MatchWorkspace, MatcherConfig, PredicateSymbol, Term, TimeLimit,
    Unlimited, Variable,
};
use std::time::Duration;

/// Test context that holds the interner and provides helper methods
struct TestCtx {
    interner: Interner,
}

impl TestCtx {
    fn new() -> Self {
        Self {
            interner: Interner::new(),
        }
    }

    fn var(&mut self, name: &str) -> Term {
        Term::Variable(Variable {
            id: self.interner.intern_variable(name),
        })
    }

    fn const_(&mut self, name: &str) -> Term {
        Term::Constant(Constant {
            id: self.interner.intern_constant(name),
        })
    }

    fn lit(&mut self, name: &str, args: Vec<Term>) -> Literal {
        let predicate = PredicateSymbol {
            id: self.interner.intern_predicate(name),
            arity: args.len() as u8,
        };
        Literal::positive(predicate, args)
    }
}

fn matched<L: TimeLimit>(
    base: &[Literal],
    instance: &Clause,
    config: &MatcherConfig,
    limit: &L,
) -> Result<bool, MatchError> {
    let base: Vec<&Literal> = base.iter().collect();
    let alternatives = literal_alternatives(&base, instance, None);
    let problem = MatchProblem {
        base: &base,
        instance,
        alternatives: &alternatives,
        resolved: None,
        equality: None,
    };
    can_be_matched(&mut MatchWorkspace::new(), &problem, config, limit)
}

#[test]
fn test_single_literal_subsumption() {
    let mut ctx = TestCtx::new();
    let x = ctx.var("X");
    let y = ctx.var("Y");
    let a = ctx.const_("a");
    let b = ctx.const_("b");
    let base = [ctx.lit("P", vec![x, y])];
    let instance = Clause::new(vec![ctx.lit("P", vec![a, b])]);

    assert_eq!(
        matched(&base, &instance, &MatcherConfig::default(), &Unlimited),
        Ok(true)
    );
}

#[test]
fn test_multiset_matching_is_injective() {
    let mut ctx = TestCtx::new();
    let x = ctx.var("X");
    let y = ctx.var("Y");
    let a = ctx.const_("a");
    let base = [ctx.lit("P", vec![x]), ctx.lit("P", vec![y])];
    let instance = Clause::new(vec![ctx.lit("P", vec![a])]);

    assert_eq!(
        matched(&base, &instance, &MatcherConfig::multiset(), &Unlimited),
        Ok(false)
    );
    assert_eq!(
        matched(&base, &instance, &MatcherConfig::default(), &Unlimited),
        Ok(true)
    );
}

#[test]
fn test_shared_variables_must_agree() {
    let mut ctx = TestCtx::new();
    let x = ctx.var("X");
    let a = ctx.const_("a");
    let b = ctx.const_("b");
    let base = [ctx.lit("P", vec![x.clone()]), ctx.lit("Q", vec![x])];

    let conflicting = Clause::new(vec![ctx.lit("P", vec![a.clone()]), ctx.lit("Q", vec![b])]);
    let agreeing = Clause::new(vec![ctx.lit("P", vec![a.clone()]), ctx.lit("Q", vec![a])]);

    let config = MatcherConfig::default();
    assert_eq!(matched(&base, &conflicting, &config, &Unlimited), Ok(false));
    assert_eq!(matched(&base, &agreeing, &config, &Unlimited), Ok(true));
}

#[test]
fn test_workspace_is_reusable() {
    let mut ctx = TestCtx::new();
    let x = ctx.var("X");
    let a = ctx.const_("a");
    let b = ctx.const_("b");
    let base_lits = [ctx.lit("P", vec![x.clone()]), ctx.lit("Q", vec![x])];
    let base: Vec<&Literal> = base_lits.iter().collect();
    let instances = [
        Clause::new(vec![ctx.lit("P", vec![a.clone()]), ctx.lit("Q", vec![b.clone()])]),
        Clause::new(vec![ctx.lit("Q", vec![b.clone()]), ctx.lit("P", vec![b])]),
        Clause::new(vec![ctx.lit("P", vec![a])]),
    ];

    let mut ws = MatchWorkspace::new();
    let config = MatcherConfig::default();
    let results: Vec<bool> = instances
        .iter()
        .map(|instance| {
            let alternatives = literal_alternatives(&base, instance, None);
            let problem = MatchProblem {
                base: &base,
                instance,
                alternatives: &alternatives,
                resolved: None,
                equality: None,
            };
            can_be_matched(&mut ws, &problem, &config, &Unlimited).expect("no time limit")
        })
        .collect();
    assert_eq!(results, vec![false, true, false]);
}

/// Base literals asking for a triangle `X -> Y -> Z -> X` in an instance
/// that is a complete bipartite graph: many partial matches, no solution.
fn triangle_problem(ctx: &mut TestCtx) -> (Vec<Literal>, Clause) {
    let x = ctx.var("X");
    let y = ctx.var("Y");
    let z = ctx.var("Z");
    let base = vec![
        ctx.lit("e", vec![x.clone(), y.clone()]),
        ctx.lit("e", vec![y, z.clone()]),
        ctx.lit("e", vec![z, x]),
    ];

    let left: Vec<Term> = (0..6).map(|i| ctx.const_(&format!("l{}", i))).collect();
    let right: Vec<Term> = (0..6).map(|i| ctx.const_(&format!("r{}", i))).collect();
    let mut edges = Vec::new();
    for l in &left {
        for r in &right {
            edges.push(ctx.lit("e", vec![l.clone(), r.clone()]));
            edges.push(ctx.lit("e", vec![r.clone(), l.clone()]));
        }
    }
    (base, Clause::new(edges))
}

#[test]
fn test_exhausted_search_returns_false() {
    let mut ctx = TestCtx::new();
    let (base, instance) = triangle_problem(&mut ctx);
    let generous = Deadline::new(Duration::from_secs(3600));
    assert_eq!(
        matched(&base, &instance, &MatcherConfig::default(), &generous),
        Ok(false)
    );
}

#[test]
fn test_expired_budget_aborts_search() {
    let mut ctx = TestCtx::new();
    let (base, instance) = triangle_problem(&mut ctx);
    let config = MatcherConfig {
        check_interval: 1,
        ..MatcherConfig::default()
    };

    let result = matched(&base, &instance, &config, &Deadline::new(Duration::ZERO));
    assert!(matches!(
        result,
        Err(MatchError::TimeLimitExceeded { iterations }) if iterations >= 1
    ));
}
