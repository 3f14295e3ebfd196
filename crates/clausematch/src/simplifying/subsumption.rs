//! Subsumption and subsumption resolution on top of the literal matcher.
//!
//! A clause C subsumes D if some instance Cσ is contained in D. With
//! multiset matching every literal of D is used at most once, otherwise
//! several literals of C may collapse onto the same literal of D.
//!
//! C resolves D at literal L if some instance Cσ is contained in
//! (D \ {L}) ∪ {¬L} and uses ¬L. D can then be replaced by D \ {L}.

use super::ml_matcher::{can_be_matched, matches_complement, MatchProblem};
use super::workspace::MatchWorkspace;
use crate::config::MatcherConfig;
use crate::error::{MatchError, Result};
use crate::index::ClauseCodeTree;
use crate::logic::{literal_matches, Clause, Deadline, Literal, PredicateId, Unlimited};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Per base literal, the positions of the instance literals it matches
/// on its own (same header, arguments match in some orientation).
pub fn literal_alternatives(
    base: &[&Literal],
    instance: &Clause,
    eq: Option<PredicateId>,
) -> Vec<Vec<usize>> {
    base.iter()
        .map(|b| {
            instance
                .literals
                .iter()
                .enumerate()
                .filter(|(_, lit)| literal_matches(b, lit, eq))
                .map(|(i, _)| i)
                .collect()
        })
        .collect()
}

/// Pairwise subsumption checks sharing one matcher workspace.
#[derive(Debug, Default)]
pub struct Subsumption {
    config: MatcherConfig,
    equality: Option<PredicateId>,
    workspace: MatchWorkspace,
}

impl Subsumption {
    pub fn new(config: MatcherConfig, equality: Option<PredicateId>) -> Self {
        Subsumption {
            config,
            equality,
            workspace: MatchWorkspace::new(),
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Check whether `c` subsumes `d`
    pub fn subsumes(&mut self, c: &Clause, d: &Clause) -> Result<bool> {
        if self.config.multiset && c.len() > d.len() {
            return Ok(false);
        }
        let base: Vec<&Literal> = c.literals.iter().collect();
        let alternatives = literal_alternatives(&base, d, self.equality);
        if alternatives.iter().any(Vec::is_empty) {
            return Ok(false);
        }
        let problem = MatchProblem {
            base: &base,
            instance: d,
            alternatives: &alternatives,
            resolved: None,
            equality: self.equality,
        };
        self.run(&problem, self.config)
    }

    /// Check whether `c` resolves away literal `resolved` of `d`.
    ///
    /// Always non-multiset, whatever the configuration says.
    pub fn resolves(&mut self, c: &Clause, d: &Clause, resolved: usize) -> Result<bool> {
        let resolved_lit = &d.literals[resolved];
        let base: Vec<&Literal> = c.literals.iter().collect();
        let mut alternatives = literal_alternatives(&base, d, self.equality);
        for alts in &mut alternatives {
            alts.retain(|&i| i != resolved);
        }

        let mut uses_complement = false;
        for (b, alts) in base.iter().zip(&alternatives) {
            let complement = matches_complement(b, resolved_lit, self.equality);
            if alts.is_empty() && !complement {
                return Ok(false);
            }
            uses_complement |= complement;
        }
        if !uses_complement {
            return Ok(false);
        }

        let problem = MatchProblem {
            base: &base,
            instance: d,
            alternatives: &alternatives,
            resolved: Some(resolved),
            equality: self.equality,
        };
        let config = MatcherConfig {
            multiset: false,
            ..self.config
        };
        self.run(&problem, config)
    }

    fn run(&mut self, problem: &MatchProblem<'_>, config: MatcherConfig) -> Result<bool> {
        match config.timeout {
            Some(budget) => {
                can_be_matched(&mut self.workspace, problem, &config, &Deadline::new(budget))
            }
            None => can_be_matched(&mut self.workspace, problem, &config, &Unlimited),
        }
    }
}

/// A stored clause that resolves away one literal of a query clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub clause: usize,
    /// Position of the removable literal in the query clause
    pub literal: usize,
}

/// Clause store answering forward subsumption and subsumption resolution
/// queries.
///
/// Candidates come from a clause code tree, which matches literals
/// independently of each other; the literal matcher then confirms them.
#[derive(Debug)]
pub struct SubsumptionIndex {
    tree: ClauseCodeTree<usize>,
    clauses: IndexMap<usize, Clause>,
    checker: Subsumption,
}

impl SubsumptionIndex {
    pub fn new(config: MatcherConfig, equality: Option<PredicateId>) -> Self {
        SubsumptionIndex {
            tree: ClauseCodeTree::new(equality),
            clauses: IndexMap::new(),
            checker: Subsumption::new(config, equality),
        }
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Clause> {
        self.clauses.get(&id)
    }

    /// Store `clause` under `id`, replacing any clause stored under it
    pub fn insert(&mut self, id: usize, clause: Clause) {
        self.remove(id);
        self.tree.insert(&clause, id);
        self.clauses.insert(id, clause);
        trace!(id, "clause added to subsumption index");
    }

    pub fn remove(&mut self, id: usize) -> Option<Clause> {
        let clause = self.clauses.shift_remove(&id)?;
        let removed = self.tree.remove(&clause, id);
        debug_assert!(removed, "clause {id} missing from code tree");
        Some(clause)
    }

    /// Find a stored clause subsuming `query`
    pub fn find_subsumer(&mut self, query: &Clause) -> Result<Option<usize>> {
        let config = *self.checker.config();
        let checker = &mut self.checker;
        let found = first_confirmed(&self.tree, &self.clauses, query, &config, |clause| {
            checker.subsumes(clause, query)
        })?;
        if let Some(id) = found {
            debug!(id, "forward subsumed");
        }
        Ok(found)
    }

    /// Find a stored clause that resolves away some literal of `query`
    pub fn find_resolution(&mut self, query: &Clause) -> Result<Option<Resolution>> {
        let config = *self.checker.config();
        for literal in 0..query.len() {
            let mut flipped = query.clone();
            flipped.literals[literal] = query.literals[literal].complement();
            let checker = &mut self.checker;
            let found = first_confirmed(&self.tree, &self.clauses, &flipped, &config, |clause| {
                checker.resolves(clause, query, literal)
            })?;
            if let Some(id) = found {
                debug!(id, literal, "subsumption resolution");
                return Ok(Some(Resolution {
                    clause: id,
                    literal,
                }));
            }
        }
        Ok(None)
    }
}

/// Pull code tree candidates for `query` one at a time and return the
/// first stored id that `confirm` accepts. Each id is confirmed at most
/// once. Retrieval shares the configured time budget and reports running
/// out of it as an error.
fn first_confirmed(
    tree: &ClauseCodeTree<usize>,
    clauses: &IndexMap<usize, Clause>,
    query: &Clause,
    config: &MatcherConfig,
    mut confirm: impl FnMut(&Clause) -> Result<bool>,
) -> Result<Option<usize>> {
    let mut matches = tree.subsumers(query);
    if let Some(budget) = config.timeout {
        matches = matches.within(Deadline::new(budget), config.check_interval);
    }
    let mut tried = HashSet::new();
    for &id in matches.by_ref() {
        if !tried.insert(id) {
            continue;
        }
        let Some(clause) = clauses.get(&id) else {
            continue;
        };
        if confirm(clause)? {
            return Ok(Some(id));
        }
    }
    if matches.expired() {
        return Err(MatchError::TimeLimitExceeded {
            iterations: matches.steps(),
        });
    }
    Ok(None)
}
