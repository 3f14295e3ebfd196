//! Multi-literal matching.
//!
//! Decides whether every literal of a base clause can be placed on a literal
//! of an instance clause under one substitution. Each base literal arrives
//! with its candidate instance literals, found beforehand by single-literal
//! matching; the search here only has to make the per-literal bindings
//! agree, and in multiset mode keep the placement injective.
//!
//! The search is an iterative depth-first walk over base literal slots with
//! chronological backtracking. Bindings of a slot's alternatives are built
//! lazily when the walk first reaches it (`ensure_init`), and every
//! tentative choice prunes the alternatives of the later slots that were
//! already built (`bind_alt`). Pruned alternatives are swapped behind the
//! live range of their slot, and `remaining(i, j)` remembers how long that
//! range is for each depth `j`, so undoing a choice costs nothing.

use super::workspace::{AltBinding, AltTarget, MatchWorkspace, RecordEntry};
use crate::config::MatcherConfig;
use crate::error::{MatchError, Result};
use crate::logic::{
    match_args, match_reversed_args, Binder, Clause, ListBinder, Literal, PredicateId, Term,
    TimeLimit, VariableId,
};
use tracing::{debug, trace};

/// Input of one multi-literal matching problem.
#[derive(Debug, Clone, Copy)]
pub struct MatchProblem<'a> {
    pub base: &'a [&'a Literal],
    pub instance: &'a Clause,
    /// Per base literal, positions of the instance literals it matches
    pub alternatives: &'a [Vec<usize>],
    /// Position in `instance` of the literal being resolved away.
    ///
    /// That literal is never an ordinary target; instead base literals may
    /// map onto its complement, and at least one of them has to.
    pub resolved: Option<usize>,
    /// The interned `=` predicate, if equality occurs
    pub equality: Option<PredicateId>,
}

impl<'a> MatchProblem<'a> {
    fn resolved_literal(&self) -> Option<&'a Literal> {
        self.resolved.map(|i| &self.instance.literals[i])
    }
}

enum InitResult {
    Ok,
    MustBacktrack,
    NoAlternative,
}

/// Decide whether `problem.base` can be matched onto `problem.instance`.
///
/// Returns `Err(MatchError::TimeLimitExceeded)` when `limit` reports
/// expiry at one of the periodic checks.
pub fn can_be_matched<L: TimeLimit>(
    ws: &mut MatchWorkspace,
    problem: &MatchProblem<'_>,
    config: &MatcherConfig,
    limit: &L,
) -> Result<bool> {
    let len = problem.base.len();
    debug_assert_eq!(problem.alternatives.len(), len);
    debug_assert!(
        !(config.multiset && problem.resolved.is_some()),
        "multiset matching does not support a resolved literal"
    );
    let multiset = config.multiset && problem.resolved.is_none();

    if len == 0 {
        return Ok(problem.resolved.is_none());
    }

    // One cell per instance literal plus one for the resolved complement
    ws.reset(len, problem.instance.len() + 1);
    order_slots(ws, problem);

    let terms = recycle(std::mem::take(&mut ws.term_store));
    let mut search = Search {
        ws: &mut *ws,
        problem,
        terms,
    };
    let result = search.run(multiset, config.check_interval.max(1), limit);
    let terms = search.terms;
    ws.term_store = recycle(terms);
    trace!(slots = len, multiset, ?result, "multi-literal match");
    result
}

/// Empty `buffer` and hand its allocation on to references of another
/// lifetime. Collecting an emptied vector into one of the same layout
/// reuses the allocation in place.
fn recycle<'b>(mut buffer: Vec<Option<&Term>>) -> Vec<Option<&'b Term>> {
    buffer.clear();
    buffer.into_iter().map(|_| None).collect()
}

/// Number of placements a base literal has, counting both orientations of
/// equality targets.
fn alternative_count(problem: &MatchProblem<'_>, base_index: usize) -> usize {
    problem.alternatives[base_index]
        .iter()
        .map(|&i| 1 + problem.instance.literals[i].is_equality(problem.equality) as usize)
        .sum()
}

fn distinct_variable_count(literal: &Literal) -> usize {
    literal.distinct_variables().len()
}

/// Whether `base` could be placed on the complement of `resolved`
pub(crate) fn matches_complement(base: &Literal, resolved: &Literal, eq: Option<PredicateId>) -> bool {
    base.header() == resolved.complementary_header()
        && (match_args(base, resolved, &mut ListBinder::new())
            || (base.is_equality(eq) && match_reversed_args(base, resolved, &mut ListBinder::new())))
}

/// Reorder base literals to cut down backtracking: literals without
/// alternatives first, then literals with exactly one, then the literal
/// with the most distinct variables, then the rest in input order.
///
/// A single-alternative literal that could also land on the complement of
/// the resolved literal is not forced, so it does not join the second
/// group.
fn order_slots(ws: &mut MatchWorkspace, problem: &MatchProblem<'_>) {
    let len = problem.base.len();
    let order = &mut ws.order;
    order.extend(0..len);
    let resolved = problem.resolved_literal();

    let mut zero_alts = 0;
    let mut single_alts = 0;
    let mut most_vars_pos = 0;
    let mut most_vars = distinct_variable_count(problem.base[0]);

    for i in 0..len {
        // position i is untouched until this iteration
        let base = problem.base[order[i]];
        let vars = distinct_variable_count(base);
        let alt_count = alternative_count(problem, order[i]);

        if alt_count == 0 {
            if zero_alts != i {
                // rotate: i to the zero block, first single to the end of
                // the single block, first of the rest to i
                if single_alts != zero_alts && single_alts != i {
                    order.swap(single_alts, zero_alts);
                }
                order.swap(i, zero_alts);
                if most_vars_pos == single_alts {
                    most_vars_pos = i;
                }
            }
            zero_alts += 1;
            single_alts += 1;
        } else if alt_count == 1
            && !resolved.map_or(false, |r| matches_complement(base, r, problem.equality))
        {
            if single_alts != i {
                order.swap(i, single_alts);
                if most_vars_pos == single_alts {
                    most_vars_pos = i;
                }
            }
            single_alts += 1;
        } else if i > 0 && most_vars < vars {
            most_vars_pos = i;
            most_vars = vars;
        }
    }
    if most_vars_pos > single_alts {
        order.swap(most_vars_pos, single_alts);
    }
}

/// Binder writing into the binding row of one alternative.
struct SlotBinder<'s, 'a> {
    vars: &'s [VariableId],
    row: &'s mut [Option<&'a Term>],
}

impl<'s, 'a> Binder<'a> for SlotBinder<'s, 'a> {
    fn bind(&mut self, var: VariableId, term: &'a Term) -> bool {
        let Some(pos) = self.vars.iter().position(|v| *v == var) else {
            debug_assert!(false, "{var} is not a variable of the base literal");
            return false;
        };
        match self.row[pos] {
            Some(bound) => bound == term,
            None => {
                self.row[pos] = Some(term);
                true
            }
        }
    }
}

/// Drop the alternatives in `alts[..live]` rejected by `keep` by swapping
/// them behind the live range. Returns the new live length.
fn prune(alts: &mut [AltBinding], mut live: usize, mut keep: impl FnMut(&AltBinding) -> bool) -> usize {
    let mut i = 0;
    while i < live {
        if keep(&alts[i]) {
            i += 1;
        } else {
            live -= 1;
            alts.swap(i, live);
        }
    }
    live
}

/// Whether two binding rows agree on every shared variable
fn compatible(
    pairs: &[(usize, usize)],
    terms: &[Option<&Term>],
    first: usize,
    second: usize,
) -> bool {
    pairs
        .iter()
        .all(|&(i, j)| terms[first + i] == terms[second + j])
}

struct Search<'w, 'a> {
    ws: &'w mut MatchWorkspace,
    problem: &'w MatchProblem<'a>,
    /// Binding rows of all built alternatives
    terms: Vec<Option<&'a Term>>,
}

impl<'w, 'a> Search<'w, 'a> {
    fn record_index(&self, target: AltTarget) -> usize {
        match target {
            AltTarget::Literal(i) => i,
            AltTarget::Complementary => self.problem.instance.len(),
        }
    }

    fn run<L: TimeLimit>(&mut self, multiset: bool, check_interval: u32, limit: &L) -> Result<bool> {
        let len = self.ws.order.len();
        let complementary = self.record_index(AltTarget::Complementary);
        let mut cur = 0;
        let mut counter = 0;
        let mut iterations: u64 = 0;

        loop {
            loop {
                match self.ensure_init(cur) {
                    InitResult::Ok => {}
                    InitResult::MustBacktrack => {
                        cur -= 1;
                        continue;
                    }
                    InitResult::NoAlternative => return Ok(false),
                }

                let max_alt = self.ws.remaining.get(cur, cur);
                while self.ws.next_alts[cur] < max_alt
                    && ((multiset && self.consumed_earlier(cur, self.ws.next_alts[cur]))
                        || !self.bind_alt(cur, self.ws.next_alts[cur]))
                {
                    self.ws.next_alts[cur] += 1;
                }

                if self.ws.next_alts[cur] < max_alt {
                    let target = self.ws.alts[cur][self.ws.next_alts[cur]].target;
                    let index = self.record_index(target);
                    self.commit_record(cur, index);
                    self.ws.next_alts[cur] += 1;
                    cur += 1;
                    if cur == len {
                        break;
                    }
                    self.ws.next_alts[cur] = 0;
                } else {
                    if cur == 0 {
                        return Ok(false);
                    }
                    cur -= 1;
                }

                counter += 1;
                iterations += 1;
                if counter >= check_interval {
                    counter = 0;
                    if limit.exceeded() {
                        debug!(iterations, "multi-literal match ran out of time");
                        return Err(MatchError::TimeLimitExceeded { iterations });
                    }
                }
            }

            // Subsumption resolution needs some literal on the complement
            if self.problem.resolved.is_some()
                && self.ws.record[complementary] == RecordEntry::Unconsumed
            {
                cur -= 1;
                continue;
            }
            return Ok(true);
        }
    }

    /// Whether alternative `alt` of slot `slot` targets an instance literal
    /// already claimed by an earlier slot
    fn consumed_earlier(&self, slot: usize, alt: usize) -> bool {
        let index = self.record_index(self.ws.alts[slot][alt].target);
        matches!(self.ws.record[index], RecordEntry::ConsumedBy(s) if s < slot)
    }

    fn commit_record(&mut self, slot: usize, index: usize) {
        for entry in self.ws.record.iter_mut() {
            if *entry == RecordEntry::ConsumedBy(slot) {
                *entry = RecordEntry::Unconsumed;
            }
        }
        // cells of later slots are stale here
        if !matches!(self.ws.record[index], RecordEntry::ConsumedBy(s) if s < slot) {
            self.ws.record[index] = RecordEntry::ConsumedBy(slot);
        }
    }

    /// Shared variable positions of slots `first < second`, computed once
    fn intersection(&mut self, first: usize, second: usize) -> (usize, usize) {
        debug_assert!(first < second);
        let ws = &mut *self.ws;
        if let Some(range) = ws.intersections.get(second, first) {
            return range;
        }
        let start = ws.pairs.len();
        for (i, var) in ws.vars[first].iter().enumerate() {
            if let Some(j) = ws.vars[second].iter().position(|v| v == var) {
                ws.pairs.push((i, j));
            }
        }
        let range = (start, ws.pairs.len());
        ws.intersections.set(second, first, Some(range));
        range
    }

    /// Try `alt` for `slot` and prune every later built slot against it.
    /// Fails if some later slot is left without alternatives.
    fn bind_alt(&mut self, slot: usize, alt: usize) -> bool {
        let chosen = self.ws.alts[slot][alt];
        for later in slot + 1..self.ws.order.len() {
            if !self.ws.initialized[later] {
                break;
            }
            let (start, end) = self.intersection(slot, later);
            let ws = &mut *self.ws;
            let mut live = ws.remaining.get(later, slot);
            if start < end {
                let pairs = &ws.pairs[start..end];
                let terms = &self.terms;
                live = prune(&mut ws.alts[later], live, |a| {
                    compatible(pairs, terms, chosen.start, a.start)
                });
            }
            if live == 0 {
                return false;
            }
            ws.remaining.set(later, slot + 1, live);
        }
        true
    }

    /// Build the alternatives of `slot` on first visit and prune them
    /// against the committed choices of all earlier slots.
    fn ensure_init(&mut self, slot: usize) -> InitResult {
        if self.ws.initialized[slot] {
            return InitResult::Ok;
        }
        self.ws.initialized[slot] = true;
        self.build_alternatives(slot);

        let alt_count = self.ws.alts[slot].len();
        if alt_count == 0 {
            return InitResult::NoAlternative;
        }
        self.ws.remaining.set(slot, 0, alt_count);

        let mut live = alt_count;
        for prev in 0..slot {
            let (start, end) = self.intersection(prev, slot);
            let ws = &mut *self.ws;
            live = ws.remaining.get(slot, prev);
            if start < end {
                let committed = ws.alts[prev][ws.next_alts[prev] - 1];
                let pairs = &ws.pairs[start..end];
                let terms = &self.terms;
                live = prune(&mut ws.alts[slot], live, |a| {
                    compatible(pairs, terms, committed.start, a.start)
                });
            }
            ws.remaining.set(slot, prev + 1, live);
        }

        if slot > 0 && live == 0 {
            InitResult::MustBacktrack
        } else {
            InitResult::Ok
        }
    }

    fn build_alternatives(&mut self, slot: usize) {
        let problem = self.problem;
        let base_index = self.ws.order[slot];
        let base = problem.base[base_index];
        let eq = problem.equality;

        let vars = &mut self.ws.vars[slot];
        for arg in &base.args {
            arg.for_each_variable(&mut |v| {
                if !vars.contains(&v) {
                    vars.push(v);
                }
            });
        }

        for &i in &problem.alternatives[base_index] {
            if problem.resolved == Some(i) {
                continue;
            }
            let target = &problem.instance.literals[i];
            debug_assert_eq!(base.header(), target.header());
            self.push_alternative(slot, base, target, false, AltTarget::Literal(i));
            if target.is_equality(eq) {
                self.push_alternative(slot, base, target, true, AltTarget::Literal(i));
            }
        }

        if let Some(resolved) = problem.resolved_literal() {
            if resolved.complementary_header() == base.header() {
                self.push_alternative(slot, base, resolved, false, AltTarget::Complementary);
                if base.is_equality(eq) {
                    self.push_alternative(slot, base, resolved, true, AltTarget::Complementary);
                }
            }
        }
    }

    /// Match `base` onto `target` and keep the bindings as a new alternative
    fn push_alternative(
        &mut self,
        slot: usize,
        base: &Literal,
        target: &'a Literal,
        reversed: bool,
        alt_target: AltTarget,
    ) {
        let vars = &self.ws.vars[slot];
        let start = self.terms.len();
        self.terms.resize(start + vars.len(), None);
        let mut binder = SlotBinder {
            vars,
            row: &mut self.terms[start..],
        };
        let matched = if reversed {
            match_reversed_args(base, target, &mut binder)
        } else {
            match_args(base, target, &mut binder)
        };
        if matched {
            self.ws.alts[slot].push(AltBinding {
                target: alt_target,
                start,
            });
        } else {
            self.terms.truncate(start);
        }
    }
}
