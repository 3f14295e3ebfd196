//! Compilation of terms and clauses into linear instruction blocks

use super::Op;
use crate::logic::{Clause, Literal, Symbol, Term, VariableId};

/// A compiled pattern ready to be merged into a [`CodeTree`](super::CodeTree)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCode<T> {
    /// Instructions in execution order; the last one is `Success`
    pub ops: Vec<Op<T>>,
    /// Number of variable slots the block uses
    pub var_count: u32,
}

/// Emits instructions while numbering variables by first occurrence.
struct Compiler<T> {
    ops: Vec<Op<T>>,
    slots: Vec<VariableId>,
}

impl<T> Compiler<T> {
    fn new(capacity: usize) -> Self {
        Compiler {
            ops: Vec::with_capacity(capacity + 1),
            slots: Vec::new(),
        }
    }

    fn variable(&mut self, var: VariableId) -> Op<T> {
        match self.slots.iter().position(|v| *v == var) {
            Some(slot) => Op::CheckVar(slot as u32),
            None => {
                self.slots.push(var);
                Op::AssignVar(self.slots.len() as u32 - 1)
            }
        }
    }

    fn term(&mut self, term: &Term) {
        match term {
            Term::Variable(v) => {
                let op = self.variable(v.id);
                self.ops.push(op);
            }
            Term::Constant(c) => self.ops.push(Op::CheckFun(Symbol::Constant(c.id))),
            Term::Function(f, args) => {
                self.ops.push(Op::CheckFun(Symbol::Function(*f)));
                for arg in args {
                    self.term(arg);
                }
            }
        }
    }

    fn literal(&mut self, literal: &Literal) {
        self.ops.push(Op::NextLit);
        self.ops.push(Op::CheckFun(literal.header()));
        for arg in &literal.args {
            self.term(arg);
        }
    }

    fn finish(mut self, payload: T) -> CompiledCode<T> {
        self.ops.push(Op::Success(payload));
        CompiledCode {
            ops: self.ops,
            var_count: self.slots.len() as u32,
        }
    }
}

/// Compile a term in preorder.
///
/// Slot `i` is bound to the `i`-th distinct variable of `term`.
pub fn compile_term<T>(term: &Term, payload: T) -> CompiledCode<T> {
    let mut compiler = Compiler::new(term.weight());
    compiler.term(term);
    compiler.finish(payload)
}

/// Compile a clause, literals in the given order, each prefixed by
/// `NextLit`. Variable slots are shared across literals.
pub fn compile_clause<T>(clause: &Clause, payload: T) -> CompiledCode<T> {
    let size = clause
        .literals
        .iter()
        .map(|l| 2 + l.args.iter().map(Term::weight).sum::<usize>())
        .sum();
    let mut compiler = Compiler::new(size);
    for literal in &clause.literals {
        compiler.literal(literal);
    }
    compiler.finish(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Constant, FunctionSymbol, Interner, PredicateSymbol, Variable};

    #[test]
    fn test_repeated_variable_becomes_check() {
        let mut interner = Interner::new();
        let x = Term::Variable(Variable::new(interner.intern_variable("X")));
        let y = Term::Variable(Variable::new(interner.intern_variable("Y")));
        let g = FunctionSymbol::new(interner.intern_function("g"), 3);
        let t = Term::Function(g, vec![y, x.clone(), x]);

        let code = compile_term(&t, ());
        assert_eq!(
            code.ops,
            vec![
                Op::CheckFun(Symbol::Function(g)),
                Op::AssignVar(0),
                Op::AssignVar(1),
                Op::CheckVar(1),
                Op::Success(()),
            ]
        );
        assert_eq!(code.var_count, 2);
    }

    #[test]
    fn test_clause_shares_slots_between_literals() {
        let mut interner = Interner::new();
        let x = Term::Variable(Variable::new(interner.intern_variable("X")));
        let a_id = interner.intern_constant("a");
        let a = Term::Constant(Constant::new(a_id));
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 2);
        let clause = Clause::new(vec![
            Literal::positive(p, vec![x.clone()]),
            Literal::negative(q, vec![a, x]),
        ]);

        let code = compile_clause(&clause, 3usize);
        assert_eq!(
            code.ops,
            vec![
                Op::NextLit,
                Op::CheckFun(Symbol::Predicate(p, true)),
                Op::AssignVar(0),
                Op::NextLit,
                Op::CheckFun(Symbol::Predicate(q, false)),
                Op::CheckFun(Symbol::Constant(a_id)),
                Op::CheckVar(0),
                Op::Success(3),
            ]
        );
        assert_eq!(code.var_count, 1);
    }

    #[test]
    fn test_empty_clause_compiles_to_bare_success() {
        let code = compile_clause(&Clause::new(vec![]), 0u8);
        assert_eq!(code.ops, vec![Op::Success(0)]);
        assert_eq!(code.var_count, 0);
    }
}
