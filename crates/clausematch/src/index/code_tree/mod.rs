//! Code trees: compiled matching instructions merged into a shared trie.
//!
//! A stored pattern is compiled into a linear block of instructions
//! (`compile`). Blocks are merged into the tree by walking the existing code
//! and sharing every instruction that is equal up to its alternative link;
//! at the first divergence the remaining instructions become a fresh block
//! hung off the end of the alternative chain (`CodeTree::incorporate`).
//!
//! All instructions live in one arena and are addressed by [`InstrId`]. The
//! instructions of a block are contiguous, so the successor of an
//! instruction inside a block is simply the next id. Every block ends in
//! `Success` or `Fail`, which is what makes advancing `id + 1` safe during
//! execution: a non-terminal instruction always has a successor.
//!
//! Retrieval runs the instructions against a [`FlatTerm`] with an explicit
//! backtrack stack (see [`term`] and [`clause`]).

pub mod clause;
pub mod compile;
pub mod term;


pub use clause::{ClauseCodeTree, ClauseMatches};
pub use compile::{compile_clause, compile_term, CompiledCode};
pub use term::{TermCodeTree, TermMatches};

use crate::index::flat_term::FlatTerm;
use crate::logic::{Symbol, Term};
use std::fmt;
use tracing::{debug, trace};

/// Index of an instruction in the code arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrId(u32);

impl InstrId {
    pub const ROOT: InstrId = InstrId(0);

    fn index(self) -> usize {
        self.0 as usize
    }

    /// Next instruction of the same block
    fn next(self) -> InstrId {
        InstrId(self.0 + 1)
    }
}

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A matching operation.
///
/// Structural equality on `Op` is "equality modulo alternative": the link
/// lives in [`Instruction`], and a `Success` compares its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op<T> {
    /// Query entry must have this head symbol; consumes the head only
    CheckFun(Symbol),
    /// Bind the slot to the whole subterm at the query position
    AssignVar(u32),
    /// Subterm at the query position must equal the slot's binding
    CheckVar(u32),
    /// Start matching the next pattern literal (clause trees only)
    NextLit,
    Success(T),
    Fail,
}

impl<T> Op<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Op::Success(_) | Op::Fail)
    }
}

impl<T> fmt::Display for Op<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::CheckFun(s) => write!(f, "chf:{}", s),
            Op::AssignVar(v) => write!(f, "asv:{}", v),
            Op::CheckVar(v) => write!(f, "chv:{}", v),
            Op::NextLit => write!(f, "nlit"),
            Op::Success(_) => write!(f, "suc"),
            Op::Fail => write!(f, "fail"),
        }
    }
}

/// An operation plus the optional branch to try when its path fails
#[derive(Debug, Clone)]
pub struct Instruction<T> {
    pub op: Op<T>,
    pub alternative: Option<InstrId>,
}

/// Shared instruction trie, generic over the payload stored at `Success`.
#[derive(Debug, Clone)]
pub struct CodeTree<T> {
    code: Vec<Instruction<T>>,
    /// Largest number of variable slots used by any compiled pattern
    max_var_count: u32,
    /// Number of `Success` instructions (live entries)
    entries: usize,
}

impl<T> Default for CodeTree<T> {
    fn default() -> Self {
        CodeTree {
            code: Vec::new(),
            max_var_count: 0,
            entries: 0,
        }
    }
}

impl<T> CodeTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Number of live entries (removed entries are not counted)
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn max_var_count(&self) -> usize {
        self.max_var_count as usize
    }

    /// Total number of instructions ever allocated
    pub fn instruction_count(&self) -> usize {
        self.code.len()
    }

    /// Number of branch points, i.e. instructions carrying an alternative
    pub fn branch_count(&self) -> usize {
        self.code.iter().filter(|i| i.alternative.is_some()).count()
    }

    pub fn instruction(&self, id: InstrId) -> &Instruction<T> {
        &self.code[id.index()]
    }

    /// Root instruction, `None` until something has been incorporated
    pub fn root(&self) -> Option<InstrId> {
        if self.code.is_empty() {
            None
        } else {
            Some(InstrId::ROOT)
        }
    }

    /// Append `ops` as one contiguous block and return its first id.
    fn push_block(&mut self, ops: impl IntoIterator<Item = Op<T>>) -> InstrId {
        let start = InstrId(self.code.len() as u32);
        self.code.extend(ops.into_iter().map(|op| Instruction {
            op,
            alternative: None,
        }));
        debug_assert!(
            self.code.last().map_or(false, |i| i.op.is_terminal()),
            "code block must end in Success or Fail"
        );
        start
    }

    /// Last instruction of the alternative chain starting at `id`
    fn chain_end(&self, mut id: InstrId) -> InstrId {
        while let Some(alt) = self.code[id.index()].alternative {
            id = alt;
        }
        id
    }

    /// Whether no instruction after `id` in its block carries an
    /// alternative, i.e. every path entering at `id + 1` ends at the
    /// block's own terminal.
    fn is_linear_after(&self, id: InstrId) -> bool {
        let mut cur = id.next();
        loop {
            let instr = &self.code[cur.index()];
            if instr.alternative.is_some() {
                return false;
            }
            if instr.op.is_terminal() {
                return true;
            }
            cur = cur.next();
        }
    }
}

impl<T: PartialEq> CodeTree<T> {
    /// Scan the alternative chain starting at `id` for an instruction equal
    /// to `op`. Returns the match, or the end of the chain on failure.
    fn find_in_chain(&self, mut id: InstrId, op: &Op<T>) -> Result<InstrId, InstrId> {
        loop {
            let instr = &self.code[id.index()];
            if instr.op == *op {
                return Ok(id);
            }
            match instr.alternative {
                Some(alt) => id = alt,
                None => return Err(id),
            }
        }
    }

    /// Merge a compiled block into the tree.
    ///
    /// Inserting the same code twice is legal and yields a second `Success`
    /// alternative, so that each copy can later be removed on its own.
    pub fn incorporate(&mut self, code: CompiledCode<T>) {
        let CompiledCode { mut ops, var_count } = code;
        debug_assert!(matches!(ops.last(), Some(Op::Success(_))));
        self.max_var_count = self.max_var_count.max(var_count);
        self.entries += 1;

        if self.code.is_empty() {
            self.push_block(ops);
            return;
        }

        let mut cur = InstrId::ROOT;
        let mut i = 0;
        while i < ops.len() {
            match self.find_in_chain(cur, &ops[i]) {
                Ok(found) => {
                    i += 1;
                    // ops[i - 1] was not terminal, so neither is `found`
                    cur = if i < ops.len() { found.next() } else { found };
                }
                Err(last) => {
                    debug_assert!(self.code[last.index()].alternative.is_none());
                    let block_len = ops.len() - i;
                    let start = self.push_block(ops.drain(i..));
                    self.code[last.index()].alternative = Some(start);
                    trace!(at = %last, block = %start, block_len, "incorporated code block");
                    return;
                }
            }
        }

        // Every instruction matched: the same entry is being inserted again.
        debug_assert!(matches!(self.code[cur.index()].op, Op::Success(_)));
        let last = self.chain_end(cur);
        let start = self.push_block(ops.pop());
        self.code[last.index()].alternative = Some(start);
        debug!(at = %last, "incorporated duplicate entry");
    }

    /// Retire one live entry equal to the terminal of `code`.
    ///
    /// Follows exactly the path `incorporate` would have taken and rewrites
    /// the first matching `Success` into `Fail`. Returns false when no such
    /// entry is stored.
    pub fn remove(&mut self, code: &CompiledCode<T>) -> bool {
        if self.code.is_empty() {
            return false;
        }
        let ops = &code.ops;
        let mut cur = InstrId::ROOT;
        for (i, op) in ops.iter().enumerate() {
            let found = match self.find_in_chain(cur, op) {
                Ok(found) => found,
                Err(_) => return false,
            };
            if i + 1 < ops.len() {
                cur = found.next();
            } else {
                debug_assert!(matches!(op, Op::Success(_)));
                self.code[found.index()].op = Op::Fail;
                self.entries -= 1;
                trace!(at = %found, "retired code tree entry");
                return true;
            }
        }
        false
    }
}

/// Choice point of a term query: resume at `op` with query position `tp`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChoicePoint {
    pub op: InstrId,
    pub tp: usize,
}

/// Variable slots of a running query.
///
/// Slots are only written by `AssignVar`; along any instruction path the
/// assignment of a slot precedes its checks, so stale values left behind by
/// an abandoned path are always overwritten before they are read.
#[derive(Debug, Clone)]
pub(crate) struct Bindings<'q> {
    slots: Vec<Option<&'q Term>>,
}

impl<'q> Bindings<'q> {
    pub fn new(slot_count: usize) -> Self {
        Bindings {
            slots: vec![None; slot_count],
        }
    }

    pub fn as_slice(&self) -> &[Option<&'q Term>] {
        &self.slots
    }

    /// Execute one non-control instruction against `query` at `*tp`.
    ///
    /// Returns false on a structural mismatch; the caller backtracks.
    pub fn step<T>(&mut self, op: &Op<T>, query: &FlatTerm<'q>, tp: &mut usize) -> bool {
        let Some(entry) = query.get(*tp) else {
            return false;
        };
        match op {
            Op::CheckFun(symbol) => {
                if entry.symbol() != Some(*symbol) {
                    return false;
                }
                *tp += 1;
                true
            }
            Op::AssignVar(slot) => match entry.subterm() {
                Some((term, span)) => {
                    self.slots[*slot as usize] = Some(term);
                    *tp += span;
                    true
                }
                None => {
                    debug_assert!(false, "variable slot assigned at a literal header");
                    false
                }
            },
            Op::CheckVar(slot) => match entry.subterm() {
                Some((term, span)) if self.slots[*slot as usize] == Some(term) => {
                    *tp += span;
                    true
                }
                _ => false,
            },
            Op::NextLit | Op::Success(_) | Op::Fail => {
                debug_assert!(false, "control instruction {} reached step", op);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Constant, FunctionSymbol, Interner, Variable};

    struct TestCtx {
        interner: Interner,
    }

    impl TestCtx {
        fn new() -> Self {
            TestCtx {
                interner: Interner::new(),
            }
        }

        fn var(&mut self, name: &str) -> Term {
            Term::Variable(Variable::new(self.interner.intern_variable(name)))
        }

        fn const_(&mut self, name: &str) -> Term {
            Term::Constant(Constant::new(self.interner.intern_constant(name)))
        }

        fn func(&mut self, name: &str, args: Vec<Term>) -> Term {
            let id = self.interner.intern_function(name);
            Term::Function(FunctionSymbol::new(id, args.len() as u8), args)
        }
    }

    #[test]
    fn test_first_insert_becomes_root_block() {
        let mut ctx = TestCtx::new();
        let x = ctx.var("X");
        let a = ctx.const_("a");
        let fxa = ctx.func("f", vec![x, a]);

        let mut tree = CodeTree::new();
        assert!(tree.root().is_none());
        tree.incorporate(compile_term(&fxa, 0));

        // chf:f asv:0 chf:a suc
        assert_eq!(tree.root(), Some(InstrId::ROOT));
        assert_eq!(tree.instruction_count(), 4);
        assert_eq!(tree.branch_count(), 0);
        assert_eq!(tree.max_var_count(), 1);
        assert!(matches!(tree.instruction(InstrId(3)).op, Op::Success(0)));
    }

    #[test]
    fn test_common_prefix_is_shared() {
        let mut ctx = TestCtx::new();
        let x = ctx.var("X");
        let a = ctx.const_("a");
        let b = ctx.const_("b");
        let fxa = ctx.func("f", vec![x.clone(), a]);
        let fxb = ctx.func("f", vec![x, b]);

        let mut tree = CodeTree::new();
        tree.incorporate(compile_term(&fxa, 0));
        tree.incorporate(compile_term(&fxb, 1));

        // Only `chf:b suc` is new; it hangs off `chf:a`.
        assert_eq!(tree.instruction_count(), 6);
        assert_eq!(tree.branch_count(), 1);
        assert_eq!(tree.instruction(InstrId(2)).alternative, Some(InstrId(4)));
        assert_eq!(tree.len(), 2);

        // The branch at `chf:a` lies after the root, not after `chf:a`
        assert!(!tree.is_linear_after(InstrId::ROOT));
        assert!(tree.is_linear_after(InstrId(2)));
        assert!(tree.is_linear_after(InstrId(4)));
    }

    #[test]
    fn test_duplicate_insert_appends_success() {
        let mut ctx = TestCtx::new();
        let a = ctx.const_("a");
        let fa = ctx.func("f", vec![a]);

        let mut tree = CodeTree::new();
        tree.incorporate(compile_term(&fa, 7));
        tree.incorporate(compile_term(&fa, 7));

        assert_eq!(tree.instruction_count(), 4);
        assert_eq!(tree.instruction(InstrId(2)).alternative, Some(InstrId(3)));
        assert!(matches!(tree.instruction(InstrId(3)).op, Op::Success(7)));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_remove_retires_one_copy_at_a_time() {
        let mut ctx = TestCtx::new();
        let a = ctx.const_("a");
        let fa = ctx.func("f", vec![a]);

        let mut tree = CodeTree::new();
        tree.incorporate(compile_term(&fa, 7));
        tree.incorporate(compile_term(&fa, 7));

        let code = compile_term(&fa, 7);
        assert!(tree.remove(&code));
        assert_eq!(tree.len(), 1);
        assert!(matches!(tree.instruction(InstrId(2)).op, Op::Fail));
        assert!(tree.remove(&code));
        assert!(!tree.remove(&code));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_requires_equal_payload() {
        let mut ctx = TestCtx::new();
        let a = ctx.const_("a");

        let mut tree = CodeTree::new();
        tree.incorporate(compile_term(&a, 1));
        assert!(!tree.remove(&compile_term(&a, 2)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_op_display() {
        let op: Op<()> = Op::AssignVar(3);
        assert_eq!(op.to_string(), "asv:3");
        assert_eq!(Op::<()>::NextLit.to_string(), "nlit");
    }
}
