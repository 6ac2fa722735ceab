//! Support sets and smallest containing cubes.
//!
//! The *support* of a set of functions is the set of variables any of them
//! depends on. In a reduced BDD this is exactly the set of levels that occur
//! on some node reachable from the roots, so computing it is a plain graph
//! walk. Because nodes are shared, the walk paints every node it enters with
//! the manager's scratch mark and skips painted nodes, which makes it linear
//! in the number of distinct nodes. A second walk over the same roots removes
//! the paint again, so no state leaks into later operations.
//!
//! The *smallest cube containing* `f` (SCC) is the conjunction of every literal
//! implied by `f`. It is found by classifying each support level by the branches
//! through which the constant true can still be reached:
//!
//! ```text
//! Else   only through the negative cofactor   =>  literal ¬x
//! Then   only through the positive cofactor   =>  literal  x
//! Both   through both, or skipped on a path   =>  no literal
//! ```
//!
//! # Example
//!
//! ```
//! use bdd_support::bdd::Bdd;
//! use bdd_support::support::SupportOp;
//! use bdd_support::types::Var;
//!
//! let bdd = Bdd::default();
//! let x1 = bdd.mk_var(Var::new(1));
//! let x2 = bdd.mk_var(Var::new(2));
//! let x3 = bdd.mk_var(Var::new(3));
//!
//! // f = x1 ∧ (x2 ∨ x3)
//! let f = bdd.apply_and(x1, bdd.apply_or(x2, x3));
//!
//! let mut op = SupportOp::new(&bdd);
//! assert_eq!(op.compute_support(&[f]), 3);
//! assert_eq!(op.vars(), vec![Var::new(1), Var::new(2), Var::new(3)]);
//!
//! // Every model of f sets x1, nothing else is forced.
//! assert_eq!(op.compute_scc(f), x1);
//! ```

use std::collections::{HashSet, LinkedList};
use std::fmt::{Display, Formatter};
use std::ops::{BitOr, BitOrAssign};

use log::debug;

use crate::bdd::Bdd;
use crate::manager::BddManager;
use crate::reference::Ref;
use crate::types::{Level, Var};

/// The cofactors of a support variable through which the constant true is reachable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[repr(u8)]
pub enum Branch {
    /// Not classified yet.
    #[default]
    Unset = 0,
    Else = 1,
    Then = 2,
    Both = 3,
}

impl Branch {
    fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Branch::Unset,
            1 => Branch::Else,
            2 => Branch::Then,
            _ => Branch::Both,
        }
    }
}

impl BitOr for Branch {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Branch::from_bits(self as u8 | rhs as u8)
    }
}

impl BitOrAssign for Branch {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl Display for Branch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Branch::Unset => "-",
            Branch::Else => "0",
            Branch::Then => "1",
            Branch::Both => "*",
        };
        write!(f, "{}", s)
    }
}

/// Support and SCC operator bound to one manager.
///
/// The level tables and the support list are reused between calls; every
/// top-level call rebuilds them from scratch.
pub struct SupportOp<'a, M>
where
    M: BddManager + ?Sized,
{
    mgr: &'a M,
    /// Per level: the level is already in `support`.
    seen: Vec<bool>,
    /// Per level: classification from the last SCC pass.
    branch: Vec<Branch>,
    /// Support levels in ascending order.
    support: Vec<Level>,
}

impl<'a, M> SupportOp<'a, M>
where
    M: BddManager + ?Sized,
{
    pub fn new(mgr: &'a M) -> Self {
        Self {
            mgr,
            seen: Vec::new(),
            branch: Vec::new(),
            support: Vec::new(),
        }
    }

    /// Levels found by the last [`compute_support`][Self::compute_support], ascending.
    pub fn support(&self) -> &[Level] {
        &self.support
    }

    pub fn len(&self) -> usize {
        self.support.len()
    }

    pub fn is_empty(&self) -> bool {
        self.support.is_empty()
    }

    /// Classification of `level` by the last [`compute_scc`][Self::compute_scc].
    pub fn branch(&self, level: Level) -> Branch {
        self.branch.get(level.index()).copied().unwrap_or_default()
    }

    /// Compute the union of the supports of `roots`. Returns the number of support variables.
    ///
    /// All roots must belong to the manager this operator was created with.
    pub fn compute_support(&mut self, roots: &[Ref]) -> usize {
        let max_level = self.mgr.max_level();
        self.seen.clear();
        self.seen.resize(max_level, false);
        self.branch.clear();
        self.branch.resize(max_level, Branch::Unset);
        self.support.clear();

        for &root in roots {
            self.mark_step(root);
        }
        for &root in roots {
            self.unmark_step(root);
        }

        self.support.sort_unstable();
        debug!(
            "compute_support({} roots) -> {} levels: {:?}",
            roots.len(),
            self.support.len(),
            self.support
        );
        self.support.len()
    }

    fn mark_step(&mut self, root: Ref) {
        let mut stack = vec![root];
        while let Some(e) = stack.pop() {
            if self.mgr.is_const(e) || self.mgr.is_marked(e) {
                continue;
            }
            self.mgr.set_marked(e, true);

            let level = self.mgr.level(e);
            assert!(
                level.index() < self.seen.len(),
                "{} of {} exceeds the manager's level bound {}",
                level,
                e,
                self.seen.len()
            );
            if !self.seen[level.index()] {
                self.seen[level.index()] = true;
                self.support.push(level);
            }

            // Low child is visited first.
            stack.push(self.mgr.edge1(e));
            stack.push(self.mgr.edge0(e));
        }
    }

    /// Clear the scratch marks painted by `mark_step(root)`.
    fn unmark_step(&self, root: Ref) {
        let mut stack = vec![root];
        while let Some(e) = stack.pop() {
            if self.mgr.is_const(e) || !self.mgr.is_marked(e) {
                continue;
            }
            self.mgr.set_marked(e, false);
            stack.push(self.mgr.edge1(e));
            stack.push(self.mgr.edge0(e));
        }
    }

    /// Write the support variables into `out` in level order. Returns their number.
    pub fn to_var_vec(&self, out: &mut Vec<Var>) -> usize {
        out.clear();
        out.extend(self.support.iter().map(|&level| self.mgr.var_at(level)));
        out.len()
    }

    /// Like [`to_var_vec`][Self::to_var_vec], for a linked list.
    pub fn to_var_list(&self, out: &mut LinkedList<Var>) -> usize {
        out.clear();
        out.extend(self.support.iter().map(|&level| self.mgr.var_at(level)));
        out.len()
    }

    /// The support variables in level order.
    pub fn vars(&self) -> Vec<Var> {
        let mut vars = Vec::with_capacity(self.support.len());
        self.to_var_vec(&mut vars);
        vars
    }

    /// The positive cube over the support variables.
    pub fn to_bdd(&self) -> Ref {
        let zero = self.mgr.zero();
        // Nodes are built bottom-up, so the deepest level comes first.
        self.support
            .iter()
            .rev()
            .fold(self.mgr.one(), |acc, &level| {
                self.mgr.new_node(level, zero, acc)
            })
    }

    /// The smallest cube containing the function `root`.
    ///
    /// Afterwards [`support`][Self::support] holds the support of `root` and
    /// [`branch`][Self::branch] its classification.
    ///
    /// # Panics
    ///
    /// Panics if `root` is the constant false, which no cube contains.
    pub fn compute_scc(&mut self, root: Ref) -> Ref {
        assert!(
            !self.mgr.is_zero(root),
            "The constant false is not contained in any cube"
        );

        self.compute_support(&[root]);
        for i in 0..self.support.len() {
            let level = self.support[i];
            self.branch[level.index()] = Branch::Unset;
        }

        let mut visited = HashSet::new();
        self.scc_step(root, 0, &mut visited);

        let zero = self.mgr.zero();
        let mut cube = self.mgr.one();
        for &level in self.support.iter().rev() {
            cube = match self.branch[level.index()] {
                Branch::Else => self.mgr.new_node(level, cube, zero),
                Branch::Then => self.mgr.new_node(level, zero, cube),
                Branch::Both => cube,
                Branch::Unset => panic!("{} was not classified", level),
            };
        }
        debug!(
            "compute_scc({}) -> {} over {} support levels",
            root,
            cube,
            self.support.len()
        );
        cube
    }

    /// Classify the support levels from `spos` on that are reachable through `e`.
    fn scc_step(&mut self, e: Ref, spos: usize, visited: &mut HashSet<Ref>) {
        if self.mgr.is_one(e) {
            for &level in &self.support[spos..] {
                self.branch[level.index()] = Branch::Both;
            }
            return;
        }
        assert!(
            !self.mgr.is_zero(e),
            "Reached the constant false edge while classifying support"
        );

        // Levels skipped on the way to `e` are free on this path. This has to
        // happen on every arrival, since each path may skip different levels.
        let level = self.mgr.level(e);
        let mut spos = spos;
        while self.support[spos] < level {
            let skipped = self.support[spos];
            self.branch[skipped.index()] = Branch::Both;
            spos += 1;
        }

        if !visited.insert(e) {
            return;
        }
        debug_assert_eq!(self.support[spos], level);

        let e0 = self.mgr.edge0(e);
        if !self.mgr.is_zero(e0) {
            self.branch[level.index()] |= Branch::Else;
            self.scc_step(e0, spos + 1, visited);
        }
        let e1 = self.mgr.edge1(e);
        if !self.mgr.is_zero(e1) {
            self.branch[level.index()] |= Branch::Then;
            self.scc_step(e1, spos + 1, visited);
        }
    }

    /// Hook for the manager before it reclaims nodes.
    ///
    /// The operator keeps no node references between calls, so there is nothing to drop.
    pub fn sweep(&mut self) {
        debug!("sweep: no cached nodes");
    }
}

impl Bdd {
    /// Support variables of `f`, in level order.
    pub fn support(&self, f: Ref) -> Vec<Var> {
        self.support_many(&[f])
    }

    /// Support variables of the union of `roots`, in level order.
    pub fn support_many(&self, roots: &[Ref]) -> Vec<Var> {
        let mut op = SupportOp::new(self);
        op.compute_support(roots);
        op.vars()
    }

    pub fn support_size(&self, f: Ref) -> usize {
        SupportOp::new(self).compute_support(&[f])
    }

    /// The positive cube over the union of the supports of `roots`.
    pub fn support_cube(&self, roots: &[Ref]) -> Ref {
        let mut op = SupportOp::new(self);
        op.compute_support(roots);
        op.to_bdd()
    }

    /// The smallest cube containing `f`.
    pub fn scc(&self, f: Ref) -> Ref {
        SupportOp::new(self).compute_scc(f)
    }
}
