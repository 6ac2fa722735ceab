//! The interface graph operators use to talk to a BDD manager.
//!
//! Operators such as [`SupportOp`][crate::support::SupportOp] never reach into
//! the node storage directly. They receive a manager through this trait, which
//! keeps them testable against wrappers that observe or restrict what the
//! operator does.

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::{Level, Var};

pub trait BddManager {
    /// Upper bound (exclusive) on the levels of all nodes.
    fn max_level(&self) -> usize;

    /// The stable variable identifier of a level.
    fn var_at(&self, level: Level) -> Var;

    /// Intern a node at `level` with the given negative (`edge0`) and positive (`edge1`) cofactors.
    fn new_node(&self, level: Level, edge0: Ref, edge1: Ref) -> Ref;

    fn zero(&self) -> Ref;
    fn one(&self) -> Ref;

    fn is_zero(&self, edge: Ref) -> bool {
        edge == self.zero()
    }
    fn is_one(&self, edge: Ref) -> bool {
        edge == self.one()
    }
    fn is_const(&self, edge: Ref) -> bool {
        self.is_zero(edge) || self.is_one(edge)
    }

    /// Level of the node under a non-constant `edge`.
    fn level(&self, edge: Ref) -> Level;

    /// Negative cofactor of a non-constant `edge`, polarity applied.
    fn edge0(&self, edge: Ref) -> Ref;

    /// Positive cofactor of a non-constant `edge`, polarity applied.
    fn edge1(&self, edge: Ref) -> Ref;

    /// The scratch mark of the node under `edge`.
    fn is_marked(&self, edge: Ref) -> bool;

    fn set_marked(&self, edge: Ref, marked: bool);
}

impl BddManager for Bdd {
    fn max_level(&self) -> usize {
        self.num_vars()
    }

    fn var_at(&self, level: Level) -> Var {
        Bdd::var_at(self, level)
    }

    fn new_node(&self, level: Level, edge0: Ref, edge1: Ref) -> Ref {
        self.mk_node(Bdd::var_at(self, level), edge0, edge1)
    }

    fn zero(&self) -> Ref {
        Bdd::zero(self)
    }

    fn one(&self) -> Ref {
        Bdd::one(self)
    }

    fn level(&self, edge: Ref) -> Level {
        Bdd::level(self, edge)
    }

    fn edge0(&self, edge: Ref) -> Ref {
        self.low_node(edge)
    }

    fn edge1(&self, edge: Ref) -> Ref {
        self.high_node(edge)
    }

    fn is_marked(&self, edge: Ref) -> bool {
        Bdd::is_marked(self, edge)
    }

    fn set_marked(&self, edge: Ref, marked: bool) {
        Bdd::set_marked(self, edge, marked)
    }
}
