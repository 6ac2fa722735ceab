//! The BDD manager.
//!
//! All nodes live in a single hash-consed [`Table`], so equal functions share
//! one node and are represented by equal [`Ref`]s. Edges carry a complement
//! bit; the stored high edge of a node is always regular, which keeps the
//! representation canonical.
//!
//! Variables are decoupled from their position: each node stores a [`Var`],
//! and the manager keeps a fixed order mapping every registered variable to a
//! [`Level`]. Level 0 is closest to the root. Along every path from a root to
//! the terminal, levels strictly increase.
//!
//! Besides the nodes, the manager owns one scratch bit per node (the *pmark*).
//! Traversals such as [`SupportOp`][crate::support::SupportOp] paint it to
//! visit shared nodes once and must clear it again before they return.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use log::debug;

use crate::bitset::BitSet;
use crate::cache::Cache;
use crate::node::Node;
use crate::reference::Ref;
use crate::table::Table;
use crate::types::{Level, Var};

/// Sizing and variable order of a [`Bdd`] manager.
#[derive(Debug, Clone)]
pub struct BddConfig {
    /// The node storage holds `2^storage_bits` cells (default: 20).
    pub storage_bits: usize,
    /// The computed table holds `2^cache_bits` entries (default: 16).
    pub cache_bits: usize,
    /// Variables pre-registered at levels `0, 1, ...` in this order (default: empty).
    pub var_order: Vec<Var>,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            storage_bits: 20,
            cache_bits: 16,
            var_order: Vec::new(),
        }
    }
}

impl BddConfig {
    pub fn with_var_order(mut self, order: impl IntoIterator<Item = Var>) -> Self {
        self.var_order = order.into_iter().collect();
        self
    }
}

#[derive(Debug, Default)]
struct VarOrder {
    vars: Vec<Var>,
    levels: HashMap<Var, Level>,
}

impl VarOrder {
    fn register(&mut self, var: Var) -> Level {
        if let Some(&level) = self.levels.get(&var) {
            return level;
        }
        let level = Level::new(self.vars.len());
        debug!("registering {} at {}", var, level);
        self.vars.push(var);
        self.levels.insert(var, level);
        level
    }
}

pub struct Bdd {
    storage: RefCell<Table<Node>>,
    cache: RefCell<Cache<(Ref, Ref, Ref), Ref>>,
    order: RefCell<VarOrder>,
    marks: RefCell<BitSet>,
    zero: Ref,
    one: Ref,
}

impl Bdd {
    pub fn new(config: BddConfig) -> Self {
        assert!(
            config.storage_bits <= 31,
            "Storage bits should be in the range 0..=31"
        );

        let mut storage = Table::new(config.storage_bits);

        // Allocate the terminal node:
        let one = storage.alloc();
        assert_eq!(one, 1); // Make sure the terminal node is (1).
        let one = Ref::positive(one as u32);

        let mut order = VarOrder::default();
        for var in config.var_order {
            order.register(var);
        }

        Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(Cache::new(config.cache_bits)),
            order: RefCell::new(order),
            marks: RefCell::new(BitSet::with_capacity(1 << config.storage_bits.min(16))),
            zero: -one,
            one,
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(BddConfig::default())
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        f.debug_struct("Bdd")
            .field("capacity", &storage.capacity())
            .field("size", &storage.size())
            .field("real_size", &storage.real_size())
            .field("num_vars", &self.num_vars())
            .finish()
    }
}

// Terminals, nodes and the variable order.
impl Bdd {
    pub fn zero(&self) -> Ref {
        self.zero
    }
    pub fn one(&self) -> Ref {
        self.one
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == self.zero
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == self.one
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        node.id() == self.one.id()
    }

    pub fn cache(&self) -> std::cell::Ref<'_, Cache<(Ref, Ref, Ref), Ref>> {
        self.cache.borrow()
    }

    /// Number of live nodes, the terminal included.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().real_size()
    }

    pub fn variable(&self, id: u32) -> Var {
        self.storage.borrow().value(id as usize).variable
    }
    pub fn low(&self, id: u32) -> Ref {
        self.storage.borrow().value(id as usize).low
    }
    pub fn high(&self, id: u32) -> Ref {
        self.storage.borrow().value(id as usize).high
    }

    /// The negative cofactor of `node` with respect to its own variable.
    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.low(node.id());
        if node.is_negated() {
            -low
        } else {
            low
        }
    }
    /// The positive cofactor of `node` with respect to its own variable.
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.high(node.id());
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    /// Number of registered variables, i.e. the bound on levels.
    pub fn num_vars(&self) -> usize {
        self.order.borrow().vars.len()
    }

    /// Register `var` at the next free level, if it is not registered yet.
    pub fn declare(&self, var: Var) -> Level {
        self.order.borrow_mut().register(var)
    }

    pub fn level_of(&self, var: Var) -> Level {
        match self.order.borrow().levels.get(&var) {
            Some(&level) => level,
            None => panic!("Variable {} is not registered", var),
        }
    }

    pub fn var_at(&self, level: Level) -> Var {
        match self.order.borrow().vars.get(level.index()) {
            Some(&var) => var,
            None => panic!("No variable at {}", level),
        }
    }

    /// The level of the top variable of a non-terminal `node`.
    pub fn level(&self, node: Ref) -> Level {
        assert!(!self.is_terminal(node), "Terminal has no level");
        self.level_of(self.variable(node.id()))
    }

    /// Like [`level`][Bdd::level], but terminals sort below every variable.
    fn level_or_max(&self, node: Ref) -> usize {
        if self.is_terminal(node) {
            usize::MAX
        } else {
            self.level(node).index()
        }
    }

    pub fn mk_node(&self, v: Var, low: Ref, high: Ref) -> Ref {
        debug!("mk(v = {}, low = {}, high = {})", v, low, high);

        let level = self.level_of(v).index();
        assert!(
            level < self.level_or_max(low) && level < self.level_or_max(high),
            "Children of a node at {} must lie strictly below it",
            v
        );

        // Handle canonicity
        if high.is_negated() {
            debug!("mk: restoring canonicity");
            return -self.mk_node(v, -low, -high);
        }

        // Handle duplicates
        if low == high {
            debug!("mk: duplicates {} == {}", low, high);
            return low;
        }

        let i = self.storage.borrow_mut().put(Node {
            variable: v,
            low,
            high,
        });
        Ref::positive(i as u32)
    }

    /// The projection function of `v`, registering `v` if needed.
    pub fn mk_var(&self, v: Var) -> Ref {
        self.declare(v);
        self.mk_node(v, self.zero, self.one)
    }

    /// Conjunction of literals given as signed variable ids (`-3` is `¬x3`).
    pub fn cube(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut literals = literals
            .into_iter()
            .map(|lit| {
                assert_ne!(lit, 0, "Variable index should not be zero");
                let var = Var::new(lit.unsigned_abs());
                self.declare(var);
                (var, lit > 0)
            })
            .collect::<Vec<_>>();
        literals.sort_by_key(|&(var, _)| std::cmp::Reverse(self.level_of(var)));
        debug!("cube(literals = {:?})", literals);

        let mut current = self.one;
        for (var, positive) in literals {
            current = if positive {
                self.mk_node(var, self.zero, current)
            } else {
                self.mk_node(var, current, self.zero)
            };
        }
        current
    }

    /// Cofactors of `node` with respect to the variable at `level`.
    ///
    /// `level` must not lie below the top level of `node`.
    pub fn top_cofactors(&self, node: Ref, level: Level) -> (Ref, Ref) {
        let top = self.level_or_max(node);
        if level.index() < top {
            return (node, node);
        }
        assert_eq!(level.index(), top, "Level {} lies below the top of {}", level, node);
        (self.low_node(node), self.high_node(node))
    }
}

// Boolean operations.
impl Bdd {
    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(x, y, z) = (x ∧ y) ∨ (¬x ∧ z)
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        debug!("apply_ite(f = {}, g = {}, h = {})", f, g, h);

        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        // More base cases:
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,~F) => ite(F,G,1)
        let (mut f, mut g, mut h) = (f, g, h);
        if g == f {
            g = self.one;
        } else if g == -f {
            g = self.zero;
        }
        if h == f {
            h = self.zero;
        } else if h == -f {
            h = self.one;
        }
        if g == h {
            return g;
        }

        // ite(~F,G,H) => ite(F,H,G)
        if f.is_negated() {
            f = -f;
            std::mem::swap(&mut g, &mut h);
        }

        // ite(F,~G,H) => ~ite(F,G,~H)
        let n = g.is_negated();
        if n {
            g = -g;
            h = -h;
        }

        let key = (f, g, h);
        if let Some(&res) = self.cache.borrow().get(&key) {
            debug!("cache: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
            return if n { -res } else { res };
        }

        // Determine the top level:
        let m = self
            .level_or_max(f)
            .min(self.level_or_max(g))
            .min(self.level_or_max(h));
        assert_ne!(m, usize::MAX);
        let m = Level::new(m);

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);

        let res = self.mk_node(self.var_at(m), e, t);
        debug!("computed: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
        self.cache.borrow_mut().insert(key, res);

        if n {
            -res
        } else {
            res
        }
    }

    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.zero)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, self.one, v)
    }

    pub fn apply_xor(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, -v, v)
    }

    pub fn apply_eq(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, -v)
    }

    pub fn apply_imply(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.one)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        nodes
            .into_iter()
            .fold(self.one, |acc, node| self.apply_and(acc, node))
    }

    pub fn is_implies(&self, f: Ref, g: Ref) -> bool {
        self.is_one(self.apply_imply(f, g))
    }
}

// Node scratch marks.
impl Bdd {
    /// Whether the node under `node` carries the scratch mark. Polarity is ignored.
    pub fn is_marked(&self, node: Ref) -> bool {
        self.marks.borrow().contains(node.index())
    }

    pub fn set_marked(&self, node: Ref, marked: bool) {
        let mut marks = self.marks.borrow_mut();
        if marked {
            marks.insert(node.index());
        } else {
            marks.remove(node.index());
        }
    }

    /// Number of nodes currently carrying the scratch mark.
    pub fn num_marked(&self) -> usize {
        self.marks.borrow().len()
    }
}

// Reachability and garbage collection.
impl Bdd {
    /// Ids of all nodes reachable from `nodes`, the terminal included.
    pub fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<u32> {
        let mut visited = HashSet::new();
        visited.insert(self.one.id());
        let mut stack = Vec::from_iter(nodes);

        while let Some(node) = stack.pop() {
            if visited.insert(node.id()) {
                stack.push(self.low(node.id()));
                stack.push(self.high(node.id()));
            }
        }

        visited
    }

    /// Number of nodes reachable from `f`, the terminal included.
    pub fn size(&self, f: Ref) -> usize {
        self.descendants([f]).len()
    }

    /// Drop every node not reachable from `roots`. Returns the number of dropped nodes.
    ///
    /// Any [`SupportOp`][crate::support::SupportOp] working on this manager
    /// must be swept before collecting.
    pub fn collect_garbage(&self, roots: &[Ref]) -> usize {
        debug!("Collecting garbage...");
        assert_eq!(
            self.num_marked(),
            0,
            "Cannot collect garbage while nodes carry scratch marks"
        );

        self.cache.borrow_mut().clear();

        let alive = self.descendants(roots.iter().copied());
        let dropped = self
            .storage
            .borrow_mut()
            .retain(|index, _| alive.contains(&(index as u32)));
        debug!("Dropped {} nodes, {} alive", dropped, alive.len());
        dropped
    }

    pub fn to_bracket_string(&self, node: Ref) -> String {
        if self.is_zero(node) {
            return "(0)".to_string();
        } else if self.is_one(node) {
            return "(1)".to_string();
        }

        format!(
            "{}:({}, {}, {})",
            node,
            self.variable(node.id()),
            self.to_bracket_string(self.high_node(node)),
            self.to_bracket_string(self.low_node(node))
        )
    }
}
