use std::cell::RefCell;
use std::collections::{BTreeSet, LinkedList};

use num_bigint::BigUint;
use test_log::test;

use bdd_support::bdd::{Bdd, BddConfig};
use bdd_support::manager::BddManager;
use bdd_support::reference::Ref;
use bdd_support::support::{Branch, SupportOp};
use bdd_support::types::{Level, Var};

/// Delegates to a [`Bdd`] and records every change of a scratch mark.
struct Recording<'a> {
    bdd: &'a Bdd,
    painted: RefCell<Vec<u32>>,
    cleared: RefCell<Vec<u32>>,
}

impl<'a> Recording<'a> {
    fn new(bdd: &'a Bdd) -> Self {
        Self {
            bdd,
            painted: RefCell::new(Vec::new()),
            cleared: RefCell::new(Vec::new()),
        }
    }

    fn painted(&self) -> BTreeSet<u32> {
        self.painted.borrow().iter().copied().collect()
    }

    fn cleared(&self) -> BTreeSet<u32> {
        self.cleared.borrow().iter().copied().collect()
    }
}

impl BddManager for Recording<'_> {
    fn max_level(&self) -> usize {
        self.bdd.max_level()
    }
    fn var_at(&self, level: Level) -> Var {
        self.bdd.var_at(level)
    }
    fn new_node(&self, level: Level, edge0: Ref, edge1: Ref) -> Ref {
        self.bdd.new_node(level, edge0, edge1)
    }
    fn zero(&self) -> Ref {
        self.bdd.zero()
    }
    fn one(&self) -> Ref {
        self.bdd.one()
    }
    fn level(&self, edge: Ref) -> Level {
        self.bdd.level(edge)
    }
    fn edge0(&self, edge: Ref) -> Ref {
        self.bdd.low_node(edge)
    }
    fn edge1(&self, edge: Ref) -> Ref {
        self.bdd.high_node(edge)
    }
    fn is_marked(&self, edge: Ref) -> bool {
        self.bdd.is_marked(edge)
    }
    fn set_marked(&self, edge: Ref, marked: bool) {
        if marked {
            self.painted.borrow_mut().push(edge.id());
        } else {
            self.cleared.borrow_mut().push(edge.id());
        }
        self.bdd.set_marked(edge, marked)
    }
}

const N: u32 = 3;

fn small_bdd() -> (Bdd, Vec<Ref>) {
    let bdd = Bdd::new(BddConfig {
        storage_bits: 16,
        ..BddConfig::default()
    });
    let x = (1..=N).map(|i| bdd.mk_var(Var::new(i))).collect();
    (bdd, x)
}

/// Every Boolean function of `N` variables, indexed by its truth table.
fn all_functions(bdd: &Bdd) -> Vec<Ref> {
    let minterms: Vec<Ref> = (0..1 << N)
        .map(|m: u32| {
            bdd.cube((0..N).map(|i| {
                let lit = (i + 1) as i32;
                if m & (1 << i) != 0 {
                    lit
                } else {
                    -lit
                }
            }))
        })
        .collect();

    (0..1u32 << (1 << N))
        .map(|table| {
            minterms
                .iter()
                .enumerate()
                .filter(|&(m, _)| table & (1 << m) != 0)
                .fold(bdd.zero(), |acc, (_, &minterm)| bdd.apply_or(acc, minterm))
        })
        .collect()
}

/// Variables `f` depends on, decided semantically by comparing cofactors.
fn semantic_support(bdd: &Bdd, f: Ref) -> Vec<Level> {
    (1..=N)
        .filter(|&i| cofactor(bdd, f, i, true) != cofactor(bdd, f, i, false))
        .map(|i| bdd.level_of(Var::new(i)))
        .collect()
}

/// `f` with variable `i` fixed to `value`, assembled point by point over the other variables.
fn cofactor(bdd: &Bdd, f: Ref, i: u32, value: bool) -> Ref {
    let others: Vec<u32> = (1..=N).filter(|&j| j != i).collect();
    let mut result = bdd.zero();
    for m in 0..1u32 << others.len() {
        let mut lits: Vec<i32> = others
            .iter()
            .enumerate()
            .map(|(k, &j)| if m & (1 << k) != 0 { j as i32 } else { -(j as i32) })
            .collect();
        let partial = bdd.cube(lits.clone());
        lits.push(if value { i as i32 } else { -(i as i32) });
        if bdd.is_implies(bdd.cube(lits), f) {
            result = bdd.apply_or(result, partial);
        }
    }
    result
}

#[test]
fn test_support_matches_semantic_dependence() {
    let (bdd, _) = small_bdd();
    let mut op = SupportOp::new(&bdd);

    for f in all_functions(&bdd) {
        op.compute_support(&[f]);
        assert_eq!(op.support(), semantic_support(&bdd, f).as_slice(), "f = {}", f);
        assert_eq!(bdd.num_marked(), 0);
    }
}

#[test]
fn test_support_is_strictly_ascending() {
    let (bdd, _) = small_bdd();
    let mut op = SupportOp::new(&bdd);

    for f in all_functions(&bdd) {
        op.compute_support(&[f]);
        assert!(op.support().windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_support_is_idempotent() {
    let (bdd, x) = small_bdd();
    let f = bdd.apply_or(bdd.apply_and(x[0], x[2]), -x[2]);
    let mut op = SupportOp::new(&bdd);

    let n1 = op.compute_support(&[f]);
    let first = op.support().to_vec();
    assert_eq!(bdd.num_marked(), 0);

    let n2 = op.compute_support(&[f]);
    assert_eq!(n1, n2);
    assert_eq!(op.support(), first.as_slice());
    assert_eq!(bdd.num_marked(), 0);
}

#[test]
fn test_support_of_union() {
    let (bdd, _) = small_bdd();
    let functions = all_functions(&bdd);
    let mut op = SupportOp::new(&bdd);

    for (i, &f) in functions.iter().enumerate().step_by(7) {
        for &g in functions.iter().skip(i).step_by(11) {
            op.compute_support(&[f]);
            let mut expected: BTreeSet<Level> = op.support().iter().copied().collect();
            op.compute_support(&[g]);
            expected.extend(op.support().iter().copied());

            op.compute_support(&[f, g]);
            assert_eq!(op.support(), expected.into_iter().collect::<Vec<_>>().as_slice());
        }
    }
}

#[test]
fn test_unmark_visits_exactly_the_painted_nodes() {
    let (bdd, x) = small_bdd();
    let f = bdd.apply_xor(x[0], bdd.apply_and(x[1], x[2]));
    let g = bdd.apply_or(x[1], x[2]);
    let rec = Recording::new(&bdd);

    let mut op = SupportOp::new(&rec);
    op.compute_support(&[f, g, -f]);

    let painted = rec.painted();
    assert_eq!(painted.len(), rec.painted.borrow().len(), "a node was painted twice");
    assert_eq!(rec.cleared(), painted);
    assert_eq!(rec.cleared.borrow().len(), painted.len(), "a node was cleared twice");

    let expected: BTreeSet<u32> = bdd
        .descendants([f, g])
        .into_iter()
        .filter(|&id| id != bdd.one().id())
        .collect();
    assert_eq!(painted, expected);
    assert_eq!(bdd.num_marked(), 0);
}

#[test]
fn test_terminals_have_empty_support() {
    let (bdd, _) = small_bdd();
    let mut op = SupportOp::new(&bdd);

    assert_eq!(op.compute_support(&[bdd.zero()]), 0);
    let mut out = Vec::new();
    assert_eq!(op.to_var_vec(&mut out), 0);
    assert!(out.is_empty());

    assert_eq!(op.compute_support(&[bdd.one()]), 0);
    let mut out = LinkedList::new();
    assert_eq!(op.to_var_list(&mut out), 0);
    assert!(out.is_empty());
}

#[test]
fn test_to_bdd_round_trip() {
    let (bdd, _) = small_bdd();
    let mut op = SupportOp::new(&bdd);

    for f in all_functions(&bdd) {
        let n = op.compute_support(&[f]);
        let levels = op.support().to_vec();
        let cube = op.to_bdd();

        assert_eq!(bdd.sat_count(cube, N as usize), BigUint::from(1u32) << (N as usize - n));
        assert_eq!(op.compute_support(&[cube]), n);
        assert_eq!(op.support(), levels.as_slice());
    }
}

#[test]
fn test_var_list_shapes_agree() {
    let config = BddConfig::default().with_var_order([Var::new(4), Var::new(2), Var::new(9)]);
    let bdd = Bdd::new(config);
    let f = bdd.apply_xor(bdd.mk_var(Var::new(9)), bdd.mk_var(Var::new(4)));

    let mut op = SupportOp::new(&bdd);
    op.compute_support(&[f]);

    let mut vec = Vec::new();
    let mut list = LinkedList::new();
    assert_eq!(op.to_var_vec(&mut vec), 2);
    assert_eq!(op.to_var_list(&mut list), 2);
    assert_eq!(vec, vec![Var::new(4), Var::new(9)]);
    assert_eq!(list.into_iter().collect::<Vec<_>>(), vec);
}

#[test]
fn test_scc_is_smallest_containing_cube() {
    let (bdd, x) = small_bdd();
    let mut op = SupportOp::new(&bdd);

    for f in all_functions(&bdd) {
        if bdd.is_zero(f) {
            continue;
        }
        let cube = op.compute_scc(f);

        // Every support level is classified.
        let n = op.len();
        let classified = op
            .support()
            .iter()
            .filter(|&&level| op.branch(level) != Branch::Unset)
            .count();
        assert_eq!(classified, n);
        let free = op
            .support()
            .iter()
            .filter(|&&level| op.branch(level) == Branch::Both)
            .count();

        // The cube contains f.
        assert!(bdd.is_implies(f, cube), "f = {}", bdd.to_bracket_string(f));

        // Exactly the literals implied by f are in the cube.
        for (i, &xi) in x.iter().enumerate() {
            let level = Level::new(i);
            let pos = bdd.is_implies(f, xi);
            let neg = bdd.is_implies(f, -xi);
            assert_eq!(bdd.is_implies(cube, xi), pos);
            assert_eq!(bdd.is_implies(cube, -xi), neg);
            if op.support().contains(&level) {
                let expected = match (pos, neg) {
                    (true, false) => Branch::Then,
                    (false, true) => Branch::Else,
                    _ => Branch::Both,
                };
                assert_eq!(op.branch(level), expected);
            }
        }

        // A cube over k literals has 2^(N-k) models.
        let literals = n - free;
        assert_eq!(
            bdd.sat_count(cube, N as usize),
            BigUint::from(1u32) << (N as usize - literals)
        );
        assert_eq!(bdd.num_marked(), 0);
    }
}

#[test]
fn test_scc_of_and() {
    let (bdd, x) = small_bdd();
    let f = bdd.apply_and(x[0], x[1]);

    let mut op = SupportOp::new(&bdd);
    assert_eq!(op.compute_support(&[f]), 2);
    assert_eq!(op.support(), &[Level::new(0), Level::new(1)]);
    assert_eq!(op.compute_scc(f), f);
}

#[test]
fn test_scc_of_xor() {
    let (bdd, x) = small_bdd();
    let f = bdd.apply_xor(x[0], x[1]);

    let mut op = SupportOp::new(&bdd);
    assert!(bdd.is_one(op.compute_scc(f)));
    assert_eq!(op.branch(Level::new(0)), Branch::Both);
    assert_eq!(op.branch(Level::new(1)), Branch::Both);
}

#[test]
fn test_sweep_before_garbage_collection() {
    let (bdd, x) = small_bdd();
    let f = bdd.apply_and(x[0], x[2]);
    let _tmp = bdd.apply_xor(x[1], bdd.apply_or(x[0], x[2]));

    let mut op = SupportOp::new(&bdd);
    op.compute_support(&[f]);
    op.sweep();
    assert!(bdd.collect_garbage(&[f, x[0], x[1], x[2]]) > 0);

    assert_eq!(op.compute_support(&[f]), 2);
    assert_eq!(op.vars(), vec![Var::new(1), Var::new(3)]);
}
