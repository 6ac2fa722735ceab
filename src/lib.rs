//! # bdd-support: support sets over shared Binary Decision Diagrams
//!
//! This crate pairs a compact, manager-centric BDD package with the
//! [`SupportOp`][crate::support::SupportOp] operator, which answers two
//! questions about functions stored in the manager:
//!
//! - **Support**: which variables does a function (or a set of functions) depend on?
//!   The result is available as levels, as variable ids, or as a positive cube.
//! - **Smallest containing cube (SCC)**: which literals are implied by a function?
//!
//! ## Basic Usage
//!
//! ```rust
//! use bdd_support::bdd::Bdd;
//! use bdd_support::types::Var;
//!
//! let bdd = Bdd::default();
//! let x1 = bdd.mk_var(Var::new(1));
//! let x2 = bdd.mk_var(Var::new(2));
//! let x3 = bdd.mk_var(Var::new(3));
//!
//! // f = ¬x1 ∧ (x2 ⊕ x3)
//! let f = bdd.apply_and(-x1, bdd.apply_xor(x2, x3));
//!
//! assert_eq!(bdd.support(f), vec![Var::new(1), Var::new(2), Var::new(3)]);
//! assert_eq!(bdd.support_cube(&[f]), bdd.cube([1, 2, 3]));
//! assert_eq!(bdd.scc(f), -x1);
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**: the [`Bdd`][crate::bdd::Bdd] manager: node storage, variable order, ITE.
//! - **[`manager`]**: the [`BddManager`][crate::manager::BddManager] trait operators are written against.
//! - **[`support`]**: support computation and the smallest containing cube.
//! - **[`sat`]**: model counting.

pub mod bdd;
pub mod bitset;
pub mod cache;
pub mod manager;
pub mod node;
pub mod reference;
pub mod sat;
pub mod support;
pub mod table;
pub mod types;
pub mod utils;
