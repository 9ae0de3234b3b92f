//! # dialectic-rs: debates, positions and their dynamics
//!
//! **`dialectic-rs`** models debates as collections of arguments over atomic
//! sentences, and agents as (possibly partial) positions towards those
//! sentences. All logical questions, such as how many complete positions are
//! coherent with a debate or which coherent position is closest to an agent,
//! are answered by a small in-crate **Binary Decision Diagram** engine.
//!
//! ## What is a debate?
//!
//! An argument `p1 & p2 >> c` is a conjunction of premise literals implying a
//! conclusion literal. A debate is the conjunction of its arguments. A
//! complete position is *coherent* with a debate if it satisfies it; the set
//! of coherent complete positions is the debate's SCCP, and the debate's
//! *density* measures how much the arguments have narrowed it down:
//! `(n - log2 |SCCP|) / n` for `n` sentences.
//!
//! ## Basic Usage
//!
//! ```rust
//! use dialectic_rs::formula::{Argument, Debate, Formula};
//!
//! let a = Formula::atom("a");
//! let b = Formula::atom("b");
//! let debate = Debate::new([Argument::new([a], b).unwrap()]);
//!
//! // (a=F, b=F), (a=F, b=T) and (a=T, b=T)
//! assert_eq!(debate.count_models(), 3u32.into());
//! assert!((debate.density() - (2.0 - 3f64.log2()) / 2.0).abs() < 1e-12);
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**, **[`sat`]**, **[`paths`]**: the decision-diagram engine.
//! - **[`formula`]**: sentences, formulas, arguments and debates.
//! - **[`engine`]**: compiling formulas once and querying their models.
//! - **[`position`]**, **[`distance`]**, **[`sccp`]**: positions and the space they live in.
//! - **[`update`]**, **[`introduction`]**: how agents move and how debates grow.
//! - **[`simulation`]**, **[`fixed`]**, **[`influence`]**: the three kinds of simulation.

pub mod bdd;
pub mod cache;
pub mod distance;
pub mod engine;
pub mod error;
pub mod fixed;
pub mod formula;
pub mod influence;
pub mod introduction;
pub mod node;
pub mod paths;
pub mod pool;
pub mod position;
pub mod reference;
pub mod sat;
pub mod sccp;
pub mod simulation;
pub mod subtable;
pub mod types;
pub mod update;

pub use error::{Error, Result};
