// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! # PLONK Builder
//!
//! _A deterministic constraint-system builder for PLONK circuits._
//!
//! Application code describes a circuit once, in terms of [`FieldVar`]
//! expressions, and runs it against a [`StandardComposer`] in one of two
//! modes:
//!
//! - [`Mode::Prover`] computes the value of every variable and can check
//!   each row against them as it is emitted.
//! - [`Mode::Analysis`] records the rows and the copy constraints only.
//!
//! Both runs emit the same rows in the same order. The finished
//! [`ConstraintSystem`] is what a proving backend consumes.
//!
//! Additions and scalings stay symbolic until an operation needs a single
//! wire. Only then is the expression reduced to a linear combination and
//! sealed into a variable, so `x + 0`, `x · 1` and chains of additions cost
//! no rows.
//!
//! [`FieldVar`]: constraint_system::FieldVar
//! [`StandardComposer`]: constraint_system::StandardComposer
//! [`Mode::Prover`]: constraint_system::Mode::Prover
//! [`Mode::Analysis`]: constraint_system::Mode::Analysis
//! [`ConstraintSystem`]: constraint_system::ConstraintSystem

// Variables have always the same names in respect to wires.
#![allow(clippy::many_single_char_names)]
// Bool expr are usually easier to read with match statements.
#![allow(clippy::match_bool)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

extern crate alloc;

mod permutation;

pub mod circuit;
pub mod config;
pub mod constraint_system;
pub mod error;
pub mod field;
pub mod prelude;
