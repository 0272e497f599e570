// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! The constraint system module stores the implementation of the
//! [`StandardComposer`], as well as the expression layer and the gadgets
//! used to build circuits with it.

mod arithmetic;
mod boolean;
mod field_var;
mod range;

pub mod gate;

pub(crate) mod composer;
pub(crate) mod expr;
pub(crate) mod helper;
pub(crate) mod optimize;
pub(crate) mod system;
pub(crate) mod variable;

pub use crate::permutation::CopyConstraints;

pub use boolean::BoolVar;
pub use composer::{Mode, StandardComposer};
pub use expr::{FieldExpr, FieldVar, LinearCombination};
pub use gate::{Gate, GateKind, GenericGate, GENERIC_COEFFS};
pub use optimize::optimize;
pub use range::from_bits;
pub use system::ConstraintSystem;
pub use variable::{Variable, WireData, WIRES};
