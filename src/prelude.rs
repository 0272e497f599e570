// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Collection of functions needed to build PLONK circuits.
//!
//! Use this as the only import that you need to interact with the principal
//! data structures of the builder.

pub use crate::{
    circuit::{
        self, check_mode_equivalence, run_in_analysis, run_in_analysis_with,
        run_in_prover, run_in_prover_with, Circuit, CircuitInputs, InputShape,
        WitnessTable,
    },
    config::ComposerConfig,
    constraint_system::{
        BoolVar, ConstraintSystem, CopyConstraints, FieldVar, GateKind, Mode,
        StandardComposer, Variable,
    },
    error::Error,
};
