// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! A collection of all possible errors encountered while building a circuit.

use crate::constraint_system::GateKind;
use thiserror::Error;

/// Defines all possible errors that can be encountered while building or
/// checking a constraint system.
///
/// Every variant is recoverable and returned to the immediate caller. A build
/// that fails should be discarded as a whole, the partially filled
/// [`StandardComposer`](crate::constraint_system::StandardComposer) is never
/// reused.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A concrete value was demanded from a variable while running in
    /// analysis mode, or a prover-mode allocation was not given a value.
    #[error("witness value unavailable in {mode} mode")]
    WitnessUnavailable {
        /// Mode the composer was running in.
        mode: &'static str,
    },

    /// A gadget received the wrong number of wires or coefficients.
    #[error("shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// What was being shaped.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Length actually supplied.
        found: usize,
    },

    /// A gate (or a copy constraint) is not satisfied by the witness.
    #[error("unsatisfied constraint: {0}")]
    UnsatisfiedConstraint(String),

    /// The variable allocator ran out of identifiers.
    #[error("variable allocator exhausted after {limit} variables")]
    AllocatorExhausted {
        /// Maximum number of variables of the build.
        limit: usize,
    },

    /// A field element or a serialized system does not belong to the field
    /// the composer is parameterized over.
    #[error("field element does not belong to the expected modulus")]
    ModulusMismatch,

    /// Inversion of a zero witness.
    #[error("division by zero")]
    DivisionByZero,

    /// Serialized data could not be decoded.
    #[error("malformed constraint system bytes")]
    MalformedBytes,
}

impl Error {
    pub(crate) fn unsatisfied_row(row: usize, kind: GateKind) -> Self {
        Self::UnsatisfiedConstraint(format!("row {} ({:?})", row, kind))
    }
}
