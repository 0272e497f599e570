// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Testing Helper Functions

use super::{Mode, StandardComposer};
use crate::config::ComposerConfig;
use crate::error::Error;
use ark_ff::PrimeField;

/// Adds dummy constraints using arithmetic gates.
#[allow(dead_code)]
pub(crate) fn dummy_gadget<F>(
    n: usize,
    composer: &mut StandardComposer<F>,
) -> Result<(), Error>
where
    F: PrimeField,
{
    let one = composer.allocate(Some(F::one()))?;
    for _ in 0..n {
        composer.arithmetic_gate(|gate| {
            gate.left(F::one(), one).right(F::one(), one).constant(-F::from(2u64))
        })?;
    }
    Ok(())
}

/// Takes a generic gadget function and tests whether it passes an end-to-end
/// test: the prover build checks every row as it is emitted and is fully
/// satisfied at the end, and the analysis build produces the same system.
#[allow(dead_code)]
pub(crate) fn gadget_tester<F, G>(gadget: G) -> Result<(), Error>
where
    F: PrimeField,
    G: Fn(&mut StandardComposer<F>) -> Result<(), Error>,
{
    // Provers View
    let mut prover = StandardComposer::with_config(
        Mode::Prover,
        ComposerConfig::new().check_gates(true),
    );
    gadget(&mut prover)?;
    prover.check_circuit_satisfied()?;

    // Analysis View
    let mut analysis = StandardComposer::analysis();
    gadget(&mut analysis)?;

    assert_eq!(
        prover.finalize(),
        analysis.finalize(),
        "prover and analysis builds differ"
    );
    Ok(())
}
