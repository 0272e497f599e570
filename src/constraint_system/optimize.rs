// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Post-processing of a finished [`ConstraintSystem`].

use crate::constraint_system::{ConstraintSystem, GateKind};
use crate::permutation::Permutation;
use ark_ff::PrimeField;
use hashbrown::HashSet;

/// Removes rows that constrain nothing.
///
/// Dropped are rows of the generic layout whose coefficients are all zero,
/// and rows of the generic layout that repeat an earlier row exactly. Public
/// input rows and custom rows are always kept. The copy constraints are
/// recomputed from the surviving rows. Applying the pass twice gives the same
/// system as applying it once.
pub fn optimize<F>(system: &ConstraintSystem<F>) -> ConstraintSystem<F>
where
    F: PrimeField,
{
    let mut seen = HashSet::new();
    let mut gates = Vec::with_capacity(system.gates.len());
    for (index, gate) in system.gates.iter().enumerate() {
        let removable = index >= system.public_inputs
            && gate.kind.is_generic_layout()
            && ((gate.is_trivial() && gate.kind != GateKind::Boolean)
                || !seen.insert(gate));
        if !removable {
            gates.push(gate.clone());
        }
    }

    let copy_constraints =
        Permutation::from_gates(system.variable_count, &gates, &system.equivalences)
            .finalize(gates.len());
    tracing::debug!(
        before = system.gates.len(),
        after = gates.len(),
        "optimized constraint system"
    );
    ConstraintSystem {
        gates,
        copy_constraints,
        public_inputs: system.public_inputs,
        variable_count: system.variable_count,
        equivalences: system.equivalences.clone(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::batch_test_field;
    use crate::constraint_system::{StandardComposer, WireData};

    fn noisy<F: PrimeField>() -> ConstraintSystem<F> {
        let mut composer = StandardComposer::<F>::analysis();
        composer.public_input(None).unwrap();
        let x = composer.allocate(None).unwrap();
        let y = composer.allocate(None).unwrap();
        let row = |composer: &mut StandardComposer<F>| {
            composer
                .arithmetic_gate(|gate| {
                    gate.left(F::one(), x).right(-F::one(), y)
                })
                .unwrap();
        };
        row(&mut composer);
        row(&mut composer);
        composer.arithmetic_gate(|gate| gate.left(F::zero(), y)).unwrap();
        composer
            .emit_gate(GateKind::Custom(4), &[Some(x), None, None, None], &[F::one()])
            .unwrap();
        composer
            .emit_gate(GateKind::Custom(4), &[Some(x), None, None, None], &[F::one()])
            .unwrap();
        composer.finalize()
    }

    fn test_removes_duplicates_and_trivial_rows<F: PrimeField>() {
        let system = noisy::<F>();
        assert_eq!(system.n(), 6);

        let optimized = optimize(&system);
        assert_eq!(optimized.n(), 4);
        assert_eq!(optimized.gates()[0], system.gates()[0]);
        assert_eq!(optimized.gates()[1], system.gates()[1]);
        assert_eq!(optimized.gates()[2].kind(), GateKind::Custom(4));
        assert_eq!(
            optimized.copy_constraints().cycle_of(WireData::Left(1)).unwrap(),
            &[WireData::Left(1), WireData::Left(2), WireData::Left(3)]
        );
    }

    fn test_idempotent<F: PrimeField>() {
        let once = optimize(&noisy::<F>());
        let twice = optimize(&once);
        assert_eq!(once, twice);
        assert_eq!(once.to_bytes().unwrap(), twice.to_bytes().unwrap());
    }

    fn test_public_rows_survive<F: PrimeField>() {
        let mut composer = StandardComposer::<F>::analysis();
        composer.public_input(None).unwrap();
        composer.public_input(None).unwrap();
        let system = composer.finalize();
        assert_eq!(optimize(&system), system);
    }

    batch_test_field!(
        [
            test_removes_duplicates_and_trivial_rows,
            test_idempotent,
            test_public_rows_survive
        ],
        [] => (bls12_381: ark_bls12_381::Fr)
    );

    batch_test_field!(
        [
            test_removes_duplicates_and_trivial_rows,
            test_idempotent,
            test_public_rows_survive
        ],
        [] => (bls12_377: ark_bls12_377::Fr)
    );
}
