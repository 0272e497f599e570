// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! The finished constraint system handed to a proving backend.

use crate::constraint_system::{Gate, StandardComposer, Variable};
use crate::error::Error;
use crate::field::modulus_bytes;
use crate::permutation::{CopyConstraints, Permutation};
use ark_ff::PrimeField;
use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write,
};

/// Rows, copy constraints and public input count of a build.
///
/// Public inputs own the first variables and the first rows. Two builds of
/// the same circuit produce equal systems and identical bytes.
#[derive(derivative::Derivative)]
#[derivative(
    Clone(bound = ""),
    Debug(bound = ""),
    Eq(bound = ""),
    PartialEq(bound = "")
)]
pub struct ConstraintSystem<F>
where
    F: PrimeField,
{
    pub(crate) gates: Vec<Gate<F>>,
    pub(crate) copy_constraints: CopyConstraints,
    pub(crate) public_inputs: usize,
    pub(crate) variable_count: usize,
    pub(crate) equivalences: Vec<(Variable, Variable)>,
}

impl<F> ConstraintSystem<F>
where
    F: PrimeField,
{
    /// Rows in emission order.
    pub fn gates(&self) -> &[Gate<F>] {
        &self.gates
    }

    /// Number of rows.
    pub fn n(&self) -> usize {
        self.gates.len()
    }

    /// Copy constraints over the rows.
    pub fn copy_constraints(&self) -> &CopyConstraints {
        &self.copy_constraints
    }

    /// Number of public inputs.
    pub fn public_input_count(&self) -> usize {
        self.public_inputs
    }

    /// Number of variables of the build.
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Serializes the system, prefixed by the modulus of `F`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = Vec::with_capacity(self.serialized_size());
        self.serialize(&mut bytes)
            .map_err(|_| Error::MalformedBytes)?;
        Ok(bytes)
    }

    /// Decodes a system produced by [`ConstraintSystem::to_bytes`].
    ///
    /// Fails with [`Error::ModulusMismatch`] when the bytes were produced
    /// over another field and with [`Error::MalformedBytes`] when they do not
    /// describe a consistent system.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = bytes;
        let modulus =
            Vec::<u8>::deserialize(&mut reader).map_err(|_| Error::MalformedBytes)?;
        if modulus != modulus_bytes::<F>() {
            return Err(Error::ModulusMismatch);
        }
        let system =
            Self::deserialize_body(&mut reader).map_err(|_| Error::MalformedBytes)?;
        if !reader.is_empty() || !system.is_consistent() {
            return Err(Error::MalformedBytes);
        }
        Ok(system)
    }

    fn deserialize_body<R: Read>(mut reader: R) -> Result<Self, SerializationError> {
        let public_inputs = u64::deserialize(&mut reader)? as usize;
        let variable_count = u64::deserialize(&mut reader)? as usize;
        let gates = Vec::<Gate<F>>::deserialize(&mut reader)?;
        let pairs = u64::deserialize(&mut reader)? as usize;
        let mut equivalences = Vec::new();
        for _ in 0..pairs {
            let a = Variable::deserialize(&mut reader)?;
            let b = Variable::deserialize(&mut reader)?;
            equivalences.push((a, b));
        }
        let copy_constraints = CopyConstraints::deserialize(&mut reader)?;
        Ok(Self {
            gates,
            copy_constraints,
            public_inputs,
            variable_count,
            equivalences,
        })
    }

    /// Every reference is in range and the copy constraints are the ones the
    /// rows and equivalences produce.
    fn is_consistent(&self) -> bool {
        let in_range = |var: &Variable| var.0 < self.variable_count;
        let wires_ok = self
            .gates
            .iter()
            .flat_map(|gate| gate.wires.iter().flatten())
            .all(in_range);
        let equivalences_ok = self
            .equivalences
            .iter()
            .all(|(a, b)| in_range(a) && in_range(b));
        if !wires_ok
            || !equivalences_ok
            || self.public_inputs > self.gates.len()
            || self.public_inputs > self.variable_count
        {
            return false;
        }
        Permutation::from_gates(self.variable_count, &self.gates, &self.equivalences)
            .finalize(self.gates.len())
            == self.copy_constraints
    }
}

impl<F> CanonicalSerialize for ConstraintSystem<F>
where
    F: PrimeField,
{
    fn serialize<W: Write>(
        &self,
        mut writer: W,
    ) -> Result<(), SerializationError> {
        modulus_bytes::<F>().serialize(&mut writer)?;
        (self.public_inputs as u64).serialize(&mut writer)?;
        (self.variable_count as u64).serialize(&mut writer)?;
        self.gates.serialize(&mut writer)?;
        (self.equivalences.len() as u64).serialize(&mut writer)?;
        for (a, b) in self.equivalences.iter() {
            a.serialize(&mut writer)?;
            b.serialize(&mut writer)?;
        }
        self.copy_constraints.serialize(&mut writer)
    }

    fn serialized_size(&self) -> usize {
        modulus_bytes::<F>().serialized_size()
            + 8
            + 8
            + self.gates.serialized_size()
            + 8
            + self.equivalences.len() * 16
            + self.copy_constraints.serialized_size()
    }
}

impl<F> StandardComposer<F>
where
    F: PrimeField,
{
    /// Snapshot of the rows and copy constraints emitted so far.
    pub fn finalize(&self) -> ConstraintSystem<F> {
        ConstraintSystem {
            gates: self.gates.clone(),
            copy_constraints: self.perm.finalize(self.gates.len()),
            public_inputs: self.public_inputs,
            variable_count: self.perm.variable_count(),
            equivalences: self.perm.equivalences.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::batch_test_field;

    fn build<F: PrimeField>() -> ConstraintSystem<F> {
        let mut composer = StandardComposer::<F>::analysis();
        let p = composer.public_input(None).unwrap();
        let x = composer.witness(None).unwrap();
        let y = composer.witness(None).unwrap();
        let z = composer.mul(&x, &y).unwrap();
        composer.assert_equal(&z.add(&x), &p).unwrap();
        composer.assert_equal(&x, &y).unwrap();
        composer.assert_boolean(&x).unwrap();
        composer.finalize()
    }

    fn test_bytes_are_deterministic<F: PrimeField>() {
        let first = build::<F>().to_bytes().unwrap();
        let second = build::<F>().to_bytes().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), build::<F>().serialized_size());
    }

    fn test_bytes_round_trip<F: PrimeField>() {
        let system = build::<F>();
        let bytes = system.to_bytes().unwrap();
        assert_eq!(ConstraintSystem::<F>::from_bytes(&bytes), Ok(system));
    }

    fn test_malformed_bytes<F: PrimeField>() {
        let bytes = build::<F>().to_bytes().unwrap();
        assert_eq!(
            ConstraintSystem::<F>::from_bytes(&bytes[..bytes.len() - 1]),
            Err(Error::MalformedBytes)
        );

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert_eq!(
            ConstraintSystem::<F>::from_bytes(&trailing),
            Err(Error::MalformedBytes)
        );

        // Drop the equivalence: the stored copy constraints no longer match.
        let mut system = build::<F>();
        system.equivalences.clear();
        let bytes = system.to_bytes().unwrap();
        assert_eq!(
            ConstraintSystem::<F>::from_bytes(&bytes),
            Err(Error::MalformedBytes)
        );
    }

    #[test]
    fn test_foreign_modulus() {
        let bytes = build::<ark_bls12_377::Fr>().to_bytes().unwrap();
        assert_eq!(
            ConstraintSystem::<ark_bls12_381::Fr>::from_bytes(&bytes),
            Err(Error::ModulusMismatch)
        );
    }

    fn test_public_rows_come_first<F: PrimeField>() {
        let system = build::<F>();
        assert_eq!(system.public_input_count(), 1);
        assert_eq!(system.gates()[0].wires()[0], Some(Variable(0)));
        assert_eq!(system.variable_count(), 4);
        // Public row, product row and the sum row; the boolean row last.
        assert_eq!(system.n(), 4);
    }

    batch_test_field!(
        [
            test_bytes_are_deterministic,
            test_bytes_round_trip,
            test_malformed_bytes,
            test_public_rows_come_first
        ],
        [] => (bls12_381: ark_bls12_381::Fr)
    );

    batch_test_field!(
        [
            test_bytes_are_deterministic,
            test_bytes_round_trip,
            test_malformed_bytes,
            test_public_rows_come_first
        ],
        [] => (bls12_377: ark_bls12_377::Fr)
    );
}
