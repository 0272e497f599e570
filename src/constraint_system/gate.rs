// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Rows of the constraint system.
//!
//! Every row has [`WIRES`] wire slots and a coefficient vector. The built-in
//! kinds share the generic layout
//!
//! ```text
//! q_l·L + q_r·R + q_o·O + q_d·D + q_m·L·R + q_c (+ PI) = 0
//! ```
//!
//! with coefficients stored as `[q_l, q_r, q_o, q_d, q_m, q_c]`.

use crate::constraint_system::{Variable, WIRES};
use ark_ff::PrimeField;
use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write,
};

/// Length of the coefficient vector of the generic layout.
pub const GENERIC_COEFFS: usize = 6;

/// Index of the left wire selector.
pub const Q_L: usize = 0;
/// Index of the right wire selector.
pub const Q_R: usize = 1;
/// Index of the output wire selector.
pub const Q_O: usize = 2;
/// Index of the fourth wire selector.
pub const Q_D: usize = 3;
/// Index of the multiplication selector.
pub const Q_M: usize = 4;
/// Index of the constant selector.
pub const Q_C: usize = 5;

/// Column of the left wire.
pub const LEFT: usize = 0;
/// Column of the right wire.
pub const RIGHT: usize = 1;
/// Column of the output wire.
pub const OUTPUT: usize = 2;
/// Column of the fourth wire.
pub const FOURTH: usize = 3;

/// Kind of a row. Decides how the backend reads the coefficient vector.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum GateKind {
    /// Generic arithmetic row.
    Generic,
    /// `a·a - a = 0` on wires `[a, a, a, -]`.
    Boolean,
    /// `c1·u + c2·v = 0` on wires `[u, v, -, -]`.
    EqualityLinear,
    /// Gadget specific row, opaque to the builder.
    Custom(u16),
}

impl GateKind {
    /// Whether the row follows the generic layout and can be evaluated by the
    /// builder itself.
    pub fn is_generic_layout(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Number of coefficients the kind requires, if fixed.
    pub fn coefficient_count(&self) -> Option<usize> {
        match self {
            Self::Custom(_) => None,
            _ => Some(GENERIC_COEFFS),
        }
    }
}

impl CanonicalSerialize for GateKind {
    fn serialize<W: Write>(
        &self,
        mut writer: W,
    ) -> Result<(), SerializationError> {
        match self {
            Self::Generic => 0u8.serialize(writer),
            Self::Boolean => 1u8.serialize(writer),
            Self::EqualityLinear => 2u8.serialize(writer),
            Self::Custom(id) => {
                3u8.serialize(&mut writer)?;
                (*id as u64).serialize(writer)
            }
        }
    }

    fn serialized_size(&self) -> usize {
        match self {
            Self::Custom(_) => 1 + 8,
            _ => 1,
        }
    }
}

impl CanonicalDeserialize for GateKind {
    fn deserialize<R: Read>(mut reader: R) -> Result<Self, SerializationError> {
        match u8::deserialize(&mut reader)? {
            0 => Ok(Self::Generic),
            1 => Ok(Self::Boolean),
            2 => Ok(Self::EqualityLinear),
            3 => {
                let id = u64::deserialize(reader)?;
                if id > u16::MAX as u64 {
                    return Err(SerializationError::InvalidData);
                }
                Ok(Self::Custom(id as u16))
            }
            _ => Err(SerializationError::InvalidData),
        }
    }
}

/// One row of the constraint system.
#[derive(derivative::Derivative)]
#[derivative(
    Clone(bound = ""),
    Debug(bound = ""),
    Eq(bound = ""),
    Hash(bound = ""),
    PartialEq(bound = "")
)]
pub struct Gate<F>
where
    F: PrimeField,
{
    pub(crate) kind: GateKind,
    pub(crate) wires: [Option<Variable>; WIRES],
    pub(crate) coeffs: Vec<F>,
}

impl<F> Gate<F>
where
    F: PrimeField,
{
    /// Kind of the row.
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Wire slots, `None` for an unused slot.
    pub fn wires(&self) -> &[Option<Variable>; WIRES] {
        &self.wires
    }

    /// Coefficient vector.
    pub fn coeffs(&self) -> &[F] {
        &self.coeffs
    }

    /// Whether every coefficient is zero.
    pub fn is_trivial(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_zero())
    }

    /// Evaluates the generic layout against an assignment. Unused slots read
    /// as zero. Returns `None` for kinds the builder cannot evaluate.
    pub fn evaluate<V>(&self, value: V, pi: F) -> Option<F>
    where
        V: Fn(Variable) -> F,
    {
        if !self.kind.is_generic_layout() {
            return None;
        }
        let w = |column: usize| self.wires[column].map(&value).unwrap_or_else(F::zero);
        let q = &self.coeffs;
        let (l, r, o, d) = (w(LEFT), w(RIGHT), w(OUTPUT), w(FOURTH));
        Some(
            q[Q_L] * l
                + q[Q_R] * r
                + q[Q_O] * o
                + q[Q_D] * d
                + q[Q_M] * l * r
                + q[Q_C]
                + pi,
        )
    }
}

impl<F> CanonicalSerialize for Gate<F>
where
    F: PrimeField,
{
    fn serialize<W: Write>(
        &self,
        mut writer: W,
    ) -> Result<(), SerializationError> {
        self.kind.serialize(&mut writer)?;
        for wire in self.wires.iter() {
            match wire {
                Some(var) => {
                    1u8.serialize(&mut writer)?;
                    var.serialize(&mut writer)?;
                }
                None => 0u8.serialize(&mut writer)?,
            }
        }
        self.coeffs.serialize(writer)
    }

    fn serialized_size(&self) -> usize {
        self.kind.serialized_size()
            + self
                .wires
                .iter()
                .map(|wire| 1 + wire.map_or(0, |var| var.serialized_size()))
                .sum::<usize>()
            + self.coeffs.serialized_size()
    }
}

impl<F> CanonicalDeserialize for Gate<F>
where
    F: PrimeField,
{
    fn deserialize<R: Read>(mut reader: R) -> Result<Self, SerializationError> {
        let kind = GateKind::deserialize(&mut reader)?;
        let mut wires = [None; WIRES];
        for wire in wires.iter_mut() {
            *wire = match u8::deserialize(&mut reader)? {
                0 => None,
                1 => Some(Variable::deserialize(&mut reader)?),
                _ => return Err(SerializationError::InvalidData),
            };
        }
        let coeffs = Vec::<F>::deserialize(reader)?;
        if let Some(expected) = kind.coefficient_count() {
            if coeffs.len() != expected {
                return Err(SerializationError::InvalidData);
            }
        }
        Ok(Self {
            kind,
            wires,
            coeffs,
        })
    }
}

/// Builder for rows of the generic layout.
///
/// ```text
/// composer.arithmetic_gate(|gate| {
///     gate.left(F::one(), a).right(F::one(), b).output(-F::one(), c)
/// })
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GenericGate<F>
where
    F: PrimeField,
{
    pub(crate) wires: [Option<Variable>; WIRES],
    pub(crate) selectors: [F; GENERIC_COEFFS],
}

impl<F> Default for GenericGate<F>
where
    F: PrimeField,
{
    fn default() -> Self {
        Self {
            wires: [None; WIRES],
            selectors: [F::zero(); GENERIC_COEFFS],
        }
    }
}

impl<F> GenericGate<F>
where
    F: PrimeField,
{
    /// Empty row: no wires, all selectors zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `var` on the left wire with selector `q_l`.
    pub fn left(&mut self, q_l: F, var: Variable) -> &mut Self {
        self.wire(LEFT, Q_L, q_l, var)
    }

    /// Places `var` on the right wire with selector `q_r`.
    pub fn right(&mut self, q_r: F, var: Variable) -> &mut Self {
        self.wire(RIGHT, Q_R, q_r, var)
    }

    /// Places `var` on the output wire with selector `q_o`.
    pub fn output(&mut self, q_o: F, var: Variable) -> &mut Self {
        self.wire(OUTPUT, Q_O, q_o, var)
    }

    /// Places `var` on the fourth wire with selector `q_d`.
    pub fn fourth(&mut self, q_d: F, var: Variable) -> &mut Self {
        self.wire(FOURTH, Q_D, q_d, var)
    }

    /// Sets the multiplication selector.
    pub fn mul(&mut self, q_m: F) -> &mut Self {
        self.selectors[Q_M] = q_m;
        self
    }

    /// Sets the constant selector.
    pub fn constant(&mut self, q_c: F) -> &mut Self {
        self.selectors[Q_C] = q_c;
        self
    }

    /// Returns a copy of the row built so far.
    pub fn build(&mut self) -> Self {
        *self
    }

    fn wire(
        &mut self,
        column: usize,
        selector: usize,
        coeff: F,
        var: Variable,
    ) -> &mut Self {
        self.wires[column] = Some(var);
        self.selectors[selector] = coeff;
        self
    }

    pub(crate) fn into_gate(self, kind: GateKind) -> Gate<F> {
        Gate {
            kind,
            wires: self.wires,
            coeffs: self.selectors.to_vec(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::batch_test_field;

    fn test_generic_evaluation<F: PrimeField>() {
        let (a, b, c) = (Variable(0), Variable(1), Variable(2));
        let gate = GenericGate::<F>::new()
            .left(F::from(2u64), a)
            .right(F::zero(), b)
            .output(-F::one(), c)
            .mul(F::one())
            .constant(F::from(5u64))
            .build()
            .into_gate(GateKind::Generic);
        let values = [F::from(3u64), F::from(4u64), F::from(23u64)];
        // 2·3 + 3·4 + 5 - 23
        assert_eq!(gate.evaluate(|v| values[v.index()], F::zero()), Some(F::zero()));
        assert_eq!(
            gate.evaluate(|v| values[v.index()], F::one()),
            Some(F::one())
        );
    }

    fn test_custom_is_opaque<F: PrimeField>() {
        let gate = Gate::<F> {
            kind: GateKind::Custom(7),
            wires: [Some(Variable(0)), None, None, None],
            coeffs: vec![F::one()],
        };
        assert_eq!(gate.evaluate(|_| F::zero(), F::zero()), None);
        assert_eq!(gate.kind().coefficient_count(), None);
    }

    fn test_gate_serialization<F: PrimeField>() {
        let gates = vec![
            GenericGate::<F>::new()
                .left(F::one(), Variable(3))
                .constant(-F::one())
                .build()
                .into_gate(GateKind::Generic),
            Gate::<F> {
                kind: GateKind::Custom(u16::MAX),
                wires: [None, Some(Variable(1)), None, Some(Variable(9))],
                coeffs: vec![F::from(11u64); 3],
            },
        ];
        for gate in gates {
            let mut bytes = Vec::new();
            gate.serialize(&mut bytes).unwrap();
            assert_eq!(bytes.len(), gate.serialized_size());
            assert_eq!(Gate::<F>::deserialize(bytes.as_slice()).unwrap(), gate);
        }
    }

    fn test_wrong_coefficient_count_is_rejected<F: PrimeField>() {
        let gate = Gate::<F> {
            kind: GateKind::Boolean,
            wires: [None; WIRES],
            coeffs: vec![F::one()],
        };
        let mut bytes = Vec::new();
        gate.serialize(&mut bytes).unwrap();
        assert!(Gate::<F>::deserialize(bytes.as_slice()).is_err());
    }

    batch_test_field!(
        [
            test_generic_evaluation,
            test_custom_is_opaque,
            test_gate_serialization,
            test_wrong_coefficient_count_is_rejected
        ],
        [] => (bls12_381: ark_bls12_381::Fr)
    );

    batch_test_field!(
        [
            test_generic_evaluation,
            test_custom_is_opaque,
            test_gate_serialization,
            test_wrong_coefficient_count_is_rejected
        ],
        [] => (bls12_377: ark_bls12_377::Fr)
    );
}
