// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Boolean Gates

use crate::constraint_system::{
    FieldVar, GateKind, GenericGate, StandardComposer,
};
use crate::error::Error;
use ark_ff::PrimeField;

/// A [`FieldVar`] known to be `0` or `1`.
///
/// Values of this type are only handed out after the bit was constrained, or
/// when they are derived from such bits by operations that preserve it.
#[derive(derivative::Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct BoolVar<F>(FieldVar<F>)
where
    F: PrimeField;

impl<F> BoolVar<F>
where
    F: PrimeField,
{
    /// Constant bit.
    pub fn constant(bit: bool) -> Self {
        Self(FieldVar::constant(if bit { F::one() } else { F::zero() }))
    }

    /// The bit as a field value.
    pub fn as_field(&self) -> &FieldVar<F> {
        &self.0
    }

    /// Value of the bit if it is a constant.
    pub fn to_constant(&self) -> Option<bool> {
        self.0.to_constant().map(|value| value.is_one())
    }

    /// `1 - self`, free.
    pub fn not(&self) -> Self {
        Self(FieldVar::one().sub(&self.0))
    }
}

impl<F> StandardComposer<F>
where
    F: PrimeField,
{
    /// Adds a boolean constraint (also known as binary constraint) where
    /// the gate eq. will enforce that `a` is either `0` or `1`.
    ///
    /// Constants are checked directly and fail with
    /// [`Error::UnsatisfiedConstraint`] when they are not a bit.
    pub fn assert_boolean(&mut self, a: &FieldVar<F>) -> Result<BoolVar<F>, Error> {
        let lc = self.reduce(a);
        if lc.is_constant() {
            let value = lc.constant_term();
            if value.is_zero() || value.is_one() {
                return Ok(BoolVar(FieldVar::constant(value)));
            }
            return Err(Error::UnsatisfiedConstraint(format!(
                "constant {} is not a bit",
                value
            )));
        }

        let var = self.seal_lc(lc)?;
        let mut gate = GenericGate::new();
        gate.left(F::zero(), var)
            .right(F::zero(), var)
            .output(-F::one(), var)
            .mul(F::one());
        self.push_gate(gate.into_gate(GateKind::Boolean))?;
        Ok(BoolVar(FieldVar::variable(var)))
    }

    /// Allocates a constrained bit. The value is only read in prover mode.
    pub fn allocate_bool(&mut self, bit: Option<bool>) -> Result<BoolVar<F>, Error> {
        let value = bit.map(|bit| if bit { F::one() } else { F::zero() });
        let var = self.witness(value)?;
        self.assert_boolean(&var)
    }

    /// Bit computed by `witness`, see
    /// [`StandardComposer::allocate_with`](StandardComposer::allocate_with).
    pub fn exists_bool<W>(&mut self, witness: W) -> Result<BoolVar<F>, Error>
    where
        W: FnOnce(&Self) -> Result<bool, Error>,
    {
        let var = self.exists(|cs| {
            witness(cs).map(|bit| if bit { F::one() } else { F::zero() })
        })?;
        self.assert_boolean(&var)
    }

    /// Reads the value of a bit. Prover mode only, unless constant.
    pub fn read_bool(&self, bit: &BoolVar<F>) -> Result<bool, Error> {
        self.read_value(&bit.0).map(|value| value.is_one())
    }

    /// `a ∧ b = a · b`
    pub fn and(&mut self, a: &BoolVar<F>, b: &BoolVar<F>) -> Result<BoolVar<F>, Error> {
        self.mul(&a.0, &b.0).map(BoolVar)
    }

    /// `a ∨ b = a + b - a · b`
    pub fn or(&mut self, a: &BoolVar<F>, b: &BoolVar<F>) -> Result<BoolVar<F>, Error> {
        let product = self.mul(&a.0, &b.0)?;
        Ok(BoolVar(a.0.add(&b.0).sub(&product)))
    }

    /// `a ⊕ b = a + b - 2 · a · b`
    pub fn xor(&mut self, a: &BoolVar<F>, b: &BoolVar<F>) -> Result<BoolVar<F>, Error> {
        let product = self.mul(&a.0, &b.0)?;
        Ok(BoolVar(a.0.add(&b.0).sub(&product.scale(F::from(2u64)))))
    }

    /// A gadget which outputs a bit whose value is 1 if the input is 0 and
    /// whose value is 0 otherwise.
    pub fn is_zero(&mut self, a: &FieldVar<F>) -> Result<BoolVar<F>, Error> {
        let lc = self.reduce(a);
        if lc.is_constant() {
            return Ok(BoolVar::constant(lc.constant_term().is_zero()));
        }

        let x = self.seal_lc(lc)?;
        let y = self.allocate_with(|cs| {
            Ok(cs.value_of_var(x)?.inverse().unwrap_or_else(F::one))
        })?;
        let b = self.allocate_with(|cs| {
            Ok(F::one() - cs.value_of_var(x)? * cs.value_of_var(y)?)
        })?;

        // Enforce constraints. The constraint system being used here is
        // a * y + b - 1 = 0
        // a * b = 0
        // where y is auxiliary and b is the boolean (a == 0).
        self.arithmetic_gate(|gate| {
            gate.left(F::zero(), x).right(F::zero(), b).mul(F::one())
        })?;
        self.arithmetic_gate(|gate| {
            gate.left(F::zero(), x)
                .right(F::zero(), y)
                .mul(F::one())
                .fourth(F::one(), b)
                .constant(-F::one())
        })?;
        Ok(BoolVar(FieldVar::variable(b)))
    }

    /// A gadget which outputs a bit whose value is 1 if `a == b`.
    pub fn is_equal(
        &mut self,
        a: &FieldVar<F>,
        b: &FieldVar<F>,
    ) -> Result<BoolVar<F>, Error> {
        self.is_zero(&a.sub(b))
    }

    /// Conditionally selects a value based on an input bit.
    ///
    /// If:
    /// bit == 1 => choice_a,
    /// bit == 0 => choice_b,
    pub fn conditional_select(
        &mut self,
        bit: &BoolVar<F>,
        choice_a: &FieldVar<F>,
        choice_b: &FieldVar<F>,
    ) -> Result<FieldVar<F>, Error> {
        // b + bit · (a - b)
        let delta = self.mul(&bit.0, &choice_a.sub(choice_b))?;
        Ok(choice_b.add(&delta))
    }
}
