// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Arithmetic on [`FieldVar`]s.
//!
//! Linear operations only build expression nodes and never touch a composer.
//! Operations that need a multiplication row take the composer explicitly.
//! Constants are folded as the nodes are built, so arithmetic over constants
//! never reaches the constraint system.

use crate::constraint_system::{
    FieldExpr, FieldVar, StandardComposer, Variable,
};
use crate::error::Error;
use ark_ff::PrimeField;
use core::ops::{Add, Mul, Neg, Sub};

#[allow(clippy::should_implement_trait)]
impl<F> FieldVar<F>
where
    F: PrimeField,
{
    /// Constant known while writing the circuit.
    pub fn constant(value: F) -> Self {
        Self::from_expr(FieldExpr::Const(value))
    }

    /// The constant `0`.
    pub fn zero() -> Self {
        Self::constant(F::zero())
    }

    /// The constant `1`.
    pub fn one() -> Self {
        Self::constant(F::one())
    }

    pub(crate) fn variable(var: Variable) -> Self {
        Self::from_expr(FieldExpr::Var(var))
    }

    /// Value of the node if it is a constant.
    ///
    /// This is the evaluation path of purely constant arithmetic, it needs
    /// neither a composer nor a mode.
    pub fn to_constant(&self) -> Option<F> {
        match self.expr() {
            FieldExpr::Const(value) => Some(*value),
            _ => None,
        }
    }

    /// Whether the node is a constant.
    pub fn is_constant(&self) -> bool {
        self.to_constant().is_some()
    }

    /// `self + other`
    pub fn add(&self, other: &Self) -> Self {
        match (self.to_constant(), other.to_constant()) {
            (Some(a), Some(b)) => Self::constant(a + b),
            (_, Some(b)) if b.is_zero() => self.clone(),
            (Some(a), _) if a.is_zero() => other.clone(),
            _ => Self::from_expr(FieldExpr::Add(self.clone(), other.clone())),
        }
    }

    /// `self - other`
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negate())
    }

    /// `self + value`
    pub fn add_constant(&self, value: F) -> Self {
        self.add(&Self::constant(value))
    }

    /// `-self`
    pub fn negate(&self) -> Self {
        self.scale(-F::one())
    }

    /// `factor · self`
    pub fn scale(&self, factor: F) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        if factor.is_one() {
            return self.clone();
        }
        match self.expr() {
            FieldExpr::Const(value) => Self::constant(*value * factor),
            FieldExpr::Scale(inner, e) => {
                Self::from_expr(FieldExpr::Scale(*inner * factor, e.clone()))
            }
            _ => Self::from_expr(FieldExpr::Scale(factor, self.clone())),
        }
    }

    /// `self · other`, see [`StandardComposer::mul`].
    pub fn mul(
        &self,
        other: &Self,
        composer: &mut StandardComposer<F>,
    ) -> Result<Self, Error> {
        composer.mul(self, other)
    }

    /// `self · self`
    pub fn square(
        &self,
        composer: &mut StandardComposer<F>,
    ) -> Result<Self, Error> {
        composer.square(self)
    }

    /// `1 / self`, see [`StandardComposer::inverse`].
    pub fn inverse(
        &self,
        composer: &mut StandardComposer<F>,
    ) -> Result<Self, Error> {
        composer.inverse(self)
    }

    /// `self / other`, see [`StandardComposer::div`].
    pub fn div(
        &self,
        other: &Self,
        composer: &mut StandardComposer<F>,
    ) -> Result<Self, Error> {
        composer.div(self, other)
    }

    /// Constrains `self == other`.
    pub fn assert_equals(
        &self,
        other: &Self,
        composer: &mut StandardComposer<F>,
    ) -> Result<(), Error> {
        composer.assert_equal(self, other)
    }

    /// Materializes the expression into a single [`Variable`].
    pub fn seal(
        &self,
        composer: &mut StandardComposer<F>,
    ) -> Result<Variable, Error> {
        composer.seal(self)
    }
}

impl<F> From<F> for FieldVar<F>
where
    F: PrimeField,
{
    fn from(value: F) -> Self {
        Self::constant(value)
    }
}

impl<'a, F> Add<&'a FieldVar<F>> for &'a FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn add(self, other: &'a FieldVar<F>) -> FieldVar<F> {
        FieldVar::add(self, other)
    }
}

impl<'a, F> Sub<&'a FieldVar<F>> for &'a FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn sub(self, other: &'a FieldVar<F>) -> FieldVar<F> {
        FieldVar::sub(self, other)
    }
}

impl<'a, F> Neg for &'a FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn neg(self) -> FieldVar<F> {
        self.negate()
    }
}

impl<'a, F> Mul<F> for &'a FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn mul(self, factor: F) -> FieldVar<F> {
        self.scale(factor)
    }
}
