// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Simple Arithmetic Gates
//!
//! Sealing, equality and multiplication. Every method reduces its operands
//! first and only emits rows when the reduced form cannot be handled by
//! constant folding, the permutation or an earlier row.

use crate::constraint_system::gate::{OUTPUT, Q_C, Q_O};
use crate::constraint_system::{
    expr, FieldVar, GateKind, GenericGate, LinearCombination, Mode,
    StandardComposer, Variable, WireData,
};
use crate::error::Error;
use ark_ff::PrimeField;

impl<F> StandardComposer<F>
where
    F: PrimeField,
{
    /// Canonical linear form of `e`, with folded variables substituted.
    pub fn reduce(&self, e: &FieldVar<F>) -> LinearCombination<F> {
        expr::reduce(e, &self.aliases)
    }

    /// Returns a single [`Variable`] equal to `e`.
    ///
    /// A plain variable is returned as is, anything else is materialized
    /// into a fresh variable by one row per three extra terms.
    pub fn seal(&mut self, e: &FieldVar<F>) -> Result<Variable, Error> {
        let lc = self.reduce(e);
        self.seal_lc(lc)
    }

    pub(crate) fn seal_lc(
        &mut self,
        mut lc: LinearCombination<F>,
    ) -> Result<Variable, Error> {
        if let Some(var) = lc.as_variable() {
            return Ok(var);
        }
        if lc.is_constant() {
            let value = lc.constant_term();
            let out = self.allocate_with(|_| Ok(value))?;
            self.arithmetic_gate(|gate| gate.left(F::one(), out).constant(-value))?;
            return Ok(out);
        }
        while lc.len() > 3 {
            let head = lc.take_first(3);
            let sealed = self.seal_lc(head)?;
            lc.add_term(sealed, F::one());
        }

        let out = self.allocate_with(|cs| Ok(cs.evaluate_lc(&lc)))?;
        let mut gate = GenericGate::new();
        let mut terms = lc.terms();
        if let Some((var, coeff)) = terms.next() {
            gate.left(coeff, var);
        }
        if let Some((var, coeff)) = terms.next() {
            gate.right(coeff, var);
        }
        if let Some((var, coeff)) = terms.next() {
            gate.fourth(coeff, var);
        }
        gate.output(-F::one(), out).constant(lc.constant_term());
        self.push_gate(gate.into_gate(GateKind::Generic))?;
        Ok(out)
    }

    /// Evaluates `lc` against the witness. Prover mode only.
    pub(crate) fn evaluate_lc(&self, lc: &LinearCombination<F>) -> F {
        lc.evaluate(|var| self.values[var.0])
    }

    /// Constrains `a == b`.
    ///
    /// Depending on the reduced difference this is a no-op, a permutation
    /// union, a rewrite of the previous row, or a single new row.
    pub fn assert_equal(
        &mut self,
        a: &FieldVar<F>,
        b: &FieldVar<F>,
    ) -> Result<(), Error> {
        let diff = self.reduce(a).sub(&self.reduce(b));
        self.assert_zero(diff)
    }

    /// Constrains the linear combination to be zero.
    pub(crate) fn assert_zero(
        &mut self,
        mut d: LinearCombination<F>,
    ) -> Result<(), Error> {
        if d.is_constant() {
            if d.constant_term().is_zero() {
                return Ok(());
            }
            return Err(Error::UnsatisfiedConstraint(format!(
                "constant {} is not zero",
                d.constant_term()
            )));
        }

        if d.len() == 2 && d.constant_term().is_zero() {
            let mut terms = d.terms();
            if let (Some((u, c1)), Some((v, c2))) = (terms.next(), terms.next()) {
                if c1 == -c2 {
                    return self.union(u, v);
                }
            }
        }

        if self.fold_into_defining_gate(&d)? {
            return Ok(());
        }

        if d.len() == 2 && d.constant_term().is_zero() {
            let mut gate = GenericGate::new();
            let mut terms = d.terms();
            if let Some((u, c1)) = terms.next() {
                gate.left(c1, u);
            }
            if let Some((v, c2)) = terms.next() {
                gate.right(c2, v);
            }
            self.push_gate(gate.into_gate(GateKind::EqualityLinear))?;
            return Ok(());
        }

        while d.len() > 4 {
            let head = d.take_first(3);
            let sealed = self.seal_lc(head)?;
            d.add_term(sealed, F::one());
        }
        let mut gate = GenericGate::new();
        let mut terms = d.terms();
        if let Some((var, coeff)) = terms.next() {
            gate.left(coeff, var);
        }
        if let Some((var, coeff)) = terms.next() {
            gate.right(coeff, var);
        }
        if let Some((var, coeff)) = terms.next() {
            gate.output(coeff, var);
        }
        if let Some((var, coeff)) = terms.next() {
            gate.fourth(coeff, var);
        }
        gate.constant(d.constant_term());
        self.push_gate(gate.into_gate(GateKind::Generic))?;
        Ok(())
    }

    fn union(&mut self, u: Variable, v: Variable) -> Result<(), Error> {
        self.perm.union(u, v);
        tracing::trace!(?u, ?v, "merged variables");
        if self.mode == Mode::Prover
            && self.config.check_gates
            && self.values[u.0] != self.values[v.0]
        {
            tracing::warn!(?u, ?v, "copy constraint is not satisfied");
            return Err(Error::UnsatisfiedConstraint(format!(
                "copy constraint between {:?} and {:?}",
                u, v
            )));
        }
        Ok(())
    }

    /// Row whose output slot is the only wire of `var`, if an equality on
    /// `var` can be folded into it.
    fn defining_row(&self, var: Variable) -> Option<usize> {
        if var.0 < self.public_inputs || self.perm.is_merged(var) {
            return None;
        }
        let index = match self.perm.occurrences(var) {
            [WireData::Output(index)] => *index,
            _ => return None,
        };
        let gate = &self.gates[index];
        if gate.kind != GateKind::Generic || gate.coeffs[Q_O].is_zero() {
            return None;
        }
        Some(index)
    }

    /// Folds `d = 0` into the row defining one of its variables, when that
    /// variable is used nowhere else. The variable is replaced by the rest of
    /// `d` and becomes an alias. The most recently allocated candidate wins,
    /// independently of the order the rows were emitted in.
    fn fold_into_defining_gate(
        &mut self,
        d: &LinearCombination<F>,
    ) -> Result<bool, Error> {
        if d.len() > 2 {
            return Ok(false);
        }
        let terms = d.terms().collect::<Vec<_>>();
        let target = terms
            .iter()
            .rev()
            .find_map(|(var, _)| self.defining_row(*var).map(|index| (*var, index)));
        let (u, index) = match target {
            Some(target) => target,
            None => return Ok(false),
        };
        let q_o = self.gates[index].coeffs[Q_O];
        let output = WireData::Output(index);
        let inv = match d.coefficient(u).inverse() {
            Some(inv) => inv,
            None => return Ok(false),
        };

        // u = -(rest + k) / c1
        let mut alias = LinearCombination::constant(-d.constant_term() * inv);
        let rest = d.terms().find(|(var, _)| *var != u);
        if let Some((w, c2)) = rest {
            alias.add_term(w, -c2 * inv);
        }

        let gate = &mut self.gates[index];
        gate.coeffs[Q_C] += q_o * alias.constant_term();
        match rest {
            Some((w, _)) => {
                gate.wires[OUTPUT] = Some(w);
                gate.coeffs[Q_O] = q_o * alias.coefficient(w);
                self.perm.relocate(output, u, w);
            }
            None => {
                gate.wires[OUTPUT] = None;
                gate.coeffs[Q_O] = F::zero();
                self.perm.remove_wire(u, output);
            }
        }
        tracing::trace!(row = index, ?u, "folded equality into row");
        self.alias(u, alias);
        self.check_row(index)?;
        Ok(true)
    }

    /// Constrains `a · b == c` with a single multiplication row.
    pub fn assert_mul(
        &mut self,
        a: &FieldVar<F>,
        b: &FieldVar<F>,
        c: &FieldVar<F>,
    ) -> Result<(), Error> {
        let (la, lb, lc) = (self.reduce(a), self.reduce(b), self.reduce(c));
        if la.is_constant() {
            return self.assert_zero(lb.scale(la.constant_term()).sub(&lc));
        }
        if lb.is_constant() {
            return self.assert_zero(la.scale(lb.constant_term()).sub(&lc));
        }

        let x = self.seal_lc(la)?;
        let y = self.seal_lc(lb)?;
        let mut gate = GenericGate::new();
        gate.left(F::zero(), x).right(F::zero(), y).mul(F::one());
        match lc.len() {
            0 => {
                gate.constant(-lc.constant_term());
            }
            1 => {
                if let Some((w, coeff)) = lc.terms().next() {
                    gate.output(-coeff, w).constant(-lc.constant_term());
                }
            }
            _ => {
                let w = self.seal_lc(lc)?;
                gate.output(-F::one(), w);
            }
        }
        self.push_gate(gate.into_gate(GateKind::Generic))?;
        Ok(())
    }

    /// `a · b`. Scaling by a constant is free, otherwise one row.
    pub fn mul(
        &mut self,
        a: &FieldVar<F>,
        b: &FieldVar<F>,
    ) -> Result<FieldVar<F>, Error> {
        let (la, lb) = (self.reduce(a), self.reduce(b));
        if la.is_constant() {
            return Ok(b.scale(la.constant_term()));
        }
        if lb.is_constant() {
            return Ok(a.scale(lb.constant_term()));
        }

        let x = self.seal_lc(la)?;
        let y = self.seal_lc(lb)?;
        let z = self.allocate_with(|cs| {
            Ok(cs.value_of_var(x)? * cs.value_of_var(y)?)
        })?;
        self.arithmetic_gate(|gate| {
            gate.left(F::zero(), x)
                .right(F::zero(), y)
                .mul(F::one())
                .output(-F::one(), z)
        })?;
        Ok(FieldVar::variable(z))
    }

    /// `a · a`
    pub fn square(&mut self, a: &FieldVar<F>) -> Result<FieldVar<F>, Error> {
        self.mul(a, a)
    }

    /// `1 / a`, constrained by `a · z - 1 = 0`.
    ///
    /// Fails with [`Error::DivisionByZero`] for a zero constant, or for a zero
    /// witness in prover mode.
    pub fn inverse(&mut self, a: &FieldVar<F>) -> Result<FieldVar<F>, Error> {
        let la = self.reduce(a);
        if la.is_constant() {
            return la
                .constant_term()
                .inverse()
                .map(FieldVar::constant)
                .ok_or(Error::DivisionByZero);
        }

        let x = self.seal_lc(la)?;
        let z = self.allocate_with(|cs| {
            cs.value_of_var(x)?.inverse().ok_or(Error::DivisionByZero)
        })?;
        self.arithmetic_gate(|gate| {
            gate.left(F::zero(), x)
                .right(F::zero(), z)
                .mul(F::one())
                .constant(-F::one())
        })?;
        Ok(FieldVar::variable(z))
    }

    /// `a / b`, constrained by `b · z == a`.
    pub fn div(
        &mut self,
        a: &FieldVar<F>,
        b: &FieldVar<F>,
    ) -> Result<FieldVar<F>, Error> {
        let lb = self.reduce(b);
        if lb.is_constant() {
            let inv = lb
                .constant_term()
                .inverse()
                .ok_or(Error::DivisionByZero)?;
            return Ok(a.scale(inv));
        }

        let la = self.reduce(a);
        let z = self.exists(|cs| {
            let denominator =
                cs.evaluate_lc(&lb).inverse().ok_or(Error::DivisionByZero)?;
            Ok(cs.evaluate_lc(&la) * denominator)
        })?;
        self.assert_mul(b, &z, a)?;
        Ok(z)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::batch_test_field;
    use crate::config::ComposerConfig;
    use crate::constraint_system::gate::{Q_D, Q_L, Q_M, Q_R};

    fn checked<F: PrimeField>() -> StandardComposer<F> {
        StandardComposer::with_config(
            Mode::Prover,
            ComposerConfig::new().check_gates(true),
        )
    }

    fn value<F: PrimeField>(
        composer: &mut StandardComposer<F>,
        v: u64,
    ) -> FieldVar<F> {
        composer.witness(Some(F::from(v))).unwrap()
    }

    fn test_mul_then_equal_folds<F: PrimeField>() {
        let mut composer = checked::<F>();
        let x = value(&mut composer, 3);
        let y = value(&mut composer, 4);
        let z = composer.mul(&x, &y).unwrap();
        composer
            .assert_equal(&z, &FieldVar::constant(F::from(12u64)))
            .unwrap();

        assert_eq!(composer.variable_count(), 3);
        assert_eq!(composer.n(), 1);
        let gate = &composer.gates()[0];
        assert_eq!(gate.kind(), GateKind::Generic);
        assert_eq!(gate.wires(), &[Some(Variable(0)), Some(Variable(1)), None, None]);
        assert_eq!(gate.coeffs()[Q_M], F::one());
        assert_eq!(gate.coeffs()[Q_O], F::zero());
        assert_eq!(gate.coeffs()[Q_C], -F::from(12u64));
        assert_eq!(composer.read_value(&z), Ok(F::from(12u64)));
        assert!(composer.check_circuit_satisfied().is_ok());
    }

    fn test_fold_ignores_emission_order<F: PrimeField>() {
        let rows = |product_first: bool| {
            let mut composer = checked::<F>();
            let x = value(&mut composer, 3);
            let y = value(&mut composer, 4);
            let a = value(&mut composer, 5);
            let b = value(&mut composer, 6);
            let z = if product_first {
                let z = composer.mul(&x, &y).unwrap();
                composer.mul(&a, &b).unwrap();
                z
            } else {
                composer.mul(&a, &b).unwrap();
                composer.mul(&x, &y).unwrap()
            };
            composer
                .assert_equal(&z, &FieldVar::constant(F::from(12u64)))
                .unwrap();
            assert!(composer.check_circuit_satisfied().is_ok());
            composer.n()
        };
        assert_eq!(rows(true), 2);
        assert_eq!(rows(false), 2);
    }

    fn test_fold_needs_a_single_use<F: PrimeField>() {
        let mut composer = checked::<F>();
        let x = value(&mut composer, 3);
        let y = value(&mut composer, 4);
        let a = value(&mut composer, 5);
        let z = composer.mul(&x, &y).unwrap();
        composer.mul(&z, &a).unwrap();
        composer
            .assert_equal(&z, &FieldVar::constant(F::from(12u64)))
            .unwrap();

        assert_eq!(composer.n(), 3);
        assert_eq!(composer.gates()[0].coeffs()[Q_C], F::zero());
        assert!(composer.check_circuit_satisfied().is_ok());
    }

    fn test_linear_equality_is_one_gate<F: PrimeField>() {
        let mut composer = checked::<F>();
        let x = value(&mut composer, 1);
        let y = value(&mut composer, 2);
        let z = value(&mut composer, 8);
        let sum = x.add(&y).add_constant(F::from(5u64));
        composer.assert_equal(&sum, &z).unwrap();

        assert_eq!(composer.n(), 1);
        let gate = &composer.gates()[0];
        assert_eq!(gate.kind(), GateKind::Generic);
        assert_eq!(
            gate.wires(),
            &[Some(Variable(0)), Some(Variable(1)), Some(Variable(2)), None]
        );
        assert_eq!(
            gate.coeffs(),
            &[F::one(), F::one(), -F::one(), F::zero(), F::zero(), F::from(5u64)]
        );
    }

    fn test_zero_cost_identities<F: PrimeField>() {
        let mut composer = StandardComposer::<F>::analysis();
        let x = composer.witness(None).unwrap();
        let plus_zero = x.add(&FieldVar::zero());
        let times_one = composer.mul(&x, &FieldVar::one()).unwrap();
        let chain = x.add(&x).sub(&x);

        for e in [plus_zero, times_one, chain] {
            assert_eq!(composer.seal(&e), Ok(Variable(0)));
        }
        assert_eq!(composer.n(), 0);
        assert_eq!(composer.variable_count(), 1);
    }

    fn test_constant_folding<F: PrimeField>() {
        let mut composer = StandardComposer::<F>::analysis();
        let a = FieldVar::constant(F::from(2u64)).add_constant(F::from(3u64));
        let b = composer.mul(&a, &FieldVar::constant(F::from(4u64))).unwrap();
        let c = composer.inverse(&b).unwrap();
        let d = composer.div(&b, &c).unwrap();

        assert_eq!(d.to_constant(), Some(F::from(400u64)));
        assert_eq!(composer.n(), 0);
        assert_eq!(composer.variable_count(), 0);
        composer.assert_equal(&d, &FieldVar::constant(F::from(400u64))).unwrap();
        assert!(composer
            .assert_equal(&d, &FieldVar::constant(F::from(401u64)))
            .is_err());
    }

    fn test_equal_variables_share_a_cycle<F: PrimeField>() {
        let mut composer = checked::<F>();
        let x = value(&mut composer, 7);
        let y = value(&mut composer, 7);
        composer.assert_equal(&x, &y).unwrap();
        assert_eq!(composer.n(), 0);
        assert!(composer.perm.is_merged(Variable(1)));

        let z = value(&mut composer, 8);
        assert!(composer.assert_equal(&x, &z).is_err());
    }

    fn test_scaled_equality<F: PrimeField>() {
        let mut composer = checked::<F>();
        let x = value(&mut composer, 3);
        let y = value(&mut composer, 6);
        composer.assert_equal(&x.scale(F::from(2u64)), &y).unwrap();

        assert_eq!(composer.n(), 1);
        let gate = &composer.gates()[0];
        assert_eq!(gate.kind(), GateKind::EqualityLinear);
        assert_eq!(gate.coeffs()[Q_L], F::from(2u64));
        assert_eq!(gate.coeffs()[Q_R], -F::one());
    }

    fn test_seal_chains_wide_sums<F: PrimeField>() {
        let mut composer = checked::<F>();
        let vars = (1..=5)
            .map(|v| value(&mut composer, v))
            .collect::<Vec<_>>();
        let sum = vars.iter().fold(FieldVar::zero(), |acc, v| acc.add(v));
        let sealed = composer.seal(&sum).unwrap();

        assert_eq!(composer.n(), 2);
        assert_eq!(composer.variable_count(), 7);
        assert_eq!(composer.value_of_var(sealed), Ok(F::from(15u64)));
        // The first row seals the three smallest variables.
        let first = &composer.gates()[0];
        assert_eq!(first.wires()[3], Some(Variable(2)));
        assert_eq!(first.coeffs()[Q_D], F::one());
        assert!(composer.check_circuit_satisfied().is_ok());
    }

    fn test_seal_constant<F: PrimeField>() {
        let mut composer = checked::<F>();
        let sealed = composer.seal(&FieldVar::constant(F::from(9u64))).unwrap();
        assert_eq!(composer.n(), 1);
        assert_eq!(composer.value_of_var(sealed), Ok(F::from(9u64)));
    }

    fn test_fold_rewires_output<F: PrimeField>() {
        let mut composer = checked::<F>();
        let x = value(&mut composer, 3);
        let y = value(&mut composer, 4);
        let w = value(&mut composer, 6);
        let z = composer.mul(&x, &y).unwrap();
        let z_var = composer.seal(&z).unwrap();
        composer.assert_equal(&z, &w.scale(F::from(2u64))).unwrap();

        assert_eq!(composer.n(), 1);
        assert_eq!(composer.gates()[0].wires()[OUTPUT], Some(Variable(2)));
        assert_eq!(composer.gates()[0].coeffs()[Q_O], -F::from(2u64));
        let expected = composer.reduce(&w.scale(F::from(2u64)));
        assert_eq!(composer.reduce(&z), expected);

        // Using the folded variable on a wire again restores its row.
        composer
            .emit_gate(GateKind::Custom(1), &[Some(z_var), None, None, None], &[F::one()])
            .unwrap();
        assert_eq!(composer.n(), 3);
        assert!(composer.check_circuit_satisfied().is_ok());
    }

    fn test_public_equality_merges<F: PrimeField>() {
        let mut composer = checked::<F>();
        let p = composer.public_input(Some(F::from(12u64))).unwrap();
        let x = value(&mut composer, 3);
        let y = value(&mut composer, 4);
        let z = composer.mul(&x, &y).unwrap();
        composer.assert_equal(&z, &p).unwrap();
        assert_eq!(composer.n(), 2);
        assert!(composer.perm.is_merged(Variable(0)));
        assert!(composer.check_circuit_satisfied().is_ok());
    }

    fn test_assert_mul<F: PrimeField>() {
        let mut composer = checked::<F>();
        let x = value(&mut composer, 3);
        let y = value(&mut composer, 5);
        let z = value(&mut composer, 14);
        composer
            .assert_mul(&x, &y, &z.add_constant(F::one()))
            .unwrap();
        assert_eq!(composer.n(), 1);
        assert!(composer.assert_mul(&x, &y, &z).is_err());
    }

    fn test_inverse_and_div<F: PrimeField>() {
        let mut composer = checked::<F>();
        let x = value(&mut composer, 4);
        let y = value(&mut composer, 2);
        let inv = composer.inverse(&x).unwrap();
        assert_eq!(
            composer.read_value(&inv).unwrap() * F::from(4u64),
            F::one()
        );
        let q = composer.div(&x, &y).unwrap();
        assert_eq!(composer.read_value(&q), Ok(F::from(2u64)));

        let zero = value(&mut composer, 0);
        assert!(matches!(composer.inverse(&zero), Err(Error::DivisionByZero)));
        assert!(composer.check_circuit_satisfied().is_ok());

        let mut analysis = StandardComposer::<F>::analysis();
        let zero = analysis.witness(None).unwrap();
        assert!(analysis.inverse(&zero).is_ok());
        assert!(matches!(
            analysis.inverse(&FieldVar::zero()),
            Err(Error::DivisionByZero)
        ));
    }

    batch_test_field!(
        [
            test_mul_then_equal_folds,
            test_fold_ignores_emission_order,
            test_fold_needs_a_single_use,
            test_linear_equality_is_one_gate,
            test_zero_cost_identities,
            test_constant_folding,
            test_equal_variables_share_a_cycle,
            test_scaled_equality,
            test_seal_chains_wide_sums,
            test_seal_constant,
            test_fold_rewires_output,
            test_public_equality_merges,
            test_assert_mul,
            test_inverse_and_div
        ],
        [] => (bls12_381: ark_bls12_381::Fr)
    );

    batch_test_field!(
        [
            test_mul_then_equal_folds,
            test_fold_ignores_emission_order,
            test_fold_needs_a_single_use,
            test_linear_equality_is_one_gate,
            test_zero_cost_identities,
            test_constant_folding,
            test_equal_variables_share_a_cycle,
            test_scaled_equality,
            test_seal_chains_wide_sums,
            test_seal_constant,
            test_fold_rewires_output,
            test_public_equality_merges,
            test_assert_mul,
            test_inverse_and_div
        ],
        [] => (bls12_377: ark_bls12_377::Fr)
    );
}
