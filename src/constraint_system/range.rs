// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Bit decomposition, range checks and the comparator gadget.

use crate::constraint_system::{BoolVar, FieldVar, Mode, StandardComposer};
use crate::error::Error;
use crate::field::{low_bits, num_bits};
use ark_ff::PrimeField;

/// `Σ 2^i · bits[i]`, little-endian. Free.
pub fn from_bits<F>(bits: &[BoolVar<F>]) -> FieldVar<F>
where
    F: PrimeField,
{
    let two = F::from(2u64);
    bits.iter()
        .enumerate()
        .fold(FieldVar::zero(), |acc, (i, bit)| {
            acc.add(&bit.as_field().scale(two.pow([i as u64])))
        })
}

/// Largest bit length a decomposition may have without wrapping around the
/// modulus.
fn max_bits<F: PrimeField>() -> usize {
    F::size_in_bits() - 1
}

impl<F> StandardComposer<F>
where
    F: PrimeField,
{
    /// Decomposes `x` into `n` little-endian bits and constrains the
    /// decomposition, which proves `x < 2^n`.
    ///
    /// A prover whose value does not fit fails with
    /// [`Error::UnsatisfiedConstraint`]. `n` must stay below the bit size of
    /// the modulus.
    pub fn to_bits(
        &mut self,
        x: &FieldVar<F>,
        n: usize,
    ) -> Result<Vec<BoolVar<F>>, Error> {
        if n > max_bits::<F>() {
            return Err(Error::ShapeMismatch {
                what: "bit length",
                expected: max_bits::<F>(),
                found: n,
            });
        }
        let lc = self.reduce(x);
        let value = match (lc.is_constant(), self.mode) {
            (true, _) => Some(lc.constant_term()),
            (false, Mode::Prover) => Some(self.evaluate_lc(&lc)),
            (false, Mode::Analysis) => None,
        };
        if let Some(value) = value {
            if num_bits(&value) > n {
                return Err(Error::UnsatisfiedConstraint(format!(
                    "{} does not fit in {} bits",
                    value, n
                )));
            }
        }
        if lc.is_constant() {
            return Ok(low_bits(&lc.constant_term(), n)
                .into_iter()
                .map(BoolVar::constant)
                .collect());
        }

        let witness = value.map(|value| low_bits(&value, n));
        let bits = (0..n)
            .map(|i| self.allocate_bool(witness.as_ref().map(|bits| bits[i])))
            .collect::<Result<Vec<_>, _>>()?;
        self.assert_equal(&from_bits(&bits), x)?;
        Ok(bits)
    }

    /// Constrains `x < 2^n`.
    pub fn range_check(&mut self, x: &FieldVar<F>, n: usize) -> Result<(), Error> {
        self.to_bits(x, n).map(|_| ())
    }

    /// Compares two values within a range, returns `1` if `lhs < rhs`, `0`
    /// otherwise.
    ///
    /// Both `lhs` and `rhs` are range checked to `n` bits.
    pub fn less_than(
        &mut self,
        lhs: &FieldVar<F>,
        rhs: &FieldVar<F>,
        n: usize,
    ) -> Result<BoolVar<F>, Error> {
        if n >= max_bits::<F>() {
            return Err(Error::ShapeMismatch {
                what: "bit length",
                expected: max_bits::<F>() - 1,
                found: n,
            });
        }
        self.range_check(lhs, n)?;
        self.range_check(rhs, n)?;

        if let (Some(a), Some(b)) = (
            self.reduce(lhs).as_constant(),
            self.reduce(rhs).as_constant(),
        ) {
            return Ok(BoolVar::constant(a.into_repr() < b.into_repr()));
        }

        let lt = self.exists_bool(|cs| {
            Ok(cs.read_value(lhs)?.into_repr() < cs.read_value(rhs)?.into_repr())
        })?;

        // lhs - rhs + lt · 2^n must fit in n bits.
        let range = F::from(2u64).pow([n as u64]);
        let diff = lhs.sub(rhs).add(&lt.as_field().scale(range));
        self.range_check(&diff, n)?;
        Ok(lt)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::batch_test_field;
    use crate::constraint_system::helper::gadget_tester;

    fn test_to_bits<F: PrimeField>() {
        gadget_tester::<F, _>(|composer: &mut StandardComposer<F>| {
            let x = composer.witness(Some(F::from(11u64)))?;
            let bits = composer.to_bits(&x, 6)?;
            assert_eq!(bits.len(), 6);
            if composer.mode() == Mode::Prover {
                let read = bits
                    .iter()
                    .map(|bit| composer.read_bool(bit))
                    .collect::<Result<Vec<_>, _>>()?;
                assert_eq!(read, vec![true, true, false, true, false, false]);
            }
            composer.assert_equal(&from_bits(&bits), &x)
        })
        .unwrap();
    }

    fn test_value_too_large<F: PrimeField>() {
        let mut composer = StandardComposer::<F>::prover();
        let x = composer.witness(Some(F::from(16u64))).unwrap();
        assert!(matches!(
            composer.range_check(&x, 4),
            Err(Error::UnsatisfiedConstraint(_))
        ));

        let mut analysis = StandardComposer::<F>::analysis();
        let x = analysis.witness(None).unwrap();
        assert!(analysis.range_check(&x, 4).is_ok());
        assert!(matches!(
            analysis.range_check(&x, F::size_in_bits()),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    fn test_constant_decomposition<F: PrimeField>() {
        let mut composer = StandardComposer::<F>::analysis();
        let bits = composer
            .to_bits(&FieldVar::constant(F::from(5u64)), 3)
            .unwrap();
        assert_eq!(
            bits.iter().map(|b| b.to_constant()).collect::<Vec<_>>(),
            vec![Some(true), Some(false), Some(true)]
        );
        assert!(composer
            .range_check(&FieldVar::constant(F::from(8u64)), 3)
            .is_err());
        assert_eq!(composer.n(), 0);
    }

    fn test_less_than<F: PrimeField>() {
        for (a, b) in [(4u64, 5u64), (5, 4), (5, 5), (0, 15)] {
            gadget_tester::<F, _>(move |composer: &mut StandardComposer<F>| {
                let lhs = composer.witness(Some(F::from(a)))?;
                let rhs = composer.witness(Some(F::from(b)))?;
                let output = composer.less_than(&lhs, &rhs, 4)?;
                let expected = if a < b { F::one() } else { F::zero() };
                composer.assert_equal(output.as_field(), &FieldVar::constant(expected))
            })
            .unwrap();
        }
    }

    fn test_less_than_width_limit<F: PrimeField>() {
        let mut composer = StandardComposer::<F>::analysis();
        let lhs = composer.witness(None).unwrap();
        let rhs = composer.witness(None).unwrap();
        for n in [max_bits::<F>(), usize::MAX] {
            assert!(matches!(
                composer.less_than(&lhs, &rhs, n),
                Err(Error::ShapeMismatch { found, .. }) if found == n
            ));
        }
        assert_eq!(composer.n(), 0);
        assert!(composer.less_than(&lhs, &rhs, max_bits::<F>() - 1).is_ok());
    }

    fn test_less_than_constants<F: PrimeField>() {
        let mut composer = StandardComposer::<F>::analysis();
        let output = composer
            .less_than(
                &FieldVar::constant(F::from(3u64)),
                &FieldVar::constant(F::from(9u64)),
                4,
            )
            .unwrap();
        assert_eq!(output.to_constant(), Some(true));
        assert_eq!(composer.n(), 0);
    }

    batch_test_field!(
        [
            test_to_bits,
            test_value_too_large,
            test_constant_decomposition,
            test_less_than,
            test_less_than_width_limit,
            test_less_than_constants
        ],
        [] => (bls12_381: ark_bls12_381::Fr)
    );

    batch_test_field!(
        [
            test_to_bits,
            test_value_too_large,
            test_constant_decomposition,
            test_less_than,
            test_less_than_width_limit,
            test_less_than_constants
        ],
        [] => (bls12_377: ark_bls12_377::Fr)
    );
}
