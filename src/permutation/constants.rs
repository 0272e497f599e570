// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Constants used in the permutation argument to ensure that the wire subsets
//! are disjoint.

#![allow(non_snake_case)]

use crate::constraint_system::WIRES;
use ark_ff::PrimeField;

pub(crate) fn K1<F: PrimeField>() -> F {
    F::from(7_u64)
}

pub(crate) fn K2<F: PrimeField>() -> F {
    F::from(13_u64)
}

pub(crate) fn K3<F: PrimeField>() -> F {
    F::from(17_u64)
}

/// Shift of every wire column: `[1, K1, K2, K3]`.
pub(crate) fn coset_shifts<F: PrimeField>() -> [F; WIRES] {
    [F::one(), K1(), K2(), K3()]
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_bls12_381::Fr;

    #[test]
    fn test_shifts_are_distinct() {
        let shifts = coset_shifts::<Fr>();
        for (i, a) in shifts.iter().enumerate() {
            for b in shifts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(shifts[3], Fr::from(17u64));
    }
}
