// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Canonical byte encodings for field elements.
//!
//! The builder never assumes a concrete field, everything is generic over
//! [`PrimeField`]. These helpers fix the byte layout used when field elements
//! cross the boundary of the crate.

use crate::error::Error;
use ark_ff::{BigInteger, FpParameters, PrimeField};

/// Number of bytes of the canonical little-endian encoding of `F`.
pub fn byte_len<F: PrimeField>() -> usize {
    F::zero().into_repr().to_bytes_le().len()
}

/// Little-endian bytes of the modulus of `F`.
pub fn modulus_bytes<F: PrimeField>() -> Vec<u8> {
    <F::Params as FpParameters>::MODULUS.to_bytes_le()
}

/// Canonical little-endian encoding of `value`.
pub fn to_bytes_le<F: PrimeField>(value: &F) -> Vec<u8> {
    value.into_repr().to_bytes_le()
}

/// Decodes a canonical little-endian encoding.
///
/// The input must be exactly [`byte_len`] bytes long and represent an
/// integer strictly smaller than the modulus, anything else is rejected with
/// [`Error::ModulusMismatch`] rather than being reduced.
pub fn from_bytes_le<F: PrimeField>(bytes: &[u8]) -> Result<F, Error> {
    if bytes.len() != byte_len::<F>() {
        return Err(Error::ModulusMismatch);
    }
    let bits = bytes
        .iter()
        .flat_map(|byte| (0..8).map(move |i| (byte >> i) & 1 == 1))
        .collect::<Vec<bool>>();
    F::from_repr(<F::BigInt as BigInteger>::from_bits_le(&bits))
        .ok_or(Error::ModulusMismatch)
}

/// Returns the `n` least significant bits of `value`, little-endian.
pub(crate) fn low_bits<F: PrimeField>(value: &F, n: usize) -> Vec<bool> {
    let mut bits = value.into_repr().to_bits_le();
    bits.resize(n.max(bits.len()), false);
    bits.truncate(n);
    bits
}

/// Number of significant bits of `value`.
pub(crate) fn num_bits<F: PrimeField>(value: &F) -> usize {
    value.into_repr().num_bits() as usize
}
