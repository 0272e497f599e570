// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! This module holds the components needed in the Constraint System.
//!
//! The two components used are Variables and Wires.

use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write,
};

/// Number of wires of every row.
pub const WIRES: usize = 4;

/// Reference to a variable that was allocated in the constraint system.
///
/// Identifiers are handed out by the composer in allocation order and are only
/// meaningful inside the build that produced them. The inner index is not
/// public so gadgets cannot fabricate wire references.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Variable(pub(crate) usize);

impl Variable {
    /// Position of the variable in allocation order.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl CanonicalSerialize for Variable {
    fn serialize<W: Write>(
        &self,
        writer: W,
    ) -> Result<(), SerializationError> {
        (self.0 as u64).serialize(writer)
    }

    fn serialized_size(&self) -> usize {
        8
    }
}

impl CanonicalDeserialize for Variable {
    fn deserialize<R: Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(Self(u64::deserialize(reader)? as usize))
    }
}

/// Stores the data for a specific wire in an arithmetic circuit
/// This data is the gate index and the type of wire
/// Left(1) signifies that this wire belongs to the first gate and is the left
/// wire
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum WireData {
    /// Left Wire of n'th gate
    Left(usize),
    /// Right Wire of n'th gate
    Right(usize),
    /// Output Wire of n'th gate
    Output(usize),
    /// Fourth Wire of n'th gate
    Fourth(usize),
}

impl WireData {
    /// Builds the wire at `column` of row `gate`.
    ///
    /// # Panics
    ///
    /// If `column >= WIRES`.
    pub fn new(gate: usize, column: usize) -> Self {
        match column {
            0 => Self::Left(gate),
            1 => Self::Right(gate),
            2 => Self::Output(gate),
            3 => Self::Fourth(gate),
            _ => panic!("column {} out of range for a width-{} row", column, WIRES),
        }
    }

    /// Row the wire belongs to.
    pub fn gate_index(&self) -> usize {
        match *self {
            Self::Left(n) | Self::Right(n) | Self::Output(n) | Self::Fourth(n) => n,
        }
    }

    /// Column of the wire inside its row.
    pub fn column(&self) -> usize {
        match self {
            Self::Left(_) => 0,
            Self::Right(_) => 1,
            Self::Output(_) => 2,
            Self::Fourth(_) => 3,
        }
    }

    /// Ordering key: row first, column second.
    pub(crate) fn position(&self) -> (usize, usize) {
        (self.gate_index(), self.column())
    }
}

impl CanonicalSerialize for WireData {
    fn serialize<W: Write>(
        &self,
        mut writer: W,
    ) -> Result<(), SerializationError> {
        (self.column() as u8).serialize(&mut writer)?;
        (self.gate_index() as u64).serialize(&mut writer)
    }

    fn serialized_size(&self) -> usize {
        1 + 8
    }
}

impl CanonicalDeserialize for WireData {
    fn deserialize<R: Read>(mut reader: R) -> Result<Self, SerializationError> {
        let column = u8::deserialize(&mut reader)? as usize;
        let gate = u64::deserialize(&mut reader)? as usize;
        if column >= WIRES {
            return Err(SerializationError::InvalidData);
        }
        Ok(Self::new(gate, column))
    }
}
