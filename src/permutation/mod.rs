// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Wire sharing bookkeeping.
//!
//! The [`Permutation`] records every wire a [`Variable`] occupies plus the
//! variables that were declared equal, and compiles both into the copy
//! constraints the backend turns into its permutation argument.

pub(crate) mod constants;

use crate::constraint_system::{Gate, Variable, WireData, WIRES};
use crate::error::Error;
use ark_ff::PrimeField;
use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write,
};
use itertools::Itertools;

/// Permutation bookkeeping of one build.
#[derive(Clone, Debug, Default)]
pub(crate) struct Permutation {
    /// Wires occupied by every variable, in insertion order.
    pub(crate) variable_map: Vec<Vec<WireData>>,
    /// Union-find forest over variables. Roots are the smallest member.
    parent: Vec<usize>,
    /// Class size, only meaningful for roots.
    size: Vec<usize>,
    /// Every union that was requested, in request order.
    pub(crate) equivalences: Vec<(Variable, Variable)>,
}

impl Permutation {
    /// Creates an empty permutation with room for `expected_size` variables.
    pub(crate) fn with_capacity(expected_size: usize) -> Self {
        Self {
            variable_map: Vec::with_capacity(expected_size),
            parent: Vec::with_capacity(expected_size),
            size: Vec::with_capacity(expected_size),
            equivalences: Vec::new(),
        }
    }

    /// Number of variables allocated so far.
    pub(crate) fn variable_count(&self) -> usize {
        self.variable_map.len()
    }

    /// Allocates a new [`Variable`], failing once `limit` variables exist.
    pub(crate) fn new_variable(&mut self, limit: usize) -> Result<Variable, Error> {
        let index = self.variable_map.len();
        if index >= limit {
            return Err(Error::AllocatorExhausted { limit });
        }
        Ok(self.push_variable())
    }

    fn push_variable(&mut self) -> Variable {
        let index = self.variable_map.len();
        self.variable_map.push(Vec::new());
        self.parent.push(index);
        self.size.push(1);
        Variable(index)
    }

    /// Records the wires of row `gate_index`.
    ///
    /// # Panics
    ///
    /// If a wire references a variable that was not allocated by this
    /// permutation.
    pub(crate) fn add_variables_to_map(
        &mut self,
        wires: &[Option<Variable>; WIRES],
        gate_index: usize,
    ) {
        for (column, wire) in wires.iter().enumerate() {
            if let Some(var) = wire {
                self.add_variable_to_map(*var, WireData::new(gate_index, column));
            }
        }
    }

    fn add_variable_to_map(&mut self, var: Variable, wire: WireData) {
        assert!(
            var.0 < self.variable_map.len(),
            "variable {} was not allocated in this build",
            var.0
        );
        self.variable_map[var.0].push(wire);
    }

    /// Wires currently occupied by `var`.
    pub(crate) fn occurrences(&self, var: Variable) -> &[WireData] {
        &self.variable_map[var.0]
    }

    /// Moves `wire` from `from` to `to`.
    pub(crate) fn relocate(&mut self, wire: WireData, from: Variable, to: Variable) {
        self.remove_wire(from, wire);
        self.add_variable_to_map(to, wire);
    }

    /// Forgets that `var` occupies `wire`.
    pub(crate) fn remove_wire(&mut self, var: Variable, wire: WireData) {
        self.variable_map[var.0].retain(|w| *w != wire);
    }

    /// Representative of the equivalence class of `var`.
    pub(crate) fn find(&self, var: Variable) -> Variable {
        let mut index = var.0;
        while self.parent[index] != index {
            index = self.parent[index];
        }
        Variable(index)
    }

    /// Whether `var` was declared equal to another variable.
    pub(crate) fn is_merged(&self, var: Variable) -> bool {
        self.size[self.find(var).0] > 1
    }

    /// Declares `a` and `b` equal. All their wires end up in one cycle.
    pub(crate) fn union(&mut self, a: Variable, b: Variable) {
        let (root_a, root_b) = (self.find(a).0, self.find(b).0);
        self.equivalences.push((a, b));
        if root_a == root_b {
            return;
        }
        let (root, child) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[child] = root;
        self.size[root] += self.size[child];
        // Compress the paths of both operands.
        self.parent[a.0] = root;
        self.parent[b.0] = root;
    }

    /// Rebuilds the bookkeeping of a finished gate list.
    pub(crate) fn from_gates<F>(
        variable_count: usize,
        gates: &[Gate<F>],
        equivalences: &[(Variable, Variable)],
    ) -> Self
    where
        F: PrimeField,
    {
        let mut perm = Self::with_capacity(variable_count);
        for _ in 0..variable_count {
            perm.push_variable();
        }
        for (gate_index, gate) in gates.iter().enumerate() {
            perm.add_variables_to_map(&gate.wires, gate_index);
        }
        for (a, b) in equivalences {
            perm.union(*a, *b);
        }
        perm
    }

    /// Compiles the copy constraints of a system with `gate_count` rows.
    pub(crate) fn finalize(&self, gate_count: usize) -> CopyConstraints {
        // Group variables by their class representative.
        let mut classes: Vec<Vec<WireData>> = vec![Vec::new(); self.variable_map.len()];
        for (index, wires) in self.variable_map.iter().enumerate() {
            let root = self.find(Variable(index)).0;
            classes[root].extend_from_slice(wires);
        }

        let cycles = classes
            .into_iter()
            .filter(|cycle| !cycle.is_empty())
            .map(|mut cycle| {
                cycle.sort_by_key(WireData::position);
                cycle
            })
            .sorted_by_key(|cycle| cycle[0].position())
            .collect::<Vec<_>>();

        let mut sigma = (0..gate_count)
            .map(|gate| {
                [
                    WireData::Left(gate),
                    WireData::Right(gate),
                    WireData::Output(gate),
                    WireData::Fourth(gate),
                ]
            })
            .collect::<Vec<_>>();
        for cycle in cycles.iter() {
            for (current, next) in cycle.iter().zip(cycle.iter().cycle().skip(1)) {
                sigma[current.gate_index()][current.column()] = *next;
            }
        }

        CopyConstraints { cycles, sigma }
    }
}

/// Copy constraints handed to the backend.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CopyConstraints {
    pub(crate) cycles: Vec<Vec<WireData>>,
    pub(crate) sigma: Vec<[WireData; WIRES]>,
}

impl CopyConstraints {
    /// Positions that must carry the same value, one cycle per class of
    /// equal variables. Positions are ordered by row then column, and the
    /// cycles by their first position.
    pub fn cycles(&self) -> &[Vec<WireData>] {
        &self.cycles
    }

    /// For every row, the next position of the cycle each wire belongs to.
    /// Unused wires map to themselves.
    pub fn sigma(&self) -> &[[WireData; WIRES]] {
        &self.sigma
    }

    /// Cycle containing `wire`, if the wire is used.
    pub fn cycle_of(&self, wire: WireData) -> Option<&[WireData]> {
        self.cycles
            .iter()
            .find(|cycle| cycle.contains(&wire))
            .map(Vec::as_slice)
    }

    /// Coset shifts that keep the four wire columns disjoint.
    pub fn coset_shifts<F: PrimeField>() -> [F; WIRES] {
        constants::coset_shifts()
    }
}

impl CanonicalSerialize for CopyConstraints {
    fn serialize<W: Write>(
        &self,
        mut writer: W,
    ) -> Result<(), SerializationError> {
        self.cycles.serialize(&mut writer)?;
        (self.sigma.len() as u64).serialize(&mut writer)?;
        for row in self.sigma.iter() {
            for wire in row.iter() {
                wire.serialize(&mut writer)?;
            }
        }
        Ok(())
    }

    fn serialized_size(&self) -> usize {
        self.cycles.serialized_size()
            + 8
            + self
                .sigma
                .iter()
                .flatten()
                .map(CanonicalSerialize::serialized_size)
                .sum::<usize>()
    }
}

impl CanonicalDeserialize for CopyConstraints {
    fn deserialize<R: Read>(mut reader: R) -> Result<Self, SerializationError> {
        let cycles = Vec::<Vec<WireData>>::deserialize(&mut reader)?;
        let rows = u64::deserialize(&mut reader)? as usize;
        let mut sigma = Vec::new();
        for _ in 0..rows {
            let mut row = [WireData::Left(0); WIRES];
            for wire in row.iter_mut() {
                *wire = WireData::deserialize(&mut reader)?;
            }
            sigma.push(row);
        }
        Ok(Self { cycles, sigma })
    }
}
