// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! A `Composer` could be understood as some sort of Trait that is actually
//! defining some kind of Circuit Builder for PLONK.
//!
//! In that sense, here we have the implementation of the [`StandardComposer`]
//! which owns every piece of state of a single build: the variable table,
//! the rows emitted so far and the permutation bookkeeping. The same
//! application code runs against a composer in [`Mode::Prover`] and in
//! [`Mode::Analysis`] and must produce the same rows in both.

use crate::config::ComposerConfig;
use crate::constraint_system::{
    FieldVar, Gate, GateKind, GenericGate, LinearCombination, Variable, WIRES,
};
use crate::error::Error;
use crate::permutation::Permutation;
use ark_ff::PrimeField;
use hashbrown::HashMap;

/// Execution mode of a build.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Variables carry concrete values, the witness is generated.
    Prover,
    /// Variables are placeholders, only the structure is recorded.
    Analysis,
}

impl Mode {
    /// Lowercase name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prover => "prover",
            Self::Analysis => "analysis",
        }
    }
}

/// The StandardComposer is the circuit-builder tool of this crate.
///
/// It stores the full circuit information of a build: the witness values (in
/// prover mode), the rows with their wires and coefficients, the public
/// inputs and the relationships between wires that make up the permutation.
///
/// Values enter the circuit as [`FieldVar`]s through
/// [`StandardComposer::public_input`], [`StandardComposer::exists`] or
/// [`StandardComposer::allocate`]. Arithmetic over them stays symbolic until
/// an operation needs a single wire, at which point the composer seals the
/// expression and emits the rows that constrain it.
#[derive(derivative::Derivative)]
#[derivative(Debug(bound = ""))]
pub struct StandardComposer<F>
where
    F: PrimeField,
{
    pub(crate) mode: Mode,
    pub(crate) config: ComposerConfig,

    /// Witness values indexed by variable. Empty in analysis mode.
    pub(crate) values: Vec<F>,

    /// Variables removed from the rows, with the combination they equal.
    pub(crate) aliases: HashMap<Variable, LinearCombination<F>>,

    /// Rows in emission order.
    pub(crate) gates: Vec<Gate<F>>,

    /// Number of public inputs. They own the first variables and rows.
    pub(crate) public_inputs: usize,

    /// Permutation argument.
    pub(crate) perm: Permutation,
}

impl<F> StandardComposer<F>
where
    F: PrimeField,
{
    /// Creates an empty composer running in `mode`.
    pub fn new(mode: Mode) -> Self {
        Self::with_config(mode, ComposerConfig::default())
    }

    /// Creates an empty composer generating a witness.
    pub fn prover() -> Self {
        Self::new(Mode::Prover)
    }

    /// Creates an empty composer recording structure only.
    pub fn analysis() -> Self {
        Self::new(Mode::Analysis)
    }

    /// Creates an empty composer with an explicit configuration.
    ///
    /// The `expected_size` of the configuration is used to pre-allocate the
    /// row and variable vectors.
    pub fn with_config(mode: Mode, config: ComposerConfig) -> Self {
        let expected_size = config.expected_size;
        let values = match mode {
            Mode::Prover => Vec::with_capacity(expected_size),
            Mode::Analysis => Vec::new(),
        };
        Self {
            mode,
            config,
            values,
            aliases: HashMap::new(),
            gates: Vec::with_capacity(expected_size),
            public_inputs: 0,
            perm: Permutation::with_capacity(expected_size),
        }
    }

    /// Mode of the build.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Configuration of the build.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Number of rows emitted so far.
    pub fn n(&self) -> usize {
        self.gates.len()
    }

    /// Number of variables allocated so far.
    pub fn variable_count(&self) -> usize {
        self.perm.variable_count()
    }

    /// Number of public inputs.
    pub fn public_input_count(&self) -> usize {
        self.public_inputs
    }

    /// Rows emitted so far.
    pub fn gates(&self) -> &[Gate<F>] {
        &self.gates
    }

    fn unavailable(&self) -> Error {
        Error::WitnessUnavailable {
            mode: self.mode.name(),
        }
    }

    /// Allocates a new [`Variable`].
    ///
    /// In prover mode the value is mandatory, in analysis mode it is
    /// ignored.
    pub fn allocate(&mut self, value: Option<F>) -> Result<Variable, Error> {
        let value = match (self.mode, value) {
            (Mode::Prover, Some(value)) => Some(value),
            (Mode::Prover, None) => return Err(self.unavailable()),
            (Mode::Analysis, _) => None,
        };
        let var = self.perm.new_variable(self.config.variable_limit())?;
        if let Some(value) = value {
            self.values.push(value);
        }
        Ok(var)
    }

    /// Allocates a new [`Variable`] whose value is computed by `witness`.
    ///
    /// The closure only runs in prover mode, it may read the values of
    /// existing variables through [`StandardComposer::read_value`].
    pub fn allocate_with<W>(&mut self, witness: W) -> Result<Variable, Error>
    where
        W: FnOnce(&Self) -> Result<F, Error>,
    {
        let value = match self.mode {
            Mode::Prover => Some(witness(self)?),
            Mode::Analysis => None,
        };
        self.allocate(value)
    }

    /// Private witness computed by `witness`, see
    /// [`StandardComposer::allocate_with`].
    pub fn exists<W>(&mut self, witness: W) -> Result<FieldVar<F>, Error>
    where
        W: FnOnce(&Self) -> Result<F, Error>,
    {
        self.allocate_with(witness).map(FieldVar::variable)
    }

    /// Private witness with an optional value, see
    /// [`StandardComposer::allocate`].
    pub fn witness(&mut self, value: Option<F>) -> Result<FieldVar<F>, Error> {
        self.allocate(value).map(FieldVar::variable)
    }

    /// Allocates a public input and emits its row `[v, -, -, -]`, `q_l = 1`.
    /// The backend supplies `-value` as the public input term of the row.
    ///
    /// # Panics
    ///
    /// If any other variable or row exists already.
    pub fn public_input(&mut self, value: Option<F>) -> Result<FieldVar<F>, Error> {
        assert!(
            self.perm.variable_count() == self.public_inputs
                && self.gates.len() == self.public_inputs,
            "public inputs must be allocated before any other variable or row"
        );
        let var = self.allocate(value)?;
        self.public_inputs += 1;
        self.arithmetic_gate(|gate| gate.left(F::one(), var))?;
        Ok(FieldVar::variable(var))
    }

    /// Concrete value of `var`.
    ///
    /// # Panics
    ///
    /// If `var` was not allocated by this composer.
    pub fn value_of_var(&self, var: Variable) -> Result<F, Error> {
        assert!(
            var.0 < self.perm.variable_count(),
            "variable {} was not allocated in this build",
            var.0
        );
        match self.mode {
            Mode::Prover => Ok(self.values[var.0]),
            Mode::Analysis => Err(self.unavailable()),
        }
    }

    /// Concrete value of an expression. Constants are readable in every
    /// mode, anything else only in prover mode.
    pub fn read_value(&self, e: &FieldVar<F>) -> Result<F, Error> {
        let lc = self.reduce(e);
        if lc.is_constant() {
            return Ok(lc.constant_term());
        }
        match self.mode {
            Mode::Prover => Ok(lc.evaluate(|var| self.values[var.0])),
            Mode::Analysis => Err(self.unavailable()),
        }
    }

    /// Public input term of `row`.
    pub(crate) fn pi_term(&self, row: usize) -> F {
        match self.mode {
            Mode::Prover if row < self.public_inputs => -self.values[row],
            _ => F::zero(),
        }
    }

    /// Appends a raw row.
    ///
    /// Built-in kinds require the generic coefficient layout, custom kinds
    /// accept any number of coefficients. Every wire must come from this
    /// composer.
    pub fn emit_gate(
        &mut self,
        kind: GateKind,
        wires: &[Option<Variable>],
        coeffs: &[F],
    ) -> Result<usize, Error> {
        if wires.len() != WIRES {
            return Err(Error::ShapeMismatch {
                what: "wires",
                expected: WIRES,
                found: wires.len(),
            });
        }
        if let Some(expected) = kind.coefficient_count() {
            if coeffs.len() != expected {
                return Err(Error::ShapeMismatch {
                    what: "coefficients",
                    expected,
                    found: coeffs.len(),
                });
            }
        }
        let mut row = [None; WIRES];
        row.copy_from_slice(wires);
        self.push_gate(Gate {
            kind,
            wires: row,
            coeffs: coeffs.to_vec(),
        })
    }

    /// Function used to generate any row of the generic layout.
    pub fn arithmetic_gate<G>(&mut self, func: G) -> Result<usize, Error>
    where
        G: FnOnce(&mut GenericGate<F>) -> &mut GenericGate<F>,
    {
        let gate = {
            let mut gate = GenericGate::new();
            func(&mut gate).build()
        };
        self.push_gate(gate.into_gate(GateKind::Generic))
    }

    pub(crate) fn push_gate(&mut self, gate: Gate<F>) -> Result<usize, Error> {
        self.rebind_aliases(&gate.wires)?;

        let index = self.gates.len();
        self.perm.add_variables_to_map(&gate.wires, index);
        tracing::trace!(row = index, kind = ?gate.kind, "emitted gate");
        self.gates.push(gate);
        self.check_row(index)?;
        Ok(index)
    }

    /// A variable that was folded away and shows up on a wire again gets
    /// its defining row back.
    fn rebind_aliases(&mut self, wires: &[Option<Variable>; WIRES]) -> Result<(), Error> {
        for var in wires.iter().flatten() {
            if let Some(alias) = self.aliases.remove(var) {
                debug_assert!(alias.len() <= 1);
                let mut gate = GenericGate::new();
                if let Some((term, coeff)) = alias.terms().next() {
                    gate.left(coeff, term);
                }
                gate.output(-F::one(), *var).constant(alias.constant_term());
                self.push_gate(gate.into_gate(GateKind::Generic))?;
            }
        }
        Ok(())
    }

    /// Registers `var = lc` and drops `var` from every other alias.
    pub(crate) fn alias(&mut self, var: Variable, lc: LinearCombination<F>) {
        for other in self.aliases.values_mut() {
            other.substitute(var, &lc);
        }
        self.aliases.insert(var, lc);
    }

    /// Self-check of a single row, only active in prover mode with
    /// [`ComposerConfig::check_gates`].
    pub(crate) fn check_row(&self, index: usize) -> Result<(), Error> {
        if self.mode != Mode::Prover || !self.config.check_gates {
            return Ok(());
        }
        self.evaluate_row(index)
    }

    fn evaluate_row(&self, index: usize) -> Result<(), Error> {
        let gate = &self.gates[index];
        match gate.evaluate(|var| self.values[var.0], self.pi_term(index)) {
            Some(result) if !result.is_zero() => {
                tracing::warn!(row = index, kind = ?gate.kind, "row is not satisfied");
                Err(Error::unsatisfied_row(index, gate.kind))
            }
            _ => Ok(()),
        }
    }

    /// Checks every row and every declared equality against the witness.
    ///
    /// Rows of custom kinds are opaque and skipped. With the `trace` feature
    /// every row is logged with its wire values.
    pub fn check_circuit_satisfied(&self) -> Result<(), Error> {
        if self.mode != Mode::Prover {
            return Err(self.unavailable());
        }
        for index in 0..self.gates.len() {
            #[cfg(feature = "trace")]
            {
                let gate = &self.gates[index];
                let values = gate
                    .wires
                    .iter()
                    .map(|wire| wire.map(|var| self.values[var.0]))
                    .collect::<Vec<_>>();
                tracing::trace!(
                    row = index,
                    kind = ?gate.kind,
                    wires = ?gate.wires,
                    coeffs = ?gate.coeffs,
                    values = ?values,
                    "checking row"
                );
            }
            self.evaluate_row(index)?;
        }
        for (a, b) in self.perm.equivalences.iter() {
            if self.values[a.0] != self.values[b.0] {
                tracing::warn!(?a, ?b, "copy constraint is not satisfied");
                return Err(Error::UnsatisfiedConstraint(format!(
                    "copy constraint between {:?} and {:?}",
                    a, b
                )));
            }
        }
        Ok(())
    }
}
