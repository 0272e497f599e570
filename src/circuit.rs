// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Tools & traits for PLONK circuits

use crate::config::ComposerConfig;
use crate::constraint_system::{
    ConstraintSystem, FieldVar, Mode, StandardComposer, Variable,
};
use crate::error::Error;
use ark_ff::PrimeField;
use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write,
};

/// Number of public and private inputs a circuit takes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct InputShape {
    /// Number of public inputs.
    pub public: usize,
    /// Number of private inputs.
    pub private: usize,
}

impl InputShape {
    /// Creates a new shape.
    pub fn new(public: usize, private: usize) -> Self {
        Self { public, private }
    }
}

/// Concrete inputs of a prover-mode build.
#[derive(derivative::Derivative)]
#[derivative(
    Clone(bound = ""),
    Debug(bound = ""),
    Default(bound = ""),
    Eq(bound = ""),
    PartialEq(bound = "")
)]
pub struct CircuitInputs<F>
where
    F: PrimeField,
{
    /// Public input values, in allocation order.
    pub public: Vec<F>,
    /// Private input values, in allocation order.
    pub private: Vec<F>,
}

impl<F> CircuitInputs<F>
where
    F: PrimeField,
{
    /// Creates a new set of inputs.
    pub fn new(public: Vec<F>, private: Vec<F>) -> Self {
        Self { public, private }
    }

    /// Shape of these inputs.
    pub fn shape(&self) -> InputShape {
        InputShape::new(self.public.len(), self.private.len())
    }
}

/// Values of every variable of a prover-mode build.
///
/// The table is indexed by [`Variable`]: the first
/// [`WitnessTable::public_input_count`] entries are the public inputs.
#[derive(CanonicalDeserialize, CanonicalSerialize, derivative::Derivative)]
#[derivative(
    Clone(bound = ""),
    Debug(bound = ""),
    Eq(bound = ""),
    PartialEq(bound = "")
)]
pub struct WitnessTable<F>
where
    F: PrimeField,
{
    values: Vec<F>,
    public_inputs: u64,
}

impl<F> WitnessTable<F>
where
    F: PrimeField,
{
    /// Values of all variables.
    pub fn values(&self) -> &[F] {
        &self.values
    }

    /// Value of `var`, if it belongs to the build.
    pub fn value(&self, var: Variable) -> Option<F> {
        self.values.get(var.0).copied()
    }

    /// Number of public inputs.
    pub fn public_input_count(&self) -> usize {
        self.public_inputs as usize
    }

    /// Values of the public inputs.
    pub fn public_inputs(&self) -> &[F] {
        &self.values[..self.public_input_count()]
    }
}

/// Trait that should be implemented for any circuit function to provide to
/// it the capabilities of being built in both modes.
///
/// `synthesize` receives the public inputs first and the private inputs
/// second, and returns the outputs of the circuit. It runs once per mode and
/// must issue the same sequence of composer calls in both, it can only
/// observe concrete values through the witness closures of the composer.
///
/// Any closure with the signature of `synthesize` is a circuit.
///
/// ```
/// use ark_bls12_381::Fr;
/// use plonk_builder::prelude::*;
///
/// let circuit = |composer: &mut StandardComposer<Fr>,
///                public: &[FieldVar<Fr>],
///                private: &[FieldVar<Fr>]|
///  -> Result<Vec<FieldVar<Fr>>, Error> {
///     let product = private[0].mul(&private[1], composer)?;
///     product.assert_equals(&public[0], composer)?;
///     Ok(vec![product.add(&private[0])])
/// };
///
/// let inputs = CircuitInputs::new(
///     vec![Fr::from(12u64)],
///     vec![Fr::from(3u64), Fr::from(4u64)],
/// );
/// let (outputs, witness) = run_in_prover(&circuit, &inputs)?;
/// assert_eq!(outputs, vec![Fr::from(15u64)]);
/// assert_eq!(witness.public_inputs(), &[Fr::from(12u64)]);
///
/// let system = run_in_analysis::<Fr, _>(&circuit, inputs.shape())?;
/// assert_eq!(system.public_input_count(), 1);
/// assert!(check_mode_equivalence(&circuit, &inputs)?);
/// # Ok::<(), Error>(())
/// ```
pub trait Circuit<F>
where
    F: PrimeField,
{
    /// Fills the composer with the constraints of the circuit.
    fn synthesize(
        &self,
        composer: &mut StandardComposer<F>,
        public: &[FieldVar<F>],
        private: &[FieldVar<F>],
    ) -> Result<Vec<FieldVar<F>>, Error>;
}

impl<F, C> Circuit<F> for C
where
    F: PrimeField,
    C: Fn(
        &mut StandardComposer<F>,
        &[FieldVar<F>],
        &[FieldVar<F>],
    ) -> Result<Vec<FieldVar<F>>, Error>,
{
    fn synthesize(
        &self,
        composer: &mut StandardComposer<F>,
        public: &[FieldVar<F>],
        private: &[FieldVar<F>],
    ) -> Result<Vec<FieldVar<F>>, Error> {
        self(composer, public, private)
    }
}

/// Runs `circuit` against `composer`. Inputs are allocated public first, then
/// private, and every output is sealed into a variable.
fn build<F, C>(
    circuit: &C,
    composer: &mut StandardComposer<F>,
    public: &[Option<F>],
    private: &[Option<F>],
) -> Result<Vec<Variable>, Error>
where
    F: PrimeField,
    C: Circuit<F> + ?Sized,
{
    tracing::debug!(
        mode = composer.mode().name(),
        public = public.len(),
        private = private.len(),
        "building circuit"
    );
    let public = public
        .iter()
        .map(|value| composer.public_input(*value))
        .collect::<Result<Vec<_>, _>>()?;
    let private = private
        .iter()
        .map(|value| composer.witness(*value))
        .collect::<Result<Vec<_>, _>>()?;
    let outputs = circuit
        .synthesize(composer, &public, &private)?
        .iter()
        .map(|output| composer.seal(output))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(
        mode = composer.mode().name(),
        gates = composer.n(),
        variables = composer.variable_count(),
        "circuit built"
    );
    Ok(outputs)
}

fn prover_build<F, C>(
    circuit: &C,
    inputs: &CircuitInputs<F>,
    config: ComposerConfig,
) -> Result<(StandardComposer<F>, Vec<Variable>), Error>
where
    F: PrimeField,
    C: Circuit<F> + ?Sized,
{
    let check_gates = config.checks_gates();
    let mut composer = StandardComposer::with_config(Mode::Prover, config);
    let public = inputs.public.iter().copied().map(Some).collect::<Vec<_>>();
    let private = inputs.private.iter().copied().map(Some).collect::<Vec<_>>();
    let outputs = build(circuit, &mut composer, &public, &private)?;
    if check_gates {
        composer.check_circuit_satisfied()?;
    }
    Ok((composer, outputs))
}

/// Runs `circuit` in prover mode with the default configuration and
/// returns its output values together with the witness table.
pub fn run_in_prover<F, C>(
    circuit: &C,
    inputs: &CircuitInputs<F>,
) -> Result<(Vec<F>, WitnessTable<F>), Error>
where
    F: PrimeField,
    C: Circuit<F> + ?Sized,
{
    run_in_prover_with(circuit, inputs, ComposerConfig::default())
}

/// Runs `circuit` in prover mode with `config`.
///
/// When the configuration enables gate checking, every row is checked as it
/// is emitted and the finished build is checked as a whole, including its
/// copy constraints.
pub fn run_in_prover_with<F, C>(
    circuit: &C,
    inputs: &CircuitInputs<F>,
    config: ComposerConfig,
) -> Result<(Vec<F>, WitnessTable<F>), Error>
where
    F: PrimeField,
    C: Circuit<F> + ?Sized,
{
    let (composer, outputs) = prover_build(circuit, inputs, config)?;
    let outputs = outputs
        .into_iter()
        .map(|var| composer.value_of_var(var))
        .collect::<Result<Vec<_>, _>>()?;
    let witness = WitnessTable {
        public_inputs: composer.public_input_count() as u64,
        values: composer.values,
    };
    Ok((outputs, witness))
}

/// Runs `circuit` in analysis mode and returns the constraint system it
/// describes.
pub fn run_in_analysis<F, C>(
    circuit: &C,
    shape: InputShape,
) -> Result<ConstraintSystem<F>, Error>
where
    F: PrimeField,
    C: Circuit<F> + ?Sized,
{
    run_in_analysis_with(circuit, shape, ComposerConfig::default())
}

/// Runs `circuit` in analysis mode with `config`. Only the variable limit and
/// the expected size apply, there are no values to check.
pub fn run_in_analysis_with<F, C>(
    circuit: &C,
    shape: InputShape,
    config: ComposerConfig,
) -> Result<ConstraintSystem<F>, Error>
where
    F: PrimeField,
    C: Circuit<F> + ?Sized,
{
    let mut composer = StandardComposer::with_config(Mode::Analysis, config);
    build(
        circuit,
        &mut composer,
        &vec![None; shape.public],
        &vec![None; shape.private],
    )?;
    Ok(composer.finalize())
}

/// Builds `circuit` in both modes and tells whether the two constraint
/// systems are identical.
pub fn check_mode_equivalence<F, C>(
    circuit: &C,
    inputs: &CircuitInputs<F>,
) -> Result<bool, Error>
where
    F: PrimeField,
    C: Circuit<F> + ?Sized,
{
    let (prover, _) = prover_build(circuit, inputs, ComposerConfig::default())?;
    let analysis = run_in_analysis(circuit, inputs.shape())?;
    let equivalent = prover.finalize() == analysis;
    if !equivalent {
        tracing::warn!("prover and analysis builds differ");
    }
    Ok(equivalent)
}

impl<F> WitnessTable<F>
where
    F: PrimeField,
{
    /// Serializes the table.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = Vec::with_capacity(self.serialized_size());
        self.serialize(&mut bytes)
            .map_err(|_| Error::MalformedBytes)?;
        Ok(bytes)
    }

    /// Decodes a table produced by [`WitnessTable::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = bytes;
        let table =
            Self::deserialize(&mut reader).map_err(|_| Error::MalformedBytes)?;
        if !reader.is_empty() || table.public_input_count() > table.values.len()
        {
            return Err(Error::MalformedBytes);
        }
        Ok(table)
    }
}
