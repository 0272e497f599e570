// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Expressions over field values and their canonical linear form.
//!
//! Application code never manipulates gates directly. It builds [`FieldVar`]
//! handles, which are immutable nodes of a shared expression graph, and the
//! composer only turns them into rows when an operation really needs a single
//! wire. Until then an expression is just a description of a linear
//! combination of already allocated [`Variable`]s plus a constant.
//!
//! [`reduce`] collapses such a graph into a [`LinearCombination`]. A node that
//! is reachable through several parents is visited once: the weight of every
//! node is accumulated top-down over a reverse post-order of the graph and only
//! the leaves contribute terms.

use crate::constraint_system::Variable;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use ark_ff::PrimeField;
use hashbrown::{HashMap, HashSet};

/// A node of the expression graph.
#[derive(derivative::Derivative)]
#[derivative(Debug(bound = ""))]
pub enum FieldExpr<F>
where
    F: PrimeField,
{
    /// Value known while writing the circuit.
    Const(F),
    /// Reference to an allocated variable.
    Var(Variable),
    /// `c * e`
    Scale(F, FieldVar<F>),
    /// `e1 + e2`
    Add(FieldVar<F>, FieldVar<F>),
}

/// Cheap, clonable handle to an immutable [`FieldExpr`] node.
///
/// Cloning shares the node, so expression graphs are DAGs rather than trees.
#[derive(derivative::Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct FieldVar<F>(Rc<FieldExpr<F>>)
where
    F: PrimeField;

impl<F> FieldVar<F>
where
    F: PrimeField,
{
    pub(crate) fn from_expr(expr: FieldExpr<F>) -> Self {
        Self(Rc::new(expr))
    }

    /// Returns the node this handle points to.
    pub fn expr(&self) -> &FieldExpr<F> {
        &self.0
    }

    /// Identity of the node, shared by all clones of the handle.
    fn key(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl<F> Drop for FieldVar<F>
where
    F: PrimeField,
{
    fn drop(&mut self) {
        // Children of uniquely owned nodes are unlinked and freed in a loop,
        // so dropping a deep chain does not recurse.
        let mut pending = Vec::new();
        take_children(&mut self.0, &mut pending);
        while let Some(mut node) = pending.pop() {
            take_children(&mut node.0, &mut pending);
        }
    }
}

fn take_children<F>(
    node: &mut Rc<FieldExpr<F>>,
    pending: &mut Vec<FieldVar<F>>,
) where
    F: PrimeField,
{
    if let Some(expr) = Rc::get_mut(node) {
        match core::mem::replace(expr, FieldExpr::Const(F::zero())) {
            FieldExpr::Scale(_, e) => pending.push(e),
            FieldExpr::Add(lhs, rhs) => {
                pending.push(lhs);
                pending.push(rhs);
            }
            FieldExpr::Const(_) | FieldExpr::Var(_) => {}
        }
    }
}

/// Canonical sparse form of an expression: `Σ coeff · var + constant`.
///
/// Terms are kept ordered by [`Variable`] so that every traversal of a linear
/// combination is deterministic. Coefficients are never zero.
#[derive(derivative::Derivative)]
#[derivative(
    Clone(bound = ""),
    Debug(bound = ""),
    PartialEq(bound = ""),
    Eq(bound = "")
)]
pub struct LinearCombination<F>
where
    F: PrimeField,
{
    pub(crate) terms: BTreeMap<Variable, F>,
    pub(crate) constant: F,
}

impl<F> Default for LinearCombination<F>
where
    F: PrimeField,
{
    fn default() -> Self {
        Self::constant(F::zero())
    }
}

impl<F> LinearCombination<F>
where
    F: PrimeField,
{
    /// Linear combination without terms.
    pub fn constant(value: F) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    /// `1 · var`
    pub fn variable(var: Variable) -> Self {
        let mut lc = Self::default();
        lc.add_term(var, F::one());
        lc
    }

    /// Iterates over the terms in ascending [`Variable`] order.
    pub fn terms(&self) -> impl Iterator<Item = (Variable, F)> + '_ {
        self.terms.iter().map(|(var, coeff)| (*var, *coeff))
    }

    /// Constant part of the combination.
    pub fn constant_term(&self) -> F {
        self.constant
    }

    /// Number of (non-zero) terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the combination has no terms at all.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether the combination is a plain constant.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the constant if the combination has no terms.
    pub fn as_constant(&self) -> Option<F> {
        if self.is_constant() {
            Some(self.constant)
        } else {
            None
        }
    }

    /// Returns the variable if the combination is exactly `1 · var + 0`.
    pub fn as_variable(&self) -> Option<Variable> {
        match (self.terms.len(), self.constant.is_zero()) {
            (1, true) => self
                .terms
                .iter()
                .next()
                .filter(|(_, coeff)| coeff.is_one())
                .map(|(var, _)| *var),
            _ => None,
        }
    }

    /// Coefficient of `var`, zero when absent.
    pub fn coefficient(&self, var: Variable) -> F {
        self.terms.get(&var).copied().unwrap_or_else(F::zero)
    }

    /// Adds `coeff · var`, merging with an existing term.
    pub fn add_term(&mut self, var: Variable, coeff: F) {
        if coeff.is_zero() {
            return;
        }
        let merged = self.coefficient(var) + coeff;
        if merged.is_zero() {
            self.terms.remove(&var);
        } else {
            self.terms.insert(var, merged);
        }
    }

    /// Adds `factor · other` to `self`.
    pub fn add_scaled(&mut self, other: &Self, factor: F) {
        if factor.is_zero() {
            return;
        }
        for (var, coeff) in other.terms() {
            self.add_term(var, coeff * factor);
        }
        self.constant += other.constant * factor;
    }

    /// `factor · self`
    pub fn scale(&self, factor: F) -> Self {
        let mut lc = Self::default();
        lc.add_scaled(self, factor);
        lc
    }

    /// `self - other`
    pub fn sub(&self, other: &Self) -> Self {
        let mut lc = self.clone();
        lc.add_scaled(other, -F::one());
        lc
    }

    /// Replaces every occurrence of `var` by `with`.
    pub(crate) fn substitute(&mut self, var: Variable, with: &Self) {
        if let Some(coeff) = self.terms.remove(&var) {
            self.add_scaled(with, coeff);
        }
    }

    /// Splits off the first `n` terms into a combination with zero constant.
    pub(crate) fn take_first(&mut self, n: usize) -> Self {
        let head = self.terms.keys().take(n).copied().collect::<Vec<_>>();
        let mut taken = Self::default();
        for var in head {
            if let Some(coeff) = self.terms.remove(&var) {
                taken.terms.insert(var, coeff);
            }
        }
        taken
    }

    /// Evaluates the combination against an assignment.
    pub fn evaluate<V>(&self, value: V) -> F
    where
        V: Fn(Variable) -> F,
    {
        self.terms()
            .fold(self.constant, |acc, (var, coeff)| acc + coeff * value(var))
    }
}

/// Reduces an expression graph to its [`LinearCombination`].
///
/// `aliases` maps variables that were eliminated from the circuit to the
/// combination they stand for; they are substituted while reducing. The
/// traversal is iterative, so arbitrarily long addition chains do not grow the
/// call stack.
pub fn reduce<F>(
    root: &FieldVar<F>,
    aliases: &HashMap<Variable, LinearCombination<F>>,
) -> LinearCombination<F>
where
    F: PrimeField,
{
    // Post-order: every node comes after all of its descendants.
    let mut order: Vec<&FieldVar<F>> = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![(root, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !seen.insert(node.key()) {
            continue;
        }
        stack.push((node, true));
        match node.expr() {
            FieldExpr::Scale(_, inner) => stack.push((inner, false)),
            FieldExpr::Add(lhs, rhs) => {
                stack.push((rhs, false));
                stack.push((lhs, false));
            }
            FieldExpr::Const(_) | FieldExpr::Var(_) => {}
        }
    }

    let mut weights: HashMap<usize, F> = HashMap::with_capacity(order.len());
    weights.insert(root.key(), F::one());
    let mut lc = LinearCombination::default();
    for node in order.into_iter().rev() {
        let weight = match weights.get(&node.key()) {
            Some(weight) if !weight.is_zero() => *weight,
            _ => continue,
        };
        match node.expr() {
            FieldExpr::Const(value) => lc.constant += *value * weight,
            FieldExpr::Var(var) => match aliases.get(var) {
                Some(alias) => lc.add_scaled(alias, weight),
                None => lc.add_term(*var, weight),
            },
            FieldExpr::Scale(factor, inner) => {
                *weights.entry(inner.key()).or_insert_with(F::zero) +=
                    *factor * weight;
            }
            FieldExpr::Add(lhs, rhs) => {
                *weights.entry(lhs.key()).or_insert_with(F::zero) += weight;
                *weights.entry(rhs.key()).or_insert_with(F::zero) += weight;
            }
        }
    }
    lc
}
