// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Copyright (c) ZK-GARAGE. All rights reserved.

//! Build configuration.

/// Knobs of a single build.
///
/// ```
/// use plonk_builder::prelude::ComposerConfig;
///
/// let config = ComposerConfig::new()
///     .check_gates(true)
///     .max_variables(1 << 20)
///     .expected_size(1024);
/// assert!(config.checks_gates());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ComposerConfig {
    pub(crate) check_gates: bool,
    pub(crate) max_variables: Option<usize>,
    pub(crate) expected_size: usize,
}

impl ComposerConfig {
    /// Default configuration: no self-check, unbounded allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every row against the witness as it is emitted in prover mode.
    pub fn check_gates(mut self, check: bool) -> Self {
        self.check_gates = check;
        self
    }

    /// Caps the number of variables of the build.
    pub fn max_variables(mut self, limit: usize) -> Self {
        self.max_variables = Some(limit);
        self
    }

    /// Pre-allocates room for `expected_size` rows and variables.
    pub fn expected_size(mut self, expected_size: usize) -> Self {
        self.expected_size = expected_size;
        self
    }

    /// Whether the prover-mode self-check is enabled.
    pub fn checks_gates(&self) -> bool {
        self.check_gates
    }

    pub(crate) fn variable_limit(&self) -> usize {
        self.max_variables.unwrap_or(usize::MAX)
    }
}
