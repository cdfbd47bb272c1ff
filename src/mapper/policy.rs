//! Mapping policies: how raw tokens become numbers, per dimension.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{element::Element, Datatype, DimensionState};
use crate::error::ParseError;

/// Decides how the tokens of one dimension are turned into numbers.
pub trait MapPolicy {
    /// Whether every token must be seen by [`MapPolicy::map_first_pass`]
    /// before any value is produced.
    fn needs_first_pass(&self) -> bool;

    /// Observe a token during the first pass. Produces no value.
    fn map_first_pass<T: Element>(&self, token: &str, state: &mut DimensionState);

    /// Produce the final value of `token` in `dimension`.
    fn map_string<T: Element>(
        &self,
        token: &str,
        dimension: usize,
        state: &mut DimensionState,
    ) -> Result<T, ParseError>;

    /// Value produced by the token registered under `code`.
    fn mapped_value<T: Element>(&self, code: usize) -> T;
}

/// Auto-categorical encoding.
///
/// The first pass marks a dimension categorical as soon as one of its tokens
/// is not a number. Categorical dimensions map every token (numbers included)
/// to sequential codes in order of first appearance; numeric dimensions pass
/// numbers through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementPolicy {
    force_all_mappings: bool,
}

impl IncrementPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every token of every dimension, even ones that parse as numbers.
    pub fn with_force_all_mappings(force_all_mappings: bool) -> Self {
        Self { force_all_mappings }
    }

    pub fn force_all_mappings(&self) -> bool {
        self.force_all_mappings
    }
}

impl MapPolicy for IncrementPolicy {
    fn needs_first_pass(&self) -> bool {
        true
    }

    fn map_first_pass<T: Element>(&self, token: &str, state: &mut DimensionState) {
        if state.datatype() == Datatype::Categorical {
            return;
        }
        if T::parse_token(token).is_none() {
            state.set_datatype(Datatype::Categorical);
        }
    }

    fn map_string<T: Element>(
        &self,
        token: &str,
        _dimension: usize,
        state: &mut DimensionState,
    ) -> Result<T, ParseError> {
        if state.datatype() == Datatype::Numeric && !self.force_all_mappings {
            if let Some(value) = T::parse_token(token) {
                return Ok(value);
            }
        }
        // anything mapped makes the dimension categorical
        state.set_datatype(Datatype::Categorical);
        Ok(T::from_code(state.register(token)))
    }

    fn mapped_value<T: Element>(&self, code: usize) -> T {
        T::from_code(code)
    }
}

/// Numbers only: a token that does not parse fails the load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericPolicy;

impl MapPolicy for NumericPolicy {
    fn needs_first_pass(&self) -> bool {
        false
    }

    fn map_first_pass<T: Element>(&self, _token: &str, _state: &mut DimensionState) {}

    fn map_string<T: Element>(
        &self,
        token: &str,
        dimension: usize,
        _state: &mut DimensionState,
    ) -> Result<T, ParseError> {
        T::parse_token(token).ok_or_else(|| ParseError {
            token: token.to_string(),
            dimension,
        })
    }

    fn mapped_value<T: Element>(&self, code: usize) -> T {
        T::from_code(code)
    }
}

/// Missing-value encoding: configured missing tokens, and any token that is
/// not a number, load as NaN and are remembered in the dimension mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingPolicy {
    missing: BTreeSet<String>,
}

impl MissingPolicy {
    pub fn new<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn missing(&self) -> &BTreeSet<String> {
        &self.missing
    }
}

impl MapPolicy for MissingPolicy {
    fn needs_first_pass(&self) -> bool {
        false
    }

    fn map_first_pass<T: Element>(&self, _token: &str, _state: &mut DimensionState) {}

    fn map_string<T: Element>(
        &self,
        token: &str,
        _dimension: usize,
        state: &mut DimensionState,
    ) -> Result<T, ParseError> {
        if !self.missing.contains(token) {
            if let Some(value) = T::parse_token(token) {
                return Ok(value);
            }
        }
        state.register(token);
        Ok(T::nan())
    }

    fn mapped_value<T: Element>(&self, _code: usize) -> T {
        T::nan()
    }
}

/// A policy chosen at run time (from flags or a config file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Policy {
    Increment(IncrementPolicy),
    Numeric(NumericPolicy),
    Missing(MissingPolicy),
}

impl Default for Policy {
    fn default() -> Self {
        Policy::Increment(IncrementPolicy::default())
    }
}

impl From<IncrementPolicy> for Policy {
    fn from(p: IncrementPolicy) -> Self {
        Policy::Increment(p)
    }
}

impl From<NumericPolicy> for Policy {
    fn from(p: NumericPolicy) -> Self {
        Policy::Numeric(p)
    }
}

impl From<MissingPolicy> for Policy {
    fn from(p: MissingPolicy) -> Self {
        Policy::Missing(p)
    }
}

impl MapPolicy for Policy {
    fn needs_first_pass(&self) -> bool {
        match self {
            Policy::Increment(p) => p.needs_first_pass(),
            Policy::Numeric(p) => p.needs_first_pass(),
            Policy::Missing(p) => p.needs_first_pass(),
        }
    }

    fn map_first_pass<T: Element>(&self, token: &str, state: &mut DimensionState) {
        match self {
            Policy::Increment(p) => p.map_first_pass::<T>(token, state),
            Policy::Numeric(p) => p.map_first_pass::<T>(token, state),
            Policy::Missing(p) => p.map_first_pass::<T>(token, state),
        }
    }

    fn map_string<T: Element>(
        &self,
        token: &str,
        dimension: usize,
        state: &mut DimensionState,
    ) -> Result<T, ParseError> {
        match self {
            Policy::Increment(p) => p.map_string(token, dimension, state),
            Policy::Numeric(p) => p.map_string(token, dimension, state),
            Policy::Missing(p) => p.map_string(token, dimension, state),
        }
    }

    fn mapped_value<T: Element>(&self, code: usize) -> T {
        match self {
            Policy::Increment(p) => p.mapped_value(code),
            Policy::Numeric(p) => p.mapped_value(code),
            Policy::Missing(p) => p.mapped_value(code),
        }
    }
}
