//! Per-dimension token → number mapping shared by both load passes.

pub mod element;
pub mod policy;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::MapError;

pub use element::Element;
pub use policy::{IncrementPolicy, MapPolicy, MissingPolicy, NumericPolicy, Policy};

/// Classification of one dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    #[default]
    Numeric,
    Categorical,
}

impl Datatype {
    pub fn as_str(&self) -> &str {
        match self {
            Datatype::Numeric => "numeric",
            Datatype::Categorical => "categorical",
        }
    }
}

/// Mapping state of a single dimension.
///
/// Codes are positions in `tokens`: the n-th distinct token registered gets
/// code n, and a token keeps its code for the life of the state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredDimension", into = "StoredDimension")]
pub struct DimensionState {
    datatype: Datatype,
    tokens: Vec<String>,
    codes: HashMap<String, usize>,
    next_code: usize,
}

impl DimensionState {
    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    pub fn set_datatype(&mut self, datatype: Datatype) {
        self.datatype = datatype;
    }

    /// Code of `token`, registering it under the next code on first sight.
    pub fn register(&mut self, token: &str) -> usize {
        if let Some(&code) = self.codes.get(token) {
            return code;
        }
        let code = self.next_code;
        self.codes.insert(token.to_string(), code);
        self.tokens.push(token.to_string());
        self.next_code += 1;
        code
    }

    pub fn code(&self, token: &str) -> Option<usize> {
        self.codes.get(token).copied()
    }

    pub fn token(&self, code: usize) -> Option<&str> {
        self.tokens.get(code).map(String::as_str)
    }

    /// Registered tokens in code order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn num_mappings(&self) -> usize {
        self.next_code
    }
}

/// Serialized form: the code table is rebuilt from token order on load.
#[derive(Serialize, Deserialize)]
struct StoredDimension {
    datatype: Datatype,
    tokens: Vec<String>,
}

impl From<StoredDimension> for DimensionState {
    fn from(stored: StoredDimension) -> Self {
        let mut state = DimensionState {
            datatype: stored.datatype,
            ..DimensionState::default()
        };
        for token in &stored.tokens {
            state.register(token);
        }
        state
    }
}

impl From<DimensionState> for StoredDimension {
    fn from(state: DimensionState) -> Self {
        StoredDimension {
            datatype: state.datatype,
            tokens: state.tokens,
        }
    }
}

/// One [`DimensionState`] per dimension plus the policy that drives them.
///
/// The slot count is fixed at construction; [`DatasetMapper::reset`] discards
/// all state and re-creates the slots for a new load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMapper<P = IncrementPolicy> {
    policy: P,
    dimensions: Vec<DimensionState>,
}

/// The usual mapper: auto-categorical encoding.
pub type DatasetInfo = DatasetMapper<IncrementPolicy>;

impl<P: MapPolicy + Default> DatasetMapper<P> {
    pub fn new(dimensionality: usize) -> Self {
        Self::with_policy(P::default(), dimensionality)
    }
}

impl<P: Default> Default for DatasetMapper<P> {
    fn default() -> Self {
        Self {
            policy: P::default(),
            dimensions: Vec::new(),
        }
    }
}

impl<P: MapPolicy> DatasetMapper<P> {
    pub fn with_policy(policy: P, dimensionality: usize) -> Self {
        Self {
            policy,
            dimensions: vec![DimensionState::default(); dimensionality],
        }
    }

    /// Drop every mapping and re-create `dimensionality` fresh slots, keeping the policy.
    pub fn reset(&mut self, dimensionality: usize) {
        self.dimensions = vec![DimensionState::default(); dimensionality];
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimension(&self, dimension: usize) -> Option<&DimensionState> {
        self.dimensions.get(dimension)
    }

    pub fn dimensions(&self) -> &[DimensionState] {
        &self.dimensions
    }

    fn state_mut(&mut self, dimension: usize) -> Result<&mut DimensionState, MapError> {
        slot(&mut self.dimensions, dimension)
    }

    /// First-pass observation of `token` in `dimension`.
    pub fn map_first_pass<T: Element>(
        &mut self,
        token: &str,
        dimension: usize,
    ) -> Result<(), MapError> {
        let state = slot(&mut self.dimensions, dimension)?;
        self.policy.map_first_pass::<T>(token, state);
        Ok(())
    }

    /// Final value of `token` in `dimension`.
    pub fn map_string<T: Element>(&mut self, token: &str, dimension: usize) -> Result<T, MapError> {
        let state = slot(&mut self.dimensions, dimension)?;
        Ok(self.policy.map_string(token, dimension, state)?)
    }

    pub fn datatype(&self, dimension: usize) -> Option<Datatype> {
        self.dimension(dimension).map(DimensionState::datatype)
    }

    pub fn set_datatype(&mut self, dimension: usize, datatype: Datatype) -> Result<(), MapError> {
        self.state_mut(dimension)?.set_datatype(datatype);
        Ok(())
    }

    /// Number of distinct tokens mapped in `dimension` (0 if out of range).
    pub fn num_mappings(&self, dimension: usize) -> usize {
        self.dimension(dimension)
            .map_or(0, DimensionState::num_mappings)
    }

    /// Mapped value of a registered token.
    pub fn unmap_value<T: Element>(&self, token: &str, dimension: usize) -> Option<T> {
        let code = self.dimension(dimension)?.code(token)?;
        Some(self.policy.mapped_value(code))
    }

    /// How many registered tokens of `dimension` map to `value`.
    pub fn num_unmappings<T: Element>(&self, value: T, dimension: usize) -> usize {
        self.tokens_for(value, dimension).count()
    }

    /// The `unmapping_index`-th token (in code order) of `dimension` that maps to `value`.
    pub fn unmap_string<T: Element>(
        &self,
        value: T,
        dimension: usize,
        unmapping_index: usize,
    ) -> Option<&str> {
        self.tokens_for(value, dimension).nth(unmapping_index)
    }

    fn tokens_for<T: Element>(&self, value: T, dimension: usize) -> impl Iterator<Item = &str> {
        self.dimension(dimension)
            .into_iter()
            .flat_map(|state| state.tokens().enumerate())
            .filter(move |(code, _)| self.policy.mapped_value::<T>(*code).same_value(value))
            .map(|(_, token)| token)
    }
}

fn slot(dimensions: &mut [DimensionState], dimension: usize) -> Result<&mut DimensionState, MapError> {
    let dimensionality = dimensions.len();
    dimensions
        .get_mut(dimension)
        .ok_or(MapError::DimensionOutOfRange {
            dimension,
            dimensionality,
        })
}
