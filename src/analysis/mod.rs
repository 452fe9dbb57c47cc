//! Entry points of the analysis and the types of its inputs and outputs.
//!
//! An analysis takes a [`NetworkDefinition`] and a [`DynamicsMode`](crate::DynamicsMode),
//! validates and compiles everything up front, and then produces one immutable
//! [`AnalysisResult`]. Structural problems (invalid rules, unknown nodes, bad parameters)
//! are errors. Exhausted caps and cancellation are not: the best partial result is
//! returned with `truncated` set and a warning explaining why.

use crate::attractors::Attractor;
use crate::{Edge, Node, Rule};
use log::warn;
use num_bigint::BigUint;
use std::collections::BTreeMap;

mod _impl_analysis_result;
mod _impl_analyze;
mod _impl_network_definition;

pub use _impl_analyze::{analyze, analyze_with_cancellation};

/// Everything the caller supplies about one network.
///
/// The node list fixes the bit position of every node in every `State` and the column
/// order of every export. Rules are used by the deterministic mode, edges and biases by
/// the weighted and probabilistic modes.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkDefinition {
    nodes: Vec<Node>,
    #[cfg_attr(feature = "serde", serde(default))]
    rules: Vec<Rule>,
    #[cfg_attr(feature = "serde", serde(default))]
    edges: Vec<Edge>,
    #[cfg_attr(feature = "serde", serde(default))]
    biases: Vec<(String, f64)>,
}

/// The outcome of one analysis.
///
/// The basin sizes of all attractors add up to `explored_state_count`. Initial states
/// whose trajectory exhausted the step cap are only counted in `unresolved_state_count`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisResult {
    node_order: Vec<String>,
    node_labels: BTreeMap<String, String>,
    explored_state_count: u64,
    unresolved_state_count: u64,
    #[cfg_attr(feature = "serde", serde(with = "decimal_string"))]
    total_state_space: BigUint,
    attractors: Vec<Attractor>,
    warnings: Vec<String>,
    truncated: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    marginals: Option<Vec<f64>>,
    #[cfg_attr(feature = "serde", serde(default))]
    converged: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    iterations: Option<usize>,
}

/// **(internal)** Record a non-fatal problem in the result and mirror it to the log.
pub(crate) fn report_warning(warnings: &mut Vec<String>, message: String) {
    warn!("{}", message);
    warnings.push(message);
}

/// **(internal)** `BigUint` values are exact even beyond `u64`, so they are serialized as
/// decimal strings.
#[cfg(feature = "serde")]
mod decimal_string {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let value = String::deserialize(deserializer)?;
        BigUint::from_str(&value).map_err(serde::de::Error::custom)
    }
}
