//! Synchronous transition functions.
//!
//! In one synchronous step, every node computes its next value from the *same* current
//! state. The explorer only depends on the [`TransitionFunction`] trait, so the boolean
//! rules and the weighted threshold dynamics are explored by exactly the same code.

use crate::config::TieBehavior;
use crate::{Network, NodeId, RuleSet, State};

mod _impl_boolean_dynamics;
mod _impl_weighted_dynamics;

/// Inputs whose weighted sum is within this distance of the threshold are a tie.
pub const TIE_TOLERANCE: f64 = 1e-9;

/// A deterministic synchronous update over states of a fixed width.
pub trait TransitionFunction {
    /// The network whose states this function transforms.
    fn as_network(&self) -> &Network;

    /// Compute the unique successor of `state`.
    fn successor(&self, state: &State) -> State;

    fn num_nodes(&self) -> usize {
        self.as_network().num_nodes()
    }
}

/// Boolean dynamics given by a compiled `RuleSet`. Frozen nodes keep their value.
#[derive(Clone, Debug)]
pub struct BooleanDynamics {
    rules: RuleSet,
}

/// Threshold dynamics given by weighted edges and per-node biases.
///
/// A node with no incoming edge and no bias is frozen.
#[derive(Clone, Debug)]
pub struct WeightedDynamics {
    network: Network,
    /// Incoming `(source, weight)` pairs of every node, parallel edges already merged.
    inputs: Vec<Vec<(NodeId, f64)>>,
    bias: Vec<f64>,
    threshold: Vec<f64>,
    frozen: Vec<bool>,
    tie: TieBehavior,
}
