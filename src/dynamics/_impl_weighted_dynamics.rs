use crate::config::{ThresholdPolicy, TieBehavior};
use crate::dynamics::{TransitionFunction, WeightedDynamics, TIE_TOLERANCE};
use crate::{AnalysisError, Edge, Network, NodeId, State};
use log::debug;

impl WeightedDynamics {
    /// Build the threshold dynamics of `network` from weighted `edges` and `(node, bias)`
    /// pairs.
    ///
    /// Edge endpoints and bias targets are resolved like rule identifiers (ids or labels,
    /// case-insensitive). Parallel edges and repeated biases accumulate.
    pub fn new(
        network: &Network,
        edges: &[Edge],
        biases: &[(String, f64)],
        policy: ThresholdPolicy,
    ) -> Result<WeightedDynamics, AnalysisError> {
        policy.validate()?;
        let num_nodes = network.num_nodes();
        let mut inputs: Vec<Vec<(NodeId, f64)>> = vec![Vec::new(); num_nodes];
        let mut bias = vec![0.0; num_nodes];
        let mut has_bias = vec![false; num_nodes];

        for edge in edges {
            if !edge.weight().is_finite() {
                return Err(AnalysisError::config(format!(
                    "Edge `{}` has a non-finite weight.",
                    edge
                )));
            }
            let source = resolve_endpoint(network, edge.source(), &edge.to_string())?;
            let target = resolve_endpoint(network, edge.target(), &edge.to_string())?;
            let incoming = &mut inputs[target.to_index()];
            if let Some(existing) = incoming.iter_mut().find(|(id, _)| *id == source) {
                existing.1 += edge.weight();
            } else {
                incoming.push((source, edge.weight()));
            }
        }

        for (node, value) in biases {
            if !value.is_finite() {
                return Err(AnalysisError::config(format!(
                    "Bias of `{}` is not finite.",
                    node
                )));
            }
            let id = resolve_endpoint(network, node, &format!("bias {}", node))?;
            bias[id.to_index()] += *value;
            has_bias[id.to_index()] = true;
        }

        let threshold: Vec<f64> = inputs
            .iter()
            .map(|incoming| {
                let positive: f64 = incoming.iter().map(|(_, w)| w.max(0.0)).sum();
                policy.multiplier() * positive
            })
            .collect();
        let frozen: Vec<bool> = (0..num_nodes)
            .map(|i| inputs[i].is_empty() && !has_bias[i])
            .collect();

        debug!(
            "Weighted dynamics with {} edges over {} nodes ({} frozen).",
            edges.len(),
            num_nodes,
            frozen.iter().filter(|it| **it).count()
        );

        Ok(WeightedDynamics {
            network: network.clone(),
            inputs,
            bias,
            threshold,
            frozen,
            tie: policy.tie(),
        })
    }

    /// True if the node has no incoming edge and no bias.
    pub fn is_frozen(&self, node: NodeId) -> bool {
        self.frozen[node.to_index()]
    }

    /// The threshold `multiplier * W+` of the given node.
    pub fn threshold(&self, node: NodeId) -> f64 {
        self.threshold[node.to_index()]
    }

    /// Merged incoming `(source, weight)` pairs of the given node.
    pub fn inputs(&self, node: NodeId) -> &[(NodeId, f64)] {
        &self.inputs[node.to_index()]
    }

    /// Weighted input `bias + sum(weight * value)` of a node, reading source values
    /// from `values` (indexed by node position).
    pub fn raw_input(&self, node: NodeId, values: &[f64]) -> f64 {
        self.raw_input_with(node, |i| values[i])
    }

    /// Compare the weighted input of a node with its threshold.
    ///
    /// Returns `None` if the node keeps its current value, which is the case for frozen
    /// nodes and for ties under `TieBehavior::Hold`.
    pub fn threshold_output(&self, node: NodeId, raw: f64) -> Option<bool> {
        if self.is_frozen(node) {
            return None;
        }
        let theta = self.threshold(node);
        if (raw - theta).abs() <= TIE_TOLERANCE {
            match self.tie {
                TieBehavior::Hold => None,
                TieBehavior::ForceOn => Some(true),
                TieBehavior::ForceOff => Some(false),
            }
        } else {
            Some(raw > theta)
        }
    }

    /// **(internal)** Weighted input with source values given by a closure.
    fn raw_input_with<F>(&self, node: NodeId, value: F) -> f64
    where
        F: Fn(usize) -> f64,
    {
        self.inputs[node.to_index()]
            .iter()
            .fold(self.bias[node.to_index()], |acc, (source, weight)| {
                acc + weight * value(source.to_index())
            })
    }
}

impl TransitionFunction for WeightedDynamics {
    fn as_network(&self) -> &Network {
        &self.network
    }

    fn successor(&self, state: &State) -> State {
        let mut result = state.clone();
        for node in self.network.nodes() {
            let raw = self.raw_input_with(node, |i| if state.get(i) { 1.0 } else { 0.0 });
            if let Some(value) = self.threshold_output(node, raw) {
                result.set(node.to_index(), value);
            }
        }
        result
    }
}

/// **(internal)** Resolve an edge endpoint or bias target, turning failures into
/// configuration errors.
fn resolve_endpoint(network: &Network, name: &str, context: &str) -> Result<NodeId, AnalysisError> {
    network
        .resolve_identifier(name)
        .map_err(|kind| AnalysisError::config(format!("Cannot resolve `{}`: {}", context, kind)))
}

#[cfg(test)]
mod tests {
    use crate::config::{ThresholdPolicy, TieBehavior};
    use crate::dynamics::{TransitionFunction, WeightedDynamics};
    use crate::{Edge, Network, Node, NodeId, State};

    fn network() -> Network {
        Network::new(vec![
            Node::unlabeled("a"),
            Node::unlabeled("b"),
            Node::unlabeled("c"),
        ])
        .unwrap()
    }

    fn policy(tie: TieBehavior) -> ThresholdPolicy {
        ThresholdPolicy::new(0.5, tie)
    }

    #[test]
    fn threshold_and_frozen_nodes() {
        let edges = vec![
            Edge::new("a", "b", 2.0),
            Edge::new("c", "b", -1.0),
            Edge::new("a", "b", 1.0),
        ];
        let dynamics =
            WeightedDynamics::new(&network(), &edges, &[], policy(TieBehavior::Hold)).unwrap();
        let b = NodeId::from_index(1);
        // Parallel edges merge, `W+` only counts the positive weight.
        assert_eq!(
            &[(NodeId::from_index(0), 3.0), (NodeId::from_index(2), -1.0)],
            dynamics.inputs(b)
        );
        assert_eq!(1.5, dynamics.threshold(b));
        assert!(dynamics.is_frozen(NodeId::from_index(0)));
        assert!(!dynamics.is_frozen(b));
        assert!(dynamics.is_frozen(NodeId::from_index(2)));

        assert_eq!(2.0, dynamics.raw_input(b, &[1.0, 0.0, 1.0]));
        assert_eq!(Some(true), dynamics.threshold_output(b, 2.0));
        assert_eq!(Some(false), dynamics.threshold_output(b, 1.0));
        assert_eq!(None, dynamics.threshold_output(NodeId::from_index(0), 5.0));
    }

    #[test]
    fn tie_behavior() {
        // `b` has raw input 1.0 and threshold 0.5 * 2.0 = 1.0 when only `a` is active.
        let edges = vec![Edge::new("a", "b", 1.0), Edge::new("c", "b", 1.0)];
        let state = State::from_binary_string("100").unwrap();
        let flipped = State::from_binary_string("110").unwrap();

        let hold =
            WeightedDynamics::new(&network(), &edges, &[], policy(TieBehavior::Hold)).unwrap();
        assert_eq!(state, hold.successor(&state));
        assert_eq!(flipped, hold.successor(&flipped));

        let on =
            WeightedDynamics::new(&network(), &edges, &[], policy(TieBehavior::ForceOn)).unwrap();
        assert_eq!(flipped, on.successor(&state));

        let off =
            WeightedDynamics::new(&network(), &edges, &[], policy(TieBehavior::ForceOff)).unwrap();
        assert_eq!(state, off.successor(&flipped));
    }

    #[test]
    fn bias_unfreezes_node() {
        let biases = vec![("A".to_string(), 0.5)];
        let dynamics =
            WeightedDynamics::new(&network(), &[], &biases, policy(TieBehavior::Hold)).unwrap();
        assert!(!dynamics.is_frozen(NodeId::from_index(0)));
        let next = dynamics.successor(&State::empty(3));
        assert_eq!("100", next.to_binary_string());
    }

    #[test]
    fn invalid_edges() {
        let p = policy(TieBehavior::Hold);
        let unknown = vec![Edge::new("a", "d", 1.0)];
        assert!(WeightedDynamics::new(&network(), &unknown, &[], p).is_err());
        let infinite = vec![Edge::new("a", "b", f64::INFINITY)];
        assert!(WeightedDynamics::new(&network(), &infinite, &[], p).is_err());
        let nan_bias = vec![("a".to_string(), f64::NAN)];
        assert!(WeightedDynamics::new(&network(), &[], &nan_bias, p).is_err());
    }
}
