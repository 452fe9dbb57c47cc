use crate::state::{State, StateCodec};
use crate::{AnalysisError, Network};
use std::collections::HashMap;

/// Default binarization threshold for continuous node values.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

impl StateCodec {
    /// Create a codec for the node order of the given `network`.
    pub fn new(network: &Network) -> StateCodec {
        let node_order = network.node_order();
        StateCodec {
            node_index: node_order
                .iter()
                .enumerate()
                .map(|(i, id)| (id.clone(), i))
                .collect(),
            node_order,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Use a different binarization threshold. The threshold must be in `[0,1]`.
    pub fn with_threshold(mut self, threshold: f64) -> Result<StateCodec, AnalysisError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AnalysisError::config(format!(
                "Binarization threshold must be in [0,1], got {}.",
                threshold
            )));
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Ids of the encoded nodes, in bit order.
    pub fn node_order(&self) -> &[String] {
        &self.node_order
    }

    /// Binarize one continuous value.
    pub fn binarize(&self, value: f64) -> bool {
        value >= self.threshold
    }

    /// Encode an assignment of (possibly continuous) values to node ids.
    ///
    /// Nodes missing from the assignment are `false`. Unknown node ids are an error.
    pub fn encode(&self, assignment: &HashMap<String, f64>) -> Result<State, AnalysisError> {
        let mut state = State::empty(self.node_order.len());
        for (id, value) in assignment {
            let index = self.node_index.get(id).ok_or_else(|| {
                AnalysisError::config(format!("Unknown node `{}` in state assignment.", id))
            })?;
            if self.binarize(*value) {
                state.set(*index, true);
            }
        }
        Ok(state)
    }

    /// Encode a vector of continuous values given in node order.
    pub fn encode_values(&self, values: &[f64]) -> State {
        let values: Vec<bool> = values.iter().map(|it| self.binarize(*it)).collect();
        State::from_values(&values)
    }

    /// Decode a state into a map from node ids to values.
    pub fn decode(&self, state: &State) -> HashMap<String, bool> {
        self.node_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), state.get(i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::state::StateCodec;
    use crate::{Network, Node, State};
    use std::collections::HashMap;

    fn codec() -> StateCodec {
        let network = Network::new(vec![
            Node::unlabeled("a"),
            Node::unlabeled("b"),
            Node::unlabeled("c"),
        ])
        .unwrap();
        StateCodec::new(&network)
    }

    #[test]
    fn encode_decode() {
        let codec = codec();
        let mut assignment = HashMap::new();
        assignment.insert("a".to_string(), 1.0);
        assignment.insert("c".to_string(), 0.75);
        assignment.insert("b".to_string(), 0.25);
        let state = codec.encode(&assignment).unwrap();
        assert_eq!("101", state.to_binary_string());

        let decoded = codec.decode(&state);
        assert_eq!(Some(&true), decoded.get("a"));
        assert_eq!(Some(&false), decoded.get("b"));
        assert_eq!(Some(&true), decoded.get("c"));
    }

    #[test]
    fn encode_with_threshold() {
        let codec = codec().with_threshold(0.8).unwrap();
        let state = codec.encode_values(&[0.8, 0.79, 1.0]);
        assert_eq!(State::from_binary_string("101").unwrap(), state);
        assert!(codec.clone().with_threshold(1.5).is_err());
    }

    #[test]
    fn encode_unknown_node() {
        let mut assignment = HashMap::new();
        assignment.insert("d".to_string(), 1.0);
        assert!(codec().encode(&assignment).is_err());
        // Missing nodes default to `false`.
        assert_eq!(State::empty(3), codec().encode(&HashMap::new()).unwrap());
    }
}
