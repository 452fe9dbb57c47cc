use crate::dynamics::{BooleanDynamics, TransitionFunction};
use crate::{Network, RuleSet, State};

impl BooleanDynamics {
    pub fn new(rules: RuleSet) -> BooleanDynamics {
        BooleanDynamics { rules }
    }

    pub fn as_rule_set(&self) -> &RuleSet {
        &self.rules
    }
}

impl TransitionFunction for BooleanDynamics {
    fn as_network(&self) -> &Network {
        self.rules.as_network()
    }

    fn successor(&self, state: &State) -> State {
        let mut result = state.clone();
        for node in self.rules.as_network().nodes() {
            if let Some(rule) = self.rules.get_rule(node) {
                result.set(node.to_index(), rule.evaluate(state));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::dynamics::{BooleanDynamics, TransitionFunction};
    use crate::{Network, Node, Rule, RuleSet, State};

    fn dynamics(rules: &[(&str, &str)]) -> BooleanDynamics {
        let network = Network::new(vec![
            Node::unlabeled("a"),
            Node::unlabeled("b"),
            Node::unlabeled("c"),
        ])
        .unwrap();
        let rules: Vec<Rule> = rules.iter().map(|(t, e)| Rule::new(t, e)).collect();
        BooleanDynamics::new(RuleSet::compile(&network, &rules).unwrap())
    }

    #[test]
    fn synchronous_update_reads_current_state() {
        // A rotation only works if all nodes read the same source state.
        let dynamics = dynamics(&[("a", "c"), ("b", "a"), ("c", "b")]);
        let state = State::from_binary_string("100").unwrap();
        let next = dynamics.successor(&state);
        assert_eq!("010", next.to_binary_string());
        assert_eq!("001", dynamics.successor(&next).to_binary_string());
    }

    #[test]
    fn frozen_nodes_keep_value() {
        let dynamics = dynamics(&[("b", "!a"), ("c", "c")]);
        for index in 0..8 {
            let state = State::from_index(3, index);
            let next = dynamics.successor(&state);
            assert_eq!(state.get(0), next.get(0));
            assert_eq!(!state.get(0), next.get(1));
            assert_eq!(state.get(2), next.get(2));
        }
    }
}
