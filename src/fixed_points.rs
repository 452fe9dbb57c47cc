//! Exact symbolic computation of the fixed points of a boolean rule set.
//!
//! A state is a fixed point of the synchronous dynamics iff every rule-controlled node
//! already has the value of its rule. This is the same condition as for the asynchronous
//! semantics, so the set can be described by one BDD
//! `AND_i (x_i <=> f_i(x))` and enumerated without any simulation. Frozen nodes are not
//! constrained, so they can take both values in a fixed point.

use crate::{AnalysisError, BinaryOp, FnUpdate, RuleSet, State};
use biodivine_lib_bdd::{Bdd, BddVariable, BddVariableSet};
use log::debug;

/// Aggregates algorithms for computing fixed point states of a `RuleSet`.
pub struct FixedPoints {
    _dummy: (),
}

impl FixedPoints {
    /// Enumerate all fixed points of the given `rules`, in dense-integer order.
    ///
    /// If the network has more than `limit` fixed points, a configuration error is
    /// returned instead of an (unbounded) result.
    pub fn symbolic(rules: &RuleSet, limit: usize) -> Result<Vec<State>, AnalysisError> {
        let num_nodes = rules.num_nodes();
        let num_vars = u16::try_from(num_nodes).map_err(|_| {
            AnalysisError::config(format!(
                "Cannot build a symbolic encoding of {} nodes.",
                num_nodes
            ))
        })?;
        let universe = BddVariableSet::new_anonymous(num_vars);
        let variables = universe.variables();
        let candidates = FixedPoints::symbolic_set(rules, &universe, &variables);

        let cardinality = candidates.cardinality();
        debug!("Symbolic fixed-point set has {} elements.", cardinality);
        if cardinality > limit as f64 {
            return Err(AnalysisError::config(format!(
                "Network has {} fixed points, more than the limit of {}.",
                cardinality, limit
            )));
        }

        let mut result: Vec<State> = candidates
            .sat_valuations()
            .map(|valuation| {
                let values: Vec<bool> = variables.iter().map(|var| valuation[*var]).collect();
                State::from_values(&values)
            })
            .collect();
        result.sort();
        Ok(result)
    }

    /// **(internal)** The BDD of all fixed points of `rules`.
    fn symbolic_set(rules: &RuleSet, universe: &BddVariableSet, variables: &[BddVariable]) -> Bdd {
        let mut result = universe.mk_true();
        // Reverse order keeps the intermediate results small when rules are local.
        for node in rules.as_network().nodes().rev() {
            if let Some(rule) = rules.get_rule(node) {
                let update = fn_update_to_bdd(&rule.to_fn_update(), universe, variables);
                let var = universe.mk_var(variables[node.to_index()]);
                result = result.and(&var.iff(&update));
            }
        }
        result
    }
}

/// **(internal)** Translate an update function into a BDD over the given variables.
fn fn_update_to_bdd(
    function: &FnUpdate,
    universe: &BddVariableSet,
    variables: &[BddVariable],
) -> Bdd {
    match function {
        FnUpdate::Const(value) => {
            if *value {
                universe.mk_true()
            } else {
                universe.mk_false()
            }
        }
        FnUpdate::Var(id) => universe.mk_var(variables[id.to_index()]),
        FnUpdate::Not(inner) => fn_update_to_bdd(inner, universe, variables).not(),
        FnUpdate::Binary(op, left, right) => {
            let left = fn_update_to_bdd(left, universe, variables);
            let right = fn_update_to_bdd(right, universe, variables);
            match op {
                BinaryOp::And => left.and(&right),
                BinaryOp::Or => left.or(&right),
                BinaryOp::Xor => left.xor(&right),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::fixed_points::FixedPoints;
    use crate::{Network, Node, Rule, RuleSet, State};
    use pretty_assertions::assert_eq;

    fn rule_set(nodes: &[&str], rules: &[(&str, &str)]) -> RuleSet {
        let network = Network::new(nodes.iter().map(|it| Node::unlabeled(it)).collect()).unwrap();
        let rules: Vec<Rule> = rules.iter().map(|(t, e)| Rule::new(t, e)).collect();
        RuleSet::compile(&network, &rules).unwrap()
    }

    #[test]
    fn mutual_inhibition_fixed_points() {
        let rules = rule_set(&["a", "b"], &[("a", "!b"), ("b", "!a")]);
        let fixed_points = FixedPoints::symbolic(&rules, 16).unwrap();
        assert_eq!(
            vec![
                State::from_binary_string("01").unwrap(),
                State::from_binary_string("10").unwrap()
            ],
            fixed_points
        );
    }

    #[test]
    fn frozen_nodes_are_free() {
        let rules = rule_set(&["a", "b"], &[("b", "a")]);
        let fixed_points = FixedPoints::symbolic(&rules, 16).unwrap();
        assert_eq!(
            vec![
                State::from_binary_string("00").unwrap(),
                State::from_binary_string("11").unwrap()
            ],
            fixed_points
        );
    }

    #[test]
    fn oscillator_has_no_fixed_points() {
        let rules = rule_set(&["a"], &[("a", "!a")]);
        assert!(FixedPoints::symbolic(&rules, 16).unwrap().is_empty());
    }

    #[test]
    fn too_many_fixed_points() {
        let rules = rule_set(&["a", "b", "c"], &[]);
        assert!(FixedPoints::symbolic(&rules, 4).is_err());
        assert_eq!(8, FixedPoints::symbolic(&rules, 8).unwrap().len());
    }
}
