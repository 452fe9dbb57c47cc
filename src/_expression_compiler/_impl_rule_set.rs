use crate::_expression_compiler::compile_expression;
use crate::{CompiledRule, Network, NodeId, ParseError, ParseErrorKind, Rule, RuleSet};
use log::debug;

/// Methods for safely building `RuleSet`s.
impl RuleSet {
    /// Compile all `rules` against the nodes of the given `network`.
    ///
    /// Rule targets are resolved the same way as identifiers inside expressions
    /// (case-insensitive, ids and labels). Each node can have at most one rule; nodes
    /// without a rule are frozen. The first invalid rule aborts the compilation.
    pub fn compile(network: &Network, rules: &[Rule]) -> Result<RuleSet, ParseError> {
        let mut compiled: Vec<Option<CompiledRule>> = vec![None; network.num_nodes()];
        for rule in rules {
            let error =
                |kind: ParseErrorKind| ParseError::new(rule.target(), rule.expression(), kind);
            let target = network.resolve_identifier(rule.target()).map_err(error)?;
            if compiled[target.to_index()].is_some() {
                return Err(error(ParseErrorKind::DuplicateRule));
            }
            let program = compile_expression(rule.expression(), network).map_err(error)?;
            compiled[target.to_index()] = Some(program);
        }
        debug!(
            "Compiled {} rules over {} nodes ({} frozen).",
            rules.len(),
            network.num_nodes(),
            compiled.iter().filter(|it| it.is_none()).count()
        );
        Ok(RuleSet {
            network: network.clone(),
            rules: compiled,
        })
    }
}

/// Some basic utility methods for inspecting the `RuleSet`.
impl RuleSet {
    pub fn as_network(&self) -> &Network {
        &self.network
    }

    pub fn num_nodes(&self) -> usize {
        self.network.num_nodes()
    }

    /// The compiled rule of the given node, or `None` if the node is frozen.
    pub fn get_rule(&self, node: NodeId) -> Option<&CompiledRule> {
        self.rules[node.to_index()].as_ref()
    }

    /// True if the node has no rule and therefore keeps its initial value.
    pub fn is_frozen(&self, node: NodeId) -> bool {
        self.rules[node.to_index()].is_none()
    }

    /// All nodes without a rule, in node order.
    pub fn frozen_nodes(&self) -> Vec<NodeId> {
        self.network
            .nodes()
            .filter(|it| self.is_frozen(*it))
            .collect()
    }
}
