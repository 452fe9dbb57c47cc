use crate::_expression_compiler::_tokenizer::tokenize;
use crate::_expression_compiler::TokenKind;
use crate::analysis::NetworkDefinition;
use crate::{AnalysisError, Node, ParseError, Rule, ID_REGEX};
use std::collections::HashSet;

impl NetworkDefinition {
    /// Try to load a rule-based network from a `.bnet` (BoolNet) model.
    ///
    /// Every line has the form `target, expression`. Comments (`#`), empty lines and the
    /// `targets, factors` header are skipped. The node order is given by the targets in
    /// the order of their declaration, followed by input nodes (referenced, but never
    /// declared) in the order of their first use.
    pub fn try_from_bnet(model_string: &str) -> Result<NetworkDefinition, AnalysisError> {
        let mut targets: Vec<String> = Vec::new();
        let mut rules: Vec<Rule> = Vec::new();
        let mut inputs: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for line in model_string.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.is_empty() || line.starts_with("targets,") {
                continue; // Skip comments, empty lines and header.
            }
            let segments = line.split(',').collect::<Vec<_>>();
            if segments.len() != 2 {
                return Err(AnalysisError::config(format!("Unexpected line: `{}`", line)));
            }
            let target = segments[0].trim();
            if !ID_REGEX.is_match(target) {
                return Err(AnalysisError::config(format!(
                    "Invalid target name `{}`.",
                    target
                )));
            }
            if targets.iter().any(|it| it == target) {
                return Err(AnalysisError::config(format!(
                    "Duplicate function declaration for `{}`.",
                    target
                )));
            }
            let expression = segments[1].trim();
            // Also scan regulators for node names, as inputs don't need to have a function.
            let tokens = tokenize(expression)
                .map_err(|kind| ParseError::new(target, expression, kind))?;
            for token in tokens {
                if let TokenKind::Name(name) = token.kind {
                    if seen.insert(name.clone()) {
                        inputs.push(name);
                    }
                }
            }
            targets.push(target.to_string());
            rules.push(Rule::new(target, expression));
        }

        let mut nodes: Vec<Node> = targets.iter().map(|it| Node::unlabeled(it)).collect();
        for input in inputs {
            if !targets.contains(&input) {
                nodes.push(Node::unlabeled(&input));
            }
        }
        Ok(NetworkDefinition::new(nodes).with_rules(rules))
    }
}
