use crate::analysis::NetworkDefinition;
use crate::{Edge, Node, Rule};

impl NetworkDefinition {
    /// A definition with the given nodes and no rules, edges or biases.
    pub fn new(nodes: Vec<Node>) -> NetworkDefinition {
        NetworkDefinition {
            nodes,
            ..Default::default()
        }
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> NetworkDefinition {
        self.rules = rules;
        self
    }

    pub fn with_edges(mut self, edges: Vec<Edge>) -> NetworkDefinition {
        self.edges = edges;
        self
    }

    /// Set the `(node, bias)` pairs. Repeated entries for one node are added together.
    pub fn with_biases(mut self, biases: Vec<(String, f64)>) -> NetworkDefinition {
        self.biases = biases;
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn biases(&self) -> &[(String, f64)] {
        &self.biases
    }
}
