use crate::_expression_compiler::is_reserved_word;
use crate::{AnalysisError, Network, Node, NodeId, NodeIdIterator, ParseErrorKind, ID_REGEX};
use std::collections::HashMap;
use std::ops::Index;

/// Methods for safely constructing new instances of `Network`s.
impl Network {
    /// Create a new `Network` from an ordered list of nodes.
    ///
    /// The ordering of the nodes is preserved and determines the bit positions of every
    /// `State` of this network. Returns `Err` if some id is empty or appears twice.
    pub fn new(nodes: Vec<Node>) -> Result<Network, AnalysisError> {
        let mut id_to_index = HashMap::with_capacity(nodes.len());
        let mut symbols: HashMap<String, Vec<NodeId>> = HashMap::new();
        for (i, node) in nodes.iter().enumerate() {
            let id = NodeId(i);
            if node.id.trim().is_empty() {
                return Err(AnalysisError::config(format!(
                    "Node at position {} has an empty id.",
                    i
                )));
            }
            if id_to_index.insert(node.id.clone(), id).is_some() {
                return Err(AnalysisError::config(format!(
                    "Duplicate node id `{}`.",
                    node.id
                )));
            }
            for name in [&node.id, &node.label] {
                if name.trim().is_empty() {
                    continue;
                }
                let entry = symbols.entry(normalize(name)).or_default();
                if !entry.contains(&id) {
                    entry.push(id);
                }
            }
        }
        Ok(Network {
            nodes,
            id_to_index,
            symbols,
        })
    }
}

/// Some basic utility methods for inspecting the `Network`.
impl Network {
    /// The number of nodes in this `Network`.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return an iterator over all node ids of this network (in node order).
    pub fn nodes(&self) -> NodeIdIterator {
        (0..self.num_nodes()).map(NodeId)
    }

    /// Return the `Node` corresponding to the given `NodeId`.
    pub fn get_node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Shorthand for `self.get_node(id).id()`.
    pub fn get_node_id(&self, id: NodeId) -> &str {
        &self.nodes[id.0].id
    }

    /// Find a `NodeId` using the exact (case-sensitive) node id.
    pub fn find_node(&self, id: &str) -> Option<NodeId> {
        self.id_to_index.get(id).cloned()
    }

    /// Resolve an identifier used in a rule expression.
    ///
    /// The lookup is case-insensitive and considers both node ids and labels. When the
    /// name matches more than one node, the result is an `AmbiguousIdentifier` error.
    pub fn resolve_identifier(&self, name: &str) -> Result<NodeId, ParseErrorKind> {
        match self.symbols.get(&normalize(name)).map(|it| it.as_slice()) {
            None | Some([]) => Err(ParseErrorKind::UnknownIdentifier(name.to_string())),
            Some([id]) => Ok(*id),
            Some(candidates) => Err(ParseErrorKind::AmbiguousIdentifier {
                name: name.to_string(),
                candidates: candidates
                    .iter()
                    .map(|it| self.get_node_id(*it).to_string())
                    .collect(),
            }),
        }
    }

    /// Ids of all nodes, in node order.
    pub fn node_order(&self) -> Vec<String> {
        self.nodes.iter().map(|it| it.id.clone()).collect()
    }

    /// Nodes that no rule expression can refer to: neither the id nor the label is a valid,
    /// non-reserved identifier that resolves uniquely to the node.
    pub fn unreferenceable_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|id| {
                let node = self.get_node(*id);
                let by_name = |name: &str| {
                    ID_REGEX.is_match(name)
                        && !is_reserved_word(name)
                        && self.resolve_identifier(name) == Ok(*id)
                };
                !by_name(&node.id) && !by_name(&node.label)
            })
            .collect()
    }
}

impl Index<NodeId> for Network {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        self.get_node(index)
    }
}

/// **(internal)** Identifiers are compared case-insensitively.
fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
