use crate::{Network, NodeId};
use std::fmt::{Display, Error, Formatter};

impl From<NodeId> for usize {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "Node({})", self.0)
    }
}

impl NodeId {
    /// Position of this node in the node order (and of its bit in a `State`).
    pub fn to_index(self) -> usize {
        self.0
    }

    /// Construct a `NodeId` from a raw index. The index is not checked against any network.
    pub fn from_index(index: usize) -> NodeId {
        NodeId(index)
    }

    /// Try to construct a `NodeId` from the given `usize` value. The id must be valid
    /// inside the specified `Network`, otherwise `None` is returned.
    pub fn try_from_usize(context: &Network, value: usize) -> Option<NodeId> {
        if value < context.num_nodes() {
            Some(NodeId(value))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Network, Node, NodeId};

    #[test]
    fn node_id_conversion() {
        let network = Network::new(vec![Node::new("x", "X"), Node::new("y", "Y")]).unwrap();
        assert_eq!(None, NodeId::try_from_usize(&network, 2));
        let y = NodeId::try_from_usize(&network, 1).unwrap();
        assert_eq!(1usize, usize::from(y));
        assert_eq!("Node(1)", y.to_string());
        assert_eq!(y, NodeId::from_index(y.to_index()));
    }
}
