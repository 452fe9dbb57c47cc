use crate::{Edge, Node, Rule};
use std::fmt::{Display, Error, Formatter};

impl Node {
    pub fn new(id: &str, label: &str) -> Node {
        Node {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    /// A node whose label is the same as its id.
    pub fn unlabeled(id: &str) -> Node {
        Node::new(id, id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name of this node.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.id)
    }
}

impl Rule {
    pub fn new(target: &str, expression: &str) -> Rule {
        Rule {
            target: target.to_string(),
            expression: expression.to_string(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} = {}", self.target, self.expression)
    }
}

impl Edge {
    pub fn new(source: &str, target: &str, weight: f64) -> Edge {
        Edge {
            source: source.to_string(),
            target: target.to_string(),
            weight,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} -[{}]-> {}", self.source, self.weight, self.target)
    }
}
