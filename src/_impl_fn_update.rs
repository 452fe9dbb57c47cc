use crate::FnUpdate::*;
use crate::{BinaryOp, FnUpdate, Network, NodeId, State};

/// Constructors used when rebuilding a syntax tree from a compiled rule.
impl FnUpdate {
    pub fn mk_var(id: NodeId) -> FnUpdate {
        Var(id)
    }

    pub fn mk_not(inner: FnUpdate) -> FnUpdate {
        Not(Box::new(inner))
    }

    pub fn mk_binary(op: BinaryOp, left: FnUpdate, right: FnUpdate) -> FnUpdate {
        Binary(op, Box::new(left), Box::new(right))
    }
}

impl FnUpdate {
    /// Fully parenthesized rendering of this function, using node ids from `context`.
    pub fn to_string(&self, context: &Network) -> String {
        match self {
            Const(value) => value.to_string(),
            Var(id) => context.get_node_id(*id).to_string(),
            Not(inner) => format!("!{}", inner.to_string(context)),
            Binary(op, l, r) => {
                format!("({} {} {})", l.to_string(context), op, r.to_string(context))
            }
        }
    }

    /// Value of this function in the given `state`.
    pub fn evaluate(&self, state: &State) -> bool {
        match self {
            Const(value) => *value,
            Var(id) => state.get(id.to_index()),
            Not(inner) => !inner.evaluate(state),
            Binary(op, left, right) => op.apply(left.evaluate(state), right.evaluate(state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{BinaryOp, FnUpdate, Network, Node, NodeId, State};

    #[test]
    fn render_and_evaluate() {
        let network = Network::new(vec![
            Node::unlabeled("a"),
            Node::unlabeled("b"),
            Node::unlabeled("c"),
        ])
        .unwrap();
        let a = || FnUpdate::mk_var(NodeId::from_index(0));
        let b = FnUpdate::mk_var(NodeId::from_index(1));
        let left = FnUpdate::mk_binary(BinaryOp::And, a(), FnUpdate::mk_not(b));
        let right = FnUpdate::mk_binary(BinaryOp::Xor, FnUpdate::Const(false), a());
        let fun = FnUpdate::mk_binary(BinaryOp::Or, left, right);
        assert_eq!("((a & !b) | (false ^ a))", fun.to_string(&network));

        assert!(fun.evaluate(&State::from_binary_string("100").unwrap()));
        assert!(fun.evaluate(&State::from_binary_string("110").unwrap()));
        assert!(!fun.evaluate(&State::from_binary_string("011").unwrap()));
    }
}
