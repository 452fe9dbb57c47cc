use crate::_expression_compiler::Instruction;
use crate::{CompiledRule, FnUpdate, NodeId, State};

impl CompiledRule {
    /// **(internal)** Wrap a postfix program produced by the shunting-yard parser.
    pub(crate) fn new(program: Vec<Instruction>) -> CompiledRule {
        CompiledRule { program }
    }

    /// Evaluate this rule in the given `state`.
    pub fn evaluate(&self, state: &State) -> bool {
        let mut stack: Vec<bool> = Vec::with_capacity(self.program.len());
        for instruction in &self.program {
            match instruction {
                Instruction::Const(value) => stack.push(*value),
                Instruction::Load(id) => stack.push(state.get(id.to_index())),
                Instruction::Not => {
                    let top = stack.pop().unwrap_or_default();
                    stack.push(!top);
                }
                Instruction::Binary(op) => {
                    let right = stack.pop().unwrap_or_default();
                    let left = stack.pop().unwrap_or_default();
                    stack.push(op.apply(left, right));
                }
            }
        }
        // The parser guarantees exactly one value remains.
        stack.pop().unwrap_or_default()
    }

    /// Return a sorted vector of all nodes referenced by this rule.
    pub fn collect_arguments(&self) -> Vec<NodeId> {
        let mut result: Vec<NodeId> = self
            .program
            .iter()
            .filter_map(|it| match it {
                Instruction::Load(id) => Some(*id),
                _ => None,
            })
            .collect();
        result.sort();
        result.dedup();
        result
    }

    /// Rebuild the syntax tree of this rule.
    pub fn to_fn_update(&self) -> FnUpdate {
        let mut stack: Vec<FnUpdate> = Vec::new();
        for instruction in &self.program {
            let item = match instruction {
                Instruction::Const(value) => FnUpdate::Const(*value),
                Instruction::Load(id) => FnUpdate::mk_var(*id),
                Instruction::Not => FnUpdate::mk_not(stack.pop().unwrap_or(FnUpdate::Const(false))),
                Instruction::Binary(op) => {
                    let right = stack.pop().unwrap_or(FnUpdate::Const(false));
                    let left = stack.pop().unwrap_or(FnUpdate::Const(false));
                    FnUpdate::mk_binary(*op, left, right)
                }
            };
            stack.push(item);
        }
        stack.pop().unwrap_or(FnUpdate::Const(false))
    }
}

#[cfg(test)]
mod tests {
    use crate::_expression_compiler::compile_expression;
    use crate::{Network, Node, NodeId, State};

    fn network() -> Network {
        Network::new(vec![
            Node::unlabeled("a"),
            Node::unlabeled("b"),
            Node::unlabeled("c"),
        ])
        .unwrap()
    }

    #[test]
    fn compiled_rule_eval_test() {
        let network = network();
        let rule = compile_expression("a & (!b | c) ^ c", &network).unwrap();
        for index in 0..8 {
            let state = State::from_index(3, index);
            let (a, b, c) = (state.get(0), state.get(1), state.get(2));
            assert_eq!((a && (!b || c)) != c, rule.evaluate(&state));
            // The tree view must agree with the postfix program.
            assert_eq!(rule.evaluate(&state), rule.to_fn_update().evaluate(&state));
        }
    }

    #[test]
    fn compiled_rule_arguments() {
        let network = network();
        let rule = compile_expression("c | c & !a | true", &network).unwrap();
        assert_eq!(
            vec![NodeId::from_index(0), NodeId::from_index(2)],
            rule.collect_arguments()
        );
        let constant = compile_expression("0", &network).unwrap();
        assert!(constant.collect_arguments().is_empty());
        assert!(!constant.evaluate(&State::empty(3)));
    }
}
