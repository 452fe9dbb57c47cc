use crate::{BinaryOp, NodeId};

/// **(internal)** Split an expression string into positioned `Token`s.
mod _tokenizer;
/// **(internal)** Shunting-yard conversion of a token stream into a postfix program.
mod _shunting_yard;
/// **(internal)** Evaluation and inspection of `CompiledRule`s.
mod _impl_compiled_rule;
/// **(internal)** Compilation of whole rule lists into a `RuleSet`.
mod _impl_rule_set;
/// **(internal)** `.bnet` (BoolNet) model import.
mod _impl_bnet;

pub(crate) use _shunting_yard::compile_expression;
pub(crate) use _tokenizer::is_reserved_word;

/// **(internal)** Kinds of tokens occurring in a rule expression.
#[derive(Clone, Debug, Eq, PartialEq)]
enum TokenKind {
    Not,              // '!', '~', 'NOT'
    Binary(BinaryOp), // '&', '&&', 'AND', '|', '||', 'OR', '^', 'XOR'
    Open,             // '('
    Close,            // ')'
    Const(bool),      // 'true', 'false', '1', '0'
    Name(String),     // node id or label
}

/// **(internal)** A token together with its character position in the expression.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Token {
    kind: TokenKind,
    position: usize,
    text: String,
}

/// **(internal)** One step of a postfix program. The program operates on a stack of
/// boolean values and leaves exactly one value on it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Instruction {
    Const(bool),
    Load(NodeId),
    Not,
    Binary(BinaryOp),
}
