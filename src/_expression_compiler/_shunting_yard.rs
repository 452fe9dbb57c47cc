use crate::_expression_compiler::_tokenizer::tokenize;
use crate::_expression_compiler::{Instruction, Token, TokenKind};
use crate::{BinaryOp, CompiledRule, Network, ParseErrorKind};

/// **(internal)** Items waiting on the operator stack of the shunting-yard algorithm.
#[derive(Clone, Copy, Debug)]
enum Pending {
    Not,
    Binary(BinaryOp),
    Open(usize),
}

/// Negation binds tighter than any binary operator.
const NOT_PRECEDENCE: u8 = 4;

impl Pending {
    fn precedence(self) -> Option<u8> {
        match self {
            Pending::Not => Some(NOT_PRECEDENCE),
            Pending::Binary(op) => Some(op.precedence()),
            Pending::Open(_) => None,
        }
    }

    fn into_instruction(self) -> Option<Instruction> {
        match self {
            Pending::Not => Some(Instruction::Not),
            Pending::Binary(op) => Some(Instruction::Binary(op)),
            Pending::Open(_) => None,
        }
    }
}

/// **(internal)** Compile an expression into a postfix program, resolving identifiers
/// using the symbol table of the given `network`.
///
/// This is a standard shunting-yard conversion. On top of that, we track whether an
/// operand or an operator is expected next, so that malformed infix sequences
/// (e.g. `a b`, `a & | b`, `!`) are reported at the first offending token.
pub(crate) fn compile_expression(
    expression: &str,
    network: &Network,
) -> Result<CompiledRule, ParseErrorKind> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ParseErrorKind::EmptyExpression);
    }

    let mut output: Vec<Instruction> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Pending> = Vec::new();
    let mut expect_operand = true;
    for token in &tokens {
        reject_shadowed_keyword(token, network)?;
        match &token.kind {
            TokenKind::Const(value) => {
                expect(expect_operand, token)?;
                output.push(Instruction::Const(*value));
                expect_operand = false;
            }
            TokenKind::Name(name) => {
                expect(expect_operand, token)?;
                output.push(Instruction::Load(network.resolve_identifier(name)?));
                expect_operand = false;
            }
            TokenKind::Not => {
                expect(expect_operand, token)?;
                stack.push(Pending::Not);
            }
            TokenKind::Open => {
                expect(expect_operand, token)?;
                stack.push(Pending::Open(token.position));
            }
            TokenKind::Binary(op) => {
                expect(!expect_operand, token)?;
                // All operators are left associative.
                while let Some(top) = stack.last() {
                    match top.precedence() {
                        Some(p) if p >= op.precedence() => {
                            output.extend(stack.pop().and_then(Pending::into_instruction));
                        }
                        _ => break,
                    }
                }
                stack.push(Pending::Binary(*op));
                expect_operand = true;
            }
            TokenKind::Close => {
                expect(!expect_operand, token)?;
                loop {
                    match stack.pop() {
                        None => {
                            return Err(ParseErrorKind::UnbalancedParenthesis {
                                position: token.position,
                            })
                        }
                        Some(Pending::Open(_)) => break,
                        Some(pending) => output.extend(pending.into_instruction()),
                    }
                }
            }
        }
    }

    if expect_operand {
        return Err(ParseErrorKind::UnexpectedToken {
            token: "end of expression".to_string(),
            position: expression.chars().count(),
        });
    }
    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Open(position) => {
                return Err(ParseErrorKind::UnbalancedParenthesis { position });
            }
            pending => output.extend(pending.into_instruction()),
        }
    }

    Ok(CompiledRule::new(output))
}

/// **(internal)** A keyword or constant which is also the id or label of some node cannot
/// be resolved either way, so it is reported as ambiguous.
fn reject_shadowed_keyword(token: &Token, network: &Network) -> Result<(), ParseErrorKind> {
    let is_keyword = !matches!(token.kind, TokenKind::Name(_))
        && token.text.starts_with(char::is_alphanumeric);
    if !is_keyword {
        return Ok(());
    }
    let candidates = match network.resolve_identifier(&token.text) {
        Err(ParseErrorKind::UnknownIdentifier(_)) => return Ok(()),
        Ok(id) => vec![network.get_node_id(id).to_string()],
        Err(ParseErrorKind::AmbiguousIdentifier { candidates, .. }) => candidates,
        Err(error) => return Err(error),
    };
    Err(ParseErrorKind::AmbiguousIdentifier {
        name: token.text.clone(),
        candidates,
    })
}

/// **(internal)** Fail with `UnexpectedToken` unless `condition` holds.
fn expect(condition: bool, token: &Token) -> Result<(), ParseErrorKind> {
    if condition {
        Ok(())
    } else {
        Err(ParseErrorKind::UnexpectedToken {
            token: token.text.clone(),
            position: token.position,
        })
    }
}
