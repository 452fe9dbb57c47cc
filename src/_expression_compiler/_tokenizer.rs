use crate::_expression_compiler::{Token, TokenKind};
use crate::BinaryOp::{And, Or, Xor};
use crate::ParseErrorKind;
use std::iter::{Enumerate, Peekable};
use std::str::Chars;

/// **(internal)** Process an expression into a vector of `Token`s.
///
/// Operators can be written as symbols (`!`, `~`, `&`, `&&`, `|`, `||`, `^`) or as
/// case-insensitive keywords (`NOT`, `AND`, `OR`, `XOR`). Token positions count
/// characters, not bytes.
pub(super) fn tokenize(expression: &str) -> Result<Vec<Token>, ParseErrorKind> {
    let mut output = Vec::new();
    let mut data = expression.chars().enumerate().peekable();
    while let Some((position, c)) = data.next() {
        let mut text = String::from(c);
        let kind = match c {
            c if c.is_whitespace() => continue,
            '!' | '~' => TokenKind::Not,
            '^' => TokenKind::Binary(Xor),
            '&' => {
                skip_repeated(&mut data, '&', &mut text);
                TokenKind::Binary(And)
            }
            '|' => {
                skip_repeated(&mut data, '|', &mut text);
                TokenKind::Binary(Or)
            }
            '(' => TokenKind::Open,
            ')' => TokenKind::Close,
            c if is_valid_in_name(c) => {
                while let Some((_, c)) = data.peek() {
                    if !is_valid_in_name(*c) {
                        break;
                    }
                    text.push(*c);
                    data.next(); // advance iterator
                }
                name_to_kind(text.as_str())
            }
            _ => {
                return Err(ParseErrorKind::UnexpectedToken {
                    token: c.to_string(),
                    position,
                })
            }
        };
        output.push(Token {
            kind,
            position,
            text,
        });
    }
    Ok(output)
}

/// **(internal)** True if `name` is a keyword or constant, i.e. it never tokenizes as
/// an identifier.
pub(crate) fn is_reserved_word(name: &str) -> bool {
    !matches!(name_to_kind(name.trim()), TokenKind::Name(_))
}

/// **(internal)** Check if given char can appear in a name.
fn is_valid_in_name(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '{' || c == '}'
}

/// **(internal)** Consume a second `&` or `|` of a C-style operator.
fn skip_repeated(data: &mut Peekable<Enumerate<Chars>>, symbol: char, text: &mut String) {
    if let Some((_, c)) = data.peek() {
        if *c == symbol {
            text.push(symbol);
            data.next();
        }
    }
}

/// **(internal)** Names which are reserved for operators and constants.
fn name_to_kind(name: &str) -> TokenKind {
    match name.to_lowercase().as_str() {
        "not" => TokenKind::Not,
        "and" => TokenKind::Binary(And),
        "or" => TokenKind::Binary(Or),
        "xor" => TokenKind::Binary(Xor),
        "true" | "1" => TokenKind::Const(true),
        "false" | "0" => TokenKind::Const(false),
        _ => TokenKind::Name(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{is_reserved_word, tokenize};
    use crate::_expression_compiler::TokenKind;
    use crate::BinaryOp::{And, Or, Xor};
    use crate::ParseErrorKind;

    fn kinds(expression: &str) -> Vec<TokenKind> {
        tokenize(expression)
            .unwrap()
            .into_iter()
            .map(|it| it.kind)
            .collect()
    }

    #[test]
    fn symbolic_and_keyword_operators() {
        let name = |n: &str| TokenKind::Name(n.to_string());
        let expected = vec![
            TokenKind::Not,
            TokenKind::Open,
            name("a"),
            TokenKind::Binary(And),
            name("b_2"),
            TokenKind::Close,
            TokenKind::Binary(Or),
            name("C"),
            TokenKind::Binary(Xor),
            TokenKind::Const(true),
        ];
        assert_eq!(expected, kinds("!(a & b_2) | C ^ 1"));
        assert_eq!(expected, kinds("NOT (a AND b_2) or C Xor true"));
        assert_eq!(expected, kinds("~(a && b_2) || C ^ TRUE"));
    }

    #[test]
    fn token_positions() {
        let tokens = tokenize("ab && !cd").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|it| it.position).collect();
        let texts: Vec<&str> = tokens.iter().map(|it| it.text.as_str()).collect();
        assert_eq!(vec![0, 3, 6, 7], positions);
        assert_eq!(vec!["ab", "&&", "!", "cd"], texts);
    }

    #[test]
    fn positions_count_characters() {
        let tokens = tokenize("öl | ß").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|it| it.position).collect();
        assert_eq!(vec![0, 3, 5], positions);
        assert_eq!(
            Err(ParseErrorKind::UnexpectedToken {
                token: "=".to_string(),
                position: 3
            }),
            tokenize("ñu = b")
        );
    }

    #[test]
    fn reserved_words() {
        for word in ["not", "AND", "Or", "xor", "TRUE", "false", "0", "1"] {
            assert!(is_reserved_word(word));
        }
        assert!(!is_reserved_word("notch"));
        assert!(!is_reserved_word("10"));
    }

    #[test]
    fn test_invalid_tokens() {
        assert_eq!(
            Err(ParseErrorKind::UnexpectedToken {
                token: "=".to_string(),
                position: 2
            }),
            tokenize("a = b")
        );
        assert!(tokenize("a > b").is_err());
        assert!(tokenize("a ? b").is_err());
        assert!(tokenize("a, b").is_err());
    }
}
