//! Parser for the s-expression pattern grammar.
//!
//! Grammar:
//!
//! ```text
//! pattern  := variable | node | link
//! variable := '$' ident
//! node     := '(' node-kind string ')'
//! link     := '(' link-kind pattern+ ')'
//! ```
//!
//! Node kinds are `Concept`, `Predicate`, `Variable`; link kinds are
//! `Inheritance`, `Similarity`, `Evaluation`, `Link`. Link arity is
//! validated at parse time against the kind's declared arity, so a
//! malformed pattern fails before any matching begins.

use crate::atom::{LinkKind, NodeKind};
use crate::error::PatternError;

use super::Pattern;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Ident(String),
    Str(String),
    Var(String),
}

fn lex(input: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(ch) => s.push(ch),
                        None => {
                            return Err(PatternError::Invalid {
                                message: "unterminated string literal".into(),
                            });
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            '$' => {
                chars.next();
                let mut name = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                        name.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return Err(PatternError::Invalid {
                        message: "variable sigil `$` without a name".into(),
                    });
                }
                tokens.push(Token::Var(name));
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_alphanumeric() || c == '_' || c == '-' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(PatternError::Invalid {
                    message: format!("unexpected character `{other}`"),
                });
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_pattern(&mut self) -> Result<Pattern, PatternError> {
        match self.next() {
            Some(Token::Var(name)) => Ok(Pattern::Variable(name)),
            Some(Token::LParen) => self.parse_form(),
            Some(Token::RParen) => Err(PatternError::Invalid {
                message: "unexpected `)`".into(),
            }),
            Some(Token::Ident(word)) => Err(PatternError::Invalid {
                message: format!("bare identifier `{word}` outside parentheses"),
            }),
            Some(Token::Str(s)) => Err(PatternError::Invalid {
                message: format!("bare string \"{s}\" outside a node form"),
            }),
            None => Err(PatternError::Invalid {
                message: "empty pattern".into(),
            }),
        }
    }

    /// Parse the body of a parenthesized form; the opening paren is consumed.
    fn parse_form(&mut self) -> Result<Pattern, PatternError> {
        let keyword = match self.next() {
            Some(Token::Ident(word)) => word,
            Some(_) | None => {
                return Err(PatternError::Invalid {
                    message: "expected a kind keyword after `(`".into(),
                });
            }
        };

        if let Some(kind) = node_kind(&keyword) {
            let name = match self.next() {
                Some(Token::Str(name)) => name,
                Some(_) | None => {
                    return Err(PatternError::Invalid {
                        message: format!("{keyword} node requires a double-quoted name"),
                    });
                }
            };
            match self.next() {
                Some(Token::RParen) => Ok(Pattern::Node { kind, name }),
                _ => Err(PatternError::Invalid {
                    message: format!("{keyword} node takes exactly one name"),
                }),
            }
        } else if let Some(kind) = link_kind(&keyword) {
            let mut children = Vec::new();
            loop {
                match self.peek() {
                    Some(Token::RParen) => {
                        self.next();
                        break;
                    }
                    Some(_) => children.push(self.parse_pattern()?),
                    None => {
                        return Err(PatternError::Invalid {
                            message: "unbalanced parentheses".into(),
                        });
                    }
                }
            }
            let required = kind.required_arity();
            if !required.accepts(children.len()) {
                return Err(PatternError::ArityMismatch {
                    kind: kind.to_string(),
                    expected: required.to_string(),
                    actual: children.len(),
                });
            }
            Ok(Pattern::Link { kind, children })
        } else {
            Err(PatternError::UnknownKind { keyword })
        }
    }
}

fn node_kind(keyword: &str) -> Option<NodeKind> {
    match keyword {
        "Concept" => Some(NodeKind::Concept),
        "Predicate" => Some(NodeKind::Predicate),
        "Variable" => Some(NodeKind::Variable),
        _ => None,
    }
}

fn link_kind(keyword: &str) -> Option<LinkKind> {
    match keyword {
        "Inheritance" => Some(LinkKind::Inheritance),
        "Similarity" => Some(LinkKind::Similarity),
        "Evaluation" => Some(LinkKind::Evaluation),
        "Link" => Some(LinkKind::Generic),
        _ => None,
    }
}

/// Parse a complete pattern from text.
pub fn parse(input: &str) -> Result<Pattern, PatternError> {
    let tokens = lex(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let pattern = parser.parse_pattern()?;
    if parser.peek().is_some() {
        return Err(PatternError::Invalid {
            message: "trailing tokens after pattern".into(),
        });
    }
    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node() {
        let p = parse("(Concept \"Human\")").unwrap();
        assert_eq!(
            p,
            Pattern::Node {
                kind: NodeKind::Concept,
                name: "Human".into()
            }
        );
    }

    #[test]
    fn parses_variable() {
        assert_eq!(parse("$X").unwrap(), Pattern::Variable("X".into()));
        assert_eq!(
            parse("$long-name_2").unwrap(),
            Pattern::Variable("long-name_2".into())
        );
    }

    #[test]
    fn parses_nested_link() {
        let p = parse("(Inheritance (Concept \"Human\") $X)").unwrap();
        match p {
            Pattern::Link { kind, children } => {
                assert_eq!(kind, LinkKind::Inheritance);
                assert_eq!(children.len(), 2);
                assert_eq!(children[1], Pattern::Variable("X".into()));
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn parses_evaluation_with_args() {
        let p = parse("(Evaluation (Predicate \"eats\") (Concept \"Dog\") (Concept \"Meat\"))")
            .unwrap();
        match p {
            Pattern::Link { kind, children } => {
                assert_eq!(kind, LinkKind::Evaluation);
                assert_eq!(children.len(), 3);
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_parens_rejected() {
        assert!(matches!(
            parse("(Inheritance (Concept \"A\") $X"),
            Err(PatternError::Invalid { .. })
        ));
        assert!(matches!(
            parse("(Concept \"A\"))"),
            Err(PatternError::Invalid { .. })
        ));
    }

    #[test]
    fn unknown_kind_rejected() {
        assert!(matches!(
            parse("(Frobnicate $X $Y)"),
            Err(PatternError::UnknownKind { keyword }) if keyword == "Frobnicate"
        ));
    }

    #[test]
    fn arity_mismatch_rejected() {
        assert!(matches!(
            parse("(Inheritance $X)"),
            Err(PatternError::ArityMismatch { actual: 1, .. })
        ));
        assert!(matches!(
            parse("(Inheritance $X $Y $Z)"),
            Err(PatternError::ArityMismatch { actual: 3, .. })
        ));
        assert!(matches!(
            parse("(Evaluation $P)"),
            Err(PatternError::ArityMismatch { actual: 1, .. })
        ));
    }

    #[test]
    fn empty_and_garbage_input_rejected() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
        assert!(parse("hello").is_err());
        assert!(parse("$").is_err());
        assert!(parse("(Concept \"unterminated)").is_err());
        assert!(parse("(Concept \"A\") extra").is_err());
    }

    #[test]
    fn generic_link_keyword_is_link() {
        let p = parse("(Link $X)").unwrap();
        assert!(matches!(
            p,
            Pattern::Link {
                kind: LinkKind::Generic,
                ..
            }
        ));
    }
}
