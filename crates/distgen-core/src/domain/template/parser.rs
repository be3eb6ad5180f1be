//! Builds the node tree from lexer segments.
//!
//! Directive bodies are small enough that each is tokenized on its own;
//! errors point at the opening delimiter of the offending directive.

use std::fmt;

use super::{
    ast::{Branch, Condition, Expr, Filter, Node, Operand},
    KEYWORDS,
    lexer::{self, Position, Segment},
};
use crate::domain::error::DomainError;

type ParseResult<T> = Result<T, DomainError>;

pub(crate) fn parse(source: &str) -> ParseResult<Vec<Node>> {
    let segments = lexer::tokenize(source)?;
    let mut builder = TreeBuilder {
        segments: segments.into_iter(),
    };

    match builder.block()? {
        (nodes, None) => Ok(nodes),
        (_, Some((closing, pos))) => Err(pos.error(format!(
            "unexpected `{{% {} %}}` outside of an if block",
            closing.keyword()
        ))),
    }
}

// ============================================================================
// Tree construction
// ============================================================================

enum Tag {
    If(Condition),
    Closing(Closing),
}

enum Closing {
    Elif(Condition),
    Else,
    EndIf,
}

impl Closing {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Elif(_) => "elif",
            Self::Else => "else",
            Self::EndIf => "endif",
        }
    }
}

struct TreeBuilder<'a> {
    segments: std::vec::IntoIter<Segment<'a>>,
}

impl TreeBuilder<'_> {
    /// Collect nodes until a closing tag or the end of input.
    fn block(&mut self) -> ParseResult<(Vec<Node>, Option<(Closing, Position)>)> {
        let mut nodes = Vec::new();

        while let Some(segment) = self.segments.next() {
            match segment {
                Segment::Text(text) => nodes.push(Node::Text(text.to_owned())),
                Segment::Output { body, raw, pos } => {
                    let mut parser = ExprParser::new(body, pos)?;
                    if parser.is_empty() {
                        return Err(pos.error("empty placeholder"));
                    }
                    let expr = parser.expr()?;
                    parser.finish()?;
                    nodes.push(Node::Output {
                        expr,
                        source: raw.to_owned(),
                    });
                }
                Segment::Tag { body, pos } => match parse_tag(body, pos)? {
                    Tag::If(condition) => nodes.push(self.if_block(condition, pos)?),
                    Tag::Closing(closing) => return Ok((nodes, Some((closing, pos)))),
                },
            }
        }

        Ok((nodes, None))
    }

    fn if_block(&mut self, condition: Condition, opened: Position) -> ParseResult<Node> {
        let mut branches = Vec::new();
        let mut otherwise = None;
        // `None` once the `else` branch has been entered.
        let mut pending = Some(condition);

        loop {
            let (body, end) = self.block()?;
            let Some((closing, pos)) = end else {
                return Err(opened.error("unclosed `{% if %}` block, expected `{% endif %}`"));
            };

            match pending.take() {
                Some(condition) => branches.push(Branch { condition, body }),
                None => otherwise = Some(body),
            }

            match closing {
                Closing::EndIf => return Ok(Node::If { branches, otherwise }),
                _ if otherwise.is_some() => {
                    return Err(pos.error(format!(
                        "unexpected `{{% {} %}}` after `{{% else %}}`",
                        closing.keyword()
                    )));
                }
                Closing::Elif(condition) => pending = Some(condition),
                Closing::Else => {}
            }
        }
    }
}

fn parse_tag(body: &str, pos: Position) -> ParseResult<Tag> {
    let body = body.trim();
    let (keyword, rest) = body
        .split_once(char::is_whitespace)
        .unwrap_or((body, ""));

    let bare = |closing: Closing| {
        if rest.trim().is_empty() {
            Ok(Tag::Closing(closing))
        } else {
            Err(pos.error(format!("`{keyword}` takes no arguments")))
        }
    };

    match keyword {
        "if" => Ok(Tag::If(condition(rest, pos)?)),
        "elif" => Ok(Tag::Closing(Closing::Elif(condition(rest, pos)?))),
        "else" => bare(Closing::Else),
        "endif" => bare(Closing::EndIf),
        "" => Err(pos.error("empty tag")),
        other => Err(pos.error(format!("unknown tag `{other}`"))),
    }
}

fn condition(source: &str, pos: Position) -> ParseResult<Condition> {
    let mut parser = ExprParser::new(source, pos)?;
    let condition = parser.condition()?;
    parser.finish()?;
    Ok(condition)
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Pipe,
    Eq,
    Ne,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "`{name}`"),
            Self::Str(text) => write!(f, "string \"{text}\""),
            Self::Pipe => write!(f, "`|`"),
            Self::Eq => write!(f, "`==`"),
            Self::Ne => write!(f, "`!=`"),
            Self::LParen => write!(f, "`(`"),
            Self::RParen => write!(f, "`)`"),
        }
    }
}

fn lex_expression(source: &str, pos: Position) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '|' => tokens.push(Token::Pipe),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '=' | '!' => {
                if chars.next_if_eq(&'=').is_none() {
                    return Err(pos.error(format!("expected `{c}=`")));
                }
                tokens.push(if c == '=' { Token::Eq } else { Token::Ne });
            }
            '"' | '\'' => {
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == c => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => text.push(escaped),
                            None => return Err(pos.error("unterminated string literal")),
                        },
                        Some(ch) => text.push(ch),
                        None => return Err(pos.error("unterminated string literal")),
                    }
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::from(c);
                while let Some(next) = chars.next_if(|ch| ch.is_ascii_alphanumeric() || *ch == '_') {
                    name.push(next);
                }
                tokens.push(Token::Ident(name));
            }
            other => return Err(pos.error(format!("unexpected character '{other}'"))),
        }
    }

    Ok(tokens)
}

fn keyword(word: &str) -> Token {
    Token::Ident(word.to_owned())
}

struct ExprParser {
    tokens: std::iter::Peekable<std::vec::IntoIter<Token>>,
    pos: Position,
}

impl ExprParser {
    fn new(source: &str, pos: Position) -> ParseResult<Self> {
        Ok(Self {
            tokens: lex_expression(source, pos)?.into_iter().peekable(),
            pos,
        })
    }

    fn is_empty(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    fn eat(&mut self, token: &Token) -> bool {
        self.tokens.next_if_eq(token).is_some()
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        match self.tokens.next() {
            Some(found) if found == token => Ok(()),
            Some(found) => Err(self.pos.error(format!("expected {token}, found {found}"))),
            None => Err(self.pos.error(format!("expected {token}"))),
        }
    }

    fn finish(&mut self) -> ParseResult<()> {
        match self.tokens.next() {
            Some(extra) => Err(self.pos.error(format!("unexpected {extra}"))),
            None => Ok(()),
        }
    }

    /// `or` binds loosest, then `and`, then `not`.
    fn condition(&mut self) -> ParseResult<Condition> {
        let mut lhs = self.conjunction()?;
        while self.eat(&keyword("or")) {
            lhs = Condition::Or(Box::new(lhs), Box::new(self.conjunction()?));
        }
        Ok(lhs)
    }

    fn conjunction(&mut self) -> ParseResult<Condition> {
        let mut lhs = self.negation()?;
        while self.eat(&keyword("and")) {
            lhs = Condition::And(Box::new(lhs), Box::new(self.negation()?));
        }
        Ok(lhs)
    }

    fn negation(&mut self) -> ParseResult<Condition> {
        if self.eat(&keyword("not")) {
            return Ok(Condition::Not(Box::new(self.negation()?)));
        }
        if self.eat(&Token::LParen) {
            let inner = self.condition()?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }

        let lhs = self.expr()?;
        if self.eat(&Token::Eq) {
            Ok(Condition::Equals(lhs, self.expr()?))
        } else if self.eat(&Token::Ne) {
            Ok(Condition::NotEquals(lhs, self.expr()?))
        } else {
            Ok(Condition::Truthy(lhs))
        }
    }

    fn expr(&mut self) -> ParseResult<Expr> {
        let base = match self.tokens.next() {
            Some(Token::Ident(name)) if KEYWORDS.contains(&name.as_str()) => {
                return Err(self.pos.error(format!("`{name}` is only allowed in conditions")));
            }
            Some(Token::Ident(name)) => Operand::Variable(name),
            Some(Token::Str(text)) => Operand::Literal(text),
            Some(other) => {
                return Err(self.pos.error(format!(
                    "expected a variable or string literal, found {other}"
                )));
            }
            None => return Err(self.pos.error("expected a variable or string literal")),
        };

        let mut filters = Vec::new();
        while self.eat(&Token::Pipe) {
            filters.push(self.filter()?);
        }

        Ok(Expr { base, filters })
    }

    fn filter(&mut self) -> ParseResult<Filter> {
        let name = match self.tokens.next() {
            Some(Token::Ident(name)) => name,
            Some(other) => {
                return Err(self.pos.error(format!("expected a filter name, found {other}")));
            }
            None => return Err(self.pos.error("expected a filter name after `|`")),
        };

        let filter = match name.as_str() {
            "upper" => Filter::Upper,
            "lower" => Filter::Lower,
            "capitalize" => Filter::Capitalize,
            "trim" => Filter::Trim,
            "default" => {
                self.expect(Token::LParen)?;
                let fallback = match self.tokens.next() {
                    Some(Token::Str(text)) => text,
                    _ => {
                        return Err(self.pos.error("`default` expects a string literal argument"));
                    }
                };
                self.expect(Token::RParen)?;
                return Ok(Filter::Default(fallback));
            }
            other => return Err(self.pos.error(format!("unknown filter `{other}`"))),
        };

        if self.tokens.peek() == Some(&Token::LParen) {
            return Err(self.pos.error(format!("filter `{name}` takes no arguments")));
        }

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_message(source: &str) -> String {
        match parse(source) {
            Err(DomainError::TemplateSyntax { message, .. }) => message,
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    fn var(name: &str) -> Expr {
        Expr {
            base: Operand::Variable(name.into()),
            filters: vec![],
        }
    }

    #[test]
    fn parses_placeholder_with_filters() {
        let nodes = parse("{{ network | trim | upper }}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Output {
                expr: Expr {
                    base: Operand::Variable("network".into()),
                    filters: vec![Filter::Trim, Filter::Upper],
                },
                source: "{{ network | trim | upper }}".into(),
            }]
        );
    }

    #[test]
    fn parses_default_argument() {
        let nodes = parse("{{ token | default('0x0') }}").unwrap();
        match &nodes[0] {
            Node::Output { expr, .. } => {
                assert_eq!(expr.filters, vec![Filter::Default("0x0".into())]);
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn parses_if_elif_else() {
        let nodes =
            parse("{% if network == \"mainnet\" %}a{% elif not network %}b{% else %}c{% endif %}")
                .unwrap();

        let expected = Node::If {
            branches: vec![
                Branch {
                    condition: Condition::Equals(
                        var("network"),
                        Expr {
                            base: Operand::Literal("mainnet".into()),
                            filters: vec![],
                        },
                    ),
                    body: vec![Node::Text("a".into())],
                },
                Branch {
                    condition: Condition::Not(Box::new(Condition::Truthy(var("network")))),
                    body: vec![Node::Text("b".into())],
                },
            ],
            otherwise: Some(vec![Node::Text("c".into())]),
        };
        assert_eq!(nodes, vec![expected]);
    }

    #[test]
    fn nested_if_blocks() {
        let nodes = parse("{% if a %}{% if b %}x{% endif %}{% endif %}").unwrap();
        match &nodes[0] {
            Node::If { branches, otherwise } => {
                assert!(otherwise.is_none());
                assert!(matches!(branches[0].body[0], Node::If { .. }));
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn empty_placeholder_is_rejected() {
        assert_eq!(syntax_message("{{   }}"), "empty placeholder");
    }

    #[test]
    fn unknown_filter_is_rejected() {
        assert_eq!(syntax_message("{{ network | shout }}"), "unknown filter `shout`");
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(syntax_message("{% for n in networks %}"), "unknown tag `for`");
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert_eq!(syntax_message("{{ network extra }}"), "unexpected `extra`");
    }

    #[test]
    fn nested_opening_braces_are_rejected() {
        assert_eq!(syntax_message("{{ a {{ b }}"), "unexpected character '{'");
    }

    #[test]
    fn endif_without_if_is_rejected() {
        assert_eq!(
            syntax_message("text{% endif %}"),
            "unexpected `{% endif %}` outside of an if block"
        );
    }

    #[test]
    fn unclosed_if_points_at_opening_tag() {
        let err = parse("ok\n{% if network %}open").unwrap_err();
        assert_eq!(
            err,
            DomainError::TemplateSyntax {
                line: 2,
                column: 1,
                message: "unclosed `{% if %}` block, expected `{% endif %}`".into(),
            }
        );
    }

    #[test]
    fn branch_after_else_is_rejected() {
        assert_eq!(
            syntax_message("{% if a %}x{% else %}y{% elif b %}z{% endif %}"),
            "unexpected `{% elif %}` after `{% else %}`"
        );
    }

    #[test]
    fn else_with_condition_is_rejected() {
        assert_eq!(
            syntax_message("{% if a %}x{% else b %}y{% endif %}"),
            "`else` takes no arguments"
        );
    }

    #[test]
    fn single_equals_is_rejected() {
        assert_eq!(syntax_message("{% if a = 'b' %}{% endif %}"), "expected `==`");
    }

    #[test]
    fn unterminated_string_is_rejected() {
        assert_eq!(
            syntax_message("{{ \"mainnet }}"),
            "unterminated string literal"
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let nodes = parse("{% if a or b and not c %}x{% endif %}").unwrap();
        let expected = Condition::Or(
            Box::new(Condition::Truthy(var("a"))),
            Box::new(Condition::And(
                Box::new(Condition::Truthy(var("b"))),
                Box::new(Condition::Not(Box::new(Condition::Truthy(var("c"))))),
            )),
        );
        assert_eq!(
            nodes,
            vec![Node::If {
                branches: vec![Branch {
                    condition: expected,
                    body: vec![Node::Text("x".into())],
                }],
                otherwise: None,
            }]
        );
    }

    #[test]
    fn or_of_comparisons() {
        let nodes =
            parse("{% if network == \"testnet\" or network == \"qa\" %}t{% endif %}").unwrap();
        let Node::If { branches, .. } = &nodes[0] else {
            panic!("expected if node, got {nodes:?}");
        };
        assert!(matches!(
            &branches[0].condition,
            Condition::Or(lhs, rhs)
                if matches!(**lhs, Condition::Equals(..)) && matches!(**rhs, Condition::Equals(..))
        ));
    }

    #[test]
    fn parentheses_group_conditions() {
        let nodes = parse("{% if (a or b) and c %}x{% endif %}").unwrap();
        let Node::If { branches, .. } = &nodes[0] else {
            panic!("expected if node, got {nodes:?}");
        };
        assert!(matches!(
            &branches[0].condition,
            Condition::And(lhs, _) if matches!(**lhs, Condition::Or(..))
        ));
    }

    #[test]
    fn dangling_or_is_rejected() {
        assert_eq!(
            syntax_message("{% if a or %}x{% endif %}"),
            "expected a variable or string literal"
        );
    }

    #[test]
    fn keywords_are_not_variables() {
        assert_eq!(syntax_message("{{ and }}"), "`and` is only allowed in conditions");
        assert_eq!(syntax_message("{{ or }}"), "`or` is only allowed in conditions");
    }

    #[test]
    fn whitespace_control_markers_are_stripped() {
        let nodes = parse("{%- if network == \"x\" -%}t{%- endif -%}").unwrap();
        assert!(matches!(&nodes[..], [Node::If { .. }]));
    }

    #[test]
    fn placeholder_may_contain_closer_in_string() {
        let nodes = parse("{{ \"}}\" }}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Output {
                expr: Expr {
                    base: Operand::Literal("}}".into()),
                    filters: vec![],
                },
                source: "{{ \"}}\" }}".into(),
            }]
        );
    }
}
