//! Stylesheet walker.
//!
//! Google Fonts stylesheets only ever contain two kinds of top-level nodes:
//! comments naming the subset of the following block, and `@font-face`
//! blocks. The walker turns the raw text into that sequence and rejects
//! anything else, so the builder never has to guess at a node's shape.

use cssparser::{
    BasicParseErrorKind, Delimiter, ParseError, ParseErrorKind, Parser, ParserInput, Token,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Comment(String),
    FontFace(Vec<Declaration>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Raw value text, trimmed, without the trailing semicolon.
    pub value: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct StylesheetError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

type WalkResult<'i, T> = Result<T, ParseError<'i, &'static str>>;

/// Walk a stylesheet into comments and `@font-face` rules, in source order.
pub fn parse_stylesheet(css: &str) -> Result<Vec<Rule>, StylesheetError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    walk_rules(&mut parser).map_err(StylesheetError::from)
}

impl Rule {
    pub fn is_comment(&self) -> bool {
        matches!(self, Rule::Comment(_))
    }
}

fn walk_rules<'i>(parser: &mut Parser<'i, '_>) -> WalkResult<'i, Vec<Rule>> {
    let mut rules = Vec::new();

    loop {
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {}
            Token::Comment(text) => rules.push(Rule::Comment(text.to_string())),
            Token::AtKeyword(ref name) if name.eq_ignore_ascii_case("font-face") => {
                parser.expect_curly_bracket_block()?;
                let declarations = parser.parse_nested_block(|block| walk_declarations(block))?;
                rules.push(Rule::FontFace(declarations));
            }
            other => return Err(parser.new_unexpected_token_error(other)),
        }
    }

    Ok(rules)
}

fn walk_declarations<'i>(parser: &mut Parser<'i, '_>) -> WalkResult<'i, Vec<Declaration>> {
    let mut declarations = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let name = parser.expect_ident()?.to_ascii_lowercase();
        parser.expect_colon()?;

        let value = parser.parse_until_after(Delimiter::Semicolon, |decl| {
            let start = decl.position();
            while decl.next().is_ok() {}
            Ok::<_, ParseError<'i, &'static str>>(decl.slice_from(start).trim().to_string())
        })?;

        if value.is_empty() {
            return Err(parser.new_custom_error("declaration has an empty value"));
        }

        declarations.push(Declaration { name, value });
    }

    Ok(declarations)
}

impl<'i> From<ParseError<'i, &'static str>> for StylesheetError {
    fn from(err: ParseError<'i, &'static str>) -> Self {
        let message = match err.kind {
            ParseErrorKind::Custom(message) => message.to_string(),
            ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
                format!("unexpected token {token:?}")
            }
            ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
                "unexpected end of input".to_string()
            }
            ParseErrorKind::Basic(other) => format!("{other:?}"),
        };

        StylesheetError {
            line: err.location.line + 1,
            column: err.location.column,
            message,
        }
    }
}
