//! JavaScript/TypeScript lexer
//!
//! Produces just enough structure to find module references safely:
//! - Comments are skipped (never tokenized)
//! - String literals keep their span and quote so they can be replaced in place
//! - Template literals are scanned through, including nested `${}` expressions
//! - Regular expression literals are told apart from division by the previous token
//! - JSX elements (when enabled) are skipped, except for their `{}` expression containers
//!
//! A `<` that could open a JSX element is scanned speculatively. Type parameter
//! lists (`<T,>`, `<T extends U>`) and elements whose closing tag never appears
//! (a Flow `<T>(x: T): T => x` arrow) fall back to a plain `<` token.

use std::fmt;

/// Kinds of tokens the rewriter cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    Template,
    Regex,
    Number,
    Punct,
}

/// A token with its byte span in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub start: usize,
    pub end: usize,
}

impl Token<'_> {
    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }

    /// Quote character of a string token
    pub fn quote(&self) -> Option<char> {
        match self.kind {
            TokenKind::Str => self.text.chars().next(),
            _ => None,
        }
    }

    /// Decoded value of a string token
    pub fn string_value(&self) -> Option<String> {
        if self.kind != TokenKind::Str || self.text.len() < 2 {
            return None;
        }
        Some(unescape(&self.text[1..self.text.len() - 1]))
    }
}

/// A lexing failure with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, column {}", self.message, self.line, self.column)
    }
}

impl std::error::Error for LexError {}

/// Keywords after which a `/` starts a regular expression
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// Keywords whose parenthesized head is followed by a statement, not a value
const CONTROL_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

type LexResult<T> = std::result::Result<T, LexError>;

/// Lexer over one source file
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    jsx: bool,
    tokens: Vec<Token<'src>>,
    /// One entry per open `(`: whether it follows a control keyword
    parens: Vec<bool>,
    /// The last token is a `)` closing a control keyword's head
    after_control_paren: bool,
}

impl<'src> Lexer<'src> {
    /// Create a lexer; `jsx` enables JSX element scanning
    pub fn new(source: &'src str, jsx: bool) -> Self {
        Self {
            source,
            pos: 0,
            jsx,
            tokens: Vec::new(),
            parens: Vec::new(),
            after_control_paren: false,
        }
    }

    /// Tokenize the whole source
    pub fn tokenize(mut self) -> LexResult<Vec<Token<'src>>> {
        self.skip_hashbang();
        self.lex_tokens(false)?;
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, offset: usize, message: &str) -> LexError {
        let before = &self.source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
            + 1;
        LexError {
            line,
            column,
            message: message.to_string(),
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            text: &self.source[start..self.pos],
            start,
            end: self.pos,
        });
        self.after_control_paren = false;
    }

    fn skip_hashbang(&mut self) {
        if self.source.starts_with("#!") {
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.advance();
            }
        }
    }

    /// Lex tokens until end of input, or until the `}` closing an expression
    /// container when `in_braces` is set
    fn lex_tokens(&mut self, in_braces: bool) -> LexResult<()> {
        let opened_at = self.pos;
        let mut depth = 0usize;

        loop {
            self.skip_whitespace_and_comments()?;
            let start = self.pos;
            let Some(c) = self.peek() else {
                if in_braces {
                    return Err(self.error(opened_at, "unterminated expression"));
                }
                return Ok(());
            };

            match c {
                '\'' | '"' => self.scan_string(c)?,
                '`' => self.scan_template()?,
                '/' if self.regex_allowed() => self.scan_regex()?,
                '<' if self.jsx && self.regex_allowed() && self.looks_like_jsx() => {
                    self.scan_jsx_or_less_than();
                }
                '(' => {
                    let control = self
                        .tokens
                        .len()
                        .checked_sub(1)
                        .is_some_and(|i| self.is_keyword_at(i, CONTROL_KEYWORDS));
                    self.parens.push(control);
                    self.advance();
                    self.push(TokenKind::Punct, start);
                }
                ')' => {
                    let control = self.parens.pop().unwrap_or(false);
                    self.advance();
                    self.push(TokenKind::Punct, start);
                    self.after_control_paren = control;
                }
                '{' => {
                    depth += 1;
                    self.advance();
                    self.push(TokenKind::Punct, start);
                }
                '}' => {
                    if in_braces && depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                    depth = depth.saturating_sub(1);
                    self.advance();
                    self.push(TokenKind::Punct, start);
                }
                c if is_ident_start(c) => self.scan_ident(),
                '#' if self.peek_next().is_some_and(is_ident_start) => {
                    self.advance();
                    self.scan_ident_from(start);
                }
                c if c.is_ascii_digit() => self.scan_number(),
                '.' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => self.scan_number(),
                '+' | '-' if self.peek_next() == Some(c) => {
                    self.advance();
                    self.advance();
                    self.push(TokenKind::Punct, start);
                }
                _ => {
                    self.advance();
                    self.push(TokenKind::Punct, start);
                }
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> LexResult<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    let start = self.pos;
                    match self.source[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => return Err(self.error(start, "unterminated block comment")),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// A `/` (or JSX `<`) starts a literal unless the previous token ends a value
    fn regex_allowed(&self) -> bool {
        let Some(last) = self.tokens.len().checked_sub(1) else {
            return true;
        };
        let prev = &self.tokens[last];
        match prev.kind {
            TokenKind::Str | TokenKind::Template | TokenKind::Regex | TokenKind::Number => false,
            TokenKind::Ident => self.is_keyword_at(last, REGEX_PRECEDING_KEYWORDS),
            TokenKind::Punct => match prev.text {
                ")" => self.after_control_paren,
                "]" | "}" | "++" | "--" => false,
                _ => true,
            },
        }
    }

    /// Whether the token at `index` is one of `keywords` used as a keyword;
    /// after `.` or `?.` it is a property name
    fn is_keyword_at(&self, index: usize, keywords: &[&str]) -> bool {
        let token = &self.tokens[index];
        token.kind == TokenKind::Ident
            && keywords.contains(&token.text)
            && !index
                .checked_sub(1)
                .is_some_and(|i| self.tokens[i].is_punct("."))
    }

    fn looks_like_jsx(&self) -> bool {
        self.peek_next()
            .is_some_and(|c| c == '>' || is_ident_start(c))
    }

    /// `<T,` or `<T extends` after the `<` at the current position
    fn looks_like_type_parameters(&self) -> bool {
        let rest = &self.source[self.pos + 1..];
        let name_len = rest
            .find(|c: char| !is_ident_continue(c))
            .unwrap_or(rest.len());
        let after = rest[name_len..].trim_start();
        after.starts_with(',')
            || after
                .strip_prefix("extends")
                .is_some_and(|tail| tail.starts_with(char::is_whitespace))
    }

    /// Scan a JSX element at `<`, or emit `<` as punctuation when it is not one
    fn scan_jsx_or_less_than(&mut self) {
        let start = self.pos;
        if !self.looks_like_type_parameters() {
            let tokens = self.tokens.len();
            let parens = self.parens.clone();
            if self.scan_jsx_element().is_ok() {
                return;
            }
            self.pos = start;
            self.tokens.truncate(tokens);
            self.parens = parens;
        }
        self.advance();
        self.push(TokenKind::Punct, start);
    }

    fn scan_ident(&mut self) {
        let start = self.pos;
        self.scan_ident_from(start);
    }

    fn scan_ident_from(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if !is_ident_continue(c) {
                break;
            }
            self.advance();
        }
        self.push(TokenKind::Ident, start);
    }

    fn scan_number(&mut self) {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '.' || c == '_') {
                break;
            }
            self.advance();
        }
        self.push(TokenKind::Number, start);
    }

    fn scan_string(&mut self, quote: char) -> LexResult<()> {
        let start = self.pos;
        self.advance();
        loop {
            match self.advance() {
                None | Some('\n') => return Err(self.error(start, "unterminated string literal")),
                Some('\\') => {
                    self.advance();
                }
                Some(c) if c == quote => break,
                Some(_) => {}
            }
        }
        self.push(TokenKind::Str, start);
        Ok(())
    }

    fn scan_template(&mut self) -> LexResult<()> {
        let start = self.pos;
        self.advance();
        loop {
            match self.advance() {
                None => return Err(self.error(start, "unterminated template literal")),
                Some('\\') => {
                    self.advance();
                }
                Some('`') => break,
                Some('$') if self.peek() == Some('{') => {
                    self.advance();
                    self.lex_tokens(true)?;
                }
                Some(_) => {}
            }
        }
        self.push(TokenKind::Template, start);
        Ok(())
    }

    fn scan_regex(&mut self) -> LexResult<()> {
        let start = self.pos;
        self.advance();
        let mut in_class = false;
        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(self.error(start, "unterminated regular expression"));
                }
                Some('\\') => {
                    self.advance();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(_) => {}
            }
        }
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        self.push(TokenKind::Regex, start);
        Ok(())
    }

    /// Skip a JSX element starting at `<`, lexing its `{}` expression containers
    fn scan_jsx_element(&mut self) -> LexResult<()> {
        let source = self.source;
        let start = self.pos;
        self.advance();

        let name_start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !(c.is_whitespace() || matches!(c, '/' | '>' | '{')))
        {
            self.advance();
        }
        let name = &source[name_start..self.pos];

        // Opening tag: name and attributes
        loop {
            match self.peek() {
                None => return Err(self.error(start, "unterminated JSX element")),
                Some('/') if self.peek_next() == Some('>') => {
                    self.advance();
                    self.advance();
                    self.push(TokenKind::Template, start);
                    return Ok(());
                }
                Some('>') => {
                    self.advance();
                    break;
                }
                Some('{') => {
                    self.advance();
                    self.lex_tokens(true)?;
                }
                Some(q @ ('"' | '\'')) => {
                    let attr_start = self.pos;
                    self.advance();
                    loop {
                        match self.advance() {
                            None => {
                                return Err(self.error(attr_start, "unterminated JSX attribute"));
                            }
                            Some(c) if c == q => break,
                            Some(_) => {}
                        }
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        // Children until the matching closing tag
        loop {
            match self.peek() {
                None => return Err(self.error(start, "unterminated JSX element")),
                Some('<') if self.peek_next() == Some('/') => {
                    self.pos += 2;
                    let close_start = self.pos;
                    let Some(len) = source[close_start..].find('>') else {
                        return Err(self.error(start, "unterminated JSX element"));
                    };
                    self.pos = close_start + len + 1;
                    if source[close_start..close_start + len].trim() != name {
                        return Err(self.error(start, "mismatched JSX closing tag"));
                    }
                    self.push(TokenKind::Template, start);
                    return Ok(());
                }
                Some('<') => self.scan_jsx_element()?,
                Some('{') => {
                    self.advance();
                    self.lex_tokens(true)?;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\u{200c}' || c == '\u{200d}'
}

/// Decode the common escape sequences of a string literal body
fn unescape(body: &str) -> String {
    if !body.contains('\\') {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\n') | None => {}
            Some(other) => out.push(other),
        }
    }
    out
}

/// Quote `value` as a string literal using `quote`
pub fn quote_literal(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        if c == '\\' || c == quote {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(source, true)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text.to_string()))
            .collect()
    }

    fn strings(source: &str, jsx: bool) -> Vec<String> {
        Lexer::new(source, jsx)
            .tokenize()
            .unwrap()
            .into_iter()
            .filter_map(|t| t.string_value())
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = kinds("const a = require('foo');");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Ident, "const".to_string()),
                (TokenKind::Ident, "a".to_string()),
                (TokenKind::Punct, "=".to_string()),
                (TokenKind::Ident, "require".to_string()),
                (TokenKind::Punct, "(".to_string()),
                (TokenKind::Str, "'foo'".to_string()),
                (TokenKind::Punct, ")".to_string()),
                (TokenKind::Punct, ";".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// require('a')\n/* import 'b' */ x";
        assert!(strings(source, false).is_empty());
    }

    #[test]
    fn test_regex_vs_division() {
        let source = "const r = /'foo'/g; const d = a / b / c; x = 'real';";
        assert_eq!(strings(source, false), vec!["real"]);
    }

    #[test]
    fn test_regex_with_slash_in_class() {
        let source = "s.replace(/[/']/g, 'x')";
        assert_eq!(strings(source, false), vec!["x"]);
    }

    #[test]
    fn test_template_with_nested_expression() {
        let source = "const t = `a ${require('inner')} 'b' ${ {k: `x${1}`} }`; 'after'";
        assert_eq!(strings(source, false), vec!["inner", "after"]);
    }

    #[test]
    fn test_jsx_text_with_apostrophe() {
        let source = "const el = <div className=\"a\">Don't {require('x')}<br/></div>; 'after'";
        assert_eq!(strings(source, true), vec!["x", "after"]);
    }

    #[test]
    fn test_comparison_is_not_jsx() {
        let source = "if (a < b && c > d) { x = 'y'; }";
        assert_eq!(strings(source, true), vec!["y"]);
    }

    #[test]
    fn test_tsx_type_parameters_are_not_jsx() {
        let source = "export const id = <T,>(x: T) => x;\nconst b = <T extends object>(x: T) => x;\nrequire('m');";
        assert_eq!(strings(source, true), vec!["m"]);
    }

    #[test]
    fn test_flow_generic_arrow_is_not_jsx() {
        let source = "// @flow\nconst id = <T>(x: T): T => x;\nconst el = <div title='t'>{require('a')}</div>;\nrequire('b');";
        assert_eq!(strings(source, true), vec!["a", "b"]);
    }

    #[test]
    fn test_jsx_closing_tag_must_match() {
        let source = "const el = <A><b>Don't</b>{require('x')}</A>; 'after'";
        assert_eq!(strings(source, true), vec!["x", "after"]);
    }

    #[test]
    fn test_regex_after_control_keyword_paren() {
        let source = "if (ok) /'/.test(s);\nwhile (x) /\"/g.exec(s);\nrequire('m');";
        assert_eq!(strings(source, false), vec!["m"]);
    }

    #[test]
    fn test_division_after_call_paren() {
        let source = "const half = total(a) / 2 / 'x'.length; 'y'";
        assert_eq!(strings(source, false), vec!["x", "y"]);
    }

    #[test]
    fn test_keyword_property_is_a_value() {
        let source = "const r = obj.in / 2; const m = require('M'); const q = a?.of / 2;";
        assert_eq!(strings(source, false), vec!["M"]);
        let source = "x.delete / res.return / y; 'z'";
        assert_eq!(strings(source, false), vec!["z"]);
    }

    #[test]
    fn test_escapes_are_decoded() {
        assert_eq!(strings(r#"x = 'it\'s'; y = "a\\b""#, false), vec!["it's", "a\\b"]);
    }

    #[test]
    fn test_unterminated_string_reports_position() {
        let err = Lexer::new("a;\nb = 'oops\n", false).tokenize().unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 5);
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Lexer::new("/* never closed", false).tokenize().unwrap_err();
        assert!(err.message.contains("block comment"));
    }

    #[test]
    fn test_hashbang_is_skipped() {
        assert_eq!(strings("#!/usr/bin/env node\nrequire('m')", false), vec!["m"]);
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("./M/index", '\''), "'./M/index'");
        assert_eq!(quote_literal("a'b", '\''), "'a\\'b'");
        assert_eq!(quote_literal("a'b", '"'), "\"a'b\"");
    }
}
