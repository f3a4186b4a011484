//! Tokenizer for the RFC 4512 schema definition language.

use crate::error::{SchemaError, SchemaResult};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Token classes of the definition grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LParen,
    RParen,
    LCurly,
    RCurly,
    Dollar,
    /// Dotted-decimal OID, e.g. `2.5.4.3`
    NumericOid,
    /// Numeric OID with a length bound, e.g. `1.3.6.1.4.1.1466.115.121.1.15{256}`
    NoidLen,
    /// Bare descriptor, e.g. `cn`
    Descr,
    /// Quoted descriptor, e.g. `'cn'`
    QDescr,
    /// Quoted free text, e.g. `'Common Name'`
    QDString,
    /// Upper-case clause keyword, e.g. `NAME` or `X-ORIGIN`
    Keyword,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LCurly => "LCURLY",
            TokenKind::RCurly => "RCURLY",
            TokenKind::Dollar => "DOLLAR",
            TokenKind::NumericOid => "NUMERICOID",
            TokenKind::NoidLen => "NOIDLEN",
            TokenKind::Descr => "DESCR",
            TokenKind::QDescr => "QDESCR",
            TokenKind::QDString => "QDSTRING",
            TokenKind::Keyword => "KEYWORD",
        };
        f.write_str(name)
    }
}

/// A classified token. Quoted tokens carry their unquoted, unescaped text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

// Tighter grammars first so that e.g. `NAME` is a keyword and `2.5` an OID.
const BARE_GRAMMARS: &[(TokenKind, &str)] = &[
    (TokenKind::NumericOid, r"^[0-9]+(\.[0-9]+)*$"),
    (TokenKind::NoidLen, r"^[0-9]+(\.[0-9]+)*\{[0-9]+\}$"),
    (TokenKind::Keyword, r"^[A-Z][A-Z0-9_-]*$"),
    (TokenKind::Descr, r"^[A-Za-z][A-Za-z0-9-]*$"),
];

static GRAMMARS: LazyLock<Vec<(TokenKind, Regex)>> = LazyLock::new(|| {
    BARE_GRAMMARS
        .iter()
        .map(|(kind, pattern)| (*kind, Regex::new(pattern).expect("token grammar is a valid regex")))
        .collect()
});

static QDESCR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("qdescr grammar is a valid regex"));

fn classify_bare(text: &str, line: usize) -> SchemaResult<Token> {
    match text {
        "{" => return Ok(Token::new(TokenKind::LCurly, text, line)),
        "}" => return Ok(Token::new(TokenKind::RCurly, text, line)),
        _ => {}
    }
    GRAMMARS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(kind, _)| Token::new(*kind, text, line))
        .ok_or_else(|| SchemaError::Parse {
            message: "unrecognised token".to_string(),
            token: "TEXT".to_string(),
            text: text.to_string(),
            line,
        })
}

fn unescape(raw: &str) -> String {
    raw.replace("\\27", "'")
        .replace("\\5C", "\\")
        .replace("\\5c", "\\")
}

fn classify_quoted(raw: &str, line: usize) -> Token {
    let is_descr = QDESCR.is_match(raw);
    if is_descr {
        Token::new(TokenKind::QDescr, raw, line)
    } else {
        Token::new(TokenKind::QDString, unescape(raw), line)
    }
}

fn flush(current: &mut String, line: usize, tokens: &mut Vec<Token>) -> SchemaResult<()> {
    if !current.is_empty() {
        tokens.push(classify_bare(current, line)?);
        current.clear();
    }
    Ok(())
}

/// Split schema text into classified tokens.
///
/// `(`, `)` and `$` are tokens of their own even when written without
/// surrounding whitespace. Text from an unquoted `#` to the end of the line
/// is a comment.
pub fn tokenize(input: &str) -> SchemaResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut in_comment = false;
    let mut line = 1;
    let mut token_line = 1;

    for c in input.chars() {
        if in_quote {
            if c == '\'' {
                in_quote = false;
                tokens.push(classify_quoted(&current, token_line));
                current.clear();
            } else {
                if c == '\n' {
                    line += 1;
                }
                current.push(c);
            }
            continue;
        }
        if in_comment {
            if c == '\n' {
                in_comment = false;
                line += 1;
            }
            continue;
        }
        match c {
            '\n' => {
                flush(&mut current, token_line, &mut tokens)?;
                line += 1;
            }
            c if c.is_whitespace() => flush(&mut current, token_line, &mut tokens)?,
            '#' if current.is_empty() => in_comment = true,
            '\'' if current.is_empty() => {
                in_quote = true;
                token_line = line;
            }
            '(' | ')' | '$' => {
                flush(&mut current, token_line, &mut tokens)?;
                let kind = match c {
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    _ => TokenKind::Dollar,
                };
                tokens.push(Token::new(kind, c.to_string(), line));
            }
            c => {
                if current.is_empty() {
                    token_line = line;
                }
                current.push(c);
            }
        }
    }

    if in_quote {
        return Err(SchemaError::Parse {
            message: "unterminated quoted string".to_string(),
            token: TokenKind::QDString.to_string(),
            text: current,
            line: token_line,
        });
    }
    flush(&mut current, token_line, &mut tokens)?;
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_grammar_compiles() {
        assert_eq!(GRAMMARS.len(), BARE_GRAMMARS.len());
        for ((kind, re), (expected, pattern)) in GRAMMARS.iter().zip(BARE_GRAMMARS) {
            assert_eq!(kind, expected);
            assert_eq!(re.as_str(), *pattern);
        }
        assert!(QDESCR.is_match("commonName"));
        assert!(!QDESCR.is_match("Common Name"));
    }
}
