//! Recursive-descent reader for attribute type and object class definitions.

use super::tokenizer::{Token, TokenKind, tokenize};
use crate::error::{SchemaError, SchemaResult};
use crate::schema::builder::{AttributeTypeBuilder, ObjectClassBuilder};
use crate::schema::types::{ObjectClassKind, Usage};

/// Slice a token stream into the bodies of its top-level `( ... )` groups.
fn split_definitions(tokens: &[Token]) -> SchemaResult<Vec<&[Token]>> {
    let mut definitions = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => {
                if depth == 0 {
                    start = index + 1;
                }
                depth += 1;
            }
            TokenKind::RParen => {
                if depth == 0 {
                    return Err(SchemaError::UnbalancedParentheses { line: token.line });
                }
                depth -= 1;
                if depth == 0 {
                    definitions.push(&tokens[start..index]);
                }
            }
            _ if depth == 0 => {
                return Err(unexpected(token, "expected '(' to open a definition"));
            }
            _ => {}
        }
    }
    if depth != 0 {
        let line = tokens.last().map(|t| t.line).unwrap_or(1);
        return Err(SchemaError::UnbalancedParentheses { line });
    }
    Ok(definitions)
}

fn unexpected(token: &Token, message: &str) -> SchemaError {
    SchemaError::Parse {
        message: message.to_string(),
        token: token.kind.to_string(),
        text: token.text.clone(),
        line: token.line,
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, position: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position);
        self.position += 1;
        token
    }

    fn end_of_input(&self, message: &str) -> SchemaError {
        let line = self.tokens.last().map(|t| t.line).unwrap_or(1);
        SchemaError::Parse {
            message: format!("{message}, found end of definition"),
            token: "END".to_string(),
            text: String::new(),
            line,
        }
    }

    fn expect(&mut self, kinds: &[TokenKind], message: &str) -> SchemaResult<&'a Token> {
        match self.next() {
            Some(token) if kinds.contains(&token.kind) => Ok(token),
            Some(token) => Err(unexpected(token, message)),
            None => Err(self.end_of_input(message)),
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// `oid = descr / numericoid`; keyword-shaped descriptors are accepted.
    fn oid(&mut self) -> SchemaResult<String> {
        let token = self.expect(
            &[TokenKind::NumericOid, TokenKind::Descr, TokenKind::Keyword],
            "expected an OID or descriptor",
        )?;
        Ok(token.text.clone())
    }

    /// `oids = oid / ( LPAREN oidlist RPAREN )`
    fn oids(&mut self) -> SchemaResult<Vec<String>> {
        if !self.at(TokenKind::LParen) {
            return Ok(vec![self.oid()?]);
        }
        self.next();
        let mut oids = vec![self.oid()?];
        loop {
            let token = self.expect(&[TokenKind::Dollar, TokenKind::RParen], "expected '$' or ')'")?;
            if token.kind == TokenKind::RParen {
                return Ok(oids);
            }
            oids.push(self.oid()?);
        }
    }

    /// `qdescrs = qdescr / ( LPAREN qdescrlist RPAREN )`
    fn qdescrs(&mut self) -> SchemaResult<Vec<String>> {
        self.quoted_list(TokenKind::QDescr, "expected a quoted descriptor")
    }

    fn qdstring(&mut self) -> SchemaResult<String> {
        let token = self.expect(&[TokenKind::QDString, TokenKind::QDescr], "expected a quoted string")?;
        Ok(token.text.clone())
    }

    /// Extension values: one quoted string or a parenthesised list of them.
    fn qdstrings(&mut self) -> SchemaResult<Vec<String>> {
        if !self.at(TokenKind::LParen) {
            return Ok(vec![self.qdstring()?]);
        }
        self.next();
        let mut values = Vec::new();
        loop {
            let token = self.expect(
                &[TokenKind::QDString, TokenKind::QDescr, TokenKind::RParen],
                "expected a quoted string or ')'",
            )?;
            if token.kind == TokenKind::RParen {
                return Ok(values);
            }
            values.push(token.text.clone());
        }
    }

    fn quoted_list(&mut self, kind: TokenKind, message: &str) -> SchemaResult<Vec<String>> {
        if !self.at(TokenKind::LParen) {
            return Ok(vec![self.expect(&[kind], message)?.text.clone()]);
        }
        self.next();
        let mut values = Vec::new();
        loop {
            let token = self.expect(&[kind, TokenKind::RParen], message)?;
            if token.kind == TokenKind::RParen {
                return Ok(values);
            }
            values.push(token.text.clone());
        }
    }

    /// `noidlen = numericoid [ LCURLY len RCURLY ]`
    fn noidlen(&mut self) -> SchemaResult<(String, Option<u32>)> {
        let token = self.expect(
            &[TokenKind::NumericOid, TokenKind::NoidLen],
            "expected a syntax OID",
        )?;
        if token.kind == TokenKind::NoidLen {
            let (oid, rest) = token
                .text
                .split_once('{')
                .ok_or_else(|| unexpected(token, "malformed length bound"))?;
            let length = rest
                .trim_end_matches('}')
                .parse()
                .map_err(|_| unexpected(token, "malformed length bound"))?;
            return Ok((oid.to_string(), Some(length)));
        }
        if !self.at(TokenKind::LCurly) {
            return Ok((token.text.clone(), None));
        }
        self.next();
        let length = self.expect(&[TokenKind::NumericOid], "expected a length")?;
        let bound = length
            .text
            .parse()
            .map_err(|_| unexpected(length, "malformed length bound"))?;
        self.expect(&[TokenKind::RCurly], "expected '}'")?;
        Ok((token.text.clone(), Some(bound)))
    }

    fn numericoid(&mut self) -> SchemaResult<String> {
        match self.next() {
            Some(token) if token.kind == TokenKind::NumericOid => Ok(token.text.clone()),
            Some(token) => Err(unexpected(token, "expected the numeric OID of the definition")),
            None => Err(SchemaError::MissingOid),
        }
    }

    fn keyword(&mut self) -> SchemaResult<Option<&'a Token>> {
        match self.next() {
            None => Ok(None),
            Some(token) if token.kind == TokenKind::Keyword => Ok(Some(token)),
            Some(token) => Err(unexpected(token, "expected a keyword")),
        }
    }
}

fn unknown_keyword(token: &Token) -> SchemaError {
    SchemaError::UnknownKeyword {
        keyword: token.text.clone(),
        line: token.line,
    }
}

fn read_attribute_type(body: &[Token]) -> SchemaResult<AttributeTypeBuilder> {
    let mut cursor = Cursor::new(body);
    let mut builder = AttributeTypeBuilder::default();
    builder.oid = Some(cursor.numericoid()?);
    while let Some(keyword) = cursor.keyword()? {
        match keyword.text.as_str() {
            "NAME" => builder.names = cursor.qdescrs()?,
            "DESC" => builder.description = Some(cursor.qdstring()?),
            "OBSOLETE" => builder.obsolete = true,
            "SUP" => builder.sup = Some(cursor.oid()?),
            "EQUALITY" => builder.equality = Some(cursor.oid()?),
            "ORDERING" => builder.ordering = Some(cursor.oid()?),
            "SUBSTR" => builder.substr = Some(cursor.oid()?),
            "SYNTAX" => {
                let (oid, length) = cursor.noidlen()?;
                builder.syntax = Some(oid);
                builder.max_length = length;
            }
            "SINGLE-VALUE" => builder.single_value = true,
            "COLLECTIVE" => builder.collective = true,
            "NO-USER-MODIFICATION" => builder.no_user_modification = true,
            "USAGE" => {
                let token = cursor.expect(&[TokenKind::Descr, TokenKind::Keyword], "expected a usage")?;
                builder.usage =
                    Some(Usage::from_descr(&token.text).ok_or_else(|| unexpected(token, "unknown usage"))?);
            }
            extension if extension.starts_with("X-") => {
                builder.extensions.insert(extension.to_string(), cursor.qdstrings()?);
            }
            _ => return Err(unknown_keyword(keyword)),
        }
    }
    Ok(builder)
}

fn read_object_class(body: &[Token]) -> SchemaResult<ObjectClassBuilder> {
    let mut cursor = Cursor::new(body);
    let mut builder = ObjectClassBuilder::default();
    builder.oid = Some(cursor.numericoid()?);
    while let Some(keyword) = cursor.keyword()? {
        match keyword.text.as_str() {
            "NAME" => builder.names = cursor.qdescrs()?,
            "DESC" => builder.description = Some(cursor.qdstring()?),
            "OBSOLETE" => builder.obsolete = true,
            "SUP" => builder.sup = cursor.oids()?,
            "ABSTRACT" => builder.kind = Some(ObjectClassKind::Abstract),
            "STRUCTURAL" => builder.kind = Some(ObjectClassKind::Structural),
            "AUXILIARY" => builder.kind = Some(ObjectClassKind::Auxiliary),
            "MUST" => builder.must = cursor.oids()?,
            "MAY" => builder.may = cursor.oids()?,
            extension if extension.starts_with("X-") => {
                builder.extensions.insert(extension.to_string(), cursor.qdstrings()?);
            }
            _ => return Err(unknown_keyword(keyword)),
        }
    }
    Ok(builder)
}

/// Parse every attribute type definition in `input`.
pub fn parse_attribute_types(input: &str) -> SchemaResult<Vec<AttributeTypeBuilder>> {
    let tokens = tokenize(input)?;
    let builders = split_definitions(&tokens)?
        .into_iter()
        .map(read_attribute_type)
        .collect::<SchemaResult<Vec<_>>>()?;
    log::debug!("Parsed {} attribute type definitions", builders.len());
    Ok(builders)
}

/// Parse every object class definition in `input`.
pub fn parse_object_classes(input: &str) -> SchemaResult<Vec<ObjectClassBuilder>> {
    let tokens = tokenize(input)?;
    let builders = split_definitions(&tokens)?
        .into_iter()
        .map(read_object_class)
        .collect::<SchemaResult<Vec<_>>>()?;
    log::debug!("Parsed {} object class definitions", builders.len());
    Ok(builders)
}
