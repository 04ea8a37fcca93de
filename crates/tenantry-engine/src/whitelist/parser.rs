//! Whitelist language.
//!
//! ```text
//! packages { "a.b", "a.c" }
//! classes  { "x.y.Z" }
//! ```
//!
//! Blocks may repeat and appear in any order. Items must be separated by a
//! comma; a missing comma is a parse error.

use std::collections::HashSet;

use tenantry_core::grammar::TokenStream;
use tenantry_core::{ConfigSource, ParseError};

use super::validator::WhitelistValidator;

pub(crate) fn parse(src: &str) -> Result<WhitelistValidator, ParseError> {
    let mut ts = TokenStream::new(src, ConfigSource::Whitelist)?;
    let mut packages = HashSet::new();
    let mut names = HashSet::new();

    while !ts.is_eof() {
        let tok = ts.next()?;
        if tok.is_word("packages") {
            parse_block(&mut ts, &mut packages)?;
        } else if tok.is_word("classes") {
            parse_block(&mut ts, &mut names)?;
        } else {
            return Err(ts.error(format!(
                "expected 'packages' or 'classes', found '{}'",
                tok.text
            )));
        }
    }

    Ok(WhitelistValidator::new(packages, names))
}

fn parse_block(ts: &mut TokenStream, into: &mut HashSet<String>) -> Result<(), ParseError> {
    ts.expect_punct('{')?;
    // Seeded to 1 so the first item needs no leading comma.
    let mut commas = 1usize;
    loop {
        let mut tok = ts.next()?;
        while tok.is_punct(',') {
            commas += 1;
            tok = ts.next()?;
        }
        if tok.is_punct('}') {
            return Ok(());
        }
        if !tok.is_value() {
            return Err(ts.error(format!("unexpected '{}'", tok.text)));
        }
        if commas == 0 {
            return Err(ts.error(format!("expected ',' before '{}'", tok.text)));
        }
        commas = 0;
        into.insert(tok.text);
    }
}
