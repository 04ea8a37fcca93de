//! Tokenizer behaviour shared by both configuration languages.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tenantry_core::grammar::{tokenize, TokenKind, TokenStream};
use tenantry_core::ConfigSource;

#[test]
fn comments_are_skipped_and_lines_tracked() {
    let src = "// header\ngrant USER {\n  /* block\n  comment */ permission Runtime \"exit\" ;\n}\n";
    let toks = tokenize(src, ConfigSource::Policy).unwrap();
    let texts: Vec<&str> = toks.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["grant", "USER", "{", "permission", "Runtime", "exit", ";", "}"]);
    assert_eq!(toks[0].line, 2);
    assert_eq!(toks[3].line, 4);
    assert_eq!(toks[5].kind, TokenKind::Quoted);
    assert_eq!(toks[7].line, 5);
}

#[test]
fn words_stop_at_punctuation() {
    let toks = tokenize("packages{a.b,c.d}", ConfigSource::Whitelist).unwrap();
    let texts: Vec<&str> = toks.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["packages", "{", "a.b", ",", "c.d", "}"]);
}

#[test]
fn quoted_values_keep_punctuation_and_escapes() {
    let toks = tokenize(r#"'a;b' "c\"d" "read,write""#, ConfigSource::Policy).unwrap();
    assert_eq!(toks[0].text, "a;b");
    assert_eq!(toks[1].text, "c\"d");
    assert_eq!(toks[2].text, "read,write");
    assert!(toks.iter().all(|t| t.kind == TokenKind::Quoted));
}

#[test]
fn unterminated_string_reports_its_line() {
    let err = tokenize("grant X {\n permission Runtime \"oops ;\n}", ConfigSource::Policy)
        .expect_err("must fail");
    assert_eq!(err.line, 2);
    assert!(err.message.contains("unterminated string"));
}

#[test]
fn unterminated_comment_fails() {
    let err = tokenize("packages { a } /* never closed", ConfigSource::Whitelist)
        .expect_err("must fail");
    assert_eq!(err.config, ConfigSource::Whitelist);
}

#[test]
fn stream_reports_unexpected_end() {
    let mut ts = TokenStream::new("grant", ConfigSource::Policy).unwrap();
    assert!(ts.next().unwrap().is_word("grant"));
    let err = ts.next().expect_err("must fail");
    assert!(err.message.contains("unexpected end of input"));
    assert!(ts.is_eof());
}

#[test]
fn stream_rejects_punctuation_as_value() {
    let mut ts = TokenStream::new("{ }", ConfigSource::Policy).unwrap();
    let err = ts.next_value("grant name").expect_err("must fail");
    assert!(err.message.contains("expected grant name"));
}
