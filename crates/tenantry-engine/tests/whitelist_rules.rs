#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod fixtures;

use tenantry_core::ConfigSource;
use tenantry_engine::whitelist::{load_whitelist, WhitelistValidator};

fn fixture() -> WhitelistValidator {
    load_whitelist(fixtures::WHITELIST).expect("fixture whitelist parses")
}

#[test]
fn package_matches_immediate_children_only() {
    let wl = fixture();
    assert!(wl.is_accepted("a.b.Helper"));
    assert!(!wl.is_accepted("a.b.c.Helper"));
    assert!(!wl.is_accepted("a.bx.Helper"));
    assert!(!wl.is_accepted("a.Helper"));
    assert!(!wl.is_accepted("Helper"));
}

#[test]
fn exact_names_and_trusted_library_prefix() {
    let wl = fixture();
    assert!(wl.is_accepted("x.y.Z"));
    assert!(!wl.is_accepted("x.y.W"));
    assert!(wl.is_accepted("platform.taglib.core.Tag"));
}

#[test]
fn resources_use_parent_directory() {
    let wl = fixture();
    assert!(wl.is_allowed_resource("a/b/data.txt"));
    assert!(!wl.is_allowed_resource("a/b/c/data.txt"));
    assert!(wl.is_allowed_resource("platform/io/readme"));
    assert!(wl.is_allowed_resource("META-INF/manifest.yaml"));
    assert!(wl.is_allowed_resource("platform/taglib/x/tags.yaml"));
    assert!(!wl.is_allowed_resource("data.txt"));
}

#[test]
fn blocks_accumulate_and_extra_commas_are_tolerated() {
    let wl = load_whitelist(
        r#"
packages { , "a.b",, "a.c", }
/* more */
packages { 'd.e' }
classes { }
"#,
    )
    .unwrap();
    assert_eq!(wl.package_count(), 3);
    assert_eq!(wl.name_count(), 0);
    assert!(wl.is_accepted("d.e.F"));
}

#[test]
fn missing_comma_is_rejected() {
    let err = load_whitelist("packages {\n  \"a.b\"\n  \"a.c\"\n}").unwrap_err();
    assert_eq!(err.config, ConfigSource::Whitelist);
    assert_eq!(err.line, 3);
}

#[test]
fn unknown_block_keyword_is_rejected() {
    let err = load_whitelist("packages { \"a\" }\nmodules { \"b\" }").unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("modules"));
}

#[test]
fn unterminated_block_is_rejected() {
    let err = load_whitelist("classes { \"a.B\",").unwrap_err();
    assert!(err.message.contains("unexpected end of input"));

    let err = load_whitelist("packages \"a\" }").unwrap_err();
    assert!(err.message.contains("expected '{'"));
}

#[test]
fn empty_source_is_empty_whitelist() {
    let wl = load_whitelist("// nothing here\n").unwrap();
    assert_eq!(wl.package_count(), 0);
    assert!(!wl.is_accepted("a.b.C"));
}
