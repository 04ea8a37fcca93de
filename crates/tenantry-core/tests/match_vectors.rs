//! Permission entry matching vectors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use tenantry_core::{CapabilityKind, PermissionEntry, TargetPattern};

use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn entry_vectors() {
    let files = [
        "file_subtree.json",
        "file_children.json",
        "exact_any_action.json",
        "dotted_children.json",
        "network_ports.json",
        "all_kind.json",
    ];

    for f in files {
        let v = load(f);
        let entry = v.entry.build();
        for case in &v.cases {
            let req = case.request.build();
            assert_eq!(
                entry.implies(&req),
                case.expect,
                "vector={} request={}",
                v.description,
                req
            );
        }
    }
}

#[test]
fn pattern_forms_parse_from_trailing_marker() {
    assert_eq!(TargetPattern::parse("/a/-"), TargetPattern::Subtree("/a/".into()));
    assert_eq!(TargetPattern::parse("/a/*"), TargetPattern::Children("/a/".into()));
    assert_eq!(TargetPattern::parse("/a/b"), TargetPattern::Exact("/a/b".into()));
    assert_eq!(TargetPattern::parse("/a/-").to_string(), "/a/-");
}

#[test]
fn subtree_entry_implies_narrower_entries() {
    let wide = PermissionEntry::new(CapabilityKind::FileAccess, "/opt/-", Some("read"));
    let narrow = PermissionEntry::new(CapabilityKind::FileAccess, "/opt/lib/-", Some("read"));
    let kids = PermissionEntry::new(CapabilityKind::FileAccess, "/opt/lib/*", Some("read"));
    let exact = PermissionEntry::new(CapabilityKind::FileAccess, "/opt/lib/a", Some("read"));

    assert!(wide.implies_entry(&narrow));
    assert!(wide.implies_entry(&kids));
    assert!(wide.implies_entry(&exact));
    assert!(!narrow.implies_entry(&wide));
    assert!(!kids.implies_entry(&narrow));
}

#[test]
fn action_scoped_entry_does_not_imply_unscoped_entry() {
    let read = PermissionEntry::new(CapabilityKind::FileAccess, "/opt/-", Some("read"));
    let any = PermissionEntry::new(CapabilityKind::FileAccess, "/opt/-", None);
    assert!(any.implies_entry(&read));
    assert!(!read.implies_entry(&any));
}

#[test]
fn kind_names_round_trip_through_policy_text() {
    for k in CapabilityKind::KINDS {
        assert_eq!(CapabilityKind::from_name(k.as_str()), Some(k));
    }
    assert_eq!(CapabilityKind::from_name("java.io.FilePermission"), None);
}
