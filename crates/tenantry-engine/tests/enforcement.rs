#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod fixtures;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use fixtures::{bootstrap_origin, shared_origin, tenant_origin};
use tenantry_core::{CapabilityKind, CapabilityRequest, ErrorClass, TrustError};
use tenantry_engine::enforce::{chain, push_frame, with_frame, ActiveFrame, FrameKind};
use tenantry_engine::enforce::{Decision, EnforcementContext};
use tenantry_engine::obs::EngineMetrics;

fn ctx() -> EnforcementContext {
    EnforcementContext::new(fixtures::policy())
}

fn deny(frame: usize, reason: &str) -> Decision {
    Decision::Deny {
        frame,
        reason: reason.to_string(),
    }
}

#[test]
fn baseline_requests_pass_with_empty_chain() {
    let ctx = ctx();
    assert_eq!(chain::depth(), 0);
    let req = CapabilityRequest::with_action(CapabilityKind::Property, "app.name", "read");
    assert_eq!(ctx.check_capability(&req), Decision::Allow);
    assert_eq!(ctx.check_capability(&CapabilityRequest::runtime("getName")), Decision::Allow);
}

#[test]
fn empty_chain_denies_non_baseline_requests() {
    let ctx = ctx();
    assert_eq!(
        ctx.check_capability(&CapabilityRequest::file_read("/opt/shared/x")),
        deny(0, "no checkable frames")
    );
}

#[test]
fn shared_module_reads_its_own_tree_only() {
    let ctx = ctx();
    let _g = push_frame(shared_origin("/opt/shared/lib/foo"), FrameKind::Ordinary);

    assert_eq!(
        ctx.check_capability(&CapabilityRequest::file_read("/opt/shared/lib/foo/data.txt")),
        Decision::Allow
    );
    assert_eq!(
        ctx.check_capability(&CapabilityRequest::file_read("/etc/passwd")),
        deny(0, "not implied by SHARED")
    );
}

#[test]
fn privileged_shared_frame_elevates_over_tenant_caller() {
    let ctx = ctx();
    let req = CapabilityRequest::file_read("/opt/shared/lib/conf.yaml");

    let _tenant = push_frame(tenant_origin("acme", "/acme/app.tgz"), FrameKind::Ordinary);
    assert_eq!(ctx.check_capability(&req), deny(0, "not implied by TENANT_ACME"));

    let _shared = push_frame(shared_origin("/opt/shared/lib/io"), FrameKind::PrivilegedEntry);
    let _boot = push_frame(bootstrap_origin(), FrameKind::Ordinary);
    assert_eq!(ctx.check_capability(&req), Decision::Allow);
}

#[test]
fn privileged_frame_must_itself_hold_the_capability() {
    let ctx = ctx();
    let _tenant = push_frame(tenant_origin("acme", "/acme/app.tgz"), FrameKind::Ordinary);
    let _shared = push_frame(shared_origin("/opt/shared/lib/io"), FrameKind::PrivilegedEntry);

    assert_eq!(
        ctx.check_capability(&CapabilityRequest::file_read("/data/acme/in.csv")),
        deny(0, "not implied by SHARED")
    );
}

#[test]
fn privileged_entry_from_tenant_is_denied() {
    let ctx = ctx();
    let _shared = push_frame(shared_origin("/opt/shared/lib/io"), FrameKind::Ordinary);
    let _tenant = push_frame(
        tenant_origin("acme", "/acme/app.tgz"),
        FrameKind::PrivilegedEntry,
    );

    assert_eq!(
        ctx.check_capability(&CapabilityRequest::file_read("/data/acme/in.csv")),
        deny(0, "privileged entry from untrusted origin")
    );
}

#[test]
fn outer_frames_are_checked_without_privileged_entry() {
    let ctx = ctx();
    let req = CapabilityRequest::file_read("/opt/shared/lib/conf.yaml");

    let _tenant = push_frame(tenant_origin("acme", "/acme/app.tgz"), FrameKind::Ordinary);
    let _shared = push_frame(shared_origin("/opt/shared/lib/io"), FrameKind::Ordinary);
    let _boot = push_frame(bootstrap_origin(), FrameKind::Ordinary);

    assert_eq!(ctx.check_capability(&req), deny(2, "not implied by TENANT_ACME"));
}

#[test]
fn engine_internal_frames_are_skipped() {
    let ctx = ctx();
    let req = CapabilityRequest::connect("db.internal:5432");

    let _shared = push_frame(shared_origin("/opt/shared/lib/db"), FrameKind::Ordinary);
    let _internal = push_frame(tenant_origin("acme", "/acme/x"), FrameKind::EngineInternal);
    assert_eq!(ctx.check_capability(&req), Decision::Allow);
}

#[test]
fn only_internal_frames_means_nothing_was_checked() {
    let ctx = ctx();
    let frames = vec![ActiveFrame {
        origin: bootstrap_origin(),
        kind: FrameKind::EngineInternal,
    }];
    assert_eq!(
        ctx.check_with_chain(&frames, &CapabilityRequest::connect("db.internal:5432")),
        deny(0, "no checkable frames")
    );
}

#[test]
fn explicit_chain_is_innermost_first() {
    let ctx = ctx();
    let frames = vec![
        ActiveFrame {
            origin: shared_origin("/opt/shared/lib/db"),
            kind: FrameKind::Ordinary,
        },
        ActiveFrame {
            origin: shared_origin("/opt/shared/lib/db"),
            kind: FrameKind::Ordinary,
        },
        ActiveFrame {
            origin: tenant_origin("acme", "/acme/app"),
            kind: FrameKind::Ordinary,
        },
    ];
    assert_eq!(
        ctx.check_with_chain(&frames, &CapabilityRequest::connect("db.internal:5432")),
        deny(2, "not implied by TENANT_ACME")
    );
    // the thread's own chain is untouched
    assert_eq!(chain::depth(), 0);
}

#[test]
fn guard_pops_frame_on_drop_and_on_panic() {
    {
        let _g = push_frame(bootstrap_origin(), FrameKind::Ordinary);
        assert_eq!(chain::depth(), 1);
    }
    assert_eq!(chain::depth(), 0);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _g = push_frame(shared_origin("/opt/shared/lib"), FrameKind::Ordinary);
        let _h = push_frame(bootstrap_origin(), FrameKind::PrivilegedEntry);
        panic!("module failed");
    }));
    assert!(result.is_err());
    assert_eq!(chain::depth(), 0);
}

#[test]
fn guard_pops_frame_on_error_propagation() {
    fn load(name: &str) -> Result<(), TrustError> {
        Err(TrustError::NotFound(name.into()))
    }

    fn call_module(origin: Arc<tenantry_core::ModuleOrigin>) -> Result<(), TrustError> {
        let _g = push_frame(origin, FrameKind::Ordinary);
        load("a.b.Missing")?;
        Ok(())
    }

    assert!(call_module(shared_origin("/opt/shared/lib")).is_err());
    assert_eq!(chain::depth(), 0);
}

#[test]
fn with_frame_scopes_the_push() {
    let ctx = ctx();
    let req = CapabilityRequest::file_read("/opt/shared/a");
    let inside = with_frame(shared_origin("/opt/shared/lib"), FrameKind::Ordinary, || {
        assert_eq!(chain::snapshot().len(), 1);
        ctx.check_capability(&req)
    });
    assert_eq!(inside, Decision::Allow);
    assert!(!ctx.check_capability(&req).is_allowed());
}

#[test]
fn snapshot_lists_innermost_first() {
    let _outer = push_frame(tenant_origin("acme", "/acme/app"), FrameKind::Ordinary);
    let _inner = push_frame(bootstrap_origin(), FrameKind::EngineInternal);
    let snap = chain::snapshot();
    assert_eq!(snap.len(), 2);
    assert_eq!(snap[0].kind, FrameKind::EngineInternal);
    assert_eq!(snap[1].kind, FrameKind::Ordinary);
}

#[test]
fn ensure_surfaces_denial_and_counts_it() {
    let metrics = Arc::new(EngineMetrics::default());
    let ctx = ctx().with_metrics(Arc::clone(&metrics));
    let _g = push_frame(tenant_origin("acme", "/acme/app"), FrameKind::Ordinary);

    ctx.ensure(&CapabilityRequest::file_write("/data/acme/out.csv"))
        .expect("tenant may write its data dir");

    let err = ctx
        .ensure(&CapabilityRequest::file_read("/etc/shadow"))
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Forbidden);
    assert!(!err.class().is_fatal());
    match err {
        TrustError::Denied(d) => {
            assert_eq!(d.frame, 0);
            assert_eq!(d.request, CapabilityRequest::file_read("/etc/shadow"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(metrics.capability_denials.get(&[]), 1);
    assert!(metrics
        .render()
        .contains("tenantry_capability_denials_total 1"));
}

#[test]
fn checks_run_concurrently_on_independent_chains() {
    let ctx = Arc::new(ctx());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ctx = Arc::clone(&ctx);
            std::thread::spawn(move || {
                let origin = if i % 2 == 0 {
                    shared_origin("/opt/shared/lib")
                } else {
                    tenant_origin("acme", "/acme/app")
                };
                let _g = push_frame(origin, FrameKind::Ordinary);
                ctx.check_capability(&CapabilityRequest::file_read("/opt/shared/x"))
                    .is_allowed()
            })
        })
        .collect();

    for (i, h) in handles.into_iter().enumerate() {
        assert_eq!(h.join().unwrap(), i % 2 == 0);
    }
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "frame guard dropped out of push order")]
fn dropping_outer_guard_first_is_caught() {
    let outer = push_frame(tenant_origin("acme", "/acme/app"), FrameKind::Ordinary);
    let _inner = push_frame(bootstrap_origin(), FrameKind::Ordinary);
    drop(outer);
}
