//! Thread-local active call chain.
//!
//! Every module-call boundary pushes a frame and receives a [`FrameGuard`];
//! dropping the guard (normal return, `?` propagation, or unwinding) restores
//! the chain to the depth it had before the push. Guards are `!Send`, so a
//! frame can never be popped from a thread other than the one that pushed it.
//!
//! Guards must be dropped in reverse push order. Dropping an outer guard
//! first truncates every frame above it; debug builds assert on it.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use tenantry_core::ModuleOrigin;

/// How a frame takes part in a capability walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Ordinary,
    /// Explicit elevation boundary; the walk stops here.
    PrivilegedEntry,
    /// The enforcement machinery itself; skipped by the walk.
    EngineInternal,
}

#[derive(Debug, Clone)]
pub struct ActiveFrame {
    pub origin: Arc<ModuleOrigin>,
    pub kind: FrameKind,
}

thread_local! {
    // Stored outermost-first; walks iterate in reverse.
    static CALL_CHAIN: RefCell<Vec<ActiveFrame>> = const { RefCell::new(Vec::new()) };
}

/// Scope guard returned by [`push_frame`].
#[must_use = "dropping the guard pops the frame immediately"]
#[derive(Debug)]
pub struct FrameGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl FrameGuard {
    /// Chain depth below this guard's frame.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        // try_* so a drop during thread teardown or a re-entrant borrow never
        // turns into a second panic.
        let _ = CALL_CHAIN.try_with(|chain| {
            if let Ok(mut chain) = chain.try_borrow_mut() {
                let len = chain.len();
                if !std::thread::panicking() {
                    debug_assert_eq!(
                        len,
                        self.depth + 1,
                        "frame guard dropped out of push order"
                    );
                }
                chain.truncate(self.depth);
            }
        });
    }
}

pub fn push_frame(origin: Arc<ModuleOrigin>, kind: FrameKind) -> FrameGuard {
    let depth = CALL_CHAIN.with(|chain| {
        let mut chain = chain.borrow_mut();
        let depth = chain.len();
        chain.push(ActiveFrame { origin, kind });
        depth
    });
    FrameGuard {
        depth,
        _not_send: PhantomData,
    }
}

/// Explicit pop; equivalent to dropping the guard.
pub fn pop_frame(guard: FrameGuard) {
    drop(guard);
}

/// Run `f` with a frame pushed for its duration.
pub fn with_frame<R>(origin: Arc<ModuleOrigin>, kind: FrameKind, f: impl FnOnce() -> R) -> R {
    let _guard = push_frame(origin, kind);
    f()
}

/// Current depth of this thread's chain.
pub fn depth() -> usize {
    CALL_CHAIN.with(|chain| chain.borrow().len())
}

/// Borrow this thread's chain (outermost-first) for the duration of `f`.
pub(crate) fn with_chain<R>(f: impl FnOnce(&[ActiveFrame]) -> R) -> R {
    CALL_CHAIN.with(|chain| f(&chain.borrow()))
}

/// Copy of this thread's chain, innermost frame first.
pub fn snapshot() -> Vec<ActiveFrame> {
    with_chain(|frames| frames.iter().rev().cloned().collect())
}
