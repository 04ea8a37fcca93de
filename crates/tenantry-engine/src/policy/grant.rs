//! Named, immutable sets of permission entries.

use std::collections::HashMap;

use tenantry_core::{CapabilityKind, CapabilityRequest, PermissionEntry};

/// A compiled grant. Entries are indexed by kind so `implies` only scans the
/// entries that could possibly match.
#[derive(Debug, Clone)]
pub struct Grant {
    name: String,
    entries: Vec<PermissionEntry>,
    by_kind: HashMap<CapabilityKind, Vec<usize>>,
    has_all: bool,
}

impl Grant {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[PermissionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn implies(&self, req: &CapabilityRequest) -> bool {
        if self.has_all {
            return true;
        }
        self.by_kind
            .get(&req.kind)
            .is_some_and(|idx| idx.iter().any(|&i| self.entries[i].implies(req)))
    }

    pub fn implies_entry(&self, entry: &PermissionEntry) -> bool {
        self.entries.iter().any(|e| e.implies_entry(entry))
    }
}

/// Accumulates entries while a `grant { .. }` block is parsed.
#[derive(Debug)]
pub(crate) struct GrantBuilder {
    name: String,
    entries: Vec<PermissionEntry>,
}

impl GrantBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Explicit `permission` line. Exact duplicates collapse.
    pub(crate) fn add(&mut self, entry: PermissionEntry) {
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    /// Inherited or macro-expanded entry, skipped when already implied.
    pub(crate) fn add_if_not_implied(&mut self, entry: PermissionEntry) {
        if !self.entries.iter().any(|e| e.implies_entry(&entry)) {
            self.entries.push(entry);
        }
    }

    pub(crate) fn build(self) -> Grant {
        let mut by_kind: HashMap<CapabilityKind, Vec<usize>> = HashMap::new();
        let mut has_all = false;
        for (i, e) in self.entries.iter().enumerate() {
            if e.kind == CapabilityKind::All {
                has_all = true;
            }
            by_kind.entry(e.kind).or_default().push(i);
        }
        Grant {
            name: self.name,
            entries: self.entries,
            by_kind,
            has_all,
        }
    }
}
