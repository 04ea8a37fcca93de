//! Path variables and computed macros available to policy text.

use tenantry_core::capability::CapabilityKind;
use tenantry_core::PermissionEntry;

pub const VAR_PLATFORM_BASE: &str = "${platform.base}";
pub const VAR_PLATFORM_INSTALL: &str = "${platform.install}";
pub const VAR_PLATFORM_TEMP: &str = "${platform.temp}";
pub const VAR_RUNTIME_ROOT: &str = "${runtime.root}";
pub const VAR_RUNTIME_HOME: &str = "${runtime.home}";

/// Grants read access below every configured extension directory.
pub const MACRO_EXTENSION_DIRS_READ: &str = "%extension_dirs_read";

/// Values resolved once at startup and substituted into policy strings.
#[derive(Debug, Clone, Default)]
pub struct PolicyEnvironment {
    platform_base: Option<String>,
    platform_install: Option<String>,
    platform_temp: Option<String>,
    runtime_home: Option<String>,
    extension_dirs: Vec<String>,
}

fn normalize(path: impl Into<String>) -> String {
    let mut p = path.into();
    if p.len() > 1 && p.ends_with('/') {
        p.pop();
    }
    p
}

impl PolicyEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform_base(mut self, path: impl Into<String>) -> Self {
        self.platform_base = Some(normalize(path));
        self
    }

    pub fn with_platform_install(mut self, path: impl Into<String>) -> Self {
        self.platform_install = Some(normalize(path));
        self
    }

    pub fn with_platform_temp(mut self, path: impl Into<String>) -> Self {
        self.platform_temp = Some(normalize(path));
        self
    }

    pub fn with_runtime_home(mut self, path: impl Into<String>) -> Self {
        self.runtime_home = Some(normalize(path));
        self
    }

    pub fn with_extension_dirs(mut self, dirs: impl IntoIterator<Item = String>) -> Self {
        self.extension_dirs = dirs.into_iter().map(normalize).collect();
        self
    }

    /// Parent directory of `runtime.home`.
    fn runtime_root(&self) -> Option<String> {
        let home = self.runtime_home.as_deref()?;
        match home.rsplit_once('/') {
            Some(("", _)) => Some("/".to_string()),
            Some((parent, _)) => Some(parent.to_string()),
            None => None,
        }
    }

    /// Replace the first occurrence of each known variable, in fixed order.
    /// Unset or unknown variables stay literal.
    pub fn substitute(&self, expr: &str) -> String {
        let root = self.runtime_root();
        let vars = [
            (VAR_PLATFORM_BASE, self.platform_base.as_deref()),
            (VAR_PLATFORM_INSTALL, self.platform_install.as_deref()),
            (VAR_PLATFORM_TEMP, self.platform_temp.as_deref()),
            (VAR_RUNTIME_ROOT, root.as_deref()),
            (VAR_RUNTIME_HOME, self.runtime_home.as_deref()),
        ];

        let mut out = expr.to_string();
        for (var, value) in vars {
            if let Some(value) = value {
                out = out.replacen(var, value, 1);
            }
        }
        out
    }

    /// Expand a `%macro` into entries, or `None` for an unknown macro.
    pub fn expand_macro(&self, name: &str) -> Option<Vec<PermissionEntry>> {
        match name {
            MACRO_EXTENSION_DIRS_READ => Some(
                self.extension_dirs
                    .iter()
                    .map(|dir| {
                        let target = format!("{}/-", dir.trim_end_matches('/'));
                        PermissionEntry::new(CapabilityKind::FileAccess, &target, Some("read"))
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn extension_dirs(&self) -> &[String] {
        &self.extension_dirs
    }
}

