//! Grant language.
//!
//! ```text
//! define codesource SHARED_LIBS {
//!     file "${platform.install}/lib/-" ;
//! }
//! grant SHARED_LIBS {
//!     permission FileAccess "/opt/shared/-", "read" ;
//!     inherit USER ;
//!     inherit %extension_dirs_read ;
//! }
//! ```
//!
//! `inherit` only sees grants defined earlier in the file, which rules out
//! cycles. Rule grant names are checked once the whole file is read.

use std::collections::HashMap;

use tenantry_core::grammar::TokenStream;
use tenantry_core::{CapabilityKind, ConfigSource, ParseError, PermissionEntry, TargetPattern};

use super::grant::{Grant, GrantBuilder};
use super::store::{CodeSourceRule, PolicyStore};
use super::vars::PolicyEnvironment;

struct Parser<'a> {
    ts: TokenStream,
    env: &'a PolicyEnvironment,
    rules: Vec<CodeSourceRule>,
    grants: HashMap<String, Grant>,
}

pub(crate) fn parse(src: &str, env: &PolicyEnvironment) -> Result<PolicyStore, ParseError> {
    let mut p = Parser {
        ts: TokenStream::new(src, ConfigSource::Policy)?,
        env,
        rules: Vec::new(),
        grants: HashMap::new(),
    };

    while !p.ts.is_eof() {
        let tok = p.ts.next()?;
        if tok.is_word("define") {
            p.parse_define()?;
        } else if tok.is_word("grant") {
            p.parse_grant()?;
        } else {
            return Err(p.ts.error(format!(
                "expected 'define' or 'grant', found '{}'",
                tok.text
            )));
        }
    }

    let last_line = p.ts.line();
    let store = PolicyStore::assemble(p.rules, p.grants, last_line)?;
    tracing::info!(
        rules = store.rule_count(),
        grants = store.grant_count(),
        "policy loaded"
    );
    Ok(store)
}

impl Parser<'_> {
    fn parse_define(&mut self) -> Result<(), ParseError> {
        let what = self.ts.next()?;
        if !what.is_word("codesource") {
            return Err(self
                .ts
                .error(format!("expected 'codesource', found '{}'", what.text)));
        }
        let grant = self.ts.next_value("code source name")?;
        self.ts.expect_punct('{')?;

        loop {
            let tok = self.ts.next()?;
            if tok.is_punct('}') {
                return Ok(());
            }
            if !tok.is_value() {
                return Err(self.ts.error(format!("expected protocol, found '{}'", tok.text)));
            }
            let location = self.ts.next_value("location pattern")?;
            let line = self.ts.line();
            self.ts.expect_punct(';')?;

            let location = self.env.substitute(&location);
            self.rules.push(CodeSourceRule {
                protocol: tok.text,
                location: TargetPattern::parse(&location),
                grant: grant.clone(),
                line,
            });
        }
    }

    fn parse_grant(&mut self) -> Result<(), ParseError> {
        let name = self.ts.next_value("grant name")?;
        if self.grants.contains_key(&name) {
            return Err(self.ts.error(format!("duplicate grant '{name}'")));
        }
        self.ts.expect_punct('{')?;

        let mut builder = GrantBuilder::new(name.clone());
        loop {
            let tok = self.ts.next()?;
            if tok.is_punct('}') {
                break;
            }
            if tok.is_word("permission") {
                for entry in self.parse_permission()? {
                    builder.add(entry);
                }
            } else if tok.is_word("inherit") {
                let target = self.ts.next_value("grant or macro name")?;
                self.ts.expect_punct(';')?;
                for entry in self.inherited(&target)? {
                    builder.add_if_not_implied(entry);
                }
            } else {
                return Err(self.ts.error(format!(
                    "expected 'permission' or 'inherit', found '{}'",
                    tok.text
                )));
            }
        }

        self.grants.insert(name, builder.build());
        Ok(())
    }

    /// `KIND target ;` | `KIND target , action ;` | `KIND target action ;`
    fn parse_permission(&mut self) -> Result<Vec<PermissionEntry>, ParseError> {
        let kind_name = self.ts.next_value("capability kind")?;
        let kind = CapabilityKind::from_name(&kind_name)
            .ok_or_else(|| self.ts.error(format!("unknown capability kind '{kind_name}'")))?;
        let target = self.env.substitute(&self.ts.next_value("target")?);

        let tok = self.ts.next()?;
        let action = if tok.is_punct(';') {
            None
        } else {
            let action = if tok.is_punct(',') {
                self.ts.next_value("action")?
            } else if tok.is_value() {
                tok.text
            } else {
                return Err(self.ts.error(format!("expected ';', found '{}'", tok.text)));
            };
            self.ts.expect_punct(';')?;
            Some(action)
        };

        let Some(action) = action else {
            return Ok(vec![PermissionEntry::new(kind, &target, None)]);
        };
        let actions: Vec<&str> = action
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect();
        if actions.is_empty() {
            return Err(self.ts.error("empty action list"));
        }
        Ok(actions
            .into_iter()
            .map(|a| PermissionEntry::new(kind, &target, Some(a)))
            .collect())
    }

    fn inherited(&self, target: &str) -> Result<Vec<PermissionEntry>, ParseError> {
        if target.starts_with('%') {
            return self
                .env
                .expand_macro(target)
                .ok_or_else(|| self.ts.error(format!("undefined macro '{target}'")));
        }
        self.grants
            .get(target)
            .map(|g| g.entries().to_vec())
            .ok_or_else(|| {
                self.ts
                    .error(format!("grant to be inherited not found: '{target}'"))
            })
    }
}
