//! Field-level access control.
//!
//! Consulted by the navigator at every hop of a selector, not only the
//! terminal attribute.

use crate::error::DenyReason;
use std::collections::{HashMap, HashSet};

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The hop is permitted.
    Allow,
    /// The hop is rejected.
    Deny(DenyReason),
}

/// Per-type whitelist and blacklist tables.
///
/// A non-empty whitelist permits only the listed attributes; the blacklist
/// rejects its attributes regardless of whitelist outcome. Tables are
/// populated at configuration time and read-only during compiles.
#[derive(Debug, Clone, Default)]
pub struct AccessTables {
    whitelist: HashMap<String, HashSet<String>>,
    blacklist: HashMap<String, HashSet<String>>,
}

impl AccessTables {
    /// Create empty tables (everything allowed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add attributes to a type's whitelist.
    pub fn whitelist<I>(&mut self, entity: impl Into<String>, attributes: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.whitelist
            .entry(entity.into())
            .or_default()
            .extend(attributes.into_iter().map(Into::into));
    }

    /// Add attributes to a type's blacklist.
    pub fn blacklist<I>(&mut self, entity: impl Into<String>, attributes: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.blacklist
            .entry(entity.into())
            .or_default()
            .extend(attributes.into_iter().map(Into::into));
    }

    /// Check one `(owner type, attribute)` hop.
    pub fn check(&self, entity: &str, attribute: &str) -> AccessDecision {
        if let Some(allowed) = self.whitelist.get(entity) {
            if !allowed.is_empty() && !allowed.contains(attribute) {
                return AccessDecision::Deny(DenyReason::NotWhitelisted);
            }
        }
        if let Some(denied) = self.blacklist.get(entity) {
            if denied.contains(attribute) {
                return AccessDecision::Deny(DenyReason::Blacklisted);
            }
        }
        AccessDecision::Allow
    }
}
