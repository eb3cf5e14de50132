//! Access scope sets.

use std::collections::BTreeSet;

use core::fmt;

/// A set of Shopify access scopes such as `read_products,write_orders`.
///
/// A `write_*` scope implies the matching `read_*` scope, so a session granted
/// `write_products` covers a requirement of `read_products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthScopes(BTreeSet<String>);

impl AuthScopes {
    /// Parse a comma-separated scope list. Blank entries are ignored.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self(
            s.split(',')
                .map(str::trim)
                .filter(|scope| !scope.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Returns true when no scope is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if every scope in `required` is granted by `self`.
    #[must_use]
    pub fn covers(&self, required: &Self) -> bool {
        let granted = self.expanded();
        required.0.iter().all(|scope| granted.contains(scope))
    }

    fn expanded(&self) -> BTreeSet<String> {
        let mut all = self.0.clone();
        for scope in &self.0 {
            if let Some(resource) = scope.strip_prefix("write_") {
                all.insert(format!("read_{resource}"));
            } else if let Some(resource) = scope.strip_prefix("unauthenticated_write_") {
                all.insert(format!("unauthenticated_read_{resource}"));
            }
        }
        all
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(String::as_str).collect();
        write!(f, "{}", joined.join(","))
    }
}
