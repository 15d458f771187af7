//! Directory identities, delivery endpoints and visibility scopes.
//!
//! The directory itself is owned elsewhere; these types are the read-only
//! view the fan-out engine works with.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Number of leading token characters kept when an endpoint is displayed.
const REDACTED_PREFIX_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Opaque address used by the push provider to reach one device.
///
/// `Display` prints only a short prefix so device tokens never end up in
/// logs verbatim. Use [`Endpoint::as_str`] when the full token is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(REDACTED_PREFIX_LEN).collect();
        if prefix.len() < self.0.len() {
            write!(f, "{prefix}...")
        } else {
            f.write_str(&prefix)
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A directory entry: who someone is, which roles they hold, and where
/// their device can be reached (if anywhere).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: DbId,
    /// Role labels; possibly empty.
    pub roles: BTreeSet<String>,
    /// `None` means the identity is currently unreachable.
    pub delivery_endpoint: Option<Endpoint>,
}

impl Identity {
    pub fn new<I, S>(id: DbId, roles: I, delivery_endpoint: Option<Endpoint>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            roles: roles.into_iter().map(Into::into).collect(),
            delivery_endpoint,
        }
    }
}

// ---------------------------------------------------------------------------
// VisibilityScope
// ---------------------------------------------------------------------------

/// Set of role labels that may see a broadcast. Empty means "no one".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityScope(BTreeSet<String>);

impl VisibilityScope {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    /// `true` when the identity holds at least one role in this scope.
    pub fn admits(&self, identity: &Identity) -> bool {
        !self.0.is_disjoint(&identity.roles)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
