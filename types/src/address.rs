//! Account address type with `tess_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Tessera account address, always prefixed with `tess_`.
///
/// Derived from the account's public key via hex encoding plus a Blake2b
/// checksum (see `tessera-crypto::derive_address`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all Tessera addresses.
    pub const PREFIX: &'static str = "tess_";

    /// Create a new address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `tess_`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with tess_");
        Self(s)
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this address is well-formed at the string level.
    ///
    /// Checksum validation requires crypto and lives in `tessera-crypto`.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_prefix_accepted() {
        let addr = Address::new("tess_abc123");
        assert_eq!(addr.as_str(), "tess_abc123");
        assert!(addr.is_valid());
    }

    #[test]
    #[should_panic(expected = "must start with tess_")]
    fn wrong_prefix_panics() {
        Address::new("acct_abc123");
    }

    #[test]
    fn bare_prefix_is_not_valid() {
        let addr = Address::new("tess_");
        assert!(!addr.is_valid());
    }
}
