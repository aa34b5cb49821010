//! Content fingerprints for publish-status comparison.
//!
//! The remote manifest is populated by git, so a fingerprint is the git blob
//! object id of the published bytes: SHA-1 over `"blob <len>\0" + content`.

use std::fmt;

use serde::Serialize;
use sha1::{Digest, Sha1};

/// A git blob id (40 lowercase hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the blob id of `content`.
    pub fn of(content: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(format!("blob {}\0", content.len()).as_bytes());
        hasher.update(content);
        Self(hex::encode(hasher.finalize()))
    }

    /// Fingerprint of a UTF-8 document.
    pub fn of_text(content: &str) -> Self {
        Self::of(content.as_bytes())
    }

    /// Get the hex string for comparison against manifest entries.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Fingerprint {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
