use crate::Token;
use std::collections::BTreeSet;

/// Decides which tokens need their allowance reset to zero before it can be
/// raised.
///
/// Only EIP-20 tokens are ever reset-required. Matching is by coin code,
/// case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevokePolicy {
    codes: BTreeSet<String>,
}

impl Default for RevokePolicy {
    fn default() -> Self {
        Self::from_codes(["USDT"])
    }
}

impl RevokePolicy {
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|c| c.as_ref().trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// No token requires a reset.
    pub fn none() -> Self {
        Self {
            codes: BTreeSet::new(),
        }
    }

    pub fn must_be_revoked(&self, token: Option<&Token>) -> bool {
        match token {
            Some(t) if t.token_type.is_eip20() => {
                self.codes.contains(&t.code.to_ascii_uppercase())
            }
            _ => false,
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}
