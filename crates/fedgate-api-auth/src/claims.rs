//! Claim set model and identifier synonym tables.
//!
//! Federated assertions carry the same logical identifier under several
//! historical claim URIs. Each logical identifier owns an ordered list of
//! recognized synonym keys, resolved by first match, not by conditional
//! chains scattered through the code.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Recognized keys carrying the principal's email address.
pub const EMAIL_CLAIMS: &[&str] = &[
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress",
    "email",
];

/// Recognized keys carrying the user principal name.
pub const UPN_CLAIMS: &[&str] = &[
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/upn",
    "preferred_username",
];

/// Recognized keys carrying the subject name identifier.
pub const SUBJECT_CLAIMS: &[&str] = &[
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
    "nameid",
];

/// Recognized keys carrying role assignments.
pub const ROLE_CLAIMS: &[&str] = &[
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
    "role",
];

/// A validated claim set: key to list-of-values, as delivered by the
/// assertion-authentication collaborator after successful sign-in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimSet {
    claims: HashMap<String, Vec<String>>,
}

impl ClaimSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under a claim key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.claims.entry(key.into()).or_default().push(value.into());
    }

    /// All values under one key.
    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.claims.get(key).map_or(&[], Vec::as_slice)
    }

    /// First value found under the first matching synonym key.
    #[must_use]
    pub fn first_of(&self, synonyms: &[&str]) -> Option<&str> {
        synonyms
            .iter()
            .find_map(|key| self.values(key).first())
            .map(String::as_str)
    }

    /// All values across every matching synonym key.
    #[must_use]
    pub fn all_of(&self, synonyms: &[&str]) -> Vec<&str> {
        synonyms
            .iter()
            .flat_map(|key| self.values(key).iter().map(String::as_str))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}

/// Candidate directory identifiers for a principal, in priority order:
/// email, then UPN, then subject identifier. Lower-cased for comparison,
/// deduplicated, order-preserving.
#[must_use]
pub fn candidate_identifiers(claims: &ClaimSet) -> Vec<String> {
    let mut candidates = Vec::new();
    for synonyms in [EMAIL_CLAIMS, UPN_CLAIMS, SUBJECT_CLAIMS] {
        if let Some(value) = claims.first_of(synonyms) {
            let lowered = value.to_lowercase();
            if !lowered.is_empty() && !candidates.contains(&lowered) {
                candidates.push(lowered);
            }
        }
    }
    candidates
}

/// Whether the claim set carries the given role (case-insensitive value
/// compare across all role-claim synonyms).
#[must_use]
pub fn has_role(claims: &ClaimSet, role: &str) -> bool {
    claims
        .all_of(ROLE_CLAIMS)
        .iter()
        .any(|value| value.eq_ignore_ascii_case(role))
}
