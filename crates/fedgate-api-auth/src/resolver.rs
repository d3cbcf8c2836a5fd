//! Claim-set to directory-identity resolution.

use std::sync::Arc;

use fedgate_db::{DirectoryError, DirectoryStore, DirectoryUser};

use crate::claims::{candidate_identifiers, ClaimSet};

/// Why a principal was not bound to a directory identity.
///
/// The client-visible effect is identical for every reason; the reason only
/// reaches the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The claim set carried no recognized identifier.
    NoIdentifierClaims,
    /// No directory record matched any candidate identifier.
    NoMatch,
    /// Matching records exist but none is active.
    Inactive,
    /// More than one active record matched the candidate set.
    Ambiguous,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DenyReason::NoIdentifierClaims => "no identifier claims",
            DenyReason::NoMatch => "no matching directory user",
            DenyReason::Inactive => "matching directory user is inactive",
            DenyReason::Ambiguous => "multiple active directory users match",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a resolution attempt.
#[derive(Debug, Clone)]
pub enum Resolution {
    Allowed(DirectoryUser),
    Denied(DenyReason),
}

/// Resolves an authenticated principal's claim set against the directory.
///
/// Requires exactly one active match across the whole candidate identifier
/// set; zero or multiple matches deny. The same policy backs the per-request
/// gatekeeper and the sign-in gate.
pub struct IdentityResolver {
    store: Arc<dyn DirectoryStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Resolve a claim set to a directory identity.
    pub async fn resolve(&self, claims: &ClaimSet) -> Result<Resolution, DirectoryError> {
        let candidates = candidate_identifiers(claims);
        if candidates.is_empty() {
            tracing::warn!("Authenticated principal carries no email, UPN or subject claim");
            return Ok(Resolution::Denied(DenyReason::NoIdentifierClaims));
        }

        let matches = self.store.find_users_by_email(&candidates).await?;
        let mut active = matches.iter().filter(|u| u.active);

        match (active.next(), active.next()) {
            (Some(user), None) => {
                tracing::debug!(user_id = %user.id, "Directory identity resolved");
                Ok(Resolution::Allowed(user.clone()))
            }
            (Some(_), Some(_)) => {
                tracing::warn!(
                    candidates = candidates.len(),
                    "Multiple active directory users match the candidate identifiers"
                );
                Ok(Resolution::Denied(DenyReason::Ambiguous))
            }
            (None, _) => {
                let reason = if matches.is_empty() {
                    DenyReason::NoMatch
                } else {
                    DenyReason::Inactive
                };
                tracing::warn!(reason = %reason, "Directory identity resolution denied");
                Ok(Resolution::Denied(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedgate_db::{MemoryDirectory, NewUser, UserUpdate};

    fn claims_with_email(email: &str) -> ClaimSet {
        [("email", email)].into_iter().collect()
    }

    async fn seed(store: &MemoryDirectory, user_name: &str, email: &str, active: bool) -> uuid::Uuid {
        store
            .create_user(NewUser {
                user_name: user_name.to_string(),
                email: Some(email.to_string()),
                active,
                ..NewUser::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_inactive_user_is_denied_until_activated() {
        let store = Arc::new(MemoryDirectory::new());
        let id = seed(&store, "jdoe", "jdoe@example.com", false).await;
        let resolver = IdentityResolver::new(store.clone());
        let claims = claims_with_email("JDoe@Example.com");

        let resolution = resolver.resolve(&claims).await.unwrap();
        assert!(matches!(
            resolution,
            Resolution::Denied(DenyReason::Inactive)
        ));

        // Mark the record active; the same claim set now passes.
        let user = store.get_user(id).await.unwrap().unwrap();
        let mut update = UserUpdate::from(&user);
        update.active = true;
        store.update_user(id, update).await.unwrap();

        let resolution = resolver.resolve(&claims).await.unwrap();
        assert!(matches!(resolution, Resolution::Allowed(user) if user.id == id));
    }

    #[tokio::test]
    async fn test_unknown_email_is_denied() {
        let store = Arc::new(MemoryDirectory::new());
        let resolver = IdentityResolver::new(store);

        let resolution = resolver
            .resolve(&claims_with_email("ghost@example.com"))
            .await
            .unwrap();
        assert!(matches!(resolution, Resolution::Denied(DenyReason::NoMatch)));
    }

    #[tokio::test]
    async fn test_empty_claim_set_is_denied() {
        let store = Arc::new(MemoryDirectory::new());
        let resolver = IdentityResolver::new(store);

        let resolution = resolver.resolve(&ClaimSet::new()).await.unwrap();
        assert!(matches!(
            resolution,
            Resolution::Denied(DenyReason::NoIdentifierClaims)
        ));
    }

    #[tokio::test]
    async fn test_ambiguous_active_matches_are_denied() {
        let store = Arc::new(MemoryDirectory::new());
        seed(&store, "jdoe1", "shared@example.com", true).await;
        seed(&store, "jdoe2", "shared@example.com", true).await;
        let resolver = IdentityResolver::new(store);

        let resolution = resolver
            .resolve(&claims_with_email("shared@example.com"))
            .await
            .unwrap();
        assert!(matches!(
            resolution,
            Resolution::Denied(DenyReason::Ambiguous)
        ));
    }

    #[tokio::test]
    async fn test_inactive_duplicates_do_not_block_the_active_match() {
        let store = Arc::new(MemoryDirectory::new());
        seed(&store, "old", "shared@example.com", false).await;
        let id = seed(&store, "new", "shared@example.com", true).await;
        let resolver = IdentityResolver::new(store);

        let resolution = resolver
            .resolve(&claims_with_email("shared@example.com"))
            .await
            .unwrap();
        assert!(matches!(resolution, Resolution::Allowed(user) if user.id == id));
    }

    #[tokio::test]
    async fn test_upn_claim_resolves_when_email_claim_absent() {
        let store = Arc::new(MemoryDirectory::new());
        let id = seed(&store, "jdoe", "jdoe@example.com", true).await;
        let resolver = IdentityResolver::new(store);

        let claims: ClaimSet = [("preferred_username", "jdoe@example.com")]
            .into_iter()
            .collect();
        let resolution = resolver.resolve(&claims).await.unwrap();
        assert!(matches!(resolution, Resolution::Allowed(user) if user.id == id));
    }
}
