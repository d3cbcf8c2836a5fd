//! Sign-in gate exposed to the application layer.

use std::sync::Arc;

use fedgate_db::{DirectoryError, DirectoryStore};

use crate::claims::ClaimSet;
use crate::last_login::LoginTouchHandle;
use crate::resolver::{IdentityResolver, Resolution};

/// Answers "is this session bound to an active directory identity" at
/// sign-in time, with the same resolver and ambiguity policy as the
/// per-request gatekeeper.
pub struct SignInGate {
    resolver: IdentityResolver,
    touch: LoginTouchHandle,
}

impl SignInGate {
    pub fn new(store: Arc<dyn DirectoryStore>, touch: LoginTouchHandle) -> Self {
        Self {
            resolver: IdentityResolver::new(store),
            touch,
        }
    }

    /// Validate a freshly authenticated principal.
    ///
    /// On success the last-login touch is scheduled asynchronously; the
    /// result never waits on it.
    pub async fn validate(&self, claims: &ClaimSet) -> Result<bool, DirectoryError> {
        match self.resolver.resolve(claims).await? {
            Resolution::Allowed(user) => {
                tracing::info!(user_id = %user.id, "Sign-in bound to directory identity");
                self.touch.submit(user.id);
                Ok(true)
            }
            Resolution::Denied(reason) => {
                tracing::warn!(reason = %reason, "Sign-in rejected");
                Ok(false)
            }
        }
    }
}
