//! User lookups
//!
//! Read-only identity queries against the remote service, plus the label
//! formatting used when reporting members in diagnostics.

use tracing::debug;

use convene_client::{ClientError, IdentityOps, UserId, UserProfile};

use crate::error::ReconcileError;

/// Resolve a human-facing label for a user id.
///
/// Best effort: an unresolvable identifier is reported raw rather than
/// failing the surrounding operation.
pub(crate) async fn display_label<C: IdentityOps>(client: &C, id: &UserId) -> String {
    match client.get_user(id).await {
        Ok(profile) => profile.label(),
        Err(_) => format!("unknown ({id})"),
    }
}

/// Read-only user queries.
pub struct UserLookup<'a, C> {
    client: &'a C,
}

impl<'a, C: IdentityOps> UserLookup<'a, C> {
    /// Create a lookup over the given client.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Look up a user by primary email address.
    ///
    /// Returns `None` when no user has this email; only transport-level
    /// failures are errors.
    pub async fn by_email(&self, email: &str) -> Result<Option<UserProfile>, ReconcileError> {
        match self.client.find_user_by_email(email).await {
            Ok(profile) => Ok(Some(profile)),
            Err(ClientError::UserNotFound { .. }) => {
                debug!(email, "No user with this email");
                Ok(None)
            }
            Err(source) => Err(ReconcileError::remote_unavailable("user lookup", source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{make_profile, MockClient};

    #[tokio::test]
    async fn test_by_email_resolves_profile() {
        let client =
            MockClient::new().with_profile(make_profile("u1", "ada", Some("ada@example.com")));

        let lookup = UserLookup::new(&client);
        let profile = lookup.by_email("ada@example.com").await.unwrap().unwrap();

        assert_eq!(profile.id, UserId::new("u1"));
        assert_eq!(profile.display_name, "ada");
    }

    #[tokio::test]
    async fn test_by_email_absent_is_none() {
        let client = MockClient::new();

        let lookup = UserLookup::new(&client);
        let found = lookup.by_email("ghost@example.com").await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_by_email_transport_failure_is_error() {
        let client = MockClient::new().fail(
            "find_user_by_email",
            ClientError::transport("connection reset"),
        );

        let lookup = UserLookup::new(&client);
        let err = lookup.by_email("ada@example.com").await.unwrap_err();

        assert!(matches!(err, ReconcileError::RemoteUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_display_label_falls_back_to_raw_id() {
        let client = MockClient::new();
        let label = display_label(&client, &UserId::new("u404")).await;
        assert_eq!(label, "unknown (u404)");
    }
}
