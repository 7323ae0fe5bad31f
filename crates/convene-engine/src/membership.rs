//! Membership synchronization
//!
//! Converges channel membership toward the declared set under an add-only
//! API. The remote service cannot remove members, so convergence is
//! one-directional by contract: missing members are added in one bulk call,
//! extra members are only ever reported.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{info, warn};

use convene_client::{ChannelId, IdentityOps, MembershipOps, UserId};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::ReconcileError;
use crate::users::display_label;

/// How observed membership is reported back to the caller.
///
/// This only affects what the reconciler surfaces as the "current" member
/// set; additions and extra-member reporting are identical in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    /// Report the full actual membership. Manually added members show up as
    /// drift on the next reconciliation.
    Strict,
    /// Report only members that are both declared and present. Manually
    /// added members stay invisible and are never flagged for removal.
    Lenient,
}

impl Default for TrackingMode {
    fn default() -> Self {
        TrackingMode::Lenient
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingMode::Strict => write!(f, "strict"),
            TrackingMode::Lenient => write!(f, "lenient"),
        }
    }
}

impl TrackingMode {
    /// Apply the tracking policy to an observed member set.
    ///
    /// The acting principal is excluded in strict mode so the integration's
    /// own account never reads as drift.
    pub fn tracked_members(
        &self,
        desired: &BTreeSet<UserId>,
        actual: &BTreeSet<UserId>,
        self_id: Option<&UserId>,
    ) -> BTreeSet<UserId> {
        match self {
            TrackingMode::Strict => actual
                .iter()
                .filter(|user| Some(*user) != self_id)
                .cloned()
                .collect(),
            TrackingMode::Lenient => desired.intersection(actual).cloned().collect(),
        }
    }
}

/// Result of one membership synchronization pass.
#[derive(Debug, Clone)]
pub struct MembershipSyncOutcome {
    /// Members actually added by this pass.
    pub added: BTreeSet<UserId>,
    /// Membership as fetched before the additions.
    pub actual: BTreeSet<UserId>,
    /// The acting principal, when resolution succeeded.
    pub self_id: Option<UserId>,
}

impl MembershipSyncOutcome {
    /// Membership as it stands after the additions were applied.
    pub fn converged(&self) -> BTreeSet<UserId> {
        self.actual.union(&self.added).cloned().collect()
    }
}

/// Computes and applies the minimal add-only membership delta.
pub struct MembershipSynchronizer<'a, C> {
    client: &'a C,
}

impl<'a, C: MembershipOps + IdentityOps> MembershipSynchronizer<'a, C> {
    /// Create a synchronizer over the given client.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Converge the channel's membership toward `desired`.
    ///
    /// Fetches the current members, adds `desired \ actual` in a single bulk
    /// call, and reports `actual \ desired \ {self}` in one warning. A
    /// membership fetch failure is fatal: without a baseline no safe delta
    /// exists. A self-identity resolution failure is not: the pass proceeds
    /// without self-exclusion and says so.
    pub async fn sync(
        &self,
        id: &ChannelId,
        desired: &BTreeSet<UserId>,
        diags: &mut Diagnostics,
    ) -> Result<MembershipSyncOutcome, ReconcileError> {
        let actual = self
            .client
            .list_members(id)
            .await
            .map_err(|source| ReconcileError::remote_unavailable("membership listing", source))?;

        let self_id = match self.client.who_am_i().await {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(channel_id = %id, error = %err, "Failed to identify the acting principal");
                diags.push(
                    Diagnostic::warning(
                        DiagnosticKind::Identity,
                        "Could not identify the acting principal",
                    )
                    .with_detail(format!(
                        "Self-exclusion from membership reporting is skipped for this pass: {err}"
                    )),
                );
                None
            }
        };

        let to_add: BTreeSet<UserId> = desired.difference(&actual).cloned().collect();
        if !to_add.is_empty() {
            self.client
                .add_members(id, &to_add)
                .await
                .map_err(|source| ReconcileError::MembershipMutationFailed {
                    id: id.clone(),
                    source,
                })?;
            info!(channel_id = %id, count = to_add.len(), "Added members to channel");
        }

        let extras: Vec<UserId> = actual
            .difference(desired)
            .filter(|user| Some(*user) != self_id.as_ref())
            .cloned()
            .collect();

        if !extras.is_empty() {
            let mut labels = Vec::with_capacity(extras.len());
            for user in &extras {
                labels.push(display_label(self.client, user).await);
            }
            diags.push(
                Diagnostic::warning(DiagnosticKind::Drift, "Extra members present in channel")
                    .with_detail(format!(
                        "The remote service does not support removing members.\n\
                         Members present in the channel but not declared:\n- {}",
                        labels.join("\n- ")
                    )),
            );
        }

        Ok(MembershipSyncOutcome {
            added: to_add,
            actual,
            self_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{make_profile, user_set, MockClient};
    use convene_client::ClientError;

    #[tokio::test]
    async fn test_adds_exactly_the_missing_members() {
        let client = MockClient::new()
            .with_existing_members("C1", &["u1", "u2"])
            .with_self("bot");
        let mut diags = Diagnostics::new();

        let outcome = MembershipSynchronizer::new(&client)
            .sync(&ChannelId::new("C1"), &user_set(&["u1", "u3"]), &mut diags)
            .await
            .unwrap();

        assert_eq!(outcome.added, user_set(&["u3"]));
        assert_eq!(client.calls_matching("add_members"), 1);
        assert!(client.calls().contains(&"add_members:C1:u3".to_string()));
    }

    #[tokio::test]
    async fn test_no_add_call_when_desired_is_subset() {
        let client = MockClient::new()
            .with_existing_members("C1", &["u1", "u2"])
            .with_self("bot");
        let mut diags = Diagnostics::new();

        let outcome = MembershipSynchronizer::new(&client)
            .sync(&ChannelId::new("C1"), &user_set(&["u1"]), &mut diags)
            .await
            .unwrap();

        assert!(outcome.added.is_empty());
        assert_eq!(client.calls_matching("add_members"), 0);
    }

    #[tokio::test]
    async fn test_extras_reported_in_a_single_warning() {
        let client = MockClient::new()
            .with_existing_members("C1", &["u1", "u2", "u4", "bot"])
            .with_self("bot");
        let mut diags = Diagnostics::new();

        MembershipSynchronizer::new(&client)
            .sync(&ChannelId::new("C1"), &user_set(&["u1"]), &mut diags)
            .await
            .unwrap();

        // u2 and u4 are extra, the bot is excluded; one warning total.
        assert_eq!(diags.count_of(DiagnosticKind::Drift), 1);
        let warning = diags.warnings().next().unwrap();
        let detail = warning.detail.as_deref().unwrap();
        assert!(detail.contains("u2"));
        assert!(detail.contains("u4"));
        assert!(!detail.contains("bot"));
    }

    #[tokio::test]
    async fn test_extra_labels_resolved_with_raw_fallback() {
        let client = MockClient::new()
            .with_existing_members("C1", &["u2", "u9"])
            .with_profile(make_profile("u2", "ada", Some("ada@example.com")))
            .with_self("bot");
        let mut diags = Diagnostics::new();

        MembershipSynchronizer::new(&client)
            .sync(&ChannelId::new("C1"), &BTreeSet::new(), &mut diags)
            .await
            .unwrap();

        let detail = diags.warnings().next().unwrap().detail.clone().unwrap();
        assert!(detail.contains("ada (ada@example.com)"));
        // u9 has no profile; it is reported by raw identifier.
        assert!(detail.contains("unknown (u9)"));
    }

    #[tokio::test]
    async fn test_member_listing_failure_is_fatal() {
        let client = MockClient::new()
            .with_existing_members("C1", &[])
            .fail("list_members", ClientError::transport("down"));
        let mut diags = Diagnostics::new();

        let err = MembershipSynchronizer::new(&client)
            .sync(&ChannelId::new("C1"), &user_set(&["u1"]), &mut diags)
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::RemoteUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_add_rejection_is_fatal() {
        let client = MockClient::new()
            .with_existing_members("C1", &[])
            .with_self("bot")
            .fail("add_members", ClientError::api("user_is_restricted"));
        let mut diags = Diagnostics::new();

        let err = MembershipSynchronizer::new(&client)
            .sync(&ChannelId::new("C1"), &user_set(&["u1"]), &mut diags)
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::MembershipMutationFailed { .. }));
    }

    #[tokio::test]
    async fn test_self_resolution_failure_warns_and_proceeds() {
        // No self identity configured: who_am_i fails.
        let client = MockClient::new().with_existing_members("C1", &["bot"]);
        let mut diags = Diagnostics::new();

        let outcome = MembershipSynchronizer::new(&client)
            .sync(&ChannelId::new("C1"), &user_set(&["u1"]), &mut diags)
            .await
            .unwrap();

        assert!(outcome.self_id.is_none());
        assert_eq!(diags.count_of(DiagnosticKind::Identity), 1);
        // Without self-exclusion the bot is reported as extra.
        assert_eq!(diags.count_of(DiagnosticKind::Drift), 1);
        // The addition is still applied.
        assert_eq!(outcome.added, user_set(&["u1"]));
    }

    #[test]
    fn test_strict_tracking_reports_actual_minus_self() {
        // Scenario: actual {u1,u2,bot}, desired {u1,u3}, self bot.
        let actual = user_set(&["u1", "u2", "bot"]);
        let desired = user_set(&["u1", "u3"]);
        let bot = UserId::new("bot");

        let tracked = TrackingMode::Strict.tracked_members(&desired, &actual, Some(&bot));
        assert_eq!(tracked, user_set(&["u1", "u2"]));
    }

    #[test]
    fn test_lenient_tracking_reports_intersection() {
        let actual = user_set(&["u1", "u2", "bot"]);
        let desired = user_set(&["u1", "u3"]);
        let bot = UserId::new("bot");

        let tracked = TrackingMode::Lenient.tracked_members(&desired, &actual, Some(&bot));
        assert_eq!(tracked, user_set(&["u1"]));
    }

    #[test]
    fn test_strict_tracking_without_self_identity() {
        let actual = user_set(&["u1", "bot"]);
        let desired = user_set(&["u1"]);

        let tracked = TrackingMode::Strict.tracked_members(&desired, &actual, None);
        assert_eq!(tracked, user_set(&["u1", "bot"]));
    }
}
