//! Channel reconciler
//!
//! The create/adopt/update/delete state machine. Decides whether to create,
//! adopt, or mutate the remote channel, drives membership convergence, and
//! degrades to warnings for remote conditions that are not true failures:
//! name collisions on create, not-found on read, and not-found,
//! not-a-member, or already-archived on delete.
//!
//! The remote client is injected at construction; there is no ambient
//! client binding anywhere in the engine.

use tracing::{info, warn};

use convene_client::{ChannelClient, ChannelId, ClientError};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::directory::DirectoryConfig;
use crate::error::{ChannelAttribute, ReconcileError, ReconcileFailure};
use crate::locator::ChannelLocator;
use crate::membership::MembershipSynchronizer;
use crate::types::{ChannelSpec, ObservedChannel, ReconcileOutcome};

/// Result type for reconciliation entry points.
pub type ReconcileResult = Result<ReconcileOutcome, ReconcileFailure>;

/// Reconciles one declared channel spec against the remote service.
///
/// A single invocation is a single logical thread of control; callers
/// serialize operations per channel identity. No state is shared across
/// invocations.
pub struct ChannelReconciler<C> {
    client: C,
    directory_config: DirectoryConfig,
}

impl<C: ChannelClient> ChannelReconciler<C> {
    /// Create a reconciler over the given client.
    pub fn new(client: C) -> Self {
        Self {
            client,
            directory_config: DirectoryConfig::default(),
        }
    }

    /// Create a reconciler with custom directory configuration.
    pub fn with_directory_config(client: C, directory_config: DirectoryConfig) -> Self {
        Self {
            client,
            directory_config,
        }
    }

    /// Bring a declared channel into existence.
    ///
    /// If a channel with the declared name already exists, active or
    /// archived, it is adopted rather than recreated and a warning names
    /// the adoption. Otherwise the channel is created, its purpose and
    /// topic set, and membership converged.
    pub async fn reconcile_create(&self, spec: &ChannelSpec) -> ReconcileResult {
        let mut diags = Diagnostics::new();
        match self.create_inner(spec, &mut diags).await {
            Ok(channel) => Ok(ReconcileOutcome::present(channel, diags)),
            Err(error) => Err(fail(error, diags)),
        }
    }

    /// Observe the current remote state of a tracked channel.
    ///
    /// A gone outcome is not an error: it tells the caller the channel was
    /// deleted out-of-band and its identity should be forgotten.
    pub async fn reconcile_read(&self, id: &ChannelId, spec: &ChannelSpec) -> ReconcileResult {
        let mut diags = Diagnostics::new();
        match self.read_inner(id, spec, &mut diags).await {
            Ok(Some(channel)) => Ok(ReconcileOutcome::present(channel, diags)),
            Ok(None) => Ok(ReconcileOutcome::gone(diags)),
            Err(error) => Err(fail(error, diags)),
        }
    }

    /// Apply the difference between two declared specs to the remote
    /// channel.
    ///
    /// Each changed attribute is mutated independently, in a fixed order:
    /// name, privacy (always rejected), members, topic, purpose. There is
    /// no rollback; mutations applied before a failure stay applied and
    /// are reported as informational diagnostics.
    pub async fn reconcile_update(
        &self,
        id: &ChannelId,
        old: &ChannelSpec,
        new: &ChannelSpec,
    ) -> ReconcileResult {
        let mut diags = Diagnostics::new();
        match self.update_inner(id, old, new, &mut diags).await {
            Ok(Some(channel)) => Ok(ReconcileOutcome::present(channel, diags)),
            Ok(None) => Ok(ReconcileOutcome::gone(diags)),
            Err(error) => Err(fail(error, diags)),
        }
    }

    /// Remove a channel, as far as the remote service allows: archive it.
    ///
    /// Best effort in two steps: join (membership may be required to
    /// archive; a failure is only a warning), then archive. Not-found,
    /// not-a-member, and already-archived all resolve to success with a
    /// warning, since the channel needs nothing further from this engine.
    pub async fn reconcile_delete(&self, id: &ChannelId) -> ReconcileResult {
        let mut diags = Diagnostics::new();
        match self.delete_inner(id, &mut diags).await {
            Ok(()) => Ok(ReconcileOutcome::gone(diags)),
            Err(error) => Err(fail(error, diags)),
        }
    }

    async fn create_inner(
        &self,
        spec: &ChannelSpec,
        diags: &mut Diagnostics,
    ) -> Result<ObservedChannel, ReconcileError> {
        if spec.is_private && spec.members.is_empty() {
            return Err(ReconcileError::validation(
                "private channels must have at least one member listed",
            ));
        }

        let locator = ChannelLocator::with_config(&self.client, self.directory_config.clone());
        if let Some(existing) = locator.find_by_name(&spec.name).await? {
            return self.adopt(existing, spec, diags).await;
        }

        let mut channel = self
            .client
            .create_channel(&spec.name, spec.is_private)
            .await
            .map_err(|source| ReconcileError::CreationFailed {
                name: spec.name.clone(),
                source,
            })?;
        info!(channel_id = %channel.id, name = %spec.name, "Created channel");

        if let Some(purpose) = non_empty(spec.purpose.as_deref()) {
            self.client
                .set_purpose(&channel.id, purpose)
                .await
                .map_err(|source| ReconcileError::AttributeMutationFailed {
                    id: channel.id.clone(),
                    attribute: ChannelAttribute::Purpose,
                    source,
                })?;
            channel.purpose = purpose.to_string();
        }

        if let Some(topic) = non_empty(spec.topic.as_deref()) {
            self.client
                .set_topic(&channel.id, topic)
                .await
                .map_err(|source| ReconcileError::AttributeMutationFailed {
                    id: channel.id.clone(),
                    attribute: ChannelAttribute::Topic,
                    source,
                })?;
            channel.topic = topic.to_string();
        }

        let sync = MembershipSynchronizer::new(&self.client)
            .sync(&channel.id, &spec.members, diags)
            .await?;

        let members =
            spec.tracking
                .tracked_members(&spec.members, &sync.converged(), sync.self_id.as_ref());
        Ok(ObservedChannel::from_channel(channel, members))
    }

    async fn adopt(
        &self,
        existing: convene_client::Channel,
        spec: &ChannelSpec,
        diags: &mut Diagnostics,
    ) -> Result<ObservedChannel, ReconcileError> {
        warn!(
            channel_id = %existing.id,
            name = %spec.name,
            archived = existing.is_archived,
            "Channel already exists, adopting it"
        );
        diags.push(
            Diagnostic::warning(
                DiagnosticKind::Adoption,
                format!("Channel '{}' already exists", spec.name),
            )
            .with_detail(format!(
                "Reusing the existing channel (id {}). Archived: {}. \
                 Unarchive it in the remote service if necessary.",
                existing.id, existing.is_archived
            )),
        );

        // The adopted channel's privacy wins; it cannot be changed
        // post-creation.
        let sync = MembershipSynchronizer::new(&self.client)
            .sync(&existing.id, &spec.members, diags)
            .await?;

        let members =
            spec.tracking
                .tracked_members(&spec.members, &sync.converged(), sync.self_id.as_ref());
        Ok(ObservedChannel::from_channel(existing, members))
    }

    async fn read_inner(
        &self,
        id: &ChannelId,
        spec: &ChannelSpec,
        diags: &mut Diagnostics,
    ) -> Result<Option<ObservedChannel>, ReconcileError> {
        let channel = match self.client.get_channel(id).await {
            Ok(channel) => channel,
            Err(ClientError::ChannelNotFound { .. }) => {
                warn!(channel_id = %id, "Channel no longer exists");
                diags.push(
                    Diagnostic::warning(
                        DiagnosticKind::Vanished,
                        format!("Channel '{id}' no longer exists"),
                    )
                    .with_detail(
                        "The channel was deleted out-of-band. \
                         Its identity will be dropped from tracked state.",
                    ),
                );
                return Ok(None);
            }
            Err(source) => {
                return Err(ReconcileError::remote_unavailable("channel read", source));
            }
        };

        let actual = match self.client.list_members(id).await {
            Ok(members) => members,
            Err(err) => {
                warn!(channel_id = %id, error = %err, "Failed to fetch channel members");
                diags.push(
                    Diagnostic::warning(
                        DiagnosticKind::Drift,
                        format!("Could not fetch members of channel '{id}'"),
                    )
                    .with_detail(err.to_string()),
                );
                return Ok(Some(ObservedChannel::from_channel(
                    channel,
                    Default::default(),
                )));
            }
        };

        let self_id = match self.client.who_am_i().await {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "Failed to identify the acting principal");
                diags.push(
                    Diagnostic::warning(
                        DiagnosticKind::Identity,
                        "Could not identify the acting principal",
                    )
                    .with_detail(format!(
                        "Self-exclusion from membership reporting is skipped: {err}"
                    )),
                );
                None
            }
        };

        let members = spec
            .tracking
            .tracked_members(&spec.members, &actual, self_id.as_ref());
        Ok(Some(ObservedChannel::from_channel(channel, members)))
    }

    async fn update_inner(
        &self,
        id: &ChannelId,
        old: &ChannelSpec,
        new: &ChannelSpec,
        diags: &mut Diagnostics,
    ) -> Result<Option<ObservedChannel>, ReconcileError> {
        if new.name != old.name {
            self.client
                .rename_channel(id, &new.name)
                .await
                .map_err(|source| ReconcileError::AttributeMutationFailed {
                    id: id.clone(),
                    attribute: ChannelAttribute::Name,
                    source,
                })?;
            info!(channel_id = %id, new_name = %new.name, "Renamed channel");
            diags.push(Diagnostic::info(
                DiagnosticKind::Applied,
                format!("Renamed channel to '{}'", new.name),
            ));
        }

        if new.is_private != old.is_private {
            return Err(ReconcileError::ImmutablePrivacyChanged {
                id: id.clone(),
                current: old.is_private,
                desired: new.is_private,
            });
        }

        if new.members != old.members {
            let sync = MembershipSynchronizer::new(&self.client)
                .sync(id, &new.members, diags)
                .await?;
            if !sync.added.is_empty() {
                diags.push(Diagnostic::info(
                    DiagnosticKind::Applied,
                    format!("Added {} member(s) to the channel", sync.added.len()),
                ));
            }
        }

        if new.topic != old.topic {
            let topic = new.topic.as_deref().unwrap_or("");
            self.client
                .set_topic(id, topic)
                .await
                .map_err(|source| ReconcileError::AttributeMutationFailed {
                    id: id.clone(),
                    attribute: ChannelAttribute::Topic,
                    source,
                })?;
            diags.push(Diagnostic::info(
                DiagnosticKind::Applied,
                "Updated channel topic",
            ));
        }

        if new.purpose != old.purpose {
            let purpose = new.purpose.as_deref().unwrap_or("");
            self.client
                .set_purpose(id, purpose)
                .await
                .map_err(|source| ReconcileError::AttributeMutationFailed {
                    id: id.clone(),
                    attribute: ChannelAttribute::Purpose,
                    source,
                })?;
            diags.push(Diagnostic::info(
                DiagnosticKind::Applied,
                "Updated channel purpose",
            ));
        }

        // Refresh so the outcome reflects the remote view, not our
        // assumptions.
        self.read_inner(id, new, diags).await
    }

    async fn delete_inner(
        &self,
        id: &ChannelId,
        diags: &mut Diagnostics,
    ) -> Result<(), ReconcileError> {
        if let Err(err) = self.client.join_channel(id).await {
            warn!(
                channel_id = %id,
                error = %err,
                "Unable to join channel, attempting archive anyway"
            );
            diags.push(
                Diagnostic::warning(
                    DiagnosticKind::PartialJoin,
                    format!("Unable to join channel '{id}' before archiving"),
                )
                .with_detail(format!("Archival will be attempted anyway: {err}")),
            );
        }

        match self.client.archive_channel(id).await {
            Ok(()) => {
                info!(channel_id = %id, "Archived channel");
                Ok(())
            }
            Err(ClientError::NotInChannel { .. }) => {
                warn!(channel_id = %id, "Cannot archive channel, actor is not a member");
                diags.push(
                    Diagnostic::warning(
                        DiagnosticKind::PartialJoin,
                        format!("Cannot archive channel '{id}': the actor is not a member"),
                    )
                    .with_detail("Archive it in the remote service directly if needed."),
                );
                Ok(())
            }
            Err(ClientError::ChannelNotFound { .. }) => {
                warn!(channel_id = %id, "Channel not found during archival");
                diags.push(
                    Diagnostic::warning(
                        DiagnosticKind::Vanished,
                        format!("Channel '{id}' was not found"),
                    )
                    .with_detail("Assuming it was deleted out-of-band or the id is stale."),
                );
                Ok(())
            }
            Err(ClientError::AlreadyArchived { .. }) => {
                warn!(channel_id = %id, "Channel is already archived");
                diags.push(Diagnostic::warning(
                    DiagnosticKind::Vanished,
                    format!("Channel '{id}' is already archived"),
                ));
                Ok(())
            }
            Err(source) => Err(ReconcileError::DeletionFailed {
                id: id.clone(),
                source,
            }),
        }
    }
}

fn fail(error: ReconcileError, mut diagnostics: Diagnostics) -> ReconcileFailure {
    diagnostics.push(Diagnostic::error(error.to_string()));
    ReconcileFailure { error, diagnostics }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
