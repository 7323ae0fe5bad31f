//! Engine data types
//!
//! The declared desired state, the observed post-operation snapshot, and
//! the per-invocation outcome record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use convene_client::{Channel, ChannelId, UserId};

use crate::diagnostics::Diagnostics;
use crate::membership::TrackingMode;

/// Caller-declared target state for one channel.
///
/// Owned by the caller; the engine reads it per invocation and never
/// persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Channel name, the unique key within the directory.
    pub name: String,
    /// Whether the channel is private. Immutable after remote creation.
    #[serde(default)]
    pub is_private: bool,
    /// Declared member set.
    #[serde(default)]
    pub members: BTreeSet<UserId>,
    /// Channel purpose (description).
    #[serde(default)]
    pub purpose: Option<String>,
    /// Channel topic.
    #[serde(default)]
    pub topic: Option<String>,
    /// How observed membership is reported back.
    #[serde(default)]
    pub tracking: TrackingMode,
}

impl ChannelSpec {
    /// Create a minimal public-channel spec.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_private: false,
            members: BTreeSet::new(),
            purpose: None,
            topic: None,
            tracking: TrackingMode::default(),
        }
    }

    /// Set the privacy flag.
    #[must_use]
    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// Set the declared member set.
    #[must_use]
    pub fn with_members(mut self, members: BTreeSet<UserId>) -> Self {
        self.members = members;
        self
    }

    /// Set the channel purpose.
    #[must_use]
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Set the channel topic.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the membership tracking mode.
    #[must_use]
    pub fn with_tracking(mut self, tracking: TrackingMode) -> Self {
        self.tracking = tracking;
        self
    }
}

/// Snapshot of a channel after a reconciliation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedChannel {
    /// Remote-assigned identifier.
    pub id: ChannelId,
    /// Current name.
    pub name: String,
    /// Privacy flag as it exists remotely.
    pub is_private: bool,
    /// Whether the channel is archived.
    pub is_archived: bool,
    /// Current purpose.
    pub purpose: String,
    /// Current topic.
    pub topic: String,
    /// Member set as reported under the spec's tracking mode.
    pub members: BTreeSet<UserId>,
}

impl ObservedChannel {
    /// Build a snapshot from a remote channel record and a reported member
    /// set.
    pub fn from_channel(channel: Channel, members: BTreeSet<UserId>) -> Self {
        Self {
            id: channel.id,
            name: channel.name,
            is_private: channel.is_private,
            is_archived: channel.is_archived,
            purpose: channel.purpose,
            topic: channel.topic,
            members,
        }
    }
}

/// Per-invocation result of a reconciliation entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// The post-operation snapshot. `None` signals the channel no longer
    /// exists and the caller should drop its tracked identity.
    pub channel: Option<ObservedChannel>,
    /// Everything collected during the invocation, in order.
    pub diagnostics: Diagnostics,
}

impl ReconcileOutcome {
    /// An outcome for a channel that exists.
    pub fn present(channel: ObservedChannel, diagnostics: Diagnostics) -> Self {
        Self {
            channel: Some(channel),
            diagnostics,
        }
    }

    /// An outcome signaling the channel is gone; the caller should forget
    /// its identity.
    pub fn gone(diagnostics: Diagnostics) -> Self {
        Self {
            channel: None,
            diagnostics,
        }
    }

    /// The resolved channel id, when the channel exists.
    pub fn id(&self) -> Option<&ChannelId> {
        self.channel.as_ref().map(|c| &c.id)
    }

    /// Check whether this outcome signals out-of-band deletion.
    pub fn is_gone(&self) -> bool {
        self.channel.is_none()
    }
}
