//! Engine error types
//!
//! The fatal half of the reconciliation contract. Conditions traceable to
//! expected remote states (not-found on read or delete, name collision on
//! create) are downgraded to diagnostics elsewhere; everything here aborts
//! the invocation.

use std::fmt;
use thiserror::Error;

use convene_client::{ChannelId, ClientError};

use crate::diagnostics::Diagnostics;

/// Attribute of a channel targeted by a mutation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAttribute {
    Name,
    Topic,
    Purpose,
}

impl fmt::Display for ChannelAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelAttribute::Name => write!(f, "name"),
            ChannelAttribute::Topic => write!(f, "topic"),
            ChannelAttribute::Purpose => write!(f, "purpose"),
        }
    }
}

/// A fatal reconciliation error.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The desired spec violates a pre-flight policy; no remote call was made.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// A remote read or listing failed; no safe decision can be made.
    #[error("remote service unavailable during {operation}: {source}")]
    RemoteUnavailable {
        operation: &'static str,
        #[source]
        source: ClientError,
    },

    /// The remote creation call was rejected.
    #[error("failed to create channel '{name}': {source}")]
    CreationFailed {
        name: String,
        #[source]
        source: ClientError,
    },

    /// A rename, topic, or purpose mutation was rejected.
    #[error("failed to set {attribute} on channel {id}: {source}")]
    AttributeMutationFailed {
        id: ChannelId,
        attribute: ChannelAttribute,
        #[source]
        source: ClientError,
    },

    /// The bulk member addition was rejected. Skipping it silently would
    /// leave membership out of sync with no way to detect it.
    #[error("failed to add members to channel {id}: {source}")]
    MembershipMutationFailed {
        id: ChannelId,
        #[source]
        source: ClientError,
    },

    /// Archival failed for a reason other than the tolerated remote states.
    #[error("failed to archive channel {id}: {source}")]
    DeletionFailed {
        id: ChannelId,
        #[source]
        source: ClientError,
    },

    /// Privacy cannot be changed after creation; the caller must change it
    /// in the remote service directly.
    #[error("channel {id} privacy cannot be changed after creation (current: {current}, desired: {desired}); change it in the remote service directly")]
    ImmutablePrivacyChanged {
        id: ChannelId,
        current: bool,
        desired: bool,
    },
}

impl ReconcileError {
    /// Get a stable code for classification and logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ReconcileError::Validation { .. } => "VALIDATION_FAILED",
            ReconcileError::RemoteUnavailable { .. } => "REMOTE_UNAVAILABLE",
            ReconcileError::CreationFailed { .. } => "CREATION_FAILED",
            ReconcileError::AttributeMutationFailed { .. } => "ATTRIBUTE_MUTATION_FAILED",
            ReconcileError::MembershipMutationFailed { .. } => "MEMBERSHIP_MUTATION_FAILED",
            ReconcileError::DeletionFailed { .. } => "DELETION_FAILED",
            ReconcileError::ImmutablePrivacyChanged { .. } => "IMMUTABLE_PRIVACY_CHANGED",
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ReconcileError::Validation {
            message: message.into(),
        }
    }

    /// Wrap a client error from a read or listing call.
    pub fn remote_unavailable(operation: &'static str, source: ClientError) -> Self {
        ReconcileError::RemoteUnavailable { operation, source }
    }
}

/// A fatal failure together with the diagnostics accumulated before the
/// abort. Callers surface the diagnostics verbatim regardless of outcome.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ReconcileFailure {
    /// The error that aborted the invocation.
    #[source]
    pub error: ReconcileError,
    /// Everything collected up to and including the abort.
    pub diagnostics: Diagnostics,
}
