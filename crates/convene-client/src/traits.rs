//! Client capability traits
//!
//! Capability-based trait definitions for remote collaboration-space
//! services. A concrete client implements these against its transport; the
//! reconciliation engine consumes them and nothing else.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::ClientResult;
use crate::ids::{ChannelId, UserId};
use crate::types::{Channel, ChannelPage, Cursor, UserProfile};

/// Capability for enumerating the channel directory.
#[async_trait]
pub trait DirectoryOps: Send + Sync {
    /// Fetch one page of the channel directory.
    ///
    /// # Arguments
    /// * `cursor` - Continuation cursor from a previous page, `None` for the
    ///   first page
    /// * `include_archived` - Whether archived channels appear in the listing
    async fn list_channels(
        &self,
        cursor: Option<&Cursor>,
        include_archived: bool,
    ) -> ClientResult<ChannelPage>;
}

/// Capability for channel lifecycle and attribute mutations.
///
/// The remote service is deliberately limited: privacy cannot be changed
/// after creation, members cannot be removed, and the only removal primitive
/// is archival. The engine encodes those limits; implementations should not
/// paper over them.
#[async_trait]
pub trait ChannelOps: Send + Sync {
    /// Create a new channel.
    ///
    /// Fails with [`crate::ClientError::NameTaken`] if a channel with this
    /// name exists, active or archived.
    async fn create_channel(&self, name: &str, is_private: bool) -> ClientResult<Channel>;

    /// Fetch a single channel by id.
    async fn get_channel(&self, id: &ChannelId) -> ClientResult<Channel>;

    /// Rename a channel in place.
    async fn rename_channel(&self, id: &ChannelId, new_name: &str) -> ClientResult<()>;

    /// Set the channel topic.
    async fn set_topic(&self, id: &ChannelId, topic: &str) -> ClientResult<()>;

    /// Set the channel purpose.
    async fn set_purpose(&self, id: &ChannelId, purpose: &str) -> ClientResult<()>;

    /// Archive a channel. The name stays reserved and the channel remains
    /// enumerable with `include_archived = true`.
    async fn archive_channel(&self, id: &ChannelId) -> ClientResult<()>;

    /// Join a channel as the acting principal.
    ///
    /// Some services require membership before an actor may archive.
    async fn join_channel(&self, id: &ChannelId) -> ClientResult<()>;
}

/// Capability for channel membership.
///
/// There is no remove operation: the remote service only supports adding
/// members, so convergence is one-directional.
#[async_trait]
pub trait MembershipOps: Send + Sync {
    /// Fetch the current member set of a channel.
    async fn list_members(&self, id: &ChannelId) -> ClientResult<BTreeSet<UserId>>;

    /// Add members to a channel in a single bulk call.
    async fn add_members(&self, id: &ChannelId, users: &BTreeSet<UserId>) -> ClientResult<()>;
}

/// Capability for resolving user identities.
#[async_trait]
pub trait IdentityOps: Send + Sync {
    /// Identify the acting principal (the integration's own account).
    async fn who_am_i(&self) -> ClientResult<UserId>;

    /// Fetch a user profile by id.
    async fn get_user(&self, id: &UserId) -> ClientResult<UserProfile>;

    /// Look up a user by primary email address.
    ///
    /// Fails with [`crate::ClientError::UserNotFound`] when no user has this
    /// email.
    async fn find_user_by_email(&self, email: &str) -> ClientResult<UserProfile>;
}

/// Marker trait for clients that support the full capability set the
/// reconciliation engine requires.
pub trait ChannelClient: DirectoryOps + ChannelOps + MembershipOps + IdentityOps {}

// Blanket implementation for any client that implements all capabilities
impl<T> ChannelClient for T where T: DirectoryOps + ChannelOps + MembershipOps + IdentityOps {}
