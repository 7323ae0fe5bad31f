//! Client data types
//!
//! The remote service's view of channels and users, plus pagination types
//! for directory listings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{ChannelId, UserId};

/// A channel as reported by the remote service.
///
/// Membership is not part of this record; it is fetched separately via
/// [`crate::traits::MembershipOps::list_members`], mirroring the remote API
/// surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Remote-assigned identifier, immutable for the channel's lifetime.
    pub id: ChannelId,
    /// Current channel name. An archived channel keeps its name reserved.
    pub name: String,
    /// Whether the channel is private. Fixed at creation time.
    pub is_private: bool,
    /// Whether the channel has been archived (soft-deleted).
    pub is_archived: bool,
    /// Channel purpose (description). Empty when unset.
    #[serde(default)]
    pub purpose: String,
    /// Channel topic. Empty when unset.
    #[serde(default)]
    pub topic: String,
}

/// Opaque pagination cursor for directory listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a cursor value returned by the remote service.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the raw cursor value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a channel directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPage {
    /// Channels in this page.
    pub channels: Vec<Channel>,
    /// Cursor for the next page. `None` when the listing is exhausted.
    pub next_cursor: Option<Cursor>,
}

impl ChannelPage {
    /// Create the final page of a listing.
    pub fn last(channels: Vec<Channel>) -> Self {
        Self {
            channels,
            next_cursor: None,
        }
    }

    /// Create a page with a continuation cursor.
    pub fn with_next(channels: Vec<Channel>, cursor: Cursor) -> Self {
        Self {
            channels,
            next_cursor: Some(cursor),
        }
    }
}

/// A user profile as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Remote-assigned identifier.
    pub id: UserId,
    /// Human-readable display name.
    pub display_name: String,
    /// Primary email address, when the service exposes it.
    pub email: Option<String>,
}

impl UserProfile {
    /// Format a label for human-facing diagnostics: `name (email)`, or just
    /// the name when no email is available.
    pub fn label(&self) -> String {
        match &self.email {
            Some(email) => format!("{} ({})", self.display_name, email),
            None => self.display_name.clone(),
        }
    }
}
