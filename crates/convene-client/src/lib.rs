//! # Convene Client
//!
//! Capability abstractions for remote collaboration-space services.
//!
//! This crate defines the boundary between the Convene reconciliation engine
//! and whatever service actually hosts the channels. A concrete client
//! implements the capability traits against its transport and decodes the
//! service's error identifiers into [`ClientError`] exactly once; everything
//! above this crate works with typed values only.
//!
//! ## Architecture
//!
//! The capability-based trait split follows the connector-framework pattern:
//!
//! - [`DirectoryOps`] - paginated channel enumeration
//! - [`ChannelOps`] - create, fetch, rename, topic/purpose, archive, join
//! - [`MembershipOps`] - list and add members (the service cannot remove)
//! - [`IdentityOps`] - acting principal and user profile resolution
//! - [`ChannelClient`] - umbrella trait, blanket-implemented
//!
//! ## Crate Organization
//!
//! - [`ids`] - Type-safe identifiers (`ChannelId`, `UserId`)
//! - [`types`] - Channel, user, and pagination records
//! - [`error`] - The closed remote-error enum
//! - [`traits`] - Client capability traits

pub mod error;
pub mod ids;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use convene_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ClientError, ClientResult};
    pub use crate::ids::{ChannelId, UserId};
    pub use crate::traits::{
        ChannelClient, ChannelOps, DirectoryOps, IdentityOps, MembershipOps,
    };
    pub use crate::types::{Channel, ChannelPage, Cursor, UserProfile};
}

pub use error::{ClientError, ClientResult};
pub use ids::{ChannelId, UserId};
pub use traits::{ChannelClient, ChannelOps, DirectoryOps, IdentityOps, MembershipOps};
pub use types::{Channel, ChannelPage, Cursor, UserProfile};

// Re-export async_trait for client implementors
pub use async_trait::async_trait;
