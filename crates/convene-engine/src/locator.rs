//! Channel locator
//!
//! Finds an existing remote channel by name. Archived channels are always
//! part of the search: the remote service enforces name uniqueness across
//! active and archived channels, so a create that skips them runs straight
//! into a duplicate-name rejection.

use tracing::{debug, info};

use convene_client::{Channel, DirectoryOps};

use crate::directory::{DirectoryConfig, RemoteDirectory};
use crate::error::ReconcileError;

/// Name-based lookup over the remote directory.
pub struct ChannelLocator<'a, C> {
    directory: RemoteDirectory<'a, C>,
}

impl<'a, C: DirectoryOps> ChannelLocator<'a, C> {
    /// Create a locator with default directory configuration.
    pub fn new(client: &'a C) -> Self {
        Self {
            directory: RemoteDirectory::new(client),
        }
    }

    /// Create a locator with custom directory configuration.
    pub fn with_config(client: &'a C, config: DirectoryConfig) -> Self {
        Self {
            directory: RemoteDirectory::with_config(client, config),
        }
    }

    /// Find a channel by exact name, including archived ones.
    ///
    /// Returns `None` when no channel matches after full enumeration; a
    /// listing failure propagates as `RemoteUnavailable`.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Channel>, ReconcileError> {
        let found = self.directory.find_first(true, |c| c.name == name).await?;

        match &found {
            Some(channel) => info!(
                name,
                channel_id = %channel.id,
                archived = channel.is_archived,
                "Matched existing channel by name"
            ),
            None => debug!(name, "No channel with this name, archived channels included"),
        }

        Ok(found)
    }
}
