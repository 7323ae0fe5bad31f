//! Remote channel directory
//!
//! Cursor-paginated enumeration of the remote service's channels. Every
//! other component that needs to see "what exists remotely" goes through
//! this substrate.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use convene_client::{Channel, Cursor, DirectoryOps};

use crate::error::ReconcileError;

/// Configuration for remote directory enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Maximum number of channels to accumulate in a single enumeration.
    /// Prevents unbounded memory growth against very large workspaces.
    #[serde(default = "default_max_channels")]
    pub max_channels: usize,
}

fn default_max_channels() -> usize {
    50_000
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            max_channels: default_max_channels(),
        }
    }
}

/// Filter for directory queries.
///
/// All criteria are conjunctive; an unset criterion matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelFilter {
    /// Keep only channels whose name starts with this prefix.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Keep only channels with this privacy flag.
    #[serde(default)]
    pub is_private: Option<bool>,
    /// Whether archived channels appear in the result.
    #[serde(default)]
    pub include_archived: bool,
}

impl ChannelFilter {
    fn matches(&self, channel: &Channel) -> bool {
        if let Some(prefix) = &self.prefix {
            if !channel.name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(is_private) = self.is_private {
            if channel.is_private != is_private {
                return false;
            }
        }
        true
    }
}

/// Paginated view over the remote channel directory.
pub struct RemoteDirectory<'a, C> {
    client: &'a C,
    config: DirectoryConfig,
}

impl<'a, C: DirectoryOps> RemoteDirectory<'a, C> {
    /// Create a directory view with default configuration.
    pub fn new(client: &'a C) -> Self {
        Self::with_config(client, DirectoryConfig::default())
    }

    /// Create a directory view with custom configuration.
    pub fn with_config(client: &'a C, config: DirectoryConfig) -> Self {
        Self { client, config }
    }

    /// Enumerate every channel in the directory.
    ///
    /// Pages through the remote listing until exhausted. Any page failure
    /// aborts the whole enumeration with `RemoteUnavailable`; partial
    /// results are discarded, callers re-invoke from the start on retry.
    pub async fn list_all(&self, include_archived: bool) -> Result<Vec<Channel>, ReconcileError> {
        self.collect(include_archived, |_| true).await
    }

    /// Enumerate channels matching a filter.
    ///
    /// The filter is applied page by page, so memory use is proportional to
    /// the matches, not the directory.
    pub async fn query(&self, filter: &ChannelFilter) -> Result<Vec<Channel>, ReconcileError> {
        self.collect(filter.include_archived, |c| filter.matches(c))
            .await
    }

    /// Scan the directory and return the first channel the predicate
    /// accepts, without enumerating the remaining pages.
    pub(crate) async fn find_first(
        &self,
        include_archived: bool,
        predicate: impl Fn(&Channel) -> bool,
    ) -> Result<Option<Channel>, ReconcileError> {
        let mut cursor: Option<Cursor> = None;
        loop {
            let page = self.fetch_page(cursor.as_ref(), include_archived).await?;
            for channel in page.channels {
                if predicate(&channel) {
                    return Ok(Some(channel));
                }
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(None),
            }
        }
    }

    async fn collect(
        &self,
        include_archived: bool,
        keep: impl Fn(&Channel) -> bool,
    ) -> Result<Vec<Channel>, ReconcileError> {
        let mut channels = Vec::new();
        let mut cursor: Option<Cursor> = None;
        let mut seen = 0usize;

        loop {
            let page = self.fetch_page(cursor.as_ref(), include_archived).await?;
            seen += page.channels.len();
            channels.extend(page.channels.into_iter().filter(|c| keep(c)));

            if seen >= self.config.max_channels {
                warn!(
                    seen,
                    max_channels = self.config.max_channels,
                    "Channel enumeration hit the configured cap, stopping"
                );
                break;
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(channels)
    }

    async fn fetch_page(
        &self,
        cursor: Option<&Cursor>,
        include_archived: bool,
    ) -> Result<convene_client::ChannelPage, ReconcileError> {
        debug!(cursor = ?cursor.map(Cursor::as_str), "Fetching channel directory page");
        let page = self
            .client
            .list_channels(cursor, include_archived)
            .await
            .map_err(|source| ReconcileError::remote_unavailable("channel listing", source))?;
        debug!(count = page.channels.len(), "Directory page fetched");
        Ok(page)
    }
}
