//! Client error types
//!
//! The remote service's failure conditions decoded once, at the client
//! boundary, into a closed enum. Callers match on variants; raw error
//! strings from the wire never travel past this crate.

use thiserror::Error;

/// Error returned by a [`crate::traits::ChannelClient`] implementation.
///
/// Concrete clients are responsible for mapping the remote service's error
/// identifiers onto these variants. Conditions like "name taken" or "not in
/// channel" are not transport failures; the engine treats several of them as
/// expected states rather than errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The channel does not exist (deleted out-of-band, or the id is stale).
    #[error("channel not found: {id}")]
    ChannelNotFound { id: String },

    /// No user matches the given identifier or email.
    #[error("user not found: {identifier}")]
    UserNotFound { identifier: String },

    /// A channel with this name already exists, active or archived.
    #[error("channel name already taken: {name}")]
    NameTaken { name: String },

    /// The acting principal is not a member of the channel.
    #[error("not a member of channel {id}")]
    NotInChannel { id: String },

    /// The channel is already archived.
    #[error("channel {id} is already archived")]
    AlreadyArchived { id: String },

    /// The service asked us to slow down.
    #[error("rate limited by remote service, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Token rejected or insufficient scopes.
    #[error("authentication failed: {message}")]
    AuthFailed { message: String },

    /// Network-level failure reaching the remote service.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Any other error identifier reported by the remote API.
    #[error("remote api error: {code}")]
    Api { code: String },
}

impl ClientError {
    /// Check if this error is transient and the call may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Transport { .. } | ClientError::RateLimited { .. }
        )
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get a stable code for classification and logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::ChannelNotFound { .. } => "CHANNEL_NOT_FOUND",
            ClientError::UserNotFound { .. } => "USER_NOT_FOUND",
            ClientError::NameTaken { .. } => "NAME_TAKEN",
            ClientError::NotInChannel { .. } => "NOT_IN_CHANNEL",
            ClientError::AlreadyArchived { .. } => "ALREADY_ARCHIVED",
            ClientError::RateLimited { .. } => "RATE_LIMITED",
            ClientError::AuthFailed { .. } => "AUTH_FAILED",
            ClientError::Transport { .. } => "TRANSPORT_ERROR",
            ClientError::Api { .. } => "API_ERROR",
        }
    }

    // Convenience constructors

    /// Create a channel-not-found error.
    pub fn channel_not_found(id: impl Into<String>) -> Self {
        ClientError::ChannelNotFound { id: id.into() }
    }

    /// Create a user-not-found error.
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        ClientError::UserNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a name-taken error.
    pub fn name_taken(name: impl Into<String>) -> Self {
        ClientError::NameTaken { name: name.into() }
    }

    /// Create a not-in-channel error.
    pub fn not_in_channel(id: impl Into<String>) -> Self {
        ClientError::NotInChannel { id: id.into() }
    }

    /// Create an already-archived error.
    pub fn already_archived(id: impl Into<String>) -> Self {
        ClientError::AlreadyArchived { id: id.into() }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error with source.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ClientError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an error from an undecoded remote API code.
    pub fn api(code: impl Into<String>) -> Self {
        ClientError::Api { code: code.into() }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
