//! # Convene Engine
//!
//! Reconciliation engine converging declared channel state onto a remote
//! collaboration-space service with capability-limited mutation APIs: no
//! rename-on-conflict, no privacy toggle after creation, no member removal,
//! and archival instead of deletion.
//!
//! The engine decides whether to create, adopt, or mutate a remote channel,
//! converges membership under an add-only API, and downgrades remote
//! conditions that are not true failures (already exists, already archived,
//! actor not a member) to warnings instead of aborting.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   desired spec    ┌────────────────────┐
//! │  Orchestrating   │──────────────────►│  ChannelReconciler │
//! │  framework       │◄──────────────────│  create/read/      │
//! └──────────────────┘  outcome + diags  │  update/delete     │
//!                                        └─────────┬──────────┘
//!                            ┌─────────────────────┼─────────────────────┐
//!                            ▼                     ▼                     ▼
//!                    ┌───────────────┐   ┌──────────────────┐   ┌───────────────┐
//!                    │ ChannelLocator│   │   Membership     │   │  Diagnostics  │
//!                    │ (by name,     │   │   Synchronizer   │   │  (adoption,   │
//!                    │  incl. arch.) │   │   (add-only)     │   │   drift, ...) │
//!                    └───────┬───────┘   └──────────────────┘   └───────────────┘
//!                            ▼
//!                    ┌───────────────┐
//!                    │RemoteDirectory│
//!                    │ (paginated)   │
//!                    └───────────────┘
//! ```
//!
//! The remote service is reached exclusively through the capability traits
//! of `convene-client`, injected at construction. The engine persists
//! nothing; the caller owns state and serializes operations per channel.
//!
//! ## Example
//!
//! ```ignore
//! use convene_engine::{ChannelReconciler, ChannelSpec};
//!
//! let engine = ChannelReconciler::new(client);
//! let spec = ChannelSpec::new("release-notes")
//!     .with_members(members)
//!     .with_topic("weekly releases");
//!
//! let outcome = engine.reconcile_create(&spec).await?;
//! for diagnostic in &outcome.diagnostics {
//!     println!("{}: {}", diagnostic.severity, diagnostic.summary);
//! }
//! ```

pub mod diagnostics;
pub mod directory;
pub mod error;
pub mod locator;
pub mod membership;
pub mod reconciler;
pub mod types;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use directory::{ChannelFilter, DirectoryConfig, RemoteDirectory};
pub use error::{ChannelAttribute, ReconcileError, ReconcileFailure};
pub use locator::ChannelLocator;
pub use membership::{MembershipSyncOutcome, MembershipSynchronizer, TrackingMode};
pub use reconciler::{ChannelReconciler, ReconcileResult};
pub use types::{ChannelSpec, ObservedChannel, ReconcileOutcome};
pub use users::UserLookup;
