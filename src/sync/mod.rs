//! # Data Syncing
//!
//! This module implements the observer protocol that propagates data
//! between a sync source and its peers:
//!
//! - A [`SyncSource`] keeps an ordered list of update handlers and fans a
//!   notification out to all of them, aggregating their futures into one
//!   combined outcome (all results in registration order, or the first
//!   failure).
//! - A [`SyncTarget`] is any object exposing an async `sync(data)`
//!   operation. The default implementation rejects loudly so a forgotten
//!   override fails instead of silently dropping data.
//!
//! Payloads are untyped JSON values ([`SyncData`]): the protocol imposes no
//! schema beyond "one data argument in, a future of data out".
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use modelsync::{Result, SyncData, SyncSource, SyncTarget};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl SyncTarget for Echo {
//!     async fn sync(&self, data: SyncData) -> Result<SyncData> {
//!         Ok(data)
//!     }
//! }
//!
//! # async fn demo() -> Result<()> {
//! let source = SyncSource::new();
//! source.add_sync_target(Arc::new(Echo));
//! let results = source.notify_sync_targets(serde_json::json!({"seq": 1})).await?;
//! assert_eq!(results.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod source;
pub mod target;

pub use source::{SyncData, SyncSource, UpdateHandler};
pub use target::{SyncTarget, SyncTargetExt};
