//! Sync target protocol.

use async_trait::async_trait;
use std::sync::Arc;

use super::source::{SyncData, SyncSource};
use crate::error::{ModelError, Result};

/// An object that can be registered with a [`SyncSource`] and receives its
/// notifications.
///
/// Concrete targets override [`sync`](Self::sync) to apply the incoming
/// data and decide success or failure. The default implementation always
/// fails with [`ModelError::SyncNotImplemented`] so a target that forgot to
/// override it fails loudly rather than silently dropping data.
#[async_trait]
pub trait SyncTarget: Send + Sync {
    /// Apply an incoming data payload and resolve with this target's result.
    async fn sync(&self, data: SyncData) -> Result<SyncData> {
        let _ = data;
        Err(ModelError::SyncNotImplemented)
    }
}

/// Registration convenience for [`SyncTarget`] implementors held in an `Arc`.
pub trait SyncTargetExt {
    /// Subscribe this target to a source's future notifications.
    fn add_sync_source(&self, source: &SyncSource);
}

impl<T: SyncTarget + 'static> SyncTargetExt for Arc<T> {
    fn add_sync_source(&self, source: &SyncSource) {
        source.add_sync_target(self.clone());
    }
}
