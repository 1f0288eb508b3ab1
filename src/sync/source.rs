//! Sync source protocol: handler registration and fan-out notification.

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::target::SyncTarget;
use crate::error::Result;

/// Untyped sync payload. The protocol imposes no schema on the data that
/// flows between sources and targets.
pub type SyncData = serde_json::Value;

/// A registered update handler: one data argument in, a future of data out.
pub type UpdateHandler = Arc<dyn Fn(SyncData) -> BoxFuture<'static, Result<SyncData>> + Send + Sync>;

/// One entry in the handler list. Targets keep their identity so
/// [`SyncSource::remove_sync_target`] can find them again; bare handlers
/// are anonymous and can only be dropped via
/// [`SyncSource::clear_sync_targets`].
#[derive(Clone)]
enum Registration {
    Target(Arc<dyn SyncTarget>),
    Handler(UpdateHandler),
}

/// Fan-out notifier with aggregated results.
///
/// A `SyncSource` keeps an ordered list of update handlers. Notification
/// invokes every handler with the same payload and aggregates the
/// resulting futures: all resolved values in registration order, or the
/// first failure.
///
/// The type is meant to be embedded: anything that wants sync-source
/// behavior holds one and delegates to it (the
/// [`Registry`](crate::Registry) does exactly that).
#[derive(Default)]
pub struct SyncSource {
    handlers: Mutex<Vec<Registration>>,
}

impl SyncSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target's `sync` operation as an update handler.
    ///
    /// No de-duplication occurs: registering the same target twice means it
    /// is notified twice.
    pub fn add_sync_target(&self, target: Arc<dyn SyncTarget>) {
        self.handlers.lock().push(Registration::Target(target));
    }

    /// Register several targets in one call, preserving argument order.
    pub fn add_sync_targets<I>(&self, targets: I)
    where
        I: IntoIterator<Item = Arc<dyn SyncTarget>>,
    {
        let mut handlers = self.handlers.lock();
        handlers.extend(targets.into_iter().map(Registration::Target));
    }

    /// Lower-level registration primitive: install a bare handler function.
    ///
    /// Returns the resulting handler count.
    pub fn on_update<F, Fut>(&self, handler: F) -> usize
    where
        F: Fn(SyncData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SyncData>> + Send + 'static,
    {
        let handler: UpdateHandler = Arc::new(move |data| handler(data).boxed());
        let mut handlers = self.handlers.lock();
        handlers.push(Registration::Handler(handler));
        handlers.len()
    }

    /// Remove the first registered occurrence of `target`; no-op when absent.
    pub fn remove_sync_target(&self, target: &Arc<dyn SyncTarget>) {
        let mut handlers = self.handlers.lock();
        let position = handlers.iter().position(|registration| {
            matches!(registration, Registration::Target(t) if same_target(t, target))
        });
        if let Some(index) = position {
            handlers.remove(index);
        }
    }

    /// Drop every registered handler.
    pub fn clear_sync_targets(&self) {
        self.handlers.lock().clear();
    }

    /// Current handler count.
    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    /// Notify every registered handler with the same payload.
    ///
    /// The handler list is snapshotted when this is called; mutating the
    /// list afterwards does not affect an in-flight notification. All
    /// handlers are started before any completion is awaited; the returned
    /// future resolves with every handler's value in registration order, or
    /// fails with the first handler error. Every handler runs to completion
    /// even when a sibling fails; only the results after the first error are
    /// discarded.
    ///
    /// With zero registered handlers this resolves immediately to `[]`.
    pub fn notify_sync_targets(
        &self,
        data: SyncData,
    ) -> impl Future<Output = Result<Vec<SyncData>>> + Send + 'static {
        let snapshot: Vec<Registration> = self.handlers.lock().clone();
        debug!(handlers = snapshot.len(), "notifying sync targets");

        let syncs: Vec<BoxFuture<'static, Result<SyncData>>> = snapshot
            .into_iter()
            .map(|registration| {
                let payload = data.clone();
                match registration {
                    Registration::Target(target) => {
                        async move { target.sync(payload).await }.boxed()
                    }
                    Registration::Handler(handler) => {
                        async move { handler(payload).await }.boxed()
                    }
                }
            })
            .collect();

        async move { join_all(syncs).await.into_iter().collect() }
    }

    /// [`notify_sync_targets`](Self::notify_sync_targets) with the default
    /// empty-object payload.
    pub fn notify_sync_targets_default(
        &self,
    ) -> impl Future<Output = Result<Vec<SyncData>>> + Send + 'static {
        self.notify_sync_targets(SyncData::Object(serde_json::Map::new()))
    }
}

/// Identity comparison for registered targets. Compares the data pointer
/// only, so two handles to the same target compare equal even if their
/// vtable pointers differ across codegen units.
fn same_target(a: &Arc<dyn SyncTarget>, b: &Arc<dyn SyncTarget>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl std::fmt::Debug for SyncSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSource")
            .field("handlers", &self.len())
            .finish()
    }
}
