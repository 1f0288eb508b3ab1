//! Model class registry.
//!
//! A [`Registry`] maps model names to their single [`ModelClass`] with
//! get-or-create semantics: the first declaration of a name wins, and every
//! later declaration returns the existing class unchanged, ignoring the new
//! description entirely.
//!
//! The registry also participates in data syncing on both sides:
//!
//! - as a **sync source** it embeds a [`SyncSource`] and delegates the full
//!   registration/notification surface, so callers can wire peers to it and
//!   fan model updates out;
//! - as a **sync target** it implements [`SyncTarget`], acknowledging
//!   incoming payloads (applying payload items to stored instances is a
//!   persistence concern the core does not implement).
//!
//! The primary API is an explicit registry value with controlled lifetime.
//! [`Registry::global`] offers the process-wide instance for callers that
//! want singleton ergonomics.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::model::{ModelClass, ModelDescription};
use crate::sync::{SyncData, SyncSource, SyncTarget};

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// Process-lifetime mapping of model name to class, plus the embedded sync
/// source.
#[derive(Default)]
pub struct Registry {
    classes: Mutex<BTreeMap<String, ModelClass>>,
    sync: SyncSource,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Look up or create the class for `name`.
    ///
    /// When the name is already declared, the existing class handle is
    /// returned and `description` is dropped (first-write-wins); callers
    /// must not assume repeated declarations update a schema. An empty or
    /// whitespace-only name fails without mutating the registry.
    pub fn declare(&self, name: impl Into<String>, description: ModelDescription) -> Result<ModelClass> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::InvalidModelName(name));
        }

        let mut classes = self.classes.lock();
        if let Some(existing) = classes.get(&name) {
            debug!(model = %name, "already declared, returning existing class");
            return Ok(existing.clone());
        }

        let class = ModelClass::from_description(name.clone(), description);
        debug!(model = %name, "declared model class");
        classes.insert(name, class.clone());
        Ok(class)
    }

    /// The class declared under `name`, if any.
    pub fn get(&self, name: &str) -> Option<ModelClass> {
        self.classes.lock().get(name).cloned()
    }

    /// Drop a declared class, returning it.
    ///
    /// Existing handles (and stored instances) stay alive; only the
    /// name-to-class mapping is removed, so `name` can be declared afresh.
    pub fn remove(&self, name: &str) -> Option<ModelClass> {
        self.classes.lock().remove(name)
    }

    pub fn len(&self) -> usize {
        self.classes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.lock().is_empty()
    }

    /// The embedded sync source, for callers that want the full surface.
    pub fn sync_source(&self) -> &SyncSource {
        &self.sync
    }

    // Sync source delegation. The registry is the usual sync source in an
    // application, so the whole surface is mirrored here.

    /// See [`SyncSource::add_sync_target`].
    pub fn add_sync_target(&self, target: Arc<dyn SyncTarget>) {
        self.sync.add_sync_target(target);
    }

    /// See [`SyncSource::add_sync_targets`].
    pub fn add_sync_targets<I>(&self, targets: I)
    where
        I: IntoIterator<Item = Arc<dyn SyncTarget>>,
    {
        self.sync.add_sync_targets(targets);
    }

    /// See [`SyncSource::on_update`].
    pub fn on_update<F, Fut>(&self, handler: F) -> usize
    where
        F: Fn(SyncData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SyncData>> + Send + 'static,
    {
        self.sync.on_update(handler)
    }

    /// See [`SyncSource::remove_sync_target`].
    pub fn remove_sync_target(&self, target: &Arc<dyn SyncTarget>) {
        self.sync.remove_sync_target(target);
    }

    /// See [`SyncSource::clear_sync_targets`].
    pub fn clear_sync_targets(&self) {
        self.sync.clear_sync_targets();
    }

    /// See [`SyncSource::notify_sync_targets`].
    pub fn notify_sync_targets(
        &self,
        data: SyncData,
    ) -> impl Future<Output = Result<Vec<SyncData>>> + Send + 'static {
        self.sync.notify_sync_targets(data)
    }

    /// See [`SyncSource::notify_sync_targets_default`].
    pub fn notify_sync_targets_default(
        &self,
    ) -> impl Future<Output = Result<Vec<SyncData>>> + Send + 'static {
        self.sync.notify_sync_targets_default()
    }
}

#[async_trait]
impl SyncTarget for Registry {
    /// Acknowledge an incoming payload.
    ///
    /// Payload keys are model names; keys with no declared class are
    /// ignored. Applying items to stored instances is left to a
    /// persistence collaborator, so the payload is resolved back
    /// unchanged.
    async fn sync(&self, data: SyncData) -> Result<SyncData> {
        if let SyncData::Object(models) = &data {
            let classes = self.classes.lock();
            for name in models.keys() {
                if classes.contains_key(name) {
                    debug!(model = %name, "sync payload references declared model");
                }
            }
        }
        Ok(data)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("classes", &self.len())
            .field("sync", &self.sync)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attribute;

    #[test]
    fn declare_creates_and_returns_the_class() {
        let registry = Registry::new();
        let class = registry
            .declare(
                "User",
                ModelDescription::new().attribute("name", Attribute::text()),
            )
            .unwrap();

        assert_eq!(class.name(), "User");
        assert_eq!(registry.len(), 1);
        assert!(ModelClass::ptr_eq(&class, &registry.get("User").unwrap()));
    }

    #[test]
    fn declare_twice_returns_identical_class_and_ignores_description() {
        let registry = Registry::new();
        let first = registry
            .declare(
                "User",
                ModelDescription::new().attribute("name", Attribute::text()),
            )
            .unwrap();
        let second = registry
            .declare(
                "User",
                ModelDescription::new()
                    .attribute("completely", Attribute::number())
                    .attribute("different", Attribute::number()),
            )
            .unwrap();

        assert!(ModelClass::ptr_eq(&first, &second));
        assert!(second.attributes().contains_key("name"));
        assert!(!second.attributes().contains_key("different"));
    }

    #[test]
    fn declare_with_blank_name_fails_without_mutation() {
        let registry = Registry::new();
        for name in ["", "   "] {
            match registry.declare(name, ModelDescription::new()) {
                Err(ModelError::InvalidModelName(_)) => {}
                other => panic!("expected InvalidModelName, got {other:?}"),
            }
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_frees_the_name_for_redeclaration() {
        let registry = Registry::new();
        let first = registry.declare("User", ModelDescription::new()).unwrap();
        assert!(registry.remove("User").is_some());
        assert!(registry.get("User").is_none());

        let second = registry.declare("User", ModelDescription::new()).unwrap();
        assert!(!ModelClass::ptr_eq(&first, &second));
    }

    #[test]
    fn global_registry_is_one_instance() {
        let a = Registry::global();
        let b = Registry::global();
        assert!(std::ptr::eq(a, b));
    }

    #[tokio::test]
    async fn registry_sync_acknowledges_the_payload() {
        let registry = Registry::new();
        registry.declare("User", ModelDescription::new()).unwrap();

        let payload = serde_json::json!({"User": {"items": []}, "Unknown": {"items": []}});
        let resolved = registry.sync(payload.clone()).await.unwrap();
        assert_eq!(resolved, payload);
    }

    #[tokio::test]
    async fn registry_fans_out_to_its_targets() {
        use crate::sync::SyncTargetExt;

        struct Recorder(Mutex<Vec<SyncData>>);

        #[async_trait]
        impl SyncTarget for Recorder {
            async fn sync(&self, data: SyncData) -> Result<SyncData> {
                self.0.lock().push(data.clone());
                Ok(data)
            }
        }

        let registry = Registry::new();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        recorder.add_sync_source(registry.sync_source());

        let results = registry.notify_sync_targets_default().await.unwrap();
        assert_eq!(results, vec![serde_json::json!({})]);
        assert_eq!(recorder.0.lock().len(), 1);
    }
}
