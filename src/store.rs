//! In-memory instance store.
//!
//! A [`Store`] holds the ordered collection of instances belonging to
//! exactly one named model. Every model class owns one, and `has_many`
//! relation slots provision nested stores scoped to the related model.
//!
//! Pushing an instance whose model tag does not match the store's model is
//! **silently dropped**: the store acts as a safety filter, not an error
//! channel. The drop is logged at `warn!` so it is observable without
//! becoming a failure path.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::ModelInstance;

/// Ordered, model-tag-filtered collection of instances.
///
/// Cheap to clone; clones share the same underlying item list.
#[derive(Clone)]
pub struct Store {
    model: String,
    items: Arc<Mutex<Vec<ModelInstance>>>,
}

impl Store {
    /// Create an empty store scoped to `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The model name this store accepts.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Append an instance, preserving insertion order.
    ///
    /// Instances tagged with a different model are dropped without error.
    pub fn push(&self, instance: ModelInstance) {
        if instance.model() != self.model {
            warn!(
                store = %self.model,
                instance_model = %instance.model(),
                "dropping mis-tagged instance"
            );
            return;
        }
        debug!(store = %self.model, id = %instance.id(), "storing instance");
        self.items.lock().push(instance);
    }

    /// Append several instances at once, subject to the same model filter.
    pub fn extend<I: IntoIterator<Item = ModelInstance>>(&self, instances: I) {
        for instance in instances {
            self.push(instance);
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Handle clones of all stored instances, in insertion order.
    pub fn items(&self) -> Vec<ModelInstance> {
        self.items.lock().clone()
    }

    /// Look up a stored instance by id.
    pub fn find(&self, id: &Uuid) -> Option<ModelInstance> {
        self.items
            .lock()
            .iter()
            .find(|instance| instance.id() == *id)
            .cloned()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("model", &self.model)
            .field("len", &self.len())
            .finish()
    }
}
