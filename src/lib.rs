//! # modelsync
//!
//! An in-memory object-modeling library: declare model classes with typed
//! and computed attributes, build dirty-tracked instances, and propagate
//! data changes to sync peers with aggregated async fan-out.
//!
//! This is a modeling layer, not a database: there is no persistence
//! engine, no network transport and no query language. What it gives you:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Registry (registry.rs)                                     │
//! │  - name → ModelClass, get-or-create, first-write-wins       │
//! │  - embeds a SyncSource; is itself a SyncTarget              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Model layer (model.rs, attributes/, relations.rs)          │
//! │  - ModelDescription → ModelClass → ModelInstance            │
//! │  - typed/computed attributes, dirty flag, save()            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Store (store.rs)                                           │
//! │  - ordered instances of exactly one model, silent filter    │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Syncing (sync/)                                            │
//! │  - SyncSource: ordered handlers, fan-out, join semantics    │
//! │  - SyncTarget: async sync(data), default rejects loudly     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use modelsync::{Attribute, AttrValue, ModelDescription, Registry};
//!
//! # fn main() -> modelsync::Result<()> {
//! let registry = Registry::new();
//! let user = registry.declare(
//!     "User",
//!     ModelDescription::new()
//!         .attribute("first_name", Attribute::text())
//!         .attribute("last_name", Attribute::text())
//!         .attribute(
//!             "full_name",
//!             Attribute::computed(|bag| {
//!                 AttrValue::from(format!(
//!                     "{} {}",
//!                     bag.text("first_name"),
//!                     bag.text("last_name")
//!                 ))
//!             }),
//!         ),
//! )?;
//!
//! let tyrion = user.build_with([("first_name", "Tyrion"), ("last_name", "Lannister")]);
//! assert_eq!(tyrion.get("full_name"), Some(AttrValue::from("Tyrion Lannister")));
//! assert!(!tyrion.is_dirty());
//!
//! tyrion.set("first_name", "Cersei")?;
//! assert!(tyrion.is_dirty());
//! assert_eq!(tyrion.get("full_name"), Some(AttrValue::from("Cersei Lannister")));
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency model
//!
//! All operations are synchronous except [`ModelInstance::save`] and the
//! notification fan-out. Shared state lives behind cheap-clone handles;
//! there is no timeout or cancellation anywhere in the core, so a hung sync
//! target hangs its aggregate.

pub mod attributes;
pub mod error;
pub mod model;
pub mod registry;
pub mod relations;
pub mod store;
pub mod sync;

pub use attributes::{AttrValue, Attribute, AttributeBag, AttributeKind};
pub use error::{ModelError, Result};
pub use model::{Attributes, InstanceMethod, ModelClass, ModelDescription, ModelInstance};
pub use registry::Registry;
pub use relations::{Relation, RelationKind};
pub use store::Store;
pub use sync::{SyncData, SyncSource, SyncTarget, SyncTargetExt, UpdateHandler};
