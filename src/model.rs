//! # Domain Model: Classes, Descriptions and Instances
//!
//! This module defines the modeling core: [`ModelDescription`] (the sole
//! configuration surface for declaring a model), [`ModelClass`] (a named
//! schema plus its instance [`Store`]) and [`ModelInstance`] (one built
//! object with live attribute accessors and a dirty flag).
//!
//! ## Lifecycle
//!
//! 1. A class is created by [`Registry::declare`](crate::Registry::declare)
//!    from a description. Classes are get-or-create per name: repeated
//!    declarations return the existing class and ignore the new description.
//! 2. [`ModelClass::build`] constructs an instance: every non-computed
//!    attribute lands in the instance's bag: explicit input value wins,
//!    otherwise the descriptor's default. The instance is tagged with the
//!    model name, registered into the class store, and returned
//!    synchronously.
//! 3. Attribute writes go through [`ModelInstance::set`], which marks the
//!    instance dirty unconditionally; re-assigning an equal value still
//!    counts as a change.
//! 4. [`ModelInstance::save`] clears the dirty flag and resolves with a
//!    handle to the instance's own attribute bag (identity, not a copy).
//!    Actual persistence is an external collaborator; the core only honors
//!    the resolution contract.
//!
//! ## Computed attributes
//!
//! A computed attribute's getter runs against the current bag on every
//! read. Values are never cached, so derived attributes always reflect
//! post-mutation state. Writes to computed attributes are silently
//! discarded and do not touch the dirty flag.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::attributes::{AttrValue, Attribute, AttributeBag};
use crate::error::{ModelError, Result};
use crate::relations::{Relation, RelationKind};
use crate::store::Store;

/// A callable installed on every instance of a model, invoked with the
/// instance as context plus caller-supplied arguments.
pub type InstanceMethod = Arc<dyn Fn(&ModelInstance, &[AttrValue]) -> AttrValue + Send + Sync>;

/// Declarative description of a model, consumed by
/// [`Registry::declare`](crate::Registry::declare).
///
/// ```
/// use modelsync::{Attribute, AttrValue, ModelDescription, Relation};
///
/// let description = ModelDescription::new()
///     .attribute("first_name", Attribute::text())
///     .attribute("last_name", Attribute::text())
///     .attribute(
///         "full_name",
///         Attribute::computed(|bag| {
///             AttrValue::from(format!("{} {}", bag.text("first_name"), bag.text("last_name")))
///         }),
///     )
///     .relation(Relation::has_many("posts").with_model("Post"))
///     .resource_path("/users");
/// ```
#[derive(Default)]
pub struct ModelDescription {
    attributes: BTreeMap<String, Attribute>,
    relations: Vec<Relation>,
    methods: BTreeMap<String, InstanceMethod>,
    resource_path: Option<String>,
}

impl ModelDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute.
    pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Declare a relation.
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Install an instance method.
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&ModelInstance, &[AttrValue]) -> AttrValue + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Set the resource path hint for a future persistence collaborator.
    pub fn resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = Some(path.into());
        self
    }
}

/// Immutable schema shared by a class and all of its instances.
struct Schema {
    name: String,
    attributes: BTreeMap<String, Attribute>,
    relations: Vec<Relation>,
    methods: BTreeMap<String, InstanceMethod>,
    resource_path: Option<String>,
}

/// A named model class: schema plus instance store.
///
/// Cheap to clone; clones are handles onto the same schema and store.
#[derive(Clone)]
pub struct ModelClass {
    schema: Arc<Schema>,
    store: Store,
}

impl ModelClass {
    pub(crate) fn from_description(name: impl Into<String>, description: ModelDescription) -> Self {
        let name = name.into();
        let store = Store::new(name.clone());
        Self {
            schema: Arc::new(Schema {
                name,
                attributes: description.attributes,
                relations: description.relations,
                methods: description.methods,
                resource_path: description.resource_path,
            }),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn resource_path(&self) -> Option<&str> {
        self.schema.resource_path.as_deref()
    }

    /// The declared attribute descriptors, keyed by name.
    pub fn attributes(&self) -> &BTreeMap<String, Attribute> {
        &self.schema.attributes
    }

    /// The declared relations.
    pub fn relations(&self) -> &[Relation] {
        &self.schema.relations
    }

    /// The class's instance store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns true when both handles refer to the same class.
    pub fn ptr_eq(a: &ModelClass, b: &ModelClass) -> bool {
        Arc::ptr_eq(&a.schema, &b.schema)
    }

    /// Build an instance with every attribute at its default value.
    pub fn build(&self) -> ModelInstance {
        self.build_with(std::iter::empty::<(String, AttrValue)>())
    }

    /// Build an instance from initial values.
    ///
    /// For each non-computed attribute: the supplied value wins, otherwise
    /// the descriptor's default is used. Values for undeclared names are
    /// ignored. The instance starts clean (`is_dirty() == false`) and is
    /// appended to the class store before being returned.
    pub fn build_with<I, K, V>(&self, values: I) -> ModelInstance
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttrValue>,
    {
        let mut input: BTreeMap<String, AttrValue> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut bag = AttributeBag::new();
        for (name, attribute) in &self.schema.attributes {
            if attribute.is_computed() {
                continue;
            }
            let value = input
                .remove(name)
                .unwrap_or_else(|| attribute.default_value().clone());
            bag.set(name.clone(), value);
        }

        let mut relations = BTreeMap::new();
        for relation in &self.schema.relations {
            let slot = match relation.kind() {
                RelationKind::HasMany => RelationSlot::HasMany(Store::new(relation.model())),
                RelationKind::BelongsTo => RelationSlot::BelongsTo(None),
            };
            relations.insert(relation.name().to_string(), slot);
        }

        let instance = ModelInstance {
            inner: Arc::new(InstanceInner {
                id: Uuid::new_v4(),
                schema: Arc::clone(&self.schema),
                attributes: Attributes(Arc::new(Mutex::new(bag))),
                dirty: AtomicBool::new(false),
                relations: Mutex::new(relations),
            }),
        };

        debug!(model = %self.schema.name, id = %instance.id(), "built instance");
        self.store.push(instance.clone());
        instance
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("name", &self.schema.name)
            .field("attributes", &self.schema.attributes.len())
            .field("store", &self.store)
            .finish()
    }
}

/// Shared handle to an instance's attribute bag.
///
/// [`ModelInstance::save`] resolves with one of these, and callers may hold
/// onto it: it is the bag itself, not a snapshot, which is load-bearing for
/// code that chains on the saved attributes. Identity between handles is
/// observable through [`ptr_eq`](Self::ptr_eq).
#[derive(Clone)]
pub struct Attributes(Arc<Mutex<AttributeBag>>);

impl Attributes {
    /// Read one value out of the bag.
    pub fn get(&self, name: &str) -> Option<AttrValue> {
        self.0.lock().get(name).cloned()
    }

    /// Clone the current bag contents.
    pub fn snapshot(&self) -> AttributeBag {
        self.0.lock().clone()
    }

    /// Render the current bag as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        self.0.lock().to_json()
    }

    /// Whether two handles refer to the same underlying bag.
    pub fn ptr_eq(a: &Attributes, b: &Attributes) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Attributes").field(&*self.0.lock()).finish()
    }
}

/// What a relation declaration provisions on each instance.
enum RelationSlot {
    BelongsTo(Option<ModelInstance>),
    HasMany(Store),
}

struct InstanceInner {
    id: Uuid,
    schema: Arc<Schema>,
    attributes: Attributes,
    dirty: AtomicBool,
    relations: Mutex<BTreeMap<String, RelationSlot>>,
}

/// One concrete object built from a [`ModelClass`].
///
/// Cheap to clone; clones are handles onto the same instance state, which
/// is how the class store and callers share an instance.
#[derive(Clone)]
pub struct ModelInstance {
    inner: Arc<InstanceInner>,
}

impl ModelInstance {
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The owning model's name (the tag the store filters on).
    pub fn model(&self) -> &str {
        &self.inner.schema.name
    }

    /// Shared handle to this instance's attribute bag.
    pub fn attributes(&self) -> Attributes {
        self.inner.attributes.clone()
    }

    /// Read an attribute.
    ///
    /// Computed attributes are evaluated live against the current bag;
    /// stored attributes come straight out of the bag. Unknown names read
    /// as `None`.
    pub fn get(&self, name: &str) -> Option<AttrValue> {
        let attribute = self.inner.schema.attributes.get(name)?;
        let bag = self.inner.attributes.0.lock();
        match attribute.getter() {
            Some(getter) => Some(getter(&bag)),
            None => bag.get(name).cloned(),
        }
    }

    /// Write an attribute.
    ///
    /// Stores the value and marks the instance dirty unconditionally, with no
    /// equality short-circuit. Writes to computed attributes are silently
    /// discarded. Unknown names are an error.
    pub fn set(&self, name: &str, value: impl Into<AttrValue>) -> Result<()> {
        let attribute = self
            .inner
            .schema
            .attributes
            .get(name)
            .ok_or_else(|| ModelError::UnknownAttribute(name.to_string()))?;

        if attribute.is_computed() {
            trace!(model = %self.model(), attribute = name, "discarding write to computed attribute");
            return Ok(());
        }

        let value = value.into();
        trace!(model = %self.model(), attribute = name, "setting attribute");
        self.inner.attributes.0.lock().set(name, value);
        self.inner.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Whether the instance has unsaved attribute writes.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Persist the instance.
    ///
    /// The core has no persistence collaborator wired in, so this clears
    /// the dirty flag and resolves with the instance's own attribute bag
    /// handle (identity, not a copy). It never fails in the core.
    pub async fn save(&self) -> Result<Attributes> {
        self.inner.dirty.store(false, Ordering::SeqCst);
        trace!(model = %self.model(), id = %self.id(), "saved instance");
        Ok(self.attributes())
    }

    /// Invoke a declared instance method.
    pub fn call(&self, name: &str, args: &[AttrValue]) -> Result<AttrValue> {
        let method = self
            .inner
            .schema
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownMethod(name.to_string()))?;
        Ok(method(self, args))
    }

    /// The nested store provisioned by a `has_many` relation.
    pub fn related(&self, name: &str) -> Option<Store> {
        match self.inner.relations.lock().get(name) {
            Some(RelationSlot::HasMany(store)) => Some(store.clone()),
            _ => None,
        }
    }

    /// The current value of a `belongs_to` slot, if the slot exists and is set.
    pub fn reference(&self, name: &str) -> Option<ModelInstance> {
        match self.inner.relations.lock().get(name) {
            Some(RelationSlot::BelongsTo(target)) => target.clone(),
            _ => None,
        }
    }

    /// Write a `belongs_to` slot.
    pub fn set_reference(&self, name: &str, target: Option<ModelInstance>) -> Result<()> {
        match self.inner.relations.lock().get_mut(name) {
            Some(RelationSlot::BelongsTo(slot)) => {
                *slot = target;
                Ok(())
            }
            _ => Err(ModelError::UnknownRelation(name.to_string())),
        }
    }
}

impl fmt::Debug for ModelInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelInstance")
            .field("model", &self.model())
            .field("id", &self.inner.id)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn user_description() -> ModelDescription {
        ModelDescription::new()
            .attribute("first_name", Attribute::text())
            .attribute("last_name", Attribute::text())
            .attribute("coins", Attribute::number())
            .attribute(
                "full_name",
                Attribute::computed(|bag| {
                    AttrValue::from(format!(
                        "{} {}",
                        bag.text("first_name"),
                        bag.text("last_name")
                    ))
                }),
            )
            .method("say", |instance, args| {
                let full_name = instance.get("full_name").unwrap();
                let message = args.first().and_then(AttrValue::as_text).unwrap_or("");
                AttrValue::from(format!("{}: {}", full_name.as_text().unwrap(), message))
            })
    }

    fn user_class() -> ModelClass {
        Registry::new().declare("User", user_description()).unwrap()
    }

    #[test]
    fn build_with_values_overrides_defaults() {
        let user = user_class().build_with([("first_name", "Tyrion"), ("last_name", "Lannister")]);

        assert_eq!(user.get("first_name"), Some(AttrValue::from("Tyrion")));
        assert_eq!(user.get("last_name"), Some(AttrValue::from("Lannister")));
        assert_eq!(user.get("coins"), Some(AttrValue::Number(0.0)));
    }

    #[test]
    fn build_without_values_uses_defaults() {
        let user = user_class().build();

        assert_eq!(user.get("first_name"), Some(AttrValue::from("")));
        assert_eq!(user.get("last_name"), Some(AttrValue::from("")));
        assert_eq!(user.get("full_name"), Some(AttrValue::from(" ")));
    }

    #[test]
    fn build_ignores_undeclared_names() {
        let user = user_class().build_with([("nickname", "Imp")]);
        assert_eq!(user.get("nickname"), None);
        assert!(!user.attributes().snapshot().contains("nickname"));
    }

    #[test]
    fn computed_attribute_reflects_current_siblings() {
        let user = user_class().build_with([("first_name", "Tyrion"), ("last_name", "Lannister")]);
        assert_eq!(user.get("full_name"), Some(AttrValue::from("Tyrion Lannister")));

        user.set("first_name", "Cersei").unwrap();
        assert_eq!(user.get("full_name"), Some(AttrValue::from("Cersei Lannister")));
    }

    #[test]
    fn fresh_instance_is_clean() {
        let user = user_class().build();
        assert!(!user.is_dirty());
    }

    #[test]
    fn any_write_marks_dirty_even_with_equal_value() {
        let user = user_class().build_with([("first_name", "Tyrion")]);
        assert!(!user.is_dirty());

        user.set("first_name", "Tyrion").unwrap();
        assert!(user.is_dirty());
    }

    #[test]
    fn write_to_computed_attribute_is_discarded() {
        let user = user_class().build_with([("first_name", "Tyrion"), ("last_name", "Lannister")]);

        user.set("full_name", "Somebody Else").unwrap();

        assert!(!user.is_dirty());
        assert_eq!(user.get("full_name"), Some(AttrValue::from("Tyrion Lannister")));
    }

    #[test]
    fn write_to_unknown_attribute_is_an_error() {
        let user = user_class().build();
        match user.set("nickname", "Imp") {
            Err(ModelError::UnknownAttribute(name)) => assert_eq!(name, "nickname"),
            other => panic!("expected UnknownAttribute, got {other:?}"),
        }
        assert!(!user.is_dirty());
    }

    #[tokio::test]
    async fn save_clears_dirty_and_resolves_with_the_bag_itself() {
        let user = user_class().build_with([("first_name", "Tyrion")]);
        user.set("coins", 10i64).unwrap();
        assert!(user.is_dirty());

        let saved = user.save().await.unwrap();

        assert!(!user.is_dirty());
        assert!(Attributes::ptr_eq(&saved, &user.attributes()));
        assert_eq!(saved.get("coins"), Some(AttrValue::Number(10.0)));
    }

    #[test]
    fn instance_method_runs_with_instance_context() {
        let user = user_class().build_with([("first_name", "Tyrion"), ("last_name", "Lannister")]);

        let result = user
            .call("say", &[AttrValue::from("I drink and I know things")])
            .unwrap();
        assert_eq!(
            result,
            AttrValue::from("Tyrion Lannister: I drink and I know things")
        );
    }

    #[test]
    fn unknown_method_is_an_error() {
        let user = user_class().build();
        assert!(matches!(
            user.call("shout", &[]),
            Err(ModelError::UnknownMethod(_))
        ));
    }

    #[test]
    fn has_many_relation_provisions_scoped_store() {
        let registry = Registry::new();
        let post = registry
            .declare(
                "Post",
                ModelDescription::new().attribute("title", Attribute::text()),
            )
            .unwrap();
        let user = registry
            .declare(
                "User",
                ModelDescription::new()
                    .attribute("name", Attribute::text())
                    .relation(Relation::has_many("posts").with_model("Post")),
            )
            .unwrap();

        let author = user.build();
        let posts = author.related("posts").unwrap();
        assert_eq!(posts.model(), "Post");
        assert!(posts.is_empty());

        // the nested store applies the same model filter
        posts.push(post.build());
        posts.push(user.build());
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn belongs_to_relation_starts_empty_and_is_writable() {
        let registry = Registry::new();
        let user = registry
            .declare(
                "User",
                ModelDescription::new()
                    .attribute("name", Attribute::text())
                    .relation(Relation::belongs_to("boss").with_model("User")),
            )
            .unwrap();

        let employee = user.build();
        let boss = user.build();
        assert!(employee.reference("boss").is_none());

        employee.set_reference("boss", Some(boss.clone())).unwrap();
        assert_eq!(employee.reference("boss").unwrap().id(), boss.id());

        employee.set_reference("boss", None).unwrap();
        assert!(employee.reference("boss").is_none());
    }

    #[test]
    fn set_reference_on_missing_slot_is_an_error() {
        let user = user_class().build();
        assert!(matches!(
            user.set_reference("boss", None),
            Err(ModelError::UnknownRelation(_))
        ));
    }

    #[test]
    fn build_registers_into_class_store() {
        let class = user_class();
        assert!(class.store().is_empty());

        let instance = class.build();
        assert_eq!(class.store().len(), 1);
        assert_eq!(class.store().items()[0].id(), instance.id());
    }

    #[test]
    fn resource_path_is_exposed() {
        let registry = Registry::new();
        let class = registry
            .declare("Widget", ModelDescription::new().resource_path("/widgets"))
            .unwrap();
        assert_eq!(class.resource_path(), Some("/widgets"));
    }
}
