//! Relation declarations.
//!
//! Relations are declared on a model description and provision a slot on
//! every built instance: `has_many` gets a nested [`Store`](crate::Store)
//! scoped to the related model, `belongs_to` gets a writable nullable
//! reference. Population and traversal are deliberately out of scope; the
//! slots exist for later business logic to fill.

/// Cardinality of a declared relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Single nullable reference to an instance of the related model
    BelongsTo,

    /// Nested store of instances of the related model
    HasMany,
}

/// Immutable declaration of one relation on a model.
///
/// The related model name defaults to the relation name; override it with
/// [`with_model`](Self::with_model) when they differ (e.g. a `friends`
/// relation over the `User` model).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    kind: RelationKind,
    name: String,
    model: String,
}

impl Relation {
    /// Declare a single nullable reference slot.
    pub fn belongs_to(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: RelationKind::BelongsTo,
            model: name.clone(),
            name,
        }
    }

    /// Declare a nested store of related instances.
    pub fn has_many(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: RelationKind::HasMany,
            model: name.clone(),
            name,
        }
    }

    /// Override the related model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
