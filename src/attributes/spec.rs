//! Attribute descriptors.
//!
//! An [`Attribute`] is the immutable specification of one model field: what
//! kind of value it holds, its default, an optional computed getter and a
//! validator hook. Descriptors are created once at model-declaration time
//! and never mutated afterwards: all fields are private and only readable
//! through accessors, so frozen-object semantics hold by construction.

use std::fmt;
use std::sync::Arc;

use super::value::{AttrValue, AttributeBag};

/// Getter for computed attributes. Receives the instance's attribute bag so
/// it can reference sibling attributes by name.
pub type ComputedFn = Arc<dyn Fn(&AttributeBag) -> AttrValue + Send + Sync>;

/// Validation hook. The core never enforces it; it is a placeholder for an
/// external validation collaborator.
pub type ValidatorFn = Arc<dyn Fn(&AttrValue) -> bool + Send + Sync>;

/// The kind of value an attribute holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// UTF-8 string, defaults to `""`
    Text,

    /// 64-bit float, defaults to `0`
    Number,

    /// Derived from sibling attributes at read time; writes are discarded
    Computed,

    /// Caller-defined default and validator
    Custom,
}

/// Immutable specification for a single model attribute.
///
/// Construct via the presets ([`text`](Self::text), [`number`](Self::number),
/// [`computed`](Self::computed)) or [`new`](Self::new), then refine with the
/// chaining builders. Construction cannot fail.
#[derive(Clone)]
pub struct Attribute {
    kind: AttributeKind,
    default_value: AttrValue,
    getter: Option<ComputedFn>,
    validator: ValidatorFn,
}

impl Attribute {
    /// Create an attribute of the given kind with a `Null` default and an
    /// always-true validator.
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            default_value: AttrValue::Null,
            getter: None,
            validator: Arc::new(|_| true),
        }
    }

    /// Text attribute, default `""`.
    pub fn text() -> Self {
        Self::new(AttributeKind::Text).with_default("")
    }

    /// Number attribute, default `0`.
    pub fn number() -> Self {
        Self::new(AttributeKind::Number).with_default(0i64)
    }

    /// Computed attribute backed by `getter`.
    ///
    /// The getter is evaluated against the instance's current attribute bag
    /// on every read and never cached. Writes to a computed
    /// attribute are silently discarded.
    pub fn computed<F>(getter: F) -> Self
    where
        F: Fn(&AttributeBag) -> AttrValue + Send + Sync + 'static,
    {
        let mut attribute = Self::new(AttributeKind::Computed);
        attribute.getter = Some(Arc::new(getter));
        attribute
    }

    /// Set the default value.
    pub fn with_default(mut self, value: impl Into<AttrValue>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Set the validator hook.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&AttrValue) -> bool + Send + Sync + 'static,
    {
        self.validator = Arc::new(validator);
        self
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn default_value(&self) -> &AttrValue {
        &self.default_value
    }

    pub fn getter(&self) -> Option<&ComputedFn> {
        self.getter.as_ref()
    }

    /// Whether reads go through a getter instead of the attribute bag.
    pub fn is_computed(&self) -> bool {
        self.getter.is_some()
    }

    /// Run the validator hook against a candidate value.
    pub fn validate(&self, value: &AttrValue) -> bool {
        (self.validator)(value)
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("kind", &self.kind)
            .field("default_value", &self.default_value)
            .field("computed", &self.is_computed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_preset_defaults_to_empty_string() {
        let attribute = Attribute::text();
        assert_eq!(attribute.kind(), AttributeKind::Text);
        assert_eq!(attribute.default_value(), &AttrValue::Text(String::new()));
        assert!(!attribute.is_computed());
    }

    #[test]
    fn number_preset_defaults_to_zero() {
        let attribute = Attribute::number();
        assert_eq!(attribute.kind(), AttributeKind::Number);
        assert_eq!(attribute.default_value(), &AttrValue::Number(0.0));
    }

    #[test]
    fn bare_attribute_has_null_default_and_passing_validator() {
        let attribute = Attribute::new(AttributeKind::Custom);
        assert_eq!(attribute.default_value(), &AttrValue::Null);
        assert!(attribute.validate(&AttrValue::from("anything")));
    }

    #[test]
    fn computed_carries_a_getter() {
        let attribute = Attribute::computed(|bag| {
            AttrValue::from(format!("{} {}", bag.text("first_name"), bag.text("last_name")))
        });
        assert_eq!(attribute.kind(), AttributeKind::Computed);
        assert!(attribute.is_computed());

        let bag: AttributeBag = [("first_name", "Tyrion"), ("last_name", "Lannister")]
            .into_iter()
            .collect();
        let getter = attribute.getter().unwrap();
        assert_eq!(getter(&bag), AttrValue::from("Tyrion Lannister"));
    }

    #[test]
    fn with_default_overrides_preset() {
        let attribute = Attribute::text().with_default("n/a");
        assert_eq!(attribute.default_value(), &AttrValue::from("n/a"));
    }

    #[test]
    fn with_validator_is_consulted_by_validate() {
        let attribute =
            Attribute::number().with_validator(|v| v.as_number().is_some_and(|n| n >= 0.0));
        assert!(attribute.validate(&AttrValue::from(1.0)));
        assert!(!attribute.validate(&AttrValue::from(-1.0)));
        assert!(!attribute.validate(&AttrValue::from("text")));
    }
}
