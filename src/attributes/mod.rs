//! # Attribute System
//!
//! This module provides the schema and runtime representation of model
//! attributes. Instead of each model hand-rolling its fields, a model is
//! declared from a map of named [`Attribute`] descriptors, and instances
//! carry their current values in an [`AttributeBag`].
//!
//! - **Descriptors** ([`spec`]): immutable specifications: what kind of
//!   value an attribute holds, its default, an optional computed getter and
//!   a validator hook.
//! - **Values** ([`value`]): the runtime value enum [`AttrValue`] and the
//!   per-instance [`AttributeBag`].
//!
//! ## Attribute kinds
//!
//! | Kind | Default | Description |
//! |------|---------|-------------|
//! | `Text` | `""` | UTF-8 string value |
//! | `Number` | `0` | 64-bit float value |
//! | `Computed` | — | Derived from sibling attributes, read-only |
//! | `Custom` | `Null` | Caller-defined default and validator |
//!
//! ## Usage
//!
//! ```
//! use modelsync::{Attribute, AttrValue};
//!
//! let first_name = Attribute::text();
//! let age = Attribute::number();
//! let full_name = Attribute::computed(|bag| {
//!     AttrValue::from(format!("{} {}", bag.text("first_name"), bag.text("last_name")))
//! });
//! ```

pub mod spec;
pub mod value;

pub use spec::{Attribute, AttributeKind, ComputedFn, ValidatorFn};
pub use value::{AttrValue, AttributeBag};
