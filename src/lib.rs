//! Property Compatibility Rules
//!
//! Decides whether a change to a single field definition in a JSON-Schema
//! document is backward compatible.
//!
//! ## Features
//!
//! - **Per-field diffs**: [`PropertyDiff`] pairs the old and new definition of one field
//! - **Pluggable rules**: every [`PropertyRule`] judges one facet (default, enum, type, ...)
//! - **Handled detection**: rules report whether their facet explains the whole change,
//!   so a caller can flag changes no rule accounts for
//! - **Configurable enforcement**: [`ValidationConfig`] sets how strict each rule is
//!
//! ## Flow
//!
//! ```text
//! schema walker ──► PropertyDiff (one per field)
//!                        │
//!        ┌───────────────┼───────────────┐
//!        ▼               ▼               ▼
//!   DefaultRule      EnumRule   ...  BoundRule
//!        │               │               │
//!        └──────► Verdict { handled, error } ◄──┘
//! ```
//!
//! Walking a whole schema into diffs and aggregating verdicts across rules
//! are left to the caller.

pub mod config;
pub mod diff;
pub mod error;
pub mod property;
pub mod rules;

pub use config::ValidationConfig;
pub use diff::{is_handled, PropertyDiff};
pub use error::{CompatError, Incompatibility, Result};
pub use property::{
    EnumValues, ExternalDocumentation, JsonLiteral, Property, SchemaOrArray, SchemaOrBool,
    SchemaOrStringArray, ValidationRule,
};
pub use rules::{
    AdditionEnforcement, Bound, BoundRule, DefaultRule, Enforcement, EnumRule, PropertyRule,
    RemovalEnforcement, RequiredRule, TypeRule, Verdict,
};
