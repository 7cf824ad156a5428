//! Compatibility rules for property diffs
//!
//! Every rule inspects one sub-field of a [`PropertyDiff`] and returns a
//! [`Verdict`]:
//!
//! - `handled`: the rule's sub-field is the only thing that differs (or
//!   nothing differs), so its judgment explains the whole change.
//! - `error`: the change to the sub-field is incompatible.
//!
//! Rules are pure: the same diff and configuration always give the same
//! verdict, and a rule instance can be shared freely across threads.

pub mod bounds;
pub mod default;
pub mod enums;
pub mod kind;
pub mod required;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diff::PropertyDiff;
use crate::error::Incompatibility;

pub use bounds::{Bound, BoundRule};
pub use default::DefaultRule;
pub use enums::EnumRule;
pub use kind::TypeRule;
pub use required::RequiredRule;

/// A single compatibility check over one field's old/new definition
pub trait PropertyRule: fmt::Debug + Send + Sync {
    /// Stable identifier used in diagnostics and configuration
    fn name(&self) -> &'static str;

    /// Judge the change described by `diff`
    fn validate(&self, diff: &PropertyDiff) -> Verdict;
}

/// Outcome of running one rule against one diff
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Verdict {
    pub handled: bool,
    pub error: Option<Incompatibility>,
}

impl Verdict {
    pub fn new(handled: bool, error: Option<Incompatibility>) -> Self {
        Self { handled, error }
    }

    pub fn is_compatible(&self) -> bool {
        self.error.is_none()
    }

    /// `Ok(handled)` when compatible, otherwise the incompatibility
    pub fn into_result(self) -> Result<bool, Incompatibility> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.handled),
        }
    }
}

/// How strictly a rule treats values added to a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdditionEnforcement {
    /// Allow any addition
    None,
    /// Allow additions only to an already constrained set
    #[default]
    IfPreviouslyConstrained,
    /// Reject any addition
    Strict,
}

/// How strictly a rule treats values removed from a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemovalEnforcement {
    None,
    #[default]
    Strict,
}

/// On/off enforcement for rules with a single category of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Enforcement {
    None,
    #[default]
    Strict,
}

impl Enforcement {
    pub fn is_strict(self) -> bool {
        self == Enforcement::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::property::Property;
    use std::collections::HashSet;

    fn default_rules() -> Vec<Box<dyn PropertyRule>> {
        ValidationConfig::default().rules().unwrap()
    }

    #[test]
    fn test_rule_names_are_unique() {
        let rules = default_rules();
        let names: HashSet<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names.len(), rules.len());
        assert_eq!(rules[0].name(), "Default");
        assert_eq!(rules[1].name(), "Enum");
    }

    #[test]
    fn test_identical_properties_handled_by_every_rule() {
        let property = Property::from_json(
            r#"{"type": "string", "enum": ["a"], "default": "a", "maxLength": 3}"#,
        )
        .unwrap();
        let diff = PropertyDiff::between(property.clone(), property);

        for rule in default_rules() {
            assert_eq!(rule.validate(&diff), Verdict::new(true, None), "{}", rule.name());
        }
    }

    #[test]
    fn test_unrelated_change_handled_by_no_rule() {
        let old = Property::from_json(r#"{"id": "foo", "enum": ["a"]}"#).unwrap();
        let new = Property::from_json(r#"{"id": "bar", "enum": ["a"]}"#).unwrap();
        let diff = PropertyDiff::between(old, new);

        for rule in default_rules() {
            assert_eq!(rule.validate(&diff), Verdict::default(), "{}", rule.name());
        }
    }

    #[test]
    fn test_verdict_into_result() {
        let compatible = Verdict::new(true, None);
        assert!(compatible.is_compatible());
        assert_eq!(compatible.into_result(), Ok(true));

        let err = Incompatibility::DefaultRemoved { old: "1".to_string() };
        let verdict = Verdict::new(true, Some(err.clone()));
        assert!(!verdict.is_compatible());
        assert_eq!(verdict.into_result(), Err(err));
    }
}
