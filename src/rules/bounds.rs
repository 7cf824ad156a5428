//! Numeric and size bound rules
//!
//! One rule type covers every bound facet. A bound is either an upper limit
//! (`maximum`, `maxLength`, `maxItems`, `maxProperties`) or a lower limit
//! (`minimum`, `minLength`, `minItems`, `minProperties`); tightening it can
//! reject values that used to be valid, loosening or dropping it cannot.

use std::cmp::Ordering;
use std::fmt;

use crate::diff::{is_handled, PropertyDiff};
use crate::error::Incompatibility;
use crate::property::Property;

use super::{Enforcement, PropertyRule, Verdict};

/// A bound facet of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Maximum,
    Minimum,
    MaxLength,
    MinLength,
    MaxItems,
    MinItems,
    MaxProperties,
    MinProperties,
}

impl Bound {
    pub const ALL: [Bound; 8] = [
        Bound::Maximum,
        Bound::Minimum,
        Bound::MaxLength,
        Bound::MinLength,
        Bound::MaxItems,
        Bound::MinItems,
        Bound::MaxProperties,
        Bound::MinProperties,
    ];

    /// Rule name
    pub fn name(self) -> &'static str {
        match self {
            Bound::Maximum => "Maximum",
            Bound::Minimum => "Minimum",
            Bound::MaxLength => "MaxLength",
            Bound::MinLength => "MinLength",
            Bound::MaxItems => "MaxItems",
            Bound::MinItems => "MinItems",
            Bound::MaxProperties => "MaxProperties",
            Bound::MinProperties => "MinProperties",
        }
    }

    /// Schema keyword
    pub fn field(self) -> &'static str {
        match self {
            Bound::Maximum => "maximum",
            Bound::Minimum => "minimum",
            Bound::MaxLength => "maxLength",
            Bound::MinLength => "minLength",
            Bound::MaxItems => "maxItems",
            Bound::MinItems => "minItems",
            Bound::MaxProperties => "maxProperties",
            Bound::MinProperties => "minProperties",
        }
    }

    pub fn is_upper(self) -> bool {
        matches!(
            self,
            Bound::Maximum | Bound::MaxLength | Bound::MaxItems | Bound::MaxProperties
        )
    }

    fn limit(self, property: &Property) -> Option<Limit> {
        let count = |value: Option<i64>| value.map(Limit::Count);
        match self {
            Bound::Maximum => property.maximum.map(|value| Limit::Number {
                value,
                exclusive: property.exclusive_maximum,
            }),
            Bound::Minimum => property.minimum.map(|value| Limit::Number {
                value,
                exclusive: property.exclusive_minimum,
            }),
            Bound::MaxLength => count(property.max_length),
            Bound::MinLength => count(property.min_length),
            Bound::MaxItems => count(property.max_items),
            Bound::MinItems => count(property.min_items),
            Bound::MaxProperties => count(property.max_properties),
            Bound::MinProperties => count(property.min_properties),
        }
    }

    fn reset(self, property: &mut Property) {
        match self {
            Bound::Maximum => {
                property.maximum = None;
                property.exclusive_maximum = false;
            }
            Bound::Minimum => {
                property.minimum = None;
                property.exclusive_minimum = false;
            }
            Bound::MaxLength => property.max_length = None,
            Bound::MinLength => property.min_length = None,
            Bound::MaxItems => property.max_items = None,
            Bound::MinItems => property.min_items = None,
            Bound::MaxProperties => property.max_properties = None,
            Bound::MinProperties => property.min_properties = None,
        }
    }

    /// Whether moving from `old` to `new` rejects previously valid values
    fn is_tighter(self, old: Limit, new: Limit) -> bool {
        let narrower = if self.is_upper() {
            Ordering::Less
        } else {
            Ordering::Greater
        };
        match new.compare(&old) {
            Some(ordering) if ordering == narrower => true,
            Some(Ordering::Equal) => new.is_exclusive() && !old.is_exclusive(),
            _ => false,
        }
    }
}

/// The value of a bound on one side of a diff.
///
/// Counts stay integers so limits above 2^53 still compare exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Limit {
    Number { value: f64, exclusive: bool },
    Count(i64),
}

impl Limit {
    fn compare(&self, other: &Limit) -> Option<Ordering> {
        match (self, other) {
            (Limit::Count(a), Limit::Count(b)) => Some(a.cmp(b)),
            (Limit::Number { value: a, .. }, Limit::Number { value: b, .. }) => a.partial_cmp(b),
            _ => None,
        }
    }

    fn is_exclusive(&self) -> bool {
        matches!(self, Limit::Number { exclusive: true, .. })
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Number {
                value,
                exclusive: true,
            } => write!(f, "{} (exclusive)", value),
            Limit::Number { value, .. } => write!(f, "{}", value),
            Limit::Count(count) => write!(f, "{}", count),
        }
    }
}

/// Compatibility rule for a single [`Bound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundRule {
    pub bound: Bound,
    pub addition_enforcement: Enforcement,
    pub tightening_enforcement: Enforcement,
}

impl BoundRule {
    pub fn new(bound: Bound) -> Self {
        Self {
            bound,
            addition_enforcement: Enforcement::Strict,
            tightening_enforcement: Enforcement::Strict,
        }
    }

    pub fn with_enforcement(mut self, addition: Enforcement, tightening: Enforcement) -> Self {
        self.addition_enforcement = addition;
        self.tightening_enforcement = tightening;
        self
    }
}

impl PropertyRule for BoundRule {
    fn name(&self) -> &'static str {
        self.bound.name()
    }

    fn validate(&self, diff: &PropertyDiff) -> Verdict {
        let old = self.bound.limit(diff.old());
        let new = self.bound.limit(diff.new());

        let error = match (old, new) {
            (None, Some(new)) if self.addition_enforcement.is_strict() => {
                Some(Incompatibility::BoundAdded {
                    bound: self.bound.field(),
                    new: new.to_string(),
                })
            }
            (Some(old), Some(new))
                if self.tightening_enforcement.is_strict() && self.bound.is_tighter(old, new) =>
            {
                Some(Incompatibility::BoundTightened {
                    bound: self.bound.field(),
                    old: old.to_string(),
                    new: new.to_string(),
                })
            }
            _ => None,
        };

        if let Some(err) = &error {
            tracing::debug!(rule = self.name(), %err, "incompatible bound change");
        }

        Verdict::new(is_handled(diff, |p| self.bound.reset(p)), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_length(value: Option<i64>) -> Property {
        Property {
            kind: "string".to_string(),
            max_length: value,
            ..Default::default()
        }
    }

    fn minimum(value: Option<f64>, exclusive: bool) -> Property {
        Property {
            kind: "number".to_string(),
            minimum: value,
            exclusive_minimum: exclusive,
            ..Default::default()
        }
    }

    fn validate(rule: BoundRule, old: Property, new: Property) -> Verdict {
        rule.validate(&PropertyDiff::between(old, new))
    }

    #[test]
    fn test_upper_bound_loosened() {
        let verdict = validate(
            BoundRule::new(Bound::MaxLength),
            max_length(Some(10)),
            max_length(Some(20)),
        );
        assert_eq!(verdict, Verdict::new(true, None));
    }

    #[test]
    fn test_upper_bound_tightened() {
        let verdict = validate(
            BoundRule::new(Bound::MaxLength),
            max_length(Some(20)),
            max_length(Some(10)),
        );
        assert!(verdict.handled);
        assert_eq!(
            verdict.error.unwrap().to_string(),
            "maxLength constraint tightened from 20 to 10"
        );
    }

    #[test]
    fn test_large_count_tightened_by_one() {
        let verdict = validate(
            BoundRule::new(Bound::MaxLength),
            max_length(Some(9_007_199_254_740_993)),
            max_length(Some(9_007_199_254_740_992)),
        );
        assert!(verdict.handled);
        assert_eq!(
            verdict.error.unwrap().to_string(),
            "maxLength constraint tightened from 9007199254740993 to 9007199254740992"
        );
    }

    #[test]
    fn test_bound_added() {
        let verdict = validate(
            BoundRule::new(Bound::MaxLength),
            max_length(None),
            max_length(Some(63)),
        );
        assert_eq!(
            verdict.error.unwrap().to_string(),
            "maxLength constraint 63 added when there was no constraint previously"
        );
    }

    #[test]
    fn test_bound_added_not_enforced() {
        let rule = BoundRule::new(Bound::MaxLength)
            .with_enforcement(Enforcement::None, Enforcement::Strict);
        let verdict = validate(rule, max_length(None), max_length(Some(63)));
        assert_eq!(verdict, Verdict::new(true, None));
    }

    #[test]
    fn test_bound_removed() {
        let verdict = validate(
            BoundRule::new(Bound::MaxLength),
            max_length(Some(63)),
            max_length(None),
        );
        assert_eq!(verdict, Verdict::new(true, None));
    }

    #[test]
    fn test_lower_bound_tightened() {
        let verdict = validate(
            BoundRule::new(Bound::Minimum),
            minimum(Some(0.5), false),
            minimum(Some(1.5), false),
        );
        assert_eq!(
            verdict.error.unwrap().to_string(),
            "minimum constraint tightened from 0.5 to 1.5"
        );
    }

    #[test]
    fn test_bound_made_exclusive() {
        let verdict = validate(
            BoundRule::new(Bound::Minimum),
            minimum(Some(0.0), false),
            minimum(Some(0.0), true),
        );
        assert!(verdict.handled);
        assert_eq!(
            verdict.error.unwrap().to_string(),
            "minimum constraint tightened from 0 to 0 (exclusive)"
        );
    }

    #[test]
    fn test_tightening_not_enforced() {
        let rule = BoundRule::new(Bound::Minimum)
            .with_enforcement(Enforcement::Strict, Enforcement::None);
        let verdict = validate(rule, minimum(Some(1.0), false), minimum(Some(2.0), false));
        assert_eq!(verdict, Verdict::new(true, None));
    }

    #[test]
    fn test_other_bound_changed_not_handled() {
        let old = max_length(Some(10));
        let new = Property {
            min_length: Some(1),
            ..max_length(Some(10))
        };
        let verdict = validate(BoundRule::new(Bound::MaxLength), old, new);
        assert_eq!(verdict, Verdict::default());
    }
}
