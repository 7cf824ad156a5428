//! Enum-constraint rule
//!
//! Treats the `enum` facet as a set of allowed literals. Introducing an enum
//! where there was none restricts every previously valid value, so it is
//! rejected unless additions are explicitly allowed. Adding values to an
//! existing enum is allowed by default; removing values is rejected by
//! default.

use std::collections::BTreeSet;

use crate::diff::{is_handled, PropertyDiff};
use crate::error::{Incompatibility, LiteralList};
use crate::property::{EnumValues, Property};

use super::{AdditionEnforcement, PropertyRule, RemovalEnforcement, Verdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumRule {
    pub addition_enforcement: AdditionEnforcement,
    pub removal_enforcement: RemovalEnforcement,
}

impl EnumRule {
    pub fn new(
        addition_enforcement: AdditionEnforcement,
        removal_enforcement: RemovalEnforcement,
    ) -> Self {
        Self {
            addition_enforcement,
            removal_enforcement,
        }
    }

    fn check(&self, old: &EnumValues, new: &EnumValues) -> Vec<Incompatibility> {
        let old_set = old.to_set();
        let new_set = new.to_set();
        let added: BTreeSet<_> = new_set.difference(&old_set).copied().collect();
        let removed: BTreeSet<_> = old_set.difference(&new_set).copied().collect();

        let mut errors = Vec::new();

        if !added.is_empty() {
            let added = LiteralList::from_literals(added);
            if old_set.is_empty() {
                // Any enforcement other than None rejects a brand new constraint
                if self.addition_enforcement != AdditionEnforcement::None {
                    errors.push(Incompatibility::EnumConstraintAdded(added));
                }
            } else if self.addition_enforcement == AdditionEnforcement::Strict {
                errors.push(Incompatibility::EnumValuesAdded(added));
            }
        }

        if !removed.is_empty() && self.removal_enforcement == RemovalEnforcement::Strict {
            errors.push(Incompatibility::EnumValuesRemoved(
                LiteralList::from_literals(removed),
            ));
        }

        errors
    }
}

impl PropertyRule for EnumRule {
    fn name(&self) -> &'static str {
        "Enum"
    }

    fn validate(&self, diff: &PropertyDiff) -> Verdict {
        let errors = self.check(&diff.old().enum_values, &diff.new().enum_values);
        let error = Incompatibility::combine(errors);

        if let Some(err) = &error {
            tracing::debug!(
                rule = self.name(),
                addition = ?self.addition_enforcement,
                removal = ?self.removal_enforcement,
                %err,
                "incompatible enum change"
            );
        }

        Verdict::new(is_handled(diff, reset), error)
    }
}

fn reset(property: &mut Property) {
    property.enum_values = EnumValues::default();
}
