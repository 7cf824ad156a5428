//! Default-value rule
//!
//! Any change to a field's default is incompatible: clients that relied on
//! the old default would silently observe a different value. Defaults are
//! compared byte for byte, so `1` and `1.0` count as different.

use crate::diff::{is_handled, PropertyDiff};
use crate::error::Incompatibility;
use crate::property::Property;

use super::{PropertyRule, Verdict};

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRule;

impl PropertyRule for DefaultRule {
    fn name(&self) -> &'static str {
        "Default"
    }

    fn validate(&self, diff: &PropertyDiff) -> Verdict {
        let error = match (&diff.old().default, &diff.new().default) {
            (None, Some(new)) => Some(Incompatibility::DefaultAdded {
                new: new.to_string(),
            }),
            (Some(old), None) => Some(Incompatibility::DefaultRemoved {
                old: old.to_string(),
            }),
            (Some(old), Some(new)) if old.as_bytes() != new.as_bytes() => {
                Some(Incompatibility::DefaultChanged {
                    old: old.to_string(),
                    new: new.to_string(),
                })
            }
            _ => None,
        };

        if let Some(err) = &error {
            tracing::debug!(rule = self.name(), %err, "incompatible default change");
        }

        Verdict::new(is_handled(diff, reset), error)
    }
}

fn reset(property: &mut Property) {
    property.default = None;
}
