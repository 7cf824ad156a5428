//! Type rule: a field's `type` may not change

use crate::diff::{is_handled, PropertyDiff};
use crate::error::Incompatibility;
use crate::property::Property;

use super::{PropertyRule, Verdict};

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeRule;

impl PropertyRule for TypeRule {
    fn name(&self) -> &'static str {
        "Type"
    }

    fn validate(&self, diff: &PropertyDiff) -> Verdict {
        let (old, new) = (&diff.old().kind, &diff.new().kind);

        let error = (old != new).then(|| Incompatibility::TypeChanged {
            old: old.clone(),
            new: new.clone(),
        });

        if let Some(err) = &error {
            tracing::debug!(rule = self.name(), %err, "incompatible type change");
        }

        Verdict::new(is_handled(diff, reset), error)
    }
}

fn reset(property: &mut Property) {
    property.kind.clear();
}
