//! Required rule
//!
//! Newly required fields break existing objects that omit them. Dropping a
//! requirement is always allowed.

use std::collections::BTreeSet;

use crate::diff::{is_handled, PropertyDiff};
use crate::error::{Incompatibility, LiteralList};
use crate::property::Property;

use super::{Enforcement, PropertyRule, Verdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiredRule {
    pub new_enforcement: Enforcement,
}

impl RequiredRule {
    pub fn new(new_enforcement: Enforcement) -> Self {
        Self { new_enforcement }
    }
}

impl PropertyRule for RequiredRule {
    fn name(&self) -> &'static str {
        "Required"
    }

    fn validate(&self, diff: &PropertyDiff) -> Verdict {
        let old: BTreeSet<&str> = diff.old().required.iter().map(String::as_str).collect();
        let added: Vec<&str> = diff
            .new()
            .required
            .iter()
            .map(String::as_str)
            .filter(|name| !old.contains(name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let error = (!added.is_empty() && self.new_enforcement.is_strict())
            .then(|| Incompatibility::RequiredAdded(added.into_iter().collect()));

        if let Some(err) = &error {
            tracing::debug!(rule = self.name(), %err, "incompatible required change");
        }

        Verdict::new(is_handled(diff, reset), error)
    }
}

fn reset(property: &mut Property) {
    property.required.clear();
}
