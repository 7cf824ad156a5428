//! Error types for property compatibility checking

use std::fmt;
use thiserror::Error;

use crate::property::JsonLiteral;

/// Result type for crate operations (configuration, parsing)
pub type Result<T> = std::result::Result<T, CompatError>;

/// Operational errors: anything that stops a check from running at all
#[derive(Error, Debug)]
pub enum CompatError {
    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),
}

/// An incompatible change detected by a rule.
///
/// Each variant names the sub-field and carries the old and new values
/// involved, so the message stands on its own in a report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Incompatibility {
    #[error("default value {new:?} added when there was no default previously")]
    DefaultAdded { new: String },

    #[error("default value {old:?} removed")]
    DefaultRemoved { old: String },

    #[error("default value changed from {old:?} to {new:?}")]
    DefaultChanged { old: String, new: String },

    #[error("enum constraints {0} added when there were no restrictions previously")]
    EnumConstraintAdded(LiteralList),

    #[error("enums {0} added to the set of allowed values")]
    EnumValuesAdded(LiteralList),

    #[error("enums {0} removed from the set of previously allowed values")]
    EnumValuesRemoved(LiteralList),

    #[error("type changed from {old:?} to {new:?}")]
    TypeChanged { old: String, new: String },

    #[error("new required fields {0} added")]
    RequiredAdded(LiteralList),

    #[error("{bound} constraint {new} added when there was no constraint previously")]
    BoundAdded { bound: &'static str, new: String },

    #[error("{bound} constraint tightened from {old} to {new}")]
    BoundTightened {
        bound: &'static str,
        old: String,
        new: String,
    },

    #[error("{}", join_lines(.0))]
    Multiple(Vec<Incompatibility>),
}

impl Incompatibility {
    /// Fold zero or more conditions into a single optional error.
    ///
    /// A single condition is returned as-is; several become `Multiple`.
    pub fn combine(mut errors: Vec<Incompatibility>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Incompatibility::Multiple(errors)),
        }
    }

    /// Iterate the individual conditions, flattening `Multiple`
    pub fn conditions(&self) -> Vec<&Incompatibility> {
        match self {
            Incompatibility::Multiple(inner) => inner.iter().flat_map(|e| e.conditions()).collect(),
            single => vec![single],
        }
    }
}

fn join_lines(errors: &[Incompatibility]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A list of literal values rendered as `[a b c]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralList(pub Vec<String>);

impl LiteralList {
    pub fn from_literals<'a>(literals: impl IntoIterator<Item = &'a JsonLiteral>) -> Self {
        Self(literals.into_iter().map(|l| l.to_string()).collect())
    }
}

impl fmt::Display for LiteralList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(" "))
    }
}

impl<S: Into<String>> FromIterator<S> for LiteralList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_list_display() {
        let list: LiteralList = ["foo", "bar"].into_iter().collect();
        assert_eq!(list.to_string(), "[foo bar]");
        assert_eq!(LiteralList(Vec::new()).to_string(), "[]");
    }

    #[test]
    fn test_default_messages_quote_values() {
        let err = Incompatibility::DefaultChanged {
            old: "foo".to_string(),
            new: "bar".to_string(),
        };
        assert_eq!(err.to_string(), r#"default value changed from "foo" to "bar""#);
    }

    #[test]
    fn test_combine() {
        assert_eq!(Incompatibility::combine(Vec::new()), None);

        let single = Incompatibility::DefaultRemoved { old: "foo".to_string() };
        assert_eq!(
            Incompatibility::combine(vec![single.clone()]),
            Some(single.clone())
        );

        let added = Incompatibility::EnumValuesAdded(["bar"].into_iter().collect());
        let combined = Incompatibility::combine(vec![single, added]).unwrap();
        let message = combined.to_string();
        assert_eq!(message.lines().count(), 2);
        assert!(message.contains(r#"default value "foo" removed"#));
        assert!(message.contains("enums [bar] added to the set of allowed values"));
        assert_eq!(combined.conditions().len(), 2);
    }
}
