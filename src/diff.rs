//! Old/new pairs of a single property and handled-detection
//!
//! A rule is responsible for one or more sub-fields of a property. To know
//! whether its verdict accounts for the whole change, it resets those
//! sub-fields on copies of both sides and checks what is left:
//!
//! ```text
//! old { type: string, enum: [a] }      new { type: string, enum: [a b] }
//!            |  reset enum                       |  reset enum
//! old' { type: string }            ==    new' { type: string }   => handled
//! ```

use crate::property::Property;

/// The old and new definition of the same field across two schema versions
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDiff {
    old: Property,
    new: Property,
}

impl PropertyDiff {
    /// Pair two snapshots of the same field.
    ///
    /// No validation happens here; the caller guarantees both sides
    /// describe the same logical field.
    pub fn between(old: Property, new: Property) -> Self {
        Self { old, new }
    }

    pub fn old(&self) -> &Property {
        &self.old
    }

    #[allow(clippy::new_ret_no_self)]
    pub fn new(&self) -> &Property {
        &self.new
    }

    /// Whether both sides are structurally identical
    pub fn is_unchanged(&self) -> bool {
        self.old == self.new
    }

    /// Build the counterfactual diff with `reset` applied to copies of both sides
    pub fn reset<F>(&self, reset: F) -> PropertyDiff
    where
        F: Fn(&mut Property),
    {
        let mut old = self.old.clone();
        let mut new = self.new.clone();
        reset(&mut old);
        reset(&mut new);
        PropertyDiff::between(old, new)
    }
}

/// Whether nothing but the sub-fields cleared by `reset` differs in `diff`
pub fn is_handled<F>(diff: &PropertyDiff, reset: F) -> bool
where
    F: Fn(&mut Property),
{
    let handled = diff.reset(reset).is_unchanged();
    tracing::trace!(handled, "compared reset properties");
    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::JsonLiteral;

    fn with_default(id: &str, default: Option<&str>) -> Property {
        Property {
            id: id.to_string(),
            default: default.map(JsonLiteral::from),
            ..Default::default()
        }
    }

    fn reset_default(property: &mut Property) {
        property.default = None;
    }

    #[test]
    fn test_only_reset_field_changed_is_handled() {
        let diff = PropertyDiff::between(
            with_default("a", Some("\"foo\"")),
            with_default("a", Some("\"bar\"")),
        );
        assert!(!diff.is_unchanged());
        assert!(is_handled(&diff, reset_default));
    }

    #[test]
    fn test_other_field_changed_is_not_handled() {
        let diff = PropertyDiff::between(
            with_default("a", Some("\"foo\"")),
            with_default("b", Some("\"foo\"")),
        );
        assert!(!is_handled(&diff, reset_default));
    }

    #[test]
    fn test_reset_leaves_original_untouched() {
        let diff = PropertyDiff::between(with_default("a", Some("1")), with_default("a", Some("2")));
        let counterfactual = diff.reset(reset_default);

        assert_eq!(counterfactual.old().default, None);
        assert_eq!(counterfactual.new().default, None);
        assert_eq!(diff.old().default, Some(JsonLiteral::from("1")));
        assert_eq!(diff.new().default, Some(JsonLiteral::from("2")));
    }

    #[test]
    fn test_handled_check_emits_trace_event() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing::{Event, Level, Subscriber};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        struct CountTrace(Arc<AtomicUsize>);

        impl<S: Subscriber> Layer<S> for CountTrace {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                if *event.metadata().level() == Level::TRACE {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountTrace(count.clone()));
        let diff = PropertyDiff::between(
            with_default("a", Some("\"foo\"")),
            with_default("a", Some("\"bar\"")),
        );

        let handled = tracing::subscriber::with_default(subscriber, || {
            is_handled(&diff, reset_default)
        });
        assert!(handled);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unchanged_is_handled() {
        let property = with_default("a", None);
        let diff = PropertyDiff::between(property.clone(), property);
        assert!(diff.is_unchanged());
        assert!(is_handled(&diff, reset_default));
    }
}
