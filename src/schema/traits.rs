//! The validator trait shared by field rules and combinators.

use serde_json::Value;
use stillwater::Validation;

use crate::error::Violations;
use crate::path::JsonPath;

/// Something that checks a single JSON value and accumulates violations.
///
/// Compiled field rules implement this, and combinators (`anyOf`, `oneOf`,
/// `allOf`, `not`) hold their operands as `Arc<dyn ValueValidator>`, so a
/// rule tree of any depth can be evaluated uniformly.
///
/// The `Send + Sync` bounds let one compiled validator be shared by every
/// worker of a parallel batch.
pub trait ValueValidator: Send + Sync {
    /// Validates `value`, reporting violations at `path`.
    ///
    /// Implementations must not stop at the first failed rule.
    fn validate_value(&self, value: &Value, path: &JsonPath) -> Validation<(), Violations>;

    /// Convenience check that discards the violations.
    fn accepts(&self, value: &Value) -> bool {
        self.validate_value(value, &JsonPath::root()).is_success()
    }
}
