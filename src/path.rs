//! Document paths for attributing violations to record columns.
//!
//! Records are flat, so in practice a path is either the root (a
//! record-level rule) or a single column name. Nested segments still appear
//! when a combinator reports on the value it wraps.

use std::fmt::{self, Display};

/// Placeholder column used when a violation is not tied to any field.
pub const UNKNOWN_COLUMN: &str = "Unknown Column";

/// A path from the record root to the value a rule failed on.
///
/// # Example
///
/// ```rust
/// use rowguard::JsonPath;
///
/// let path = JsonPath::root().push_field("LoanNumber");
/// assert_eq!(path.to_string(), "LoanNumber");
/// assert_eq!(path.column(), Some("LoanNumber"));
/// assert_eq!(JsonPath::root().column(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<String>,
}

impl JsonPath {
    /// Creates an empty path representing the record itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path naming a single column.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// The column a violation at this path belongs to: the first segment.
    pub fn column(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Like [`column`](Self::column), falling back to [`UNKNOWN_COLUMN`].
    pub fn column_or_unknown(&self) -> &str {
        self.column().unwrap_or(UNKNOWN_COLUMN)
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_empty() {
        let path = JsonPath::root();
        assert!(path.is_root());
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_column_is_first_segment() {
        let path = JsonPath::from_field("Balance").push_field("anyOf");
        assert_eq!(path.column(), Some("Balance"));
        assert_eq!(path.to_string(), "Balance.anyOf");
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_root_column_is_unknown() {
        assert_eq!(JsonPath::root().column_or_unknown(), UNKNOWN_COLUMN);
        assert_eq!(
            JsonPath::from_field("Rate").column_or_unknown(),
            "Rate"
        );
    }

    #[test]
    fn test_path_immutability() {
        let base = JsonPath::from_field("Property");
        let a = base.push_field("a");
        let b = base.push_field("b");

        assert_eq!(base.to_string(), "Property");
        assert_eq!(a.to_string(), "Property.a");
        assert_eq!(b.to_string(), "Property.b");
    }

    #[test]
    fn test_segments_iterator() {
        let path = JsonPath::root().push_field("a").push_field("b");
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments, vec!["a", "b"]);
    }
}
