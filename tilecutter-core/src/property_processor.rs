use crate::error::Result;
use std::fmt;

/// Feature property value, as read from GeoJSON.
///
/// Values are kept in their textual form (even `Number`/`Boolean`) because
/// the meta file stores every property value as a length-prefixed string;
/// the discriminant preserves the original JSON kind for the vector-tile
/// encoder, which does distinguish numeric/boolean tags from string tags.
#[derive(PartialEq, Debug, Clone)]
pub enum PropertyValue {
    String(String),
    Number(String),
    Boolean(bool),
}

/// Feature property processing trait.
///
/// # Usage example:
///
/// ```rust
/// use tilecutter_core::{PropertyProcessor, PropertyValue, error::Result};
///
/// struct PropertyPrinter;
///
/// impl PropertyProcessor for PropertyPrinter {
///     fn property(&mut self, i: usize, n: &str, v: &PropertyValue) -> Result<bool> {
///         println!("columnidx: {} name: {} value: {:?}", i, n, v);
///         Ok(false) // don't abort
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait PropertyProcessor {
    /// Process property value. Abort processing, if return value is true.
    fn property(&mut self, idx: usize, name: &str, value: &PropertyValue) -> Result<bool> {
        Ok(false)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(v) => write!(f, "{v}"),
            PropertyValue::Number(v) => write!(f, "{v}"),
            PropertyValue::Boolean(v) => write!(f, "{v}"),
        }
    }
}

#[test]
fn display_values() {
    assert_eq!(PropertyValue::String("a".into()).to_string(), "a");
    assert_eq!(PropertyValue::Number("42".into()).to_string(), "42");
    assert_eq!(PropertyValue::Boolean(true).to_string(), "true");
}
