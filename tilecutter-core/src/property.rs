//! Property value typing and the include/exclude filter applied during
//! ingest (spec §4.3).
use std::collections::HashSet;

/// On-disk type tag for a property value (meta record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PropType {
    String = 1,
    Number = 2,
    Boolean = 3,
}

impl PropType {
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            1 => Some(PropType::String),
            2 => Some(PropType::Number),
            3 => Some(PropType::Boolean),
            _ => None,
        }
    }
}

/// `exclude`/`include`/`exclude_all` property pass filter, matching the
/// `-x`/`-y`/`-X` CLI flags.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub exclude: HashSet<String>,
    pub include: HashSet<String>,
    pub exclude_all: bool,
}

impl PropertyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A property key passes if: `exclude_all` is false and the key is not
    /// in `exclude`; or `exclude_all` is true and the key is in `include`.
    pub fn passes(&self, key: &str) -> bool {
        if self.exclude_all {
            self.include.contains(key)
        } else {
            !self.exclude.contains(key)
        }
    }
}

#[test]
fn default_passes_everything() {
    let f = PropertyFilter::new();
    assert!(f.passes("anything"));
}

#[test]
fn exclude_blocks_named_key() {
    let mut f = PropertyFilter::new();
    f.exclude.insert("secret".into());
    assert!(!f.passes("secret"));
    assert!(f.passes("public"));
}

#[test]
fn exclude_all_only_admits_included() {
    let mut f = PropertyFilter::new();
    f.exclude_all = true;
    f.include.insert("name".into());
    assert!(f.passes("name"));
    assert!(!f.passes("other"));
}
