//! Attribute keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved category of the parent-pointer attribute. Its display name is
/// empty and its value is the integer id of the parent entity.
pub const PARENT_CATEGORY: &str = "__parent__";

/// Identity of an attribute: the ordered (category, display name) pair.
///
/// Property maps are keyed by this pair internally; the flattened
/// `"{category}_{display_name}"` form is produced only at the presentation
/// boundary by [`property_key`](AttrKey::property_key), so two attributes
/// whose flattened forms collide remain distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttrKey {
    /// Attribute category.
    pub category: String,
    /// Attribute display name.
    pub display_name: String,
}

impl AttrKey {
    /// Create a key from category and display name.
    pub fn new(category: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            display_name: display_name.into(),
        }
    }

    /// The parent-pointer key.
    pub fn parent() -> Self {
        Self::new(PARENT_CATEGORY, "")
    }

    /// Whether this key is the parent pointer.
    pub fn is_parent(&self) -> bool {
        self.category == PARENT_CATEGORY && self.display_name.is_empty()
    }

    /// The flattened presentation form, `"{category}_{display_name}"`.
    pub fn property_key(&self) -> String {
        format!("{}_{}", self.category, self.display_name)
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category, self.display_name)
    }
}
