//! Items (spec.md §3). Item instances are immutable value copies: placing
//! one in a room or a character's inventory duplicates the template data,
//! there is no shared mutable item state anywhere in the world.

use crate::ids::ItemId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
  #[serde(rename = "ID")]
  pub id:       ItemId,
  pub name:     String,
  pub keywords: Vec<String>,
  pub desc:     String,
}

impl Item {
  /// True if `word` is a case-insensitive prefix of any of this item's
  /// keywords or its name, per the autocomplete rule in spec.md §4.6.
  pub fn matches(&self, word: &str) -> bool {
    let word = word.to_lowercase();
    if self.name.to_lowercase().starts_with(&word) {
      return true;
    }
    self.keywords.iter().any(|k| k.to_lowercase().starts_with(&word))
  }
}

/// On-disk shape of `items/items.json`: a flat map from item ID to template.
pub type ItemTemplateList = std::collections::HashMap<ItemId, Item>;
