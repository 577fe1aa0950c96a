//! ItemSet construction and lookups.
//!
//! The set keeps items in request order and a HashMap from id to the
//! first position holding it, so membership checks and index mapping are
//! O(1) during validation and assembly.

use crate::types::{Item, ItemId, ItemSet};
use std::collections::HashMap;
use tracing::warn;

impl ItemSet {
    /// Build an ItemSet, making ids unique.
    ///
    /// A later item whose id collides with an earlier one is renamed to
    /// `<id>#<position>` so every plan can be a true permutation.
    pub fn new(items: Vec<Item>) -> Self {
        let mut positions: HashMap<ItemId, usize> = HashMap::with_capacity(items.len());
        let mut unique = Vec::with_capacity(items.len());

        for (index, mut item) in items.into_iter().enumerate() {
            if positions.contains_key(&item.id) {
                let mut renamed = format!("{}#{}", item.id, index);
                while positions.contains_key(&renamed) {
                    renamed.push('_');
                }
                warn!("Duplicate item id {:?} at position {}, renamed to {:?}", item.id, index, renamed);
                item.id = renamed;
            }
            positions.insert(item.id.clone(), index);
            unique.push(item);
        }

        Self {
            items: unique,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Ids in original request order
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|item| item.id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Original index of the item with this id
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.position_of(id).map(|index| &self.items[index])
    }
}

impl From<Vec<Item>> for ItemSet {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemAnalysis;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            filename: format!("{id}.jpg"),
            analysis: ItemAnalysis::fallback(),
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let set = ItemSet::new(vec![item("a"), item("b"), item("c")]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.position_of("b"), Some(1));
        assert!(set.contains("c"));
        assert!(!set.contains("z"));
        assert_eq!(set.get("a").map(|i| i.filename.as_str()), Some("a.jpg"));
    }

    #[test]
    fn test_duplicate_ids_are_renamed() {
        let set = ItemSet::new(vec![item("a"), item("a"), item("b")]);

        let ids: Vec<&str> = set.ids().collect();
        assert_eq!(ids, vec!["a", "a#1", "b"]);
        assert_eq!(set.position_of("a"), Some(0));
        assert_eq!(set.position_of("a#1"), Some(1));
    }

    #[test]
    fn test_empty_set() {
        let set = ItemSet::default();
        assert!(set.is_empty());
        assert_eq!(set.ids().count(), 0);
    }
}
