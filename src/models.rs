use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Part codes are shared between colors of the same part and the name tells
/// the colors apart, so an item is identified by both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub part: String,
    pub name: String,
}

/// One inventory row. Field order is the CSV column order.
///
/// A single row holds at most `u32::MAX` pieces; the quantity is widened so
/// merged totals cannot overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub quantity: u64,
    pub image: String,
    pub part: String,
    pub name: String,
}

impl Item {
    pub fn new(quantity: u32, image_url: &str, part: String, name: String) -> Self {
        Self {
            quantity: u64::from(quantity),
            image: image_formula(image_url),
            part,
            name,
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey {
            part: self.part.clone(),
            name: self.name.clone(),
        }
    }
}

/// Spreadsheet formula that renders the part picture in its cell.
pub fn image_formula(url: &str) -> String {
    format!("=IMAGE(\"{}\")", url)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: HashMap<ItemKey, Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item` unless its key is already present. Returns `false` for
    /// a duplicate, in which case the stored item is left untouched.
    pub fn insert_new(&mut self, item: Item) -> bool {
        match self.items.entry(item.key()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(item);
                true
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &ItemKey) -> Option<&Item> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.values().map(|item| item.quantity).sum()
    }

    /// Folds `other` into `self` and returns the result with the number of
    /// keys found in both. Colliding quantities are summed; everything else
    /// is kept from `self`.
    pub fn merge(mut self, other: Inventory) -> (Inventory, usize) {
        let mut merges = 0;
        for (key, item) in other.items {
            match self.items.entry(key) {
                Entry::Occupied(mut slot) => {
                    slot.get_mut().quantity += item.quantity;
                    merges += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(item);
                }
            }
        }
        (self, merges)
    }

    /// Items ordered by name, then part code.
    pub fn sorted(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.part.cmp(&b.part)));
        items
    }
}

impl FromIterator<Item> for Inventory {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for item in iter {
            inventory.insert_new(item);
        }
        inventory
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub models: Vec<String>,
    pub parts: usize,
    pub quantity: u64,
    pub merges: usize,
    pub files: Vec<PathBuf>,
    pub timestamp: String,
}
