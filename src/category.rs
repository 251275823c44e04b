use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::derive::DerivedItem;
use crate::normalize::normalize;

pub type CategoryKey = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<CategoryKey>,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, alias = "foods")]
    pub items: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, items: &[&str]) -> Self {
        Self {
            key: None,
            name: name.into(),
            color: String::new(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_key(mut self, key: CategoryKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn contains(&self, text: &str) -> bool {
        let needle = normalize(text);
        self.items.iter().any(|m| normalize(m) == needle)
    }
}

/// First category in list order that claims `item`.
pub fn resolve_category<'a>(item: &DerivedItem, categories: &'a [Category]) -> Option<&'a Category> {
    categories.iter().find(|c| c.contains(&item.text))
}

pub fn find_by_key(categories: &[Category], key: CategoryKey) -> Option<&Category> {
    categories.iter().find(|c| c.key == Some(key))
}

/// Precomputed normalized-member lookup with the same first-match rule as
/// [`resolve_category`].
pub struct CategoryIndex<'a> {
    categories: &'a [Category],
    by_member: AHashMap<String, usize>,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        let mut by_member = AHashMap::new();
        for (idx, cat) in categories.iter().enumerate() {
            for member in &cat.items {
                by_member.entry(normalize(member)).or_insert(idx);
            }
        }
        Self { categories, by_member }
    }

    pub fn resolve(&self, text: &str) -> Option<&'a Category> {
        self.by_member.get(&normalize(text)).map(|&idx| &self.categories[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.by_member.is_empty()
    }
}
