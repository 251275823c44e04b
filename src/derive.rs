use ahash::AHashMap;
use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entry::{EntryError, EntryKey, RawEntry};
use crate::normalize::{capitalize_first, contains_normalized, locale_cmp, normalize};

/// A single item occurrence split out of an entry. All items of one entry share
/// its time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedItem {
    pub text: String,
    pub time: NaiveDateTime,
}

impl DerivedItem {
    pub fn new(text: impl Into<String>, time: NaiveDateTime) -> Self {
        Self { text: text.into(), time }
    }
}

/// How spelling variants that normalize to the same key are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantPolicy {
    /// Every occurrence keeps its own capitalized spelling.
    KeepAll,
    /// Every occurrence is rewritten to the most frequent spelling of its group.
    #[default]
    MostFrequent,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeriveOptions {
    pub variant_policy: VariantPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub key: Option<EntryKey>,
    pub time: String,
    pub error: EntryError,
}

#[derive(Debug, Clone, Default)]
pub struct Derivation {
    pub items: Vec<DerivedItem>,
    pub skipped: Vec<SkippedEntry>,
}

/// Comma-separated pieces of an entry text, trimmed and capitalized; empty pieces dropped.
pub fn split_items(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(capitalize_first)
}

pub fn derive_items(entries: &[RawEntry]) -> Vec<DerivedItem> {
    derive_items_with(entries, DeriveOptions::default()).items
}

pub fn derive_items_with(entries: &[RawEntry], opts: DeriveOptions) -> Derivation {
    let mut out = Derivation::default();
    for entry in entries {
        let time = match entry.instant() {
            Ok(t) => t,
            Err(error) => {
                warn!(key = ?entry.key, time = %entry.time, "skipping entry: {error}");
                out.skipped.push(SkippedEntry { key: entry.key, time: entry.time.clone(), error });
                continue;
            }
        };
        out.items.extend(split_items(&entry.text).map(|text| DerivedItem { text, time }));
    }
    if opts.variant_policy == VariantPolicy::MostFrequent {
        collapse_variants(&mut out.items);
    }
    out
}

fn collapse_variants(items: &mut [DerivedItem]) {
    let counts = items.iter().map(|i| i.text.as_str()).counts();
    let mut groups: AHashMap<String, Vec<(&str, usize)>> = AHashMap::new();
    for (text, count) in counts {
        groups.entry(normalize(text)).or_default().push((text, count));
    }
    let canonical: AHashMap<String, String> = groups
        .into_iter()
        .filter_map(|(key, variants)| {
            variants
                .into_iter()
                // most frequent first, then the earliest in display order
                .min_by(|a, b| b.1.cmp(&a.1).then_with(|| locale_cmp(a.0, b.0)))
                .map(|(text, _)| (key, text.to_string()))
        })
        .collect();
    for item in items.iter_mut() {
        if let Some(best) = canonical.get(&normalize(&item.text)) {
            if *best != item.text {
                item.text.clone_from(best);
            }
        }
    }
}

/// Distinct item texts in display order, for pickers and category checklists.
pub fn unique_items(items: &[DerivedItem]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.text.as_str())
        .unique()
        .sorted_by(|a, b| locale_cmp(a, b))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    pub text: String,
    pub count: usize,
}

/// Quick-entry suggestions: item texts matching `filter`, most logged first.
pub fn item_suggestions(items: &[DerivedItem], filter: &str) -> Vec<ItemCount> {
    items
        .iter()
        .map(|i| i.text.as_str())
        .counts()
        .into_iter()
        .filter(|(text, _)| contains_normalized(text, filter))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| locale_cmp(a.0, b.0)))
        .map(|(text, count)| ItemCount { text: text.to_string(), count })
        .collect()
}
