use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

/// Canonical matching key for free text: lowercased, NFD-decomposed and stripped
/// of combining diacritics (U+0300..=U+036F), trimmed on both ends.
///
/// Every identity comparison between items, categories and targets goes through
/// this function.
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect();
    // stripping a trailing mark can expose whitespace
    folded.trim().to_string()
}

pub fn normalize_opt(s: Option<&str>) -> String {
    s.map(normalize).unwrap_or_default()
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Uppercases the first character and keeps the rest as typed.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human ordering for display lists: case and accents are ignored first, the raw
/// text only breaks ties so the order stays total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    normalize(a).cmp(&normalize(b)).then_with(|| a.cmp(b))
}

pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    let needle = normalize(needle);
    needle.is_empty() || normalize(haystack).contains(&needle)
}
