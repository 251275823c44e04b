use std::cmp::Ordering;

use mealtrace::normalize::{capitalize_first, contains_normalized, locale_cmp, normalize, normalize_opt};

#[test]
fn folds_case_and_diacritics() {
    assert_eq!(normalize("Café"), "cafe");
    assert_eq!(normalize("cafe"), normalize("CAFÉ"));
    assert_eq!(normalize("  Crème Brûlée "), "creme brulee");
}

#[test]
fn normalization_is_idempotent() {
    for s in ["Café", "  ÀÉÎÕÜ  ", "a \u{301}", "ß", "Naïve, résumé", "", "İstanbul"] {
        let once = normalize(s);
        assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
    }
}

#[test]
fn missing_text_normalizes_to_empty() {
    assert_eq!(normalize_opt(None), "");
    assert_eq!(normalize_opt(Some(" Kiwi ")), "kiwi");
}

#[test]
fn capitalizes_only_the_first_character() {
    assert_eq!(capitalize_first("apple"), "Apple");
    assert_eq!(capitalize_first("iPhone charger"), "IPhone charger");
    assert_eq!(capitalize_first("éclair"), "Éclair");
    assert_eq!(capitalize_first(""), "");
}

#[test]
fn locale_order_ignores_case_and_accents_first() {
    assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
    assert_eq!(locale_cmp("Éclair", "Fig"), Ordering::Less);
    assert_eq!(locale_cmp("Kiwi", "Kiwi"), Ordering::Equal);
    assert_ne!(locale_cmp("Cafe", "Café"), Ordering::Equal);
}

#[test]
fn substring_search_uses_normalized_text() {
    assert!(contains_normalized("Crème brûlée, coffee", "BRULEE"));
    assert!(contains_normalized("anything", ""));
    assert!(!contains_normalized("tea", "coffee"));
}
