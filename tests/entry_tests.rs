use chrono::NaiveDate;

use mealtrace::entry::{filter_entries, EntryStats, RawEntry, SearchStatus};

#[test]
fn search_is_accent_and_case_insensitive() {
    let entries = vec![
        RawEntry::new("2024-01-01T08:00", "Café au lait, croissant"),
        RawEntry::new("2024-01-01T12:00", "Salad"),
    ];
    let hits = filter_entries(&entries, "CAFE");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "Café au lait, croissant");
    assert_eq!(filter_entries(&entries, "  ").len(), 2);
}

#[test]
fn stats_span_parsable_entries() {
    let entries = vec![
        RawEntry::new("2024-01-02T09:00", "b"),
        RawEntry::new("broken", "x"),
        RawEntry::new("2024-01-01T08:00", "a"),
    ];
    let stats = EntryStats::from_entries(&entries);
    assert_eq!(stats.count, 3);
    assert_eq!(stats.first, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(8, 0, 0));
    assert_eq!(stats.last, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 0, 0));

    let none = EntryStats::from_entries(&Vec::<RawEntry>::new());
    assert_eq!((none.count, none.first, none.last), (0, None, None));
}

#[test]
fn stats_count_entries_even_without_a_parsable_time() {
    let entries = vec![RawEntry::new("bad", "tea"), RawEntry::new("", "toast")];
    let stats = EntryStats::from_entries(&entries);
    assert_eq!(stats.count, 2);
    assert_eq!(stats.first, None);
    assert_eq!(stats.last, None);

    let status = SearchStatus::for_query(&entries, "");
    assert_eq!(status.summary(), "Showing 2 entries.");
}

#[test]
fn search_status_reports_matching_against_total() {
    let entries = vec![
        RawEntry::new("2024-01-01T08:00", "Café, toast"),
        RawEntry::new("2024-01-01T12:00", "Salad"),
        RawEntry::new("2024-01-02T08:00", "cafe"),
    ];

    let status = SearchStatus::for_query(&entries, "CAFE");
    assert_eq!((status.matching.count, status.total), (2, 3));
    assert_eq!(status.summary(), "Showing 2 of 3 entries.");
    assert_eq!(status.matching.last, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(8, 0, 0));

    assert_eq!(SearchStatus::for_query(&entries, "").summary(), "Showing 3 entries.");
    assert_eq!(SearchStatus::for_query(&entries, "rice").summary(), "No entries match filter");
    assert_eq!(SearchStatus::for_query(&[], "rice").summary(), "No entries");
}

#[test]
fn export_shape_round_trips_through_json() {
    let json = r#"[{"time":"2024-01-01T08:00","text":"eggs, toast"},{"time":"2024-01-01T09:00","text":"tea","key":4}]"#;
    let entries: Vec<RawEntry> = serde_json::from_str(json).unwrap();
    assert_eq!(entries[0].key, None);
    assert_eq!(entries[1].key, Some(4));
    assert!(entries[0].instant().is_ok());
}
