use chrono::{NaiveDate, NaiveDateTime};

use mealtrace::category::Category;
use mealtrace::derive::DerivedItem;
use mealtrace::timeline::{generate_color, hour_value, plot_points, PlotMode};

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap().and_hms_opt(h, m, 0).unwrap()
}

#[test]
fn days_count_from_first_midnight() {
    let items = vec![
        DerivedItem::new("Toast", at(4, 7, 30)),
        DerivedItem::new("Soup", at(6, 23, 45)),
        DerivedItem::new("Toast", at(5, 0, 15)),
    ];
    let layout = plot_points(&items, &[], PlotMode::Items);
    let days: Vec<i64> = layout.points.iter().map(|p| p.day).collect();
    assert_eq!(days, vec![0, 2, 1]);
    assert_eq!((layout.min_day, layout.max_day), (0, 2));
    assert_eq!(layout.points[0].hour_start, 7.5);
    assert_eq!(layout.points[0].hour_end, 8.5);
    assert_eq!(hour_value(at(1, 23, 45)), 23.75);
}

#[test]
fn item_mode_generates_one_color_per_label() {
    let items = vec![
        DerivedItem::new("Toast", at(4, 7, 0)),
        DerivedItem::new("Soup", at(4, 12, 0)),
        DerivedItem::new("Toast", at(5, 7, 0)),
    ];
    let layout = plot_points(&items, &[], PlotMode::Items);
    assert_eq!(layout.legend.len(), 2);
    assert_eq!(layout.legend[0].color, generate_color(0, 2));
    assert_eq!(layout.legend[1].color, "hsla(180, 70%, 55%, 0.7)");
    assert_eq!(layout.points[0].color, layout.points[2].color);
}

#[test]
fn category_mode_relabels_members() {
    let cats = vec![Category::new("Grains", &["toast", "Rice"]).with_color("#AA8800")];
    let items = vec![
        DerivedItem::new("Toast", at(4, 7, 0)),
        DerivedItem::new("Soup", at(4, 12, 0)),
        DerivedItem::new("Rice", at(4, 19, 0)),
    ];
    let layout = plot_points(&items, &cats, PlotMode::Categories);
    let labels: Vec<&str> = layout.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["Grains", "Soup", "Grains"]);
    assert_eq!(layout.points[0].color, "#AA8800");
    assert_eq!(layout.legend.len(), 2);
}

#[test]
fn empty_input_gives_empty_layout() {
    let layout = plot_points(&[], &[], PlotMode::Items);
    assert!(layout.points.is_empty());
    assert!(layout.legend.is_empty());
}
