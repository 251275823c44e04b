use chrono::{NaiveDateTime, Timelike};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryIndex};
use crate::derive::DerivedItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotMode {
    #[default]
    Items,
    Categories,
}

/// One box on the day/hour scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub time: NaiveDateTime,
    /// whole days since the midnight of the earliest item
    pub day: i64,
    pub hour_start: f64,
    pub hour_end: f64,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotLayout {
    pub points: Vec<PlotPoint>,
    pub legend: Vec<LegendEntry>,
    pub min_day: i64,
    pub max_day: i64,
}

/// Evenly spaced hue for the `index`-th of `total` labels.
pub fn generate_color(index: usize, total: usize) -> String {
    let hue = if total == 0 { 0 } else { (360.0 / total as f64 * index as f64).round() as i64 };
    format!("hsla({hue}, 70%, 55%, 0.7)")
}

pub fn hour_value(t: NaiveDateTime) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0
}

fn floor_to_day(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_time(chrono::NaiveTime::MIN)
}

pub fn plot_points(items: &[DerivedItem], categories: &[Category], mode: PlotMode) -> PlotLayout {
    let Some(origin) = items.iter().map(|i| i.time).min().map(floor_to_day) else {
        return PlotLayout::default();
    };
    let index = CategoryIndex::new(categories);
    let labelled: Vec<(&DerivedItem, Option<&Category>)> = items
        .iter()
        .map(|i| match mode {
            PlotMode::Items => (i, None),
            PlotMode::Categories => (i, index.resolve(&i.text)),
        })
        .collect();

    let labels: Vec<(String, Option<&Category>)> = labelled
        .iter()
        .map(|(i, cat)| (cat.map_or_else(|| i.text.clone(), |c| c.name.clone()), *cat))
        .unique_by(|(label, _)| label.clone())
        .collect();
    let total = labels.len();
    let legend: Vec<LegendEntry> = labels
        .into_iter()
        .enumerate()
        .map(|(idx, (label, cat))| {
            let color = match cat {
                Some(c) if !c.color.is_empty() => c.color.clone(),
                _ => generate_color(idx, total),
            };
            LegendEntry { label, color }
        })
        .collect();

    let points: Vec<PlotPoint> = labelled
        .iter()
        .map(|(item, cat)| {
            let label = cat.map_or_else(|| item.text.clone(), |c| c.name.clone());
            let color = legend
                .iter()
                .find(|l| l.label == label)
                .map(|l| l.color.clone())
                .unwrap_or_default();
            let hour_start = hour_value(item.time);
            PlotPoint {
                time: item.time,
                day: (floor_to_day(item.time) - origin).num_days(),
                hour_start,
                hour_end: hour_start + 1.0,
                label,
                color,
            }
        })
        .collect();

    let (min_day, max_day) = points
        .iter()
        .map(|p| p.day)
        .minmax()
        .into_option()
        .unwrap_or((0, 0));
    PlotLayout { points, legend, min_day, max_day }
}
