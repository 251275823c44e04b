use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::correlation::{Classification, CorrelationResult, CorrelationScore, CorrelationTarget, Occurrence, Timing};

pub const VERDICT_THRESHOLD: f64 = 0.2;
const MIN_BAR_WIDTH: f64 = 80.0;
const MAX_BAR_WIDTH: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    LikelyCause,
    Neutral,
    UnlikelyCause,
}

impl Verdict {
    pub fn from_score(score: f64) -> Self {
        if score > VERDICT_THRESHOLD {
            Verdict::LikelyCause
        } else if score < -VERDICT_THRESHOLD {
            Verdict::UnlikelyCause
        } else {
            Verdict::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::LikelyCause => "Likely cause",
            Verdict::Neutral => "Neutral",
            Verdict::UnlikelyCause => "Unlikely cause",
        }
    }
}

/// Maps a score in [-1, 1] to a whole percentage in [0, 100].
pub fn score_percent(score: f64) -> u8 {
    (((score + 1.0) / 2.0) * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceLine {
    pub time: String,
    pub kind: Classification,
    pub timing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub item: String,
    pub verdict: Verdict,
    pub label: String,
    pub percent: u8,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
    pub total: usize,
    pub positive_share: f64,
    pub neutral_share: f64,
    pub negative_share: f64,
    pub bar_width: f64,
    pub occurrences: Vec<OccurrenceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub target: String,
    pub target_occurrences: usize,
    pub timeframe: String,
    pub rows: Vec<ScoreRow>,
}

impl CorrelationReport {
    /// Display model for a finished run. Reads `result`, never mutates it.
    pub fn build(result: &CorrelationResult, target: &CorrelationTarget) -> Self {
        let max_total = result.scores.iter().map(|s| s.total).max().unwrap_or(0);
        Self {
            target: target.display_name().to_string(),
            target_occurrences: result.target_occurrence_count,
            timeframe: format_timeframe(result.timeframe.hours()),
            rows: result.scores.iter().map(|s| score_row(s, max_total)).collect(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Target: {}", self.target);
        let _ = writeln!(out, "Occurrences analyzed: {}", self.target_occurrences);
        let _ = writeln!(out, "Lookback timeframe: {}", self.timeframe);
        if self.target_occurrences == 0 {
            out.push_str("No occurrences found for this item/category.\n");
            return out;
        }
        if self.rows.is_empty() {
            out.push_str("No preceding items found within the selected timeframe.\n");
            return out;
        }
        let width = self.rows.iter().map(|r| r.item.chars().count()).max().unwrap_or(0);
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<width$}  {:>3}%  {:<14}  +{} ~{} -{}",
                row.item,
                row.percent,
                row.label,
                row.positive_count,
                row.neutral_count,
                row.negative_count,
                width = width
            );
        }
        out
    }
}

fn score_row(s: &CorrelationScore, max_total: usize) -> ScoreRow {
    let verdict = Verdict::from_score(s.score);
    let share = |n: usize| if s.total == 0 { 0.0 } else { n as f64 / s.total as f64 };
    let bar_width = if max_total == 0 {
        MIN_BAR_WIDTH
    } else {
        (s.total as f64 / max_total as f64 * MAX_BAR_WIDTH).max(MIN_BAR_WIDTH)
    };
    ScoreRow {
        item: s.item.clone(),
        verdict,
        label: verdict.label().to_string(),
        percent: score_percent(s.score),
        positive_count: s.positive_count,
        neutral_count: s.neutral_count,
        negative_count: s.negative_count,
        total: s.total,
        positive_share: share(s.positive_count),
        neutral_share: share(s.neutral_count),
        negative_share: share(s.negative_count),
        bar_width,
        occurrences: s.occurrences.iter().map(occurrence_line).collect(),
    }
}

fn occurrence_line(o: &Occurrence) -> OccurrenceLine {
    let timing = match o.timing {
        Timing::MinutesBefore(m) => format!("{} before", format_timing_difference(m)),
        Timing::MinutesAfter(m) => format!("{} after", format_timing_difference(m)),
    };
    OccurrenceLine { time: o.time.format("%Y-%m-%d %H:%M").to_string(), kind: o.kind, timing }
}

/// `"1 day 2 hours 5 min"`; zero renders as `"0 min"`.
pub fn format_timing_difference(minutes: i64) -> String {
    let minutes = minutes.max(0);
    let days = minutes / (24 * 60);
    let hours = (minutes % (24 * 60)) / 60;
    let mins = minutes % 60;
    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days} day{}", if days > 1 { "s" } else { "" }));
    }
    if hours > 0 {
        parts.push(format!("{hours} hour{}", if hours > 1 { "s" } else { "" }));
    }
    if mins > 0 {
        parts.push(format!("{mins} min"));
    }
    if parts.is_empty() {
        return "0 min".to_string();
    }
    parts.join(" ")
}

pub fn format_timeframe(hours: i64) -> String {
    match hours {
        1 => "1 hour".to_string(),
        h if h < 24 => format!("{h} hours"),
        24 => "1 day".to_string(),
        h if h % 24 == 0 => format!("{} days", h / 24),
        h => format!("{}d {}h", h / 24, h % 24),
    }
}
