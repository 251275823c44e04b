use std::str::FromStr;

use ahash::{AHashMap, AHashSet};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::category::{find_by_key, Category, CategoryKey};
use crate::derive::DerivedItem;
use crate::normalize::{locale_cmp, normalize};

pub const MIN_TIMEFRAME_HOURS: i64 = 1;
pub const MAX_TIMEFRAME_HOURS: i64 = 720;
pub const DEFAULT_TIMEFRAME_HOURS: i64 = 24;
pub const MAX_THRESHOLD_HOURS: i64 = 3;

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Lookback window in whole hours, always within
/// [`MIN_TIMEFRAME_HOURS`, `MAX_TIMEFRAME_HOURS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Timeframe {
    hours: i64,
}

impl Timeframe {
    pub fn new(hours: i64) -> Self {
        Self { hours: hours.clamp(MIN_TIMEFRAME_HOURS, MAX_TIMEFRAME_HOURS) }
    }

    pub fn hours(&self) -> i64 {
        self.hours
    }

    pub fn lookback_ms(&self) -> i64 {
        self.hours * MS_PER_HOUR
    }

    /// Inner "plausible cause" window: half the lookback, capped at three hours.
    pub fn threshold_ms(&self) -> i64 {
        (MAX_THRESHOLD_HOURS * MS_PER_HOUR).min(self.lookback_ms() / 2)
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEFRAME_HOURS)
    }
}

impl From<i64> for Timeframe {
    fn from(hours: i64) -> Self {
        Self::new(hours)
    }
}

impl From<Timeframe> for i64 {
    fn from(t: Timeframe) -> Self {
        t.hours
    }
}

/// What an analysis run is about: one item (matched on normalized text) or every
/// member of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationTarget {
    Item(String),
    Category(Category),
}

impl CorrelationTarget {
    pub fn item(text: impl Into<String>) -> Self {
        Self::Item(text.into())
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Item(text) => text,
            Self::Category(cat) => &cat.name,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("selector must look like item:<text> or category:<key>, got {0:?}")]
    Malformed(String),
    #[error("invalid category key {0:?}")]
    BadKey(String),
}

/// Picker encoding of a target before it is resolved against a category snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    Item(String),
    Category(CategoryKey),
}

impl TargetSelector {
    /// `None` when the category key no longer exists.
    pub fn resolve(&self, categories: &[Category]) -> Option<CorrelationTarget> {
        match self {
            Self::Item(text) => Some(CorrelationTarget::Item(text.clone())),
            Self::Category(key) => find_by_key(categories, *key).cloned().map(CorrelationTarget::Category),
        }
    }
}

impl FromStr for TargetSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s.split_once(':').ok_or_else(|| SelectorError::Malformed(s.to_string()))?;
        match kind {
            "item" => Ok(Self::Item(value.to_string())),
            "category" => value
                .trim()
                .parse()
                .map(Self::Category)
                .map_err(|_| SelectorError::BadKey(value.to_string())),
            _ => Err(SelectorError::Malformed(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Positive,
    Neutral,
    Negative,
}

/// Rounded distance to the associated target occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    MinutesBefore(i64),
    MinutesAfter(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub time: NaiveDateTime,
    /// target time minus item time; positive when the item came first
    pub delta_ms: i64,
    pub kind: Classification,
    pub timing: Timing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationScore {
    pub item: String,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub total: usize,
    pub score: f64,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub target_occurrence_count: usize,
    pub timeframe: Timeframe,
    pub scores: Vec<CorrelationScore>,
}

impl CorrelationResult {
    pub fn empty(timeframe: Timeframe) -> Self {
        Self { target_occurrence_count: 0, timeframe, scores: Vec::new() }
    }
}

/// `(positive - negative) / total`, or `None` for an empty tally.
pub fn net_score(positive: usize, negative: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some((positive as f64 - negative as f64) / total as f64)
}

/// Decision rule for a signed delta (target minus item). Returns `None` outside
/// the lookback window. Simultaneous events count as positive.
pub fn classify(delta_ms: i64, timeframe: Timeframe) -> Option<Classification> {
    let threshold = timeframe.threshold_ms();
    let lookback = timeframe.lookback_ms();
    match delta_ms {
        d if (0..=threshold).contains(&d) => Some(Classification::Positive),
        d if d > threshold && d <= lookback => Some(Classification::Neutral),
        d if d < 0 && -d <= lookback => Some(Classification::Negative),
        _ => None,
    }
}

fn timing_for(delta_ms: i64) -> Timing {
    let minutes = (delta_ms.abs() + MS_PER_MINUTE / 2) / MS_PER_MINUTE;
    if delta_ms >= 0 {
        Timing::MinutesBefore(minutes)
    } else {
        Timing::MinutesAfter(minutes)
    }
}

enum TargetMatcher {
    Item(String),
    Members(AHashSet<String>),
}

impl TargetMatcher {
    fn new(target: &CorrelationTarget) -> Self {
        match target {
            CorrelationTarget::Item(text) => Self::Item(normalize(text)),
            CorrelationTarget::Category(cat) => Self::Members(cat.items.iter().map(|m| normalize(m)).collect()),
        }
    }

    fn matches(&self, text: &str) -> bool {
        let key = normalize(text);
        match self {
            Self::Item(target) => !target.is_empty() && *target == key,
            Self::Members(members) => members.contains(&key),
        }
    }
}

/// Closest target time to `at` by absolute distance; on a tie the earlier one.
/// `times` must be sorted ascending.
fn nearest(times: &[NaiveDateTime], at: NaiveDateTime) -> Option<NaiveDateTime> {
    let idx = times.partition_point(|t| *t < at);
    let before = idx.checked_sub(1).map(|i| times[i]);
    let after = times.get(idx).copied();
    match (before, after) {
        (Some(b), Some(a)) => Some(if at - b <= a - at { b } else { a }),
        (b, a) => b.or(a),
    }
}

#[derive(Default)]
struct Tally {
    positive: usize,
    negative: usize,
    neutral: usize,
    occurrences: Vec<Occurrence>,
}

impl Tally {
    fn push(&mut self, occ: Occurrence) {
        match occ.kind {
            Classification::Positive => self.positive += 1,
            Classification::Neutral => self.neutral += 1,
            Classification::Negative => self.negative += 1,
        }
        self.occurrences.push(occ);
    }

    fn into_score(self, item: String) -> Option<CorrelationScore> {
        let total = self.positive + self.negative + self.neutral;
        let score = net_score(self.positive, self.negative, total)?;
        Some(CorrelationScore {
            item,
            positive_count: self.positive,
            negative_count: self.negative,
            neutral_count: self.neutral,
            total,
            score,
            occurrences: self.occurrences,
        })
    }
}

/// Scores every non-target item against its nearest target occurrence.
/// `timeframe_hours` is clamped to [1, 720].
pub fn analyze_correlation(
    items: &[DerivedItem],
    target: &CorrelationTarget,
    timeframe_hours: i64,
) -> CorrelationResult {
    analyze_with_timeframe(items, target, Timeframe::new(timeframe_hours))
}

pub fn analyze_with_timeframe(
    items: &[DerivedItem],
    target: &CorrelationTarget,
    timeframe: Timeframe,
) -> CorrelationResult {
    let matcher = TargetMatcher::new(target);
    let (targets, mut candidates): (Vec<&DerivedItem>, Vec<&DerivedItem>) =
        items.iter().partition(|i| matcher.matches(&i.text));
    if targets.is_empty() {
        debug!(subject = target.display_name(), "no target occurrences");
        return CorrelationResult::empty(timeframe);
    }

    let mut target_times: Vec<NaiveDateTime> = targets.iter().map(|t| t.time).collect();
    target_times.sort_unstable();
    // chronological drill-down lists
    candidates.sort_by_key(|c| c.time);
    debug!(
        subject = target.display_name(),
        targets = target_times.len(),
        candidates = candidates.len(),
        hours = timeframe.hours(),
        "analyzing correlation"
    );

    let mut tallies: AHashMap<&str, Tally> = AHashMap::new();
    for cand in candidates {
        let Some(closest) = nearest(&target_times, cand.time) else { continue };
        let delta_ms = (closest - cand.time).num_milliseconds();
        let Some(kind) = classify(delta_ms, timeframe) else { continue };
        tallies.entry(cand.text.as_str()).or_default().push(Occurrence {
            time: cand.time,
            delta_ms,
            kind,
            timing: timing_for(delta_ms),
        });
    }

    let mut scores: Vec<CorrelationScore> = tallies
        .into_iter()
        .filter_map(|(item, tally)| tally.into_score(item.to_string()))
        .collect();
    sort_scores(&mut scores);

    CorrelationResult { target_occurrence_count: target_times.len(), timeframe, scores }
}

/// Highest score first; equal scores in display order of the item text.
pub fn sort_scores(scores: &mut [CorrelationScore]) {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| locale_cmp(&a.item, &b.item)));
}

/// Resolves `selector` against `categories` and runs the analysis; a category
/// that no longer exists yields zero target occurrences.
pub fn analyze_selector(
    items: &[DerivedItem],
    selector: &TargetSelector,
    categories: &[Category],
    timeframe: Timeframe,
) -> CorrelationResult {
    match selector.resolve(categories) {
        Some(target) => analyze_with_timeframe(items, &target, timeframe),
        None => {
            debug!(?selector, "target category not found");
            CorrelationResult::empty(timeframe)
        }
    }
}
