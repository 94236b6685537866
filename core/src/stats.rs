//! Dashboard statistics over a consumption history.
//!
//! Everything here is a pure function of `(records, today)`. The current
//! date is always injected by the caller; nothing reads the system clock,
//! so every computation is reproducible in tests.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::models::{ConsumptionRecord, DerivedStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drink {
    Water,
    Coffee,
}

/// Today's slice of the history, plus the rows to show in the table.
#[derive(Debug, Clone)]
pub struct TodaySummary {
    pub total_ml: i64,
    pub coffee_count: i64,
    pub records: Vec<ConsumptionRecord>,
}

/// Classify a drink type string. Matching is case- and diacritic-
/// insensitive: "Café", "CAFE" and "cafe" are all coffee. Anything else,
/// including an empty string, counts as water-equivalent.
#[must_use]
pub fn classify_drink(drink_type: &str) -> Drink {
    if normalize_drink(drink_type) == "cafe" {
        Drink::Coffee
    } else {
        Drink::Water
    }
}

/// Lowercase and strip Latin diacritics ("Café" -> "cafe").
#[must_use]
pub fn normalize_drink(drink_type: &str) -> String {
    drink_type
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Calendar date of a record as the ISO prefix of its timestamp.
fn record_date(record: &ConsumptionRecord) -> Option<&str> {
    let date = record.recorded_at.split('T').next().unwrap_or("");
    if date.is_empty() { None } else { Some(date) }
}

/// Filter the history down to `today` and total it. Water quantities sum
/// into `total_ml`; coffee is counted separately and never contributes to
/// the total, regardless of its quantity.
#[must_use]
pub fn compute_today(records: &[ConsumptionRecord], today: NaiveDate) -> TodaySummary {
    let today_str = today.format("%Y-%m-%d").to_string();

    let mut total_ml = 0;
    let mut coffee_count = 0;
    let mut today_records = Vec::new();

    for record in records {
        if !record.recorded_at.starts_with(&today_str) {
            continue;
        }
        match classify_drink(&record.drink_type) {
            Drink::Water => total_ml += record.quantity_ml.max(0),
            Drink::Coffee => coffee_count += 1,
        }
        today_records.push(record.clone());
    }

    TodaySummary {
        total_ml,
        coffee_count,
        records: today_records,
    }
}

/// Consecutive days with at least one record, counting backward from
/// `today`. Any drink type keeps the streak alive, coffee included.
/// Returns 0 when today itself has no record.
#[must_use]
pub fn compute_streak(records: &[ConsumptionRecord], today: NaiveDate) -> i64 {
    let dates: HashSet<&str> = records.iter().filter_map(record_date).collect();

    let mut streak = 0;
    let mut current = today;
    loop {
        let date_str = current.format("%Y-%m-%d").to_string();
        if !dates.contains(date_str.as_str()) {
            break;
        }
        streak += 1;
        current -= chrono::Duration::days(1);
    }
    streak
}

/// Water totals bucketed by calendar date, coffee excluded.
fn water_by_date(records: &[ConsumptionRecord]) -> HashMap<String, i64> {
    let mut buckets: HashMap<String, i64> = HashMap::new();
    for record in records {
        if classify_drink(&record.drink_type) == Drink::Coffee {
            continue;
        }
        if let Some(date) = record_date(record) {
            *buckets.entry(date.to_string()).or_insert(0) += record.quantity_ml.max(0);
        }
    }
    buckets
}

/// Average daily water intake in liters over the last 7 days, counting
/// only days that have at least one water record. A week with water on 2
/// days averages over 2, not 7. Returns 0.0 when no day in the window has
/// data.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_weekly_average(records: &[ConsumptionRecord], today: NaiveDate) -> f64 {
    let buckets = water_by_date(records);

    let mut total_ml = 0;
    let mut days_with_data = 0;
    for offset in 0..7 {
        let date = today - chrono::Duration::days(offset);
        let date_str = date.format("%Y-%m-%d").to_string();
        if let Some(ml) = buckets.get(&date_str) {
            total_ml += ml;
            days_with_data += 1;
        }
    }

    if days_with_data == 0 {
        return 0.0;
    }
    (total_ml as f64 / f64::from(days_with_data)) / 1000.0
}

/// Goal progress as a percentage, clamped at 100 even when consumption
/// exceeds the goal. An invalid goal yields 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_progress(total_ml: i64, goal_ml: i64) -> f64 {
    if goal_ml <= 0 {
        return 0.0;
    }
    (total_ml.max(0) as f64 / goal_ml as f64 * 100.0).min(100.0)
}

/// Colour band for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Low,
    Mid,
    High,
    Complete,
}

#[must_use]
pub fn progress_band(percent: f64) -> ProgressBand {
    if percent < 33.0 {
        ProgressBand::Low
    } else if percent < 67.0 {
        ProgressBand::Mid
    } else if percent < 100.0 {
        ProgressBand::High
    } else {
        ProgressBand::Complete
    }
}

/// Daily water totals in liters for `[today-6 ..= today]`, oldest first.
/// Unlike the weekly average, days without data appear as explicit 0.0
/// entries so the chart always has 7 bars.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_seven_day_series(records: &[ConsumptionRecord], today: NaiveDate) -> Vec<f64> {
    let buckets = water_by_date(records);

    (0..7)
        .rev()
        .map(|offset| {
            let date = today - chrono::Duration::days(offset);
            let date_str = date.format("%Y-%m-%d").to_string();
            buckets.get(&date_str).copied().unwrap_or(0) as f64 / 1000.0
        })
        .collect()
}

/// Vertical scale for the 7-day chart: 20% above the goal, or 20% above
/// the tallest bar when that is higher. Anchoring the floor at the goal
/// keeps the bars growing toward a fixed goal line instead of the axis
/// rescaling between refreshes.
#[must_use]
pub fn chart_scale(goal_liters: f64, series: &[f64]) -> f64 {
    let max_value = series.iter().copied().fold(0.0_f64, f64::max);
    (goal_liters * 1.2).max(max_value * 1.2)
}

/// Sort descending by timestamp, most recent first. Display order only;
/// no aggregate depends on it.
pub fn sort_history(records: &mut [ConsumptionRecord]) {
    records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
}

/// Compose the full dashboard from a raw history and the daily goal.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn build_dashboard(
    records: &[ConsumptionRecord],
    goal_liters: f64,
    today: NaiveDate,
) -> DerivedStats {
    let summary = compute_today(records, today);
    let goal_ml = (goal_liters * 1000.0).round() as i64;

    let mut today_records = summary.records;
    sort_history(&mut today_records);

    DerivedStats {
        today_total_ml: summary.total_ml,
        today_coffee_count: summary.coffee_count,
        streak_days: compute_streak(records, today),
        weekly_average_liters: compute_weekly_average(records, today),
        progress_percent: compute_progress(summary.total_ml, goal_ml),
        seven_day_series: compute_seven_day_series(records, today),
        today_records,
    }
}
