use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::fmt::Write as _;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crate::client::ApiClient;
use sip_core::models::{
    ConsumptionRecord, DEFAULT_GOAL_LITERS, DerivedStats, UpdateConsumption,
};
use sip_core::stats::{self, ProgressBand};

use super::helpers::{format_volume, split_timestamp, truncate};

/// The slice of the REST API the dashboard needs. Abstracted so the
/// refresh logic can be driven by a fake in tests.
pub(crate) trait DashboardApi {
    async fn fetch_records(&self) -> Result<Vec<ConsumptionRecord>>;
    async fn fetch_goal(&self) -> Result<f64>;
    async fn update_record(&self, id: i64, update: &UpdateConsumption) -> Result<()>;
    async fn delete_record(&self, id: i64) -> Result<()>;
}

impl DashboardApi for ApiClient {
    async fn fetch_records(&self) -> Result<Vec<ConsumptionRecord>> {
        self.list_consumption().await
    }

    async fn fetch_goal(&self) -> Result<f64> {
        Ok(self.get_profile().await?.daily_goal_liters)
    }

    async fn update_record(&self, id: i64, update: &UpdateConsumption) -> Result<()> {
        self.update_consumption(id, update).await?;
        Ok(())
    }

    async fn delete_record(&self, id: i64) -> Result<()> {
        self.delete_consumption(id).await
    }
}

pub(crate) enum DashboardState {
    Loading,
    Ready(DerivedStats),
    Failed(String),
}

/// Fetches records and the goal, derives the stats, and keeps the last
/// good state. Every refresh gets a generation number; a reply that
/// arrives after a newer refresh started is dropped instead of
/// overwriting fresher data.
pub(crate) struct SyncController<A: DashboardApi> {
    api: A,
    goal_liters: f64,
    generation: u64,
    pub(crate) state: DashboardState,
}

impl<A: DashboardApi> SyncController<A> {
    pub(crate) fn new(api: A) -> Self {
        Self {
            api,
            goal_liters: DEFAULT_GOAL_LITERS,
            generation: 0,
            state: DashboardState::Loading,
        }
    }

    pub(crate) fn goal_liters(&self) -> f64 {
        self.goal_liters
    }

    /// Full load: goal first, then records. A failed goal fetch falls
    /// back to the default so the dashboard still renders.
    pub(crate) async fn load(&mut self, today: NaiveDate) {
        match self.api.fetch_goal().await {
            Ok(goal) if goal.is_finite() && goal > 0.0 => self.goal_liters = goal,
            Ok(_) | Err(_) => self.goal_liters = DEFAULT_GOAL_LITERS,
        }
        self.refresh(today).await;
    }

    pub(crate) async fn refresh(&mut self, today: NaiveDate) {
        let generation = self.begin_refresh();
        let result = self.api.fetch_records().await;
        self.apply(generation, today, result);
    }

    fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn apply(
        &mut self,
        generation: u64,
        today: NaiveDate,
        result: Result<Vec<ConsumptionRecord>>,
    ) {
        if generation != self.generation {
            // A newer refresh is in flight; this reply is stale.
            return;
        }
        self.state = match result {
            Ok(records) => {
                DashboardState::Ready(stats::build_dashboard(&records, self.goal_liters, today))
            }
            Err(e) => DashboardState::Failed(format!("{e:#}")),
        };
    }

    pub(crate) async fn edit(
        &mut self,
        id: i64,
        update: &UpdateConsumption,
        today: NaiveDate,
    ) -> Result<()> {
        self.api.update_record(id, update).await?;
        self.refresh(today).await;
        Ok(())
    }

    pub(crate) async fn delete(&mut self, id: i64, today: NaiveDate) -> Result<()> {
        self.api.delete_record(id).await?;
        self.refresh(today).await;
        Ok(())
    }
}

// --- Rendering ---

const BAR_WIDTH: usize = 30;
const CHART_HEIGHT: usize = 5;

fn band_label(band: ProgressBand) -> &'static str {
    match band {
        ProgressBand::Low => "keep going",
        ProgressBand::Mid => "halfway there",
        ProgressBand::High => "almost done",
        ProgressBand::Complete => "goal reached!",
    }
}

pub(crate) fn render_progress_bar(percent: f64) -> String {
    #[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let empty = BAR_WIDTH - filled;
    let label = band_label(stats::progress_band(percent));
    format!(
        "[{}{}] {percent:.0}% ({label})",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

/// Vertical bar chart of the last 7 days, oldest on the left. The y
/// axis is scaled so the goal line always fits.
pub(crate) fn render_week_chart(series: &[f64], goal_liters: f64, today: NaiveDate) -> String {
    let scale = stats::chart_scale(goal_liters, series);
    let mut out = String::new();

    for row in (1..=CHART_HEIGHT).rev() {
        #[allow(clippy::cast_precision_loss)]
        let threshold = scale * (row as f64) / (CHART_HEIGHT as f64);
        let _ = write!(out, "{threshold:>5.1} |");
        for value in series {
            if *value >= threshold {
                out.push_str(" ██");
            } else {
                out.push_str("   ");
            }
        }
        out.push('\n');
    }

    out.push_str("      +");
    out.push_str(&"---".repeat(series.len()));
    out.push('\n');
    out.push_str("       ");
    let days = series.len();
    for i in 0..days {
        #[allow(clippy::cast_possible_wrap)]
        let date = today - chrono::Duration::days((days - 1 - i) as i64);
        let _ = write!(out, "{:>2} ", date.format("%d"));
    }
    out.push('\n');
    out
}

fn render_today_table(records: &[ConsumptionRecord]) -> String {
    #[derive(Tabled)]
    struct TodayRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Drink")]
        drink: String,
        #[tabled(rename = "Amount")]
        amount: String,
    }

    let rows: Vec<TodayRow> = records
        .iter()
        .map(|r| {
            let (_, time) = split_timestamp(&r.recorded_at);
            TodayRow {
                id: r.id,
                time,
                drink: truncate(&r.drink_type, 20),
                amount: format_volume(r.quantity_ml),
            }
        })
        .collect();

    Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string()
}

pub(crate) fn render_dashboard(dash: &DerivedStats, goal_liters: f64, today: NaiveDate) -> String {
    let mut out = String::new();

    let date = today.format("%Y-%m-%d");
    let _ = writeln!(out, "=== {date} ===\n");

    let total = format_volume(dash.today_total_ml);
    let goal_ml = (goal_liters * 1000.0).round() as i64;
    let goal = format_volume(goal_ml);
    let _ = writeln!(out, "Today:          {total} / {goal}");
    let _ = writeln!(out, "{}", render_progress_bar(dash.progress_percent));

    let coffee = dash.today_coffee_count;
    let streak = dash.streak_days;
    let weekly = dash.weekly_average_liters;
    let _ = writeln!(out, "Coffees today:  {coffee}");
    let _ = writeln!(out, "Streak:         {streak} day(s)");
    let _ = writeln!(out, "Weekly average: {weekly:.2} L/day\n");

    out.push_str("Last 7 days (L):\n");
    out.push_str(&render_week_chart(&dash.seven_day_series, goal_liters, today));

    if dash.today_records.is_empty() {
        out.push_str("\nNo drinks logged today\n");
    } else {
        out.push('\n');
        out.push_str(&render_today_table(&dash.today_records));
        out.push('\n');
    }

    out
}

pub(crate) async fn cmd_dashboard(client: ApiClient, json: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let mut controller = SyncController::new(client);
    controller.load(today).await;

    match &controller.state {
        DashboardState::Ready(dash) => {
            if json {
                println!("{}", serde_json::to_string_pretty(dash)?);
            } else {
                print!("{}", render_dashboard(dash, controller.goal_liters(), today));
            }
            Ok(())
        }
        DashboardState::Failed(message) => {
            if json {
                println!("{}", super::helpers::json_error(message));
                process::exit(1);
            }
            anyhow::bail!("could not load dashboard: {message}")
        }
        DashboardState::Loading => unreachable!("load() always resolves the state"),
    }
}
