//! Report windows understood by the OpenCost API and their UTC date ranges.

use chrono::{Datelike, Days, NaiveDate};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportWindow {
    Month,
    Today,
    Yesterday,
    Last24Hours,
    Last48Hours,
    Week,
    LastWeek,
    #[default]
    Last7Days,
    Last14Days,
}

/// Half-open `[start, end)` range of whole UTC days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u64,
}

impl ReportWindow {
    pub const ALL: [ReportWindow; 9] = [
        ReportWindow::Month,
        ReportWindow::Today,
        ReportWindow::Yesterday,
        ReportWindow::Last24Hours,
        ReportWindow::Last48Hours,
        ReportWindow::Week,
        ReportWindow::LastWeek,
        ReportWindow::Last7Days,
        ReportWindow::Last14Days,
    ];

    /// Keyword sent as the `window` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportWindow::Month => "month",
            ReportWindow::Today => "today",
            ReportWindow::Yesterday => "yesterday",
            ReportWindow::Last24Hours => "24h",
            ReportWindow::Last48Hours => "48h",
            ReportWindow::Week => "week",
            ReportWindow::LastWeek => "lastweek",
            ReportWindow::Last7Days => "7d",
            ReportWindow::Last14Days => "14d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportWindow::Month => "Month to date",
            ReportWindow::Today => "Today",
            ReportWindow::Yesterday => "Yesterday",
            ReportWindow::Last24Hours => "Last 24h",
            ReportWindow::Last48Hours => "Last 48h",
            ReportWindow::Week => "Week to date",
            ReportWindow::LastWeek => "Last week",
            ReportWindow::Last7Days => "Last 7 days",
            ReportWindow::Last14Days => "Last 14 days",
        }
    }

    /// Resolves the window relative to `today` (UTC).
    pub fn range(&self, today: NaiveDate) -> WindowRange {
        let tomorrow = today + Days::new(1);
        let last_sunday = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));

        let (start, end) = match self {
            ReportWindow::Month => {
                let first = today.with_day(1).unwrap_or(today);
                (first, first + chrono::Months::new(1))
            }
            ReportWindow::Today | ReportWindow::Last24Hours => (today, tomorrow),
            ReportWindow::Yesterday => (today - Days::new(1), today),
            ReportWindow::Last48Hours => (today - Days::new(1), tomorrow),
            ReportWindow::Week => (last_sunday, tomorrow),
            ReportWindow::LastWeek => (last_sunday - Days::new(7), last_sunday),
            ReportWindow::Last7Days => (today - Days::new(6), tomorrow),
            ReportWindow::Last14Days => (today - Days::new(13), tomorrow),
        };

        let days = u64::try_from((end - start).num_days()).unwrap_or(1).max(1);
        WindowRange { start, end, days }
    }
}

impl Display for ReportWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportWindow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Invalid window: {}", s))
    }
}
