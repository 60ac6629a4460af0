//! Filtering and aggregation over the merged transaction view.
//!
//! Given a time selector (a named calendar month or a rolling window anchored
//! to today) and an owner selector, this module produces the spending subset
//! (outflows only, newest first) and the per-category and grand totals that
//! feed the envelopes, the treemap and the transactions table.

use std::collections::HashMap;

use time::{Date, Duration, Month};

use crate::{category::Category, config::DashboardConfig, transaction::Transaction};

/// The query value for the rolling window option in the period dropdown.
pub const ROLLING_WINDOW_QUERY_VALUE: &str = "last-30-days";

/// A calendar month used as a named filter period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    /// The calendar year.
    pub year: i32,
    /// The month within the year.
    pub month: Month,
}

impl MonthKey {
    /// The month a date falls in.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Whether `date` falls within this calendar month.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The label shown in the period dropdown, e.g. "July 2025".
    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }

    /// The value used in query strings, e.g. "2025-07".
    pub fn as_query_value(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month as u8)
    }

    /// Parse a query string value produced by [MonthKey::as_query_value].
    pub fn parse_query_value(value: &str) -> Option<Self> {
        let (year, month) = value.split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u8 = month.parse().ok()?;
        let month = Month::try_from(month).ok()?;

        Some(Self { year, month })
    }
}

fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    }
}

/// Which slice of time the dashboard is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSelector {
    /// Rows dated within `days` before today, inclusive.
    RollingWindow {
        /// How many days back the window reaches.
        days: i64,
    },
    /// Rows dated within one named calendar month.
    Month(MonthKey),
}

impl TimeSelector {
    /// Whether a row dated `date` falls inside the selected period.
    ///
    /// `today` is the evaluation instant for the rolling window.
    pub fn matches(&self, date: Date, today: Date) -> bool {
        match self {
            TimeSelector::RollingWindow { days } => date >= today - Duration::days(*days),
            TimeSelector::Month(month) => month.contains(date),
        }
    }

    /// The value used in query strings.
    pub fn as_query_value(&self) -> String {
        match self {
            TimeSelector::RollingWindow { .. } => ROLLING_WINDOW_QUERY_VALUE.to_owned(),
            TimeSelector::Month(month) => month.as_query_value(),
        }
    }

    /// The label shown in the period dropdown.
    pub fn label(&self) -> String {
        match self {
            TimeSelector::RollingWindow { days } => format!("Last {days} Days"),
            TimeSelector::Month(month) => month.label(),
        }
    }

    /// Parse a query string value, e.g. "2025-07" or "last-30-days".
    pub fn parse_query_value(value: &str, rolling_window_days: i64) -> Option<Self> {
        if value == ROLLING_WINDOW_QUERY_VALUE {
            return Some(TimeSelector::RollingWindow {
                days: rolling_window_days,
            });
        }

        MonthKey::parse_query_value(value).map(TimeSelector::Month)
    }
}

/// Whose spending the dashboard is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerSelector {
    /// Every account, with no category exclusions.
    Everyone,
    /// One configured owner. Only that owner's accounts are included and the
    /// configured essential categories are excluded, so the view shows
    /// discretionary spending only.
    Owner(String),
}

/// The combined dashboard filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSelection {
    /// The time period to include.
    pub time: TimeSelector,
    /// The owner to include.
    pub owner: OwnerSelector,
}

/// Filter the merged view down to the spending rows for a selection.
///
/// Only outflows (`amount > 0`) count as spending. The result is sorted by
/// date, newest first. An empty result is a normal outcome, not an error.
pub fn filter_spending(
    rows: &[Transaction],
    selection: &SpendingSelection,
    today: Date,
    config: &DashboardConfig,
) -> Vec<Transaction> {
    let owner_accounts = match &selection.owner {
        OwnerSelector::Everyone => None,
        OwnerSelector::Owner(name) => Some(
            config
                .owner(name)
                .map(|owner| owner.account_ids.as_slice())
                .unwrap_or_default(),
        ),
    };

    let mut spending: Vec<Transaction> = rows
        .iter()
        .filter(|row| row.amount > 0.0)
        .filter(|row| selection.time.matches(row.date, today))
        .filter(|row| match owner_accounts {
            None => true,
            Some(accounts) => {
                accounts.contains(&row.account_id)
                    && !config.essential_categories.contains(&row.category)
            }
        })
        .cloned()
        .collect();

    spending.sort_by(|a, b| b.date.cmp(&a.date));
    spending
}

/// The aggregates derived from a filtered spending subset.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSummary {
    /// Total spending per category, largest first.
    pub category_totals: Vec<(Category, f64)>,
    /// Total spending across every category.
    pub total: f64,
}

/// Sum the filtered rows per category and overall.
pub fn summarize_spending(rows: &[Transaction]) -> SpendingSummary {
    let mut totals: HashMap<Category, f64> = HashMap::new();

    for row in rows {
        *totals.entry(row.category).or_insert(0.0) += row.amount;
    }

    let total = totals.values().sum();

    let mut category_totals: Vec<(Category, f64)> = totals.into_iter().collect();
    category_totals.sort_by(|(category_a, total_a), (category_b, total_b)| {
        total_b
            .partial_cmp(total_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| category_a.label().cmp(category_b.label()))
    });

    SpendingSummary {
        category_totals,
        total,
    }
}

/// The distinct months present in the merged view, oldest first.
///
/// The period dropdown offers these plus the rolling window; the newest month
/// is the default selection.
pub fn month_options(rows: &[Transaction]) -> Vec<MonthKey> {
    let mut months: Vec<MonthKey> = Vec::new();

    for row in rows {
        let month = MonthKey::of(row.date);
        if !months.contains(&month) {
            months.push(month);
        }
    }

    months.sort_by_key(|month| (month.year, month.month as u8));
    months
}
