//! Dashboard HTTP handlers and view rendering.

use std::{
    sync::{Arc, Mutex},
    time::SystemTime,
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset, macros::format_description};

use crate::{
    AppState, Error,
    budget::{BudgetEntry, EnvelopeKind, EnvelopeStatus, evaluate_budgets},
    config::DashboardConfig,
    endpoints,
    filter::{
        OwnerSelector, SpendingSelection, TimeSelector, filter_spending, month_options,
        summarize_spending,
    },
    html::{FORM_LABEL_STYLE, FORM_INPUT_STYLE, HeadElement, base},
    merge::DatasetCache,
    pagination::{
        PaginationConfig, PaginationIndicator, create_pagination_indicators, page_count,
        page_slice,
    },
    store::{OverrideStore, TransactionStore},
    timezone::get_local_offset,
    transaction::Transaction,
};

use super::{
    charts::{ECHARTS_CDN, spending_treemap_option, treemap_script},
    envelopes::envelopes_view,
    table::transactions_section,
};

/// The state needed for displaying the dashboard page.
#[derive(Clone)]
pub struct DashboardState {
    /// The read-only base transaction store.
    pub base_store: Arc<dyn TransactionStore>,
    /// The store of the user's manual corrections.
    pub override_store: Arc<OverrideStore>,
    /// The cached merged view shared by every request.
    pub dataset: Arc<Mutex<DatasetCache>>,
    /// The static dashboard configuration.
    pub config: Arc<DashboardConfig>,
    /// The config that controls how to display pages of data.
    pub pagination: PaginationConfig,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            base_store: state.base_store.clone(),
            override_store: state.override_store.clone(),
            dataset: state.dataset.clone(),
            config: state.config.clone(),
            pagination: state.pagination.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string accepted by the dashboard page and its content endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The selected time period, e.g. "2025-07" or "last-30-days".
    pub period: Option<String>,
    /// The selected owner name, empty or absent for everyone.
    pub owner: Option<String>,
    /// The 1-based transactions table page.
    pub page: Option<u64>,
}

/// Everything needed to render the dashboard for one request.
struct DashboardData {
    selection: SpendingSelection,
    period_options: Vec<TimeSelector>,
    owner_options: Vec<String>,
    envelopes: Vec<EnvelopeStatus>,
    is_owner_view: bool,
    treemap_option: Option<String>,
    page_rows: Vec<Transaction>,
    indicators: Vec<PaginationIndicator>,
    last_updated: Option<String>,
}

/// Display the dashboard page.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let data = build_dashboard_data(&state, &query)?;

    Ok(dashboard_view(&data).into_response())
}

/// Return the dashboard content for the current filters. Used by htmx to
/// update the page without a full reload.
pub async fn get_dashboard_content(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let data = build_dashboard_data(&state, &query)?;

    Ok(dashboard_content(&data).into_response())
}

fn format_last_updated(modified: SystemTime, offset: UtcOffset) -> String {
    let format = format_description!("[month repr:short] [day padding:none], [year]");

    OffsetDateTime::from(modified)
        .to_offset(offset)
        .format(&format)
        .unwrap_or_default()
}

/// Refresh the merged view and derive everything the dashboard shows.
///
/// A failed refresh falls back to the previously cached rows for this read
/// when there are any; the error is only fatal when there is nothing to show.
fn build_dashboard_data(
    state: &DashboardState,
    query: &DashboardQuery,
) -> Result<DashboardData, Error> {
    let offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezone(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(offset).date();

    let mut dataset = state.dataset.lock().map_err(|_| Error::StoreLock)?;
    if let Err(error) = dataset.refresh(state.base_store.as_ref(), &state.override_store) {
        if dataset.rows().is_empty() {
            return Err(error);
        }
        tracing::error!("Could not refresh transaction data, serving the cached view: {error}");
    }
    let rows = dataset.rows();

    let months = month_options(rows);
    let default_time = months
        .last()
        .map(|month| TimeSelector::Month(*month))
        .unwrap_or(TimeSelector::RollingWindow {
            days: state.config.rolling_window_days,
        });
    let time = query
        .period
        .as_deref()
        .and_then(|value| TimeSelector::parse_query_value(value, state.config.rolling_window_days))
        .unwrap_or(default_time);

    let owner = match query.owner.as_deref() {
        Some(name) if state.config.owner(name).is_some() => OwnerSelector::Owner(name.to_owned()),
        Some(name) if !name.is_empty() => {
            tracing::warn!("Unknown owner \"{name}\" selected, showing everyone.");
            OwnerSelector::Everyone
        }
        _ => OwnerSelector::Everyone,
    };
    let selection = SpendingSelection { time, owner };

    let filtered = filter_spending(rows, &selection, today, &state.config);
    let summary = summarize_spending(&filtered);

    let is_owner_view = matches!(selection.owner, OwnerSelector::Owner(_));
    let budget_entries = if is_owner_view {
        vec![BudgetEntry {
            envelope: EnvelopeKind::Total,
            limit: state.config.owner_budget,
        }]
    } else {
        state.config.shared_budgets.clone()
    };
    let envelopes = evaluate_budgets(&budget_entries, &summary.category_totals, summary.total);

    let page_size = state.pagination.default_page_size;
    let pages = page_count(filtered.len(), page_size);
    let curr_page = query
        .page
        .unwrap_or(state.pagination.default_page)
        .clamp(1, pages);
    let page_rows = page_slice(&filtered, curr_page, page_size).to_vec();
    let indicators = create_pagination_indicators(curr_page, pages, state.pagination.max_pages);

    let treemap_option = if filtered.is_empty() {
        None
    } else {
        Some(spending_treemap_option(&filtered))
    };

    let mut period_options: Vec<TimeSelector> =
        months.iter().map(|month| TimeSelector::Month(*month)).collect();
    period_options.push(TimeSelector::RollingWindow {
        days: state.config.rolling_window_days,
    });

    let owner_options = state
        .config
        .owners
        .iter()
        .map(|owner| owner.name.clone())
        .collect();

    let last_updated = dataset
        .base_modified()
        .map(|modified| format_last_updated(modified, offset));

    Ok(DashboardData {
        selection,
        period_options,
        owner_options,
        envelopes,
        is_owner_view,
        treemap_option,
        page_rows,
        indicators,
        last_updated,
    })
}

fn filter_controls(data: &DashboardData) -> Markup {
    html!(
        section class="rounded bg-white dark:bg-gray-800 p-4 shadow"
        {
            form
                hx-get=(endpoints::DASHBOARD_CONTENT)
                hx-target="#dashboard-content"
                hx-swap="outerHTML"
                hx-trigger="change"
                class="flex flex-wrap gap-6 items-end"
            {
                div class="grow"
                {
                    label for="period" class=(FORM_LABEL_STYLE) { "Select Time Period" }

                    select name="period" id="period" class=(FORM_INPUT_STYLE)
                    {
                        @for option in &data.period_options {
                            option
                                value=(option.as_query_value())
                                selected[*option == data.selection.time]
                            {
                                (option.label())
                            }
                        }
                    }
                }

                div class="grow"
                {
                    label for="owner" class=(FORM_LABEL_STYLE) { "Select Spender" }

                    select name="owner" id="owner" class=(FORM_INPUT_STYLE)
                    {
                        option
                            value=""
                            selected[data.selection.owner == OwnerSelector::Everyone]
                        {
                            "Everyone"
                        }

                        @for name in &data.owner_options {
                            option
                                value=(name)
                                selected[data.selection.owner == OwnerSelector::Owner(name.clone())]
                            {
                                (name)
                            }
                        }
                    }
                }
            }
        }
    )
}

fn treemap_section(data: &DashboardData) -> Markup {
    html!(
        section class="rounded bg-white dark:bg-gray-800 p-4 shadow"
        {
            h2 class="text-xl font-semibold mb-3" { "Spending Breakdown" }

            @match &data.treemap_option {
                Some(options) => {
                    div id="treemap" class="min-h-[420px]" {}
                    (treemap_script("treemap", options))
                }
                None => {
                    p class="text-gray-500 py-8 text-center"
                    {
                        "No transactions for the selected filters."
                    }
                }
            }
        }
    )
}

/// The swappable dashboard content: filters, envelopes, treemap and table.
fn dashboard_content(data: &DashboardData) -> Markup {
    html!(
        div
            id="dashboard-content"
            class="w-full max-w-screen-xl mx-auto px-4 flex flex-col gap-4 pb-8"
        {
            (filter_controls(data))
            (envelopes_view(&data.envelopes, data.is_owner_view))
            (treemap_section(data))
            (transactions_section(&data.page_rows, &data.indicators, &data.selection))
        }
    )
}

fn dashboard_header(data: &DashboardData) -> Markup {
    html!(
        header class="relative bg-blue-600 dark:bg-blue-900 text-white py-8 mb-4 text-center"
        {
            @if let Some(last_updated) = &data.last_updated {
                span class="absolute left-8 top-3 text-sm opacity-80"
                {
                    "Last updated: " (last_updated)
                }
            }

            a href=(endpoints::LOG_OUT) class="absolute right-8 top-3 underline text-sm"
            {
                "Log out"
            }

            h1 class="text-3xl font-bold" { "Financial Dashboard" }
        }
    )
}

/// The full dashboard page.
fn dashboard_view(data: &DashboardData) -> Markup {
    let content = html!(
        (dashboard_header(data))
        (dashboard_content(data))
    );

    base(
        "Dashboard",
        &[HeadElement::ScriptLink(ECHARTS_CDN.to_owned())],
        &content,
    )
}
