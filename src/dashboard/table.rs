//! The recent-transactions table and its pagination controls.

use maud::{Markup, html};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    endpoints::{self, format_endpoint},
    filter::{OwnerSelector, SpendingSelection},
    html::{
        LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency,
    },
    pagination::PaginationIndicator,
    transaction::{DATE_FORMAT, Transaction},
};

/// The max number of graphemes to display in the merchant column before
/// truncating and displaying an ellipsis.
const MAX_MERCHANT_GRAPHEMES: usize = 32;

fn truncate_graphemes(text: &str, max_graphemes: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();

    if graphemes.len() <= max_graphemes {
        text.to_owned()
    } else {
        format!("{}…", graphemes[..max_graphemes].concat())
    }
}

/// The URL the pagination and filter controls fetch dashboard content from.
pub(super) fn content_url(selection: &SpendingSelection, page: u64) -> String {
    let owner = match &selection.owner {
        OwnerSelector::Everyone => String::new(),
        OwnerSelector::Owner(name) => name.clone(),
    };
    let params = [
        ("period", selection.time.as_query_value()),
        ("owner", owner),
        ("page", page.to_string()),
    ];

    match serde_urlencoded::to_string(params) {
        Ok(query) => format!("{}?{}", endpoints::DASHBOARD_CONTENT, query),
        Err(error) => {
            tracing::warn!("could not encode dashboard query: {error}");
            endpoints::DASHBOARD_CONTENT.to_owned()
        }
    }
}

/// The transactions section: heading, table and pagination controls.
pub(super) fn transactions_section(
    page_rows: &[Transaction],
    indicators: &[PaginationIndicator],
    selection: &SpendingSelection,
) -> Markup {
    html!(
        section class="rounded bg-white dark:bg-gray-800 p-4 shadow"
        {
            h2 class="text-xl font-semibold mb-3" { "Recent Transactions" }

            @if page_rows.is_empty() {
                p class="text-gray-500 py-8 text-center" data-empty-state="true"
                {
                    "No transactions for the selected filters."
                }
            } @else {
                div class="overflow-x-auto"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Merchant" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class="sr-only" { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in page_rows {
                                (transaction_row(row))
                            }
                        }
                    }
                }

                (pagination_controls(indicators, selection))
            }
        }
    )
}

fn transaction_row(row: &Transaction) -> Markup {
    let date = row
        .date
        .format(&DATE_FORMAT)
        .unwrap_or_else(|_| row.date.to_string());
    let merchant = if row.merchant_name.is_empty() {
        row.name.as_str()
    } else {
        row.merchant_name.as_str()
    };
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, row.id.as_str());

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (date) }
            td class=(TABLE_CELL_STYLE) title=(merchant)
            {
                (truncate_graphemes(merchant, MAX_MERCHANT_GRAPHEMES))
            }
            td class="px-6 py-4 text-right" { (format_currency(row.amount)) }
            td class=(TABLE_CELL_STYLE) { (row.category.display_name()) }
            td class=(TABLE_CELL_STYLE) { (row.account_id) }
            td class=(TABLE_CELL_STYLE)
            {
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }
            }
        }
    )
}

fn page_link(label: &str, target_page: u64, selection: &SpendingSelection) -> Markup {
    html!(
        a
            href="#"
            class="px-3 py-1 rounded hover:bg-gray-200 dark:hover:bg-gray-700"
            hx-get=(content_url(selection, target_page))
            hx-target="#dashboard-content"
            hx-swap="outerHTML"
        {
            (label)
        }
    )
}

fn pagination_controls(
    indicators: &[PaginationIndicator],
    selection: &SpendingSelection,
) -> Markup {
    html!(
        nav class="flex justify-center gap-1 mt-3 text-sm" aria-label="Pagination"
        {
            @for indicator in indicators {
                @match indicator {
                    PaginationIndicator::CurrPage(page) => {
                        span class="px-3 py-1 rounded bg-blue-600 text-white" { (page) }
                    }
                    PaginationIndicator::Page(page) => {
                        (page_link(&page.to_string(), *page, selection))
                    }
                    PaginationIndicator::BackButton(page) => {
                        (page_link("‹", *page, selection))
                    }
                    PaginationIndicator::NextButton(page) => {
                        (page_link("›", *page, selection))
                    }
                    PaginationIndicator::Ellipsis => {
                        span class="px-2 py-1" { "…" }
                    }
                }
            }
        }
    )
}
