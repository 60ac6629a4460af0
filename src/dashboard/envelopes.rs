//! The budget envelope cards.

use maud::{Markup, html};

use crate::{
    budget::{EnvelopeKind, EnvelopeState, EnvelopeStatus},
    html::format_currency,
};

const BADGE_OVER_STYLE: &str = "text-xs font-semibold px-2.5 py-0.5 rounded-full \
    bg-red-100 text-red-800 dark:bg-red-900 dark:text-red-300";
const BADGE_LOW_STYLE: &str = "text-xs font-semibold px-2.5 py-0.5 rounded-full \
    bg-yellow-100 text-yellow-800 dark:bg-yellow-900 dark:text-yellow-300";
const BADGE_OK_STYLE: &str = "text-xs font-semibold px-2.5 py-0.5 rounded-full \
    bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300";

/// The envelopes section for the evaluated budgets.
pub(super) fn envelopes_view(envelopes: &[EnvelopeStatus], is_owner_view: bool) -> Markup {
    html!(
        section class="rounded bg-white dark:bg-gray-800 p-4 shadow"
        {
            h2 class="text-xl font-semibold mb-3" { "Envelopes" }

            div class="flex flex-col gap-3"
            {
                @for envelope in envelopes {
                    (envelope_card(envelope, is_owner_view))
                }
            }
        }
    )
}

fn envelope_card(status: &EnvelopeStatus, is_owner_view: bool) -> Markup {
    // The per-owner view has a single discretionary envelope, shown as
    // "Extras" rather than "Total".
    let name = if is_owner_view && status.envelope == EnvelopeKind::Total {
        "Extras"
    } else {
        status.envelope.display_name()
    };

    let percent_used = (100.0 - status.percent_left).clamp(0.0, 100.0);
    let bar_color = if status.state == EnvelopeState::OverBudget {
        "red"
    } else {
        status.envelope.color()
    };

    let (badge_text, badge_style) = match status.state {
        EnvelopeState::OverBudget => ("Over budget!".to_owned(), BADGE_OVER_STYLE),
        EnvelopeState::Low => (format!("{percent_used:.1}% used"), BADGE_LOW_STYLE),
        EnvelopeState::Ok => (format!("{percent_used:.1}% used"), BADGE_OK_STYLE),
    };

    html!(
        div
            class="border border-gray-200 dark:border-gray-700 rounded-lg p-3"
            data-envelope=(name)
        {
            div class="flex justify-between items-baseline mb-1"
            {
                div
                {
                    h3 class="font-semibold inline mr-2" { (name) }
                    b class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        (format_currency(status.spent)) " / " (format_currency(status.limit))
                    }
                }

                span class=(badge_style) { (badge_text) }
            }

            div class="w-full h-3 rounded bg-gray-200 dark:bg-gray-700"
            {
                div
                    class="h-3 rounded"
                    style=(format!(
                        "width: {percent_used:.1}%; background-color: {bar_color};"
                    ))
                {}
            }

            p class="text-sm mt-1 text-gray-600 dark:text-gray-400"
            {
                @if status.state == EnvelopeState::OverBudget {
                    (format_currency(status.amount_left.abs())) " over"
                } @else {
                    (format_currency(status.amount_left)) " left"
                }
            }
        }
    )
}
