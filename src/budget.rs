//! Budget ("envelope") evaluation.
//!
//! Maps per-category spending totals against configured limits and classifies
//! each envelope for display. The classification drives presentation only and
//! has no side effects.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::category::Category;

/// The envelopes a budget limit can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    /// The synthetic envelope evaluated against the grand total.
    Total,
    /// An envelope for a single spending category.
    Category(Category),
}

impl EnvelopeKind {
    /// The name shown on the envelope card.
    pub fn display_name(&self) -> &'static str {
        match self {
            EnvelopeKind::Total => "Total",
            EnvelopeKind::Category(category) => category.display_name(),
        }
    }

    /// The chart color for the envelope's progress bar.
    pub fn color(&self) -> &'static str {
        match self {
            EnvelopeKind::Total => "steelblue",
            EnvelopeKind::Category(category) => category.color(),
        }
    }
}

impl Serialize for EnvelopeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EnvelopeKind::Total => serializer.serialize_str("Total"),
            EnvelopeKind::Category(category) => serializer.serialize_str(category.label()),
        }
    }
}

impl<'de> Deserialize<'de> for EnvelopeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        if label == "Total" {
            Ok(EnvelopeKind::Total)
        } else {
            Ok(EnvelopeKind::Category(Category::from_label(&label)))
        }
    }
}

/// A configured spending limit for one envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    /// The envelope the limit applies to.
    pub envelope: EnvelopeKind,
    /// The spending limit for the selected period.
    pub limit: f64,
}

/// How an envelope is doing relative to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    /// More than [LOW_BUDGET_THRESHOLD] percent of the budget is left.
    Ok,
    /// At most [LOW_BUDGET_THRESHOLD] percent of the budget is left.
    Low,
    /// Spending exceeds the limit.
    OverBudget,
}

/// Envelopes with at most this percentage left are classified as low.
pub const LOW_BUDGET_THRESHOLD: f64 = 20.0;

/// The evaluated position of one envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeStatus {
    /// The envelope being evaluated.
    pub envelope: EnvelopeKind,
    /// The configured limit.
    pub limit: f64,
    /// The amount spent in the selected period.
    pub spent: f64,
    /// `limit - spent`. Negative when over budget.
    pub amount_left: f64,
    /// Percentage of the limit still available, clamped to 0..=100.
    /// Zero when the limit itself is zero.
    pub percent_left: f64,
    /// The display classification.
    pub state: EnvelopeState,
}

/// Evaluate one envelope against its limit.
pub fn evaluate_envelope(envelope: EnvelopeKind, limit: f64, spent: f64) -> EnvelopeStatus {
    let amount_left = limit - spent;
    let percent_left = if limit > 0.0 {
        (100.0 * amount_left / limit).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let state = if amount_left < 0.0 {
        EnvelopeState::OverBudget
    } else if percent_left <= LOW_BUDGET_THRESHOLD {
        EnvelopeState::Low
    } else {
        EnvelopeState::Ok
    };

    EnvelopeStatus {
        envelope,
        limit,
        spent,
        amount_left,
        percent_left,
        state,
    }
}

/// Evaluate every configured envelope against the filtered spending totals.
///
/// The Total envelope uses `grand_total`; category envelopes use the matching
/// entry in `category_totals`, defaulting to zero spending when the category
/// has no rows in the selected period.
pub fn evaluate_budgets(
    entries: &[BudgetEntry],
    category_totals: &[(Category, f64)],
    grand_total: f64,
) -> Vec<EnvelopeStatus> {
    entries
        .iter()
        .map(|entry| {
            let spent = match entry.envelope {
                EnvelopeKind::Total => grand_total,
                EnvelopeKind::Category(category) => category_totals
                    .iter()
                    .find(|(candidate, _)| *candidate == category)
                    .map(|(_, total)| *total)
                    .unwrap_or(0.0),
            };

            evaluate_envelope(entry.envelope, entry.limit, spent)
        })
        .collect()
}
