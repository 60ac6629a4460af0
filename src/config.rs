//! Static dashboard configuration.
//!
//! Everything here is loaded once at process start, either from the built-in
//! defaults or from a JSON file passed to the server binary. Nothing is
//! mutated at runtime.

use serde::{Deserialize, Serialize};

use crate::{
    budget::{BudgetEntry, EnvelopeKind},
    category::Category,
};

/// How many days the rolling time window looks back.
pub const DEFAULT_ROLLING_WINDOW_DAYS: i64 = 30;

/// An account owner that can be selected in the spender dropdown.
///
/// Accounts are matched by exact account id rather than by substring so that
/// opaque feed identifiers cannot accidentally match the wrong owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// The name shown in the dropdown.
    pub name: String,
    /// The account ids that belong to this owner.
    pub account_ids: Vec<String>,
}

/// The static configuration for one dashboard deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// The owners offered by the spender dropdown, in display order.
    pub owners: Vec<Owner>,
    /// Categories treated as shared essentials. These are excluded from the
    /// per-owner view, which shows only discretionary spending.
    pub essential_categories: Vec<Category>,
    /// The envelope limits shown when every owner is selected.
    pub shared_budgets: Vec<BudgetEntry>,
    /// The discretionary ("Extras") limit applied to the per-owner view.
    pub owner_budget: f64,
    /// How many days the rolling time window looks back.
    pub rolling_window_days: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            owners: Vec::new(),
            essential_categories: vec![
                Category::GeneralMerchandise,
                Category::FoodAndDrink,
                Category::Transportation,
                Category::RentAndUtilities,
                Category::Medical,
            ],
            shared_budgets: vec![
                BudgetEntry {
                    envelope: EnvelopeKind::Total,
                    limit: 2500.0,
                },
                BudgetEntry {
                    envelope: EnvelopeKind::Category(Category::GeneralMerchandise),
                    limit: 600.0,
                },
                BudgetEntry {
                    envelope: EnvelopeKind::Category(Category::FoodAndDrink),
                    limit: 100.0,
                },
                BudgetEntry {
                    envelope: EnvelopeKind::Category(Category::Transportation),
                    limit: 200.0,
                },
            ],
            owner_budget: 100.0,
            rolling_window_days: DEFAULT_ROLLING_WINDOW_DAYS,
        }
    }
}

impl DashboardConfig {
    /// Look up an owner by the name used in the spender dropdown.
    pub fn owner(&self, name: &str) -> Option<&Owner> {
        self.owners.iter().find(|owner| owner.name == name)
    }
}

#[cfg(test)]
mod tests {
    use crate::{budget::EnvelopeKind, category::Category};

    use super::{DashboardConfig, Owner};

    #[test]
    fn default_config_has_total_envelope() {
        let config = DashboardConfig::default();

        assert!(
            config
                .shared_budgets
                .iter()
                .any(|entry| entry.envelope == EnvelopeKind::Total)
        );
        assert!(
            config
                .essential_categories
                .contains(&Category::RentAndUtilities)
        );
    }

    #[test]
    fn owner_lookup_is_exact() {
        let config = DashboardConfig {
            owners: vec![Owner {
                name: "Jay".to_owned(),
                account_ids: vec!["acc-jay-01".to_owned()],
            }],
            ..DashboardConfig::default()
        };

        assert!(config.owner("Jay").is_some());
        assert!(config.owner("Ja").is_none());
        assert!(config.owner("jay").is_none());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = DashboardConfig {
            owners: vec![Owner {
                name: "Cara".to_owned(),
                account_ids: vec!["acc-cara-01".to_owned(), "acc-cara-02".to_owned()],
            }],
            ..DashboardConfig::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: DashboardConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
    }
}
