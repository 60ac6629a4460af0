//! The spending category taxonomy.
//!
//! Transaction feeds label each row with a primary category string such as
//! `FOOD_AND_DRINK`. Keying budgets and colors off raw strings makes typos
//! silently create new buckets, so the known labels are modelled as an enum
//! and anything unrecognized falls back to [Category::Other].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A primary spending category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Supermarkets, department stores and other retail.
    GeneralMerchandise,
    /// Restaurants, cafes and groceries bought as food.
    FoodAndDrink,
    /// Fuel, public transport, parking.
    Transportation,
    /// Rent, power, water and internet.
    RentAndUtilities,
    /// Doctors, pharmacies and other health spending.
    Medical,
    /// Haircuts, cleaners and other services.
    GeneralServices,
    /// Mortgage and loan repayments.
    LoanPayments,
    /// Streaming, events and other fun.
    Entertainment,
    /// Transfers to external accounts.
    TransferOut,
    /// Gyms, cosmetics and self-care.
    PersonalCare,
    /// Account and overdraft fees.
    BankFees,
    /// Taxes, fines and donations.
    GovernmentAndNonProfit,
    /// Hardware stores and trades.
    HomeImprovement,
    /// Anything the feed labels with a category this application does not
    /// recognize.
    Other,
}

impl Category {
    /// Every category, in the order they are presented in selection lists.
    pub const ALL: [Category; 14] = [
        Category::GeneralMerchandise,
        Category::FoodAndDrink,
        Category::Transportation,
        Category::RentAndUtilities,
        Category::Medical,
        Category::GeneralServices,
        Category::LoanPayments,
        Category::Entertainment,
        Category::TransferOut,
        Category::PersonalCare,
        Category::BankFees,
        Category::GovernmentAndNonProfit,
        Category::HomeImprovement,
        Category::Other,
    ];

    /// Parse the wire label used by the transaction feed.
    ///
    /// Unrecognized labels map to [Category::Other] rather than an error so
    /// that new upstream categories degrade gracefully.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "GENERAL_MERCHANDISE" => Category::GeneralMerchandise,
            "FOOD_AND_DRINK" => Category::FoodAndDrink,
            "TRANSPORTATION" => Category::Transportation,
            "RENT_AND_UTILITIES" => Category::RentAndUtilities,
            "MEDICAL" => Category::Medical,
            "GENERAL_SERVICES" => Category::GeneralServices,
            "LOAN_PAYMENTS" => Category::LoanPayments,
            "ENTERTAINMENT" => Category::Entertainment,
            "TRANSFER_OUT" => Category::TransferOut,
            "PERSONAL_CARE" => Category::PersonalCare,
            "BANK_FEES" => Category::BankFees,
            "GOVERNMENT_AND_NON_PROFIT" => Category::GovernmentAndNonProfit,
            "HOME_IMPROVEMENT" => Category::HomeImprovement,
            _ => Category::Other,
        }
    }

    /// The wire label written back to the override file.
    pub fn label(&self) -> &'static str {
        match self {
            Category::GeneralMerchandise => "GENERAL_MERCHANDISE",
            Category::FoodAndDrink => "FOOD_AND_DRINK",
            Category::Transportation => "TRANSPORTATION",
            Category::RentAndUtilities => "RENT_AND_UTILITIES",
            Category::Medical => "MEDICAL",
            Category::GeneralServices => "GENERAL_SERVICES",
            Category::LoanPayments => "LOAN_PAYMENTS",
            Category::Entertainment => "ENTERTAINMENT",
            Category::TransferOut => "TRANSFER_OUT",
            Category::PersonalCare => "PERSONAL_CARE",
            Category::BankFees => "BANK_FEES",
            Category::GovernmentAndNonProfit => "GOVERNMENT_AND_NON_PROFIT",
            Category::HomeImprovement => "HOME_IMPROVEMENT",
            Category::Other => "OTHER",
        }
    }

    /// The name shown to the user in tables, envelopes and the treemap.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::GeneralMerchandise => "General merchandise",
            Category::FoodAndDrink => "Food & drink",
            Category::Transportation => "Transportation",
            Category::RentAndUtilities => "Rent & utilities",
            Category::Medical => "Medical",
            Category::GeneralServices => "General services",
            Category::LoanPayments => "Loan payments",
            Category::Entertainment => "Entertainment",
            Category::TransferOut => "Transfers out",
            Category::PersonalCare => "Personal care",
            Category::BankFees => "Bank fees",
            Category::GovernmentAndNonProfit => "Government & non-profit",
            Category::HomeImprovement => "Home improvement",
            Category::Other => "Other",
        }
    }

    /// The chart color assigned to the category.
    pub fn color(&self) -> &'static str {
        match self {
            Category::GeneralMerchandise => "lightblue",
            Category::FoodAndDrink => "orange",
            Category::Transportation => "lightcoral",
            Category::RentAndUtilities => "plum",
            Category::Medical => "hotpink",
            Category::GeneralServices => "lightgreen",
            Category::LoanPayments => "lightblue",
            Category::Entertainment => "gold",
            Category::TransferOut => "pink",
            Category::PersonalCare => "lightpink",
            Category::BankFees => "lightgray",
            Category::GovernmentAndNonProfit => "lightcyan",
            Category::HomeImprovement => "lightsalmon",
            Category::Other => "gray",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Category::from_label(&label))
    }
}

#[cfg(test)]
mod tests {
    use super::Category;

    #[test]
    fn parses_known_labels() {
        assert_eq!(
            Category::from_label("FOOD_AND_DRINK"),
            Category::FoodAndDrink
        );
        assert_eq!(
            Category::from_label("RENT_AND_UTILITIES"),
            Category::RentAndUtilities
        );
    }

    #[test]
    fn unknown_labels_fall_back_to_other() {
        assert_eq!(Category::from_label("CRYPTO_LOSSES"), Category::Other);
        assert_eq!(Category::from_label(""), Category::Other);
    }

    #[test]
    fn labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), category);
        }
    }

    #[test]
    fn every_category_has_a_color() {
        for category in Category::ALL {
            assert!(!category.color().is_empty());
        }
    }

    #[test]
    fn serializes_as_wire_label() {
        let json = serde_json::to_string(&Category::FoodAndDrink).unwrap();
        assert_eq!(json, "\"FOOD_AND_DRINK\"");

        let parsed: Category = serde_json::from_str("\"NOT_A_REAL_LABEL\"").unwrap();
        assert_eq!(parsed, Category::Other);
    }
}
