use clap::Parser;
use time::{Date, Duration, macros::date};

use spendboard::{Category, CsvTransactionStore, Transaction};

/// Writes a deterministic demo transaction file so the dashboard can be
/// started and explored without real bank data.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Where to write the demo base CSV.
    #[arg(long, default_value = "demo/transactions.csv")]
    output: String,
}

struct MerchantSpec {
    merchant: &'static str,
    account_id: &'static str,
    category: Category,
    category_detailed: &'static str,
    amount: f64,
    every_days: i64,
}

const MERCHANTS: [MerchantSpec; 7] = [
    MerchantSpec {
        merchant: "Property Co",
        account_id: "acc-jay-01",
        category: Category::RentAndUtilities,
        category_detailed: "RENT_AND_UTILITIES_RENT",
        amount: 1800.0,
        every_days: 30,
    },
    MerchantSpec {
        merchant: "Aldi",
        account_id: "acc-jay-01",
        category: Category::GeneralMerchandise,
        category_detailed: "GENERAL_MERCHANDISE_SUPERSTORES",
        amount: 87.35,
        every_days: 4,
    },
    MerchantSpec {
        merchant: "Corner Cafe",
        account_id: "acc-cara-01",
        category: Category::FoodAndDrink,
        category_detailed: "FOOD_AND_DRINK_COFFEE",
        amount: 6.5,
        every_days: 2,
    },
    MerchantSpec {
        merchant: "City Transit",
        account_id: "acc-cara-01",
        category: Category::Transportation,
        category_detailed: "TRANSPORTATION_PUBLIC_TRANSIT",
        amount: 32.0,
        every_days: 7,
    },
    MerchantSpec {
        merchant: "Cinema",
        account_id: "acc-jay-01",
        category: Category::Entertainment,
        category_detailed: "ENTERTAINMENT_MOVIES",
        amount: 24.0,
        every_days: 11,
    },
    MerchantSpec {
        merchant: "Pharmacy",
        account_id: "acc-cara-01",
        category: Category::Medical,
        category_detailed: "MEDICAL_PHARMACY",
        amount: 18.9,
        every_days: 13,
    },
    MerchantSpec {
        merchant: "Payroll",
        account_id: "acc-jay-01",
        category: Category::Other,
        category_detailed: "TRANSFER_IN_PAYROLL",
        amount: -4100.0,
        every_days: 14,
    },
];

fn demo_transactions() -> Vec<Transaction> {
    let start: Date = date!(2025 - 05 - 01);
    let end: Date = date!(2025 - 07 - 31);

    let mut transactions = Vec::new();

    for spec in &MERCHANTS {
        let mut day = start;
        let mut sequence = 0;

        while day <= end {
            let id = format!(
                "demo-{}-{sequence:03}",
                spec.merchant.to_lowercase().replace(' ', "-")
            );
            transactions.push(
                Transaction::build(id, spec.amount, day)
                    .merchant_name(spec.merchant)
                    .name(&spec.merchant.to_uppercase())
                    .account_id(spec.account_id)
                    .category(spec.category)
                    .category_detailed(spec.category_detailed)
                    .finish(),
            );

            day += Duration::days(spec.every_days);
            sequence += 1;
        }
    }

    transactions.sort_by_key(|transaction| transaction.date);
    transactions
}

fn main() {
    let args = Args::parse();

    if let Some(parent) = std::path::Path::new(&args.output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).expect("Could not create the output directory");
        }
    }

    let transactions = demo_transactions();
    let store = CsvTransactionStore::new(&args.output);
    store
        .replace_all(&transactions)
        .expect("Could not write the demo data");

    println!(
        "Wrote {} transactions to {}",
        transactions.len(),
        args.output
    );
}
