//! The edit-transaction form page.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    category::Category,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DANGER_STYLE, BUTTON_PRIMARY_STYLE, FORM_INPUT_STYLE, FORM_LABEL_STYLE, LINK_STYLE,
        base,
    },
    transaction::{DATE_FORMAT, Transaction, TransactionId},
};

use super::EditState;

/// Display the form for correcting one transaction's amount and category.
///
/// The form is prefilled with the transaction's effective values, overrides
/// included, exactly as the dashboard shows them.
pub async fn get_edit_transaction_page(
    State(state): State<EditState>,
    Path(transaction_id): Path<String>,
) -> Result<Response, Error> {
    let id = TransactionId::new(transaction_id);

    let mut dataset = state.dataset.lock().map_err(|_| Error::StoreLock)?;
    if let Err(error) = dataset.refresh(state.base_store.as_ref(), &state.override_store) {
        if dataset.rows().is_empty() {
            return Err(error);
        }
        tracing::error!("Could not refresh transaction data, serving the cached view: {error}");
    }

    let transaction = dataset
        .rows()
        .iter()
        .find(|row| row.id == id)
        .cloned()
        .ok_or(Error::NotFound)?;

    Ok(edit_view(&transaction).into_response())
}

fn edit_view(transaction: &Transaction) -> Markup {
    let override_url = format_endpoint(endpoints::OVERRIDE_API, transaction.id.as_str());
    let date = transaction
        .date
        .format(&DATE_FORMAT)
        .unwrap_or_else(|_| transaction.date.to_string());
    let merchant = if transaction.merchant_name.is_empty() {
        transaction.name.as_str()
    } else {
        transaction.merchant_name.as_str()
    };

    let content = html!(
        main class="flex flex-col items-center px-6 py-8 mx-auto max-w-md text-gray-900 dark:text-white"
        {
            div class="w-full bg-white rounded-lg shadow dark:bg-gray-800 p-6 space-y-4"
            {
                h1 class="text-xl font-bold" { "Edit Transaction" }

                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    (merchant) " on " (date) ", account " (transaction.account_id)
                }

                form class="space-y-4"
                {
                    div
                    {
                        label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                        input
                            type="number"
                            step="0.01"
                            name="amount"
                            id="amount"
                            value=(format!("{:.2}", transaction.amount))
                            class=(FORM_INPUT_STYLE);
                    }

                    div
                    {
                        label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                        select name="category" id="category" class=(FORM_INPUT_STYLE)
                        {
                            @for category in Category::ALL {
                                option
                                    value=(category.label())
                                    selected[category == transaction.category]
                                {
                                    (category.display_name())
                                }
                            }
                        }
                    }

                    div class="flex gap-3 items-center"
                    {
                        button
                            type="button"
                            class=(BUTTON_PRIMARY_STYLE)
                            hx-put=(override_url)
                            hx-include="closest form"
                            hx-target-error="#alert-container"
                        {
                            "Save"
                        }

                        button
                            type="button"
                            class=(BUTTON_DANGER_STYLE)
                            hx-delete=(override_url)
                            hx-target-error="#alert-container"
                        {
                            "Reset to Original"
                        }

                        a href=(endpoints::DASHBOARD_VIEW) class=(LINK_STYLE) { "Cancel" }
                    }
                }
            }
        }
    );

    base("Edit Transaction", &[], &content)
}

#[cfg(test)]
mod edit_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error,
        category::Category,
        edit::EditState,
        merge::DatasetCache,
        store::{CsvTransactionStore, OverrideStore, OverrideUpdate},
        transaction::{Transaction, TransactionId},
    };

    use super::get_edit_transaction_page;

    fn test_state(dir: &tempfile::TempDir) -> EditState {
        let base = CsvTransactionStore::new(dir.path().join("transactions.csv"));
        base.replace_all(&[
            Transaction::build("t1", 42.0, date!(2025 - 07 - 01))
                .merchant_name("Cafe Good")
                .account_id("acc-jay-01")
                .category(Category::FoodAndDrink)
                .finish(),
        ])
        .unwrap();

        EditState {
            base_store: Arc::new(base),
            override_store: Arc::new(OverrideStore::new(dir.path().join("overrides.csv"))),
            dataset: Arc::new(Mutex::new(DatasetCache::new())),
        }
    }

    async fn render_page(state: EditState, id: &str) -> Html {
        let response = get_edit_transaction_page(State(state), Path(id.to_owned()))
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        Html::parse_document(&String::from_utf8_lossy(&body))
    }

    #[tokio::test]
    async fn form_is_prefilled_with_the_effective_values() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let html = render_page(state, "t1").await;

        let amount_selector = Selector::parse("input[name='amount']").unwrap();
        let amount = html.select(&amount_selector).next().unwrap();
        assert_eq!(amount.value().attr("value"), Some("42.00"));

        let selected = Selector::parse("option[selected]").unwrap();
        let values: Vec<_> = html
            .select(&selected)
            .filter_map(|option| option.value().attr("value"))
            .collect();
        assert!(values.contains(&"FOOD_AND_DRINK"));
    }

    #[tokio::test]
    async fn form_shows_the_overridden_values_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        state
            .override_store
            .upsert(
                state.base_store.as_ref(),
                &TransactionId::new("t1"),
                OverrideUpdate {
                    new_amount: Some(10.0),
                    new_category: Some(Category::Entertainment),
                },
            )
            .unwrap();

        let html = render_page(state, "t1").await;

        let amount_selector = Selector::parse("input[name='amount']").unwrap();
        let amount = html.select(&amount_selector).next().unwrap();
        assert_eq!(amount.value().attr("value"), Some("10.00"));
    }

    #[tokio::test]
    async fn unknown_transaction_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let result = get_edit_transaction_page(State(state), Path("t9".to_owned())).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}
