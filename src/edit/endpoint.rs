//! The override mutation endpoints.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::{Deserialize, Deserializer};

use crate::{
    Error, category::Category, endpoints, store::OverrideUpdate, transaction::TransactionId,
};

use super::EditState;

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;

    Ok(value.filter(|value| !value.trim().is_empty()))
}

/// The form data for saving an override.
///
/// Empty fields are treated as "not provided" and leave the base value in
/// place; a field with a value, including an explicit zero amount, is an
/// override.
#[derive(Debug, Deserialize)]
pub struct OverrideForm {
    /// The new amount, as typed.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub amount: Option<String>,
    /// The new category label.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
}

fn redirect_to_dashboard() -> Response {
    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::OK,
    )
        .into_response()
}

/// Save a correction to one transaction's amount and/or category.
pub async fn save_override_endpoint(
    State(state): State<EditState>,
    Path(transaction_id): Path<String>,
    Form(form): Form<OverrideForm>,
) -> Response {
    let new_amount = match &form.amount {
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(amount) => Some(amount),
            Err(_) => return Error::InvalidAmount(raw.clone()).into_alert_response(),
        },
        None => None,
    };
    let new_category = form.category.as_deref().map(Category::from_label);

    let id = TransactionId::new(transaction_id);
    let update = OverrideUpdate {
        new_amount,
        new_category,
    };

    if let Err(error) = state
        .override_store
        .upsert(state.base_store.as_ref(), &id, update)
    {
        tracing::error!("Could not save the override for {id}: {error}");
        return error.into_alert_response();
    }

    state.invalidate_dataset();
    redirect_to_dashboard()
}

/// Remove the correction for one transaction, reverting it to the synced
/// values.
pub async fn reset_override_endpoint(
    State(state): State<EditState>,
    Path(transaction_id): Path<String>,
) -> Response {
    let id = TransactionId::new(transaction_id);

    if let Err(error) = state.override_store.delete(&id) {
        tracing::error!("Could not reset the override for {id}: {error}");
        return error.into_alert_response();
    }

    state.invalidate_dataset();
    redirect_to_dashboard()
}

#[cfg(test)]
mod override_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        category::Category,
        edit::EditState,
        merge::DatasetCache,
        store::{CsvTransactionStore, OverrideStore},
        transaction::Transaction,
    };

    use super::{OverrideForm, reset_override_endpoint, save_override_endpoint};

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

    fn form(amount: Option<&str>, category: Option<&str>) -> Form<OverrideForm> {
        Form(OverrideForm {
            amount: amount.map(str::to_owned),
            category: category.map(str::to_owned),
        })
    }

    #[tokio::test]
    async fn saving_a_category_change_writes_an_override() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response = save_override_endpoint(
            State(state.clone()),
            Path("t1".to_owned()),
            form(None, Some("ENTERTAINMENT")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("hx-redirect").unwrap(), "/dashboard");

        let overrides = state.override_store.read_all().unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].category, Some(Category::Entertainment));
        assert_eq!(overrides[0].amount, None);
    }

    #[tokio::test]
    async fn saving_a_zero_amount_writes_an_override() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response = save_override_endpoint(
            State(state.clone()),
            Path("t1".to_owned()),
            form(Some("0"), None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let overrides = state.override_store.read_all().unwrap();
        assert_eq!(overrides[0].amount, Some(0.0));
    }

    #[tokio::test]
    async fn an_unparsable_amount_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response = save_override_endpoint(
            State(state.clone()),
            Path("t1".to_owned()),
            form(Some("lots"), None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.override_store.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn an_empty_form_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response =
            save_override_endpoint(State(state.clone()), Path("t1".to_owned()), form(None, None))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn an_unknown_transaction_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let response = save_override_endpoint(
            State(state.clone()),
            Path("t9".to_owned()),
            form(Some("1.00"), None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_removes_the_override_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        save_override_endpoint(
            State(state.clone()),
            Path("t1".to_owned()),
            form(Some("10.00"), Some("ENTERTAINMENT")),
        )
        .await;
        assert_eq!(state.override_store.read_all().unwrap().len(), 1);

        let response = reset_override_endpoint(State(state.clone()), Path("t1".to_owned())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.override_store.read_all().unwrap().is_empty());

        // Resetting again is a no-op, not an error.
        let response = reset_override_endpoint(State(state.clone()), Path("t1".to_owned())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn empty_form_fields_decode_as_none() {
        let form: OverrideForm = serde_html_form::from_str("amount=&category=").unwrap();

        assert!(form.amount.is_none());
        assert!(form.category.is_none());

        let form: OverrideForm = serde_html_form::from_str("amount=0&category=").unwrap();
        assert_eq!(form.amount.as_deref(), Some("0"));
    }
}
