//! Application router configuration with protected and unprotected route
//! definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post, put},
};

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in},
    dashboard::{get_dashboard_content, get_dashboard_page},
    edit::{get_edit_transaction_page, reset_override_endpoint, save_override_endpoint},
    endpoints,
    html::error_view,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out));

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes answer htmx requests, so auth failures use the
    // HX-Redirect header instead of an HTTP redirect.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::DASHBOARD_CONTENT, get(get_dashboard_content))
            .route(
                endpoints::OVERRIDE_API,
                put(save_override_endpoint).delete(reset_override_endpoint),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "There is nothing here.",
            "Check the address, or head back to the dashboard.",
        ),
    )
        .into_response()
}

#[cfg(test)]
mod routing_tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use time::macros::date;

    use crate::{
        AppState, DashboardConfig, PaginationConfig,
        category::Category,
        endpoints,
        store::{CsvTransactionStore, OverrideStore},
        transaction::Transaction,
    };

    use super::build_router;

    fn test_server(dir: &tempfile::TempDir) -> TestServer {
        let base = CsvTransactionStore::new(dir.path().join("transactions.csv"));
        base.replace_all(&[
            Transaction::build("t1", 42.0, date!(2025 - 07 - 01))
                .merchant_name("Cafe Good")
                .account_id("acc-jay-01")
                .category(Category::FoodAndDrink)
                .finish(),
        ])
        .unwrap();

        let state = AppState::new(
            "cookie-secret",
            "dashboard-password",
            "Etc/UTC",
            DashboardConfig::default(),
            PaginationConfig::default(),
            Arc::new(base),
            OverrideStore::new(dir.path().join("overrides.csv")),
        );

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn root_redirects_to_the_dashboard_once_logged_in() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let log_in = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", "dashboard-password")])
            .await;
        let session_cookie = log_in.cookie(crate::auth::COOKIE_SESSION);

        let response = server
            .get(endpoints::ROOT)
            .add_cookie(session_cookie)
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn dashboard_requires_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_see_other();
        assert!(response.header("location").to_str().unwrap().starts_with(endpoints::LOG_IN_VIEW));
    }

    #[tokio::test]
    async fn logging_in_unlocks_the_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let log_in = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", "dashboard-password")])
            .await;
        log_in.assert_status_see_other();
        let session_cookie = log_in.cookie(crate::auth::COOKIE_SESSION);

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(session_cookie)
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Financial Dashboard"));
    }

    #[tokio::test]
    async fn unknown_routes_render_the_404_page() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let response = server.get("/no/such/page").await;

        response.assert_status_not_found();
        assert!(response.text().contains("404"));
    }
}
