//! The application's route paths.
//!
//! For endpoints that take a parameter, e.g. '/transactions/{transaction_id}/edit',
//! use [format_endpoint].

/// The root route, which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for editing one transaction's amount and category.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";

/// The htmx endpoint returning the dashboard content for the current filters.
pub const DASHBOARD_CONTENT: &str = "/api/dashboard";
/// The route for saving or resetting a transaction override.
pub const OVERRIDE_API: &str = "/api/overrides/{transaction_id}";
/// The route for logging in.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for logging out.
pub const LOG_OUT: &str = "/api/log_out";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace. The path is
/// assumed to contain at most one parameter; without one the original path is
/// returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
