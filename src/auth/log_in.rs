//! The log-in page and endpoint.

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, app_state::password_digest, endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_INPUT_STYLE, FORM_LABEL_STYLE, base},
};

use super::{cookie::set_session_cookie, normalize_redirect_url};

/// How long the session should last if the user selects "remember me".
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The error message shown when the wrong password is entered.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect password.";

/// The state needed to perform a log-in.
#[derive(Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,
    /// The digest of the shared dashboard password.
    pub password_digest: Vec<u8>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            password_digest: state.password_digest.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The query string accepted by the log-in page.
#[derive(Deserialize)]
pub struct RedirectQuery {
    /// Where to send the client after a successful log-in.
    pub redirect_url: Option<String>,
}

/// The form data for a log-in request.
#[derive(Debug, Deserialize)]
pub struct LogInData {
    /// The password to check.
    pub password: String,
    /// Present when the "remember me" checkbox was ticked.
    #[serde(default)]
    pub remember_me: Option<String>,
    /// Where to send the client after a successful log-in.
    #[serde(default)]
    pub redirect_url: Option<String>,
}

fn log_in_form(error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN_API)
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE)
                {
                    "Password"
                }

                input
                    type="password"
                    name="password"
                    id="password"
                    placeholder="••••••••"
                    class=(FORM_INPUT_STYLE)
                    required
                    autofocus;

                @if let Some(error_message) = error_message
                {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }
        }
    }
}

fn log_in_page(error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    let form = log_in_form(error_message, redirect_url);

    let content = html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            h1 class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                "Spendboard"
            }

            div
                class="w-full bg-white rounded-lg shadow dark:border md:mt-0 sm:max-w-md
                    xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h2
                        class="text-xl font-bold leading-tight tracking-tight
                            text-gray-900 md:text-2xl dark:text-white"
                    {
                        "Log in to the dashboard"
                    }

                    (form)
                }
            }
        }
    };

    base("Log In", &[], &content)
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");

    log_in_page(None, redirect_url.as_deref()).into_response()
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in the session cookie is set and the client is
/// redirected to the dashboard page or the requested redirect target.
/// Otherwise the form is returned with an error message.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(log_in_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(log_in_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    if password_digest(&log_in_data.password) != state.password_digest {
        return log_in_page(Some(INVALID_CREDENTIALS_ERROR_MSG), redirect_url).into_response();
    }

    let cookie_duration = if log_in_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let target = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW).to_owned();

    match set_session_cookie(jar, cookie_duration) {
        Ok(updated_jar) => (updated_jar, Redirect::to(&target)).into_response(),
        Err(error) => {
            tracing::error!("Error setting session cookie: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod log_in_tests {
    use axum::{
        Router,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use sha2::Digest;
    use time::Duration;

    use crate::{
        app_state::password_digest,
        auth::COOKIE_SESSION,
        endpoints,
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInState, get_log_in_page, post_log_in,
    };

    const PASSWORD: &str = "a-strong-shared-password";

    fn get_test_server() -> TestServer {
        let hash = sha2::Sha512::digest("cookie-secret");
        let state = LogInState {
            cookie_key: axum_extra::extract::cookie::Key::from(&hash),
            cookie_duration: Duration::minutes(30),
            password_digest: password_digest(PASSWORD),
        };

        let app = Router::new()
            .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn log_in_page_has_a_password_form() {
        let server = get_test_server();

        let response = server.get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        let selector = Selector::parse("input[type='password'][name='password']").unwrap();
        assert!(html.select(&selector).next().is_some());
    }

    #[tokio::test]
    async fn correct_password_sets_the_session_and_redirects() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", PASSWORD)])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
        assert!(!response.cookie(COOKIE_SESSION).value().is_empty());
    }

    #[tokio::test]
    async fn wrong_password_shows_an_error() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", "letmein")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains(INVALID_CREDENTIALS_ERROR_MSG));
    }

    #[tokio::test]
    async fn redirect_url_is_preserved_through_the_form() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[
                ("password", PASSWORD),
                ("redirect_url", "/dashboard?period=2025-07"),
            ])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), "/dashboard?period=2025-07");
    }

    #[tokio::test]
    async fn external_redirect_urls_are_ignored() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", PASSWORD), ("redirect_url", "//evil.example")])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[test]
    fn log_in_form_decodes_without_optional_fields() {
        let form: super::LogInData = serde_html_form::from_str("password=hunter2").unwrap();

        assert_eq!(form.password, "hunter2");
        assert!(form.remember_me.is_none());
        assert!(form.redirect_url.is_none());
    }
}
