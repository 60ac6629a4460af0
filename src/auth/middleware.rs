//! Middleware that validates the session cookie, extends the session, and
//! redirects unauthenticated requests to the log-in page.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, Uri, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, endpoints,
    auth::cookie::{extend_session_if_needed, session_expiry},
};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Reduce a raw redirect target to a safe local path.
///
/// Only same-site paths are accepted: the result always starts with a single
/// "/". Anything else, including protocol-relative "//host" URLs, is
/// rejected. Full URLs (e.g. from the HX-Current-URL header) are reduced to
/// their path and query.
pub(crate) fn normalize_redirect_url(raw: &str) -> Option<String> {
    let uri: Uri = raw.parse().ok()?;
    let path_and_query = uri.path_and_query()?.to_string();

    if path_and_query.starts_with('/') && !path_and_query.starts_with("//") {
        Some(path_and_query)
    } else {
        None
    }
}

/// The log-in URL to send an unauthenticated request to, carrying the
/// original target as a `redirect_url` query parameter when it is safe to do
/// so.
fn log_in_redirect_url(request: &Request) -> String {
    let target = request
        .headers()
        .get("HX-Current-URL")
        .and_then(|value| value.to_str().ok())
        .and_then(normalize_redirect_url)
        .or_else(|| {
            request
                .uri()
                .path_and_query()
                .map(|path_and_query| path_and_query.to_string())
                .and_then(|path_and_query| normalize_redirect_url(&path_and_query))
        });

    match target {
        Some(target) => {
            match serde_urlencoded::to_string([("redirect_url", target.as_str())]) {
                Ok(query) => format!("{}?{}", endpoints::LOG_IN_VIEW, query),
                Err(error) => {
                    tracing::warn!("could not encode redirect query: {error}");
                    endpoints::LOG_IN_VIEW.to_owned()
                }
            }
        }
        None => endpoints::LOG_IN_VIEW.to_owned(),
    }
}

/// Middleware function that checks for a valid session cookie.
///
/// The request is executed normally if the session is valid and the session
/// is extended on the way out, otherwise a redirect to the log-in page is
/// returned using `get_redirect`.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect = log_in_redirect_url(&request);

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect);
        }
    };

    match session_expiry(&jar) {
        Ok(expiry) if expiry > OffsetDateTime::now_utc() => {}
        _ => return get_redirect(&log_in_redirect),
    }

    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_session_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending session: {error:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, value) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, value.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid session cookie.
///
/// The request is executed normally if the session is valid, otherwise a
/// redirect to the log-in page is returned.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function that checks for a valid session cookie.
///
/// The request is executed normally if the session is valid, otherwise an
/// HTMX redirect to the log-in page is returned.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
