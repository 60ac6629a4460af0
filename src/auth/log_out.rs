//! The log-out endpoint.

use axum::response::Redirect;
use axum_extra::extract::PrivateCookieJar;

use crate::endpoints;

use super::cookie::invalidate_session_cookie;

/// Invalidate the session cookie and send the client back to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    (
        invalidate_session_cookie(jar),
        Redirect::to(endpoints::LOG_IN_VIEW),
    )
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, routing::get};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use sha2::Digest;

    use crate::{auth::COOKIE_SESSION, endpoints};

    use super::get_log_out;

    #[tokio::test]
    async fn log_out_deletes_the_session_cookie() {
        let hash = sha2::Sha512::digest("cookie-secret");
        let key = Key::from(&hash);

        let app = Router::new()
            .route(endpoints::LOG_OUT, get(get_log_out))
            .with_state(key);

        let server = TestServer::new(app);

        let response = server.get(endpoints::LOG_OUT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);
        // The private jar encrypts values, so check the deletion attributes
        // rather than the value itself.
        let cookie = response.cookie(COOKIE_SESSION);
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
