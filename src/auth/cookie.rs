//! The session cookie.
//!
//! The cookie value is the session's expiry timestamp. The cookie jar is a
//! `PrivateCookieJar`, so the value is encrypted and signed; a client cannot
//! forge or extend a session without the server's key.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::Error;

pub(crate) const COOKIE_SESSION: &str = "session_expiry";

/// How long a session lasts without "remember me".
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Date time format for the session expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
const DATE_TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

/// Add a session cookie to the jar, marking the client as logged in until
/// `duration` from now.
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if the expiry cannot be formatted.
pub(crate) fn set_session_cookie(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry = OffsetDateTime::now_utc() + duration;
    set_session_expiry(jar, expiry)
}

fn set_session_expiry(
    jar: PrivateCookieJar,
    expiry: OffsetDateTime,
) -> Result<PrivateCookieJar, Error> {
    // Use format instead of to_string to avoid errors at midnight when the
    // hour is printed as a single digit when DATE_TIME_FORMAT expects two.
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), format!("{expiry:?}")))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, expiry_string))
            .expires(expiry)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// The expiry recorded in the session cookie.
///
/// # Errors
/// Returns:
/// - [Error::CookieMissing] if there is no session cookie in the jar.
/// - [Error::InvalidDateFormat] if the cookie value cannot be parsed.
pub(crate) fn session_expiry(jar: &PrivateCookieJar) -> Result<OffsetDateTime, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::CookieMissing)?;
    let value = cookie.value_trimmed();

    OffsetDateTime::parse(value, DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), value.to_owned()))
}

/// Extend the session to the later of its current expiry and `duration` from
/// now.
///
/// # Errors
/// The cookie jar is not modified if an error is returned.
pub(crate) fn extend_session_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let current_expiry = session_expiry(&jar)?;
    let new_expiry = OffsetDateTime::now_utc() + duration;

    set_session_expiry(jar, max(current_expiry, new_expiry))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::Error;

    use super::{
        COOKIE_SESSION, DEFAULT_COOKIE_DURATION, extend_session_if_needed,
        invalidate_session_cookie, session_expiry, set_session_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_and_read_back_the_session() {
        let jar = set_session_cookie(get_jar(), DEFAULT_COOKIE_DURATION).unwrap();

        let expiry = session_expiry(&jar).unwrap();

        assert_date_time_close!(expiry, OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION);
    }

    #[test]
    fn missing_cookie_is_an_error() {
        let jar = get_jar();

        assert_eq!(session_expiry(&jar), Err(Error::CookieMissing));
    }

    #[test]
    fn cookie_attributes_are_strict() {
        let jar = set_session_cookie(get_jar(), DEFAULT_COOKIE_DURATION).unwrap();
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.same_site(),
            Some(axum_extra::extract::cookie::SameSite::Strict)
        );
    }

    #[test]
    fn extending_a_fresh_session_does_not_shorten_it() {
        let jar = set_session_cookie(get_jar(), Duration::minutes(30)).unwrap();
        let want = session_expiry(&jar).unwrap();

        // Extending by five seconds should keep the later original expiry.
        let jar = extend_session_if_needed(jar, Duration::seconds(5)).unwrap();

        assert_eq!(session_expiry(&jar).unwrap(), want);
    }

    #[test]
    fn extending_a_nearly_expired_session_pushes_it_out() {
        let jar = set_session_cookie(get_jar(), Duration::seconds(5)).unwrap();

        let jar = extend_session_if_needed(jar, Duration::minutes(30)).unwrap();

        assert_date_time_close!(
            session_expiry(&jar).unwrap(),
            OffsetDateTime::now_utc() + Duration::minutes(30)
        );
    }

    #[test]
    fn invalidated_session_cannot_be_read() {
        let jar = set_session_cookie(get_jar(), DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_session_cookie(jar);
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert!(session_expiry(&jar).is_err());
    }
}
