//! The session gate.
//!
//! The dashboard is protected by a single shared password. A successful
//! log-in stores the session expiry in an encrypted private cookie; the
//! middleware checks and extends it on every protected request.

mod cookie;
mod log_in;
mod log_out;
mod middleware;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub(crate) use log_in::{get_log_in_page, post_log_in};
pub(crate) use log_out::get_log_out;
pub(crate) use middleware::{auth_guard, auth_guard_hx, normalize_redirect_url};

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
