//! Access to the cookies of the request being served.
//!
//! The session token cookie is the only state the browser keeps, all reads
//! and writes of it go through [`CookieStore`].

use time::{Duration, OffsetDateTime};
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::warn;

use crate::LOG_TARGET;

/// Cookie holding the backend's session token
pub const TOKEN_COOKIE: &str = "token";

#[derive(Clone, Debug, Default)]
pub struct CookieOptions {
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age: Option<Duration>,
    pub expires: Option<OffsetDateTime>,
    pub secure: bool,
    /// `None` means http-only
    pub http_only: Option<bool>,
    pub same_site: Option<SameSite>,
}

impl CookieOptions {
    /// Attributes of the session token cookie, expiring with the token.
    pub fn session_token(expires: OffsetDateTime) -> Self {
        Self {
            path: Some("/".into()),
            expires: Some(expires),
            secure: true,
            http_only: Some(true),
            same_site: Some(SameSite::Strict),
            ..Default::default()
        }
    }
}

pub trait CookieStore {
    /// Current value of `key`. An empty value counts as absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Queue `cookie` to be sent back with the response.
    fn put(&self, cookie: Cookie<'static>);

    /// Write `key`. Invalid names or values are logged and dropped.
    fn set(&self, key: &str, value: &str, options: CookieOptions) {
        if !is_valid_cookie_name(key) {
            warn!(target: LOG_TARGET, key, "Refusing to set cookie with invalid name");
            return;
        }
        if !is_valid_cookie_value(value) {
            warn!(target: LOG_TARGET, key, "Refusing to set cookie with invalid value");
            return;
        }

        let mut cookie = Cookie::new(key.to_owned(), value.to_owned());
        if let Some(path) = options.path {
            cookie.set_path(path);
        }
        if let Some(domain) = options.domain {
            cookie.set_domain(domain);
        }
        if let Some(max_age) = options.max_age {
            cookie.set_max_age(max_age);
        }
        if let Some(expires) = options.expires {
            cookie.set_expires(expires);
        }
        if options.secure {
            cookie.set_secure(true);
        }
        cookie.set_http_only(options.http_only.unwrap_or(true));
        if let Some(same_site) = options.same_site {
            cookie.set_same_site(same_site);
        }
        self.put(cookie);
    }

    /// Overwrite `key` with an empty value that expired at the Unix epoch.
    fn delete(&self, key: &str) {
        if !is_valid_cookie_name(key) {
            warn!(target: LOG_TARGET, key, "Refusing to delete cookie with invalid name");
            return;
        }

        let mut cookie = Cookie::new(key.to_owned(), "");
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        self.put(cookie);
    }
}

impl CookieStore for Cookies {
    fn get(&self, key: &str) -> Option<String> {
        Cookies::get(self, key)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn put(&self, cookie: Cookie<'static>) {
        self.add(cookie);
    }
}

/// RFC 6265 `token`
fn is_valid_cookie_name(name: &str) -> bool {
    const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !SEPARATORS.contains(&b))
}

/// RFC 6265 `cookie-octet`s
fn is_valid_cookie_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}
