use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};

use crate::config::AppEnv;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";
/// Cookie carrying the CSRF token.
pub const CSRF_COOKIE: &str = "_csrf";
/// Header the client echoes the CSRF token in.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Attributes shared by every cookie the API sets.
///
/// Production serves a cross-site frontend, so cookies go out `SameSite=None; Secure`.
/// Development runs over plain HTTP with `SameSite=Lax`.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    same_site: SameSite,
    secure: bool,
}

impl CookiePolicy {
    pub fn for_env(app_env: AppEnv) -> Self {
        match app_env {
            AppEnv::Production => Self {
                same_site: SameSite::None,
                secure: true,
            },
            AppEnv::Development => Self {
                same_site: SameSite::Lax,
                secure: false,
            },
        }
    }

    fn build(&self, name: &'static str, value: String, max_age: CookieDuration) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(max_age)
            .finish()
    }

    /// Session cookie whose lifetime matches the token it carries.
    pub fn session_cookie(&self, token: String, ttl: chrono::Duration) -> Cookie<'static> {
        self.build(
            SESSION_COOKIE,
            token,
            CookieDuration::seconds(ttl.num_seconds()),
        )
    }

    /// Expired, empty session cookie: instructs the client to discard its session.
    pub fn cleared_session_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.build(SESSION_COOKIE, String::new(), CookieDuration::ZERO);
        cookie.make_removal();
        cookie
    }

    pub fn csrf_cookie(&self, token: String, ttl: CookieDuration) -> Cookie<'static> {
        self.build(CSRF_COOKIE, token, ttl)
    }
}
