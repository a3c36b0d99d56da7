//! HTTP server configuration object.

use actix_web::cookie::Key;

/// Settings the listener and session middleware need.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) bind_addr: String,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, bind_addr: impl Into<String>) -> Self {
        Self {
            key,
            cookie_secure,
            bind_addr: bind_addr.into(),
        }
    }
}
