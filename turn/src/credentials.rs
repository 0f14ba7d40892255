//! TURN credentials, plus the long-term realm/nonce challenge cache.
//!
//! Grounded in `nice_turn_socket_new`'s username/password setup in
//! `original_source/socket/turn.c`: MSN ships its credentials base64
//! encoded, every other dialect takes them as plain bytes.

use crate::Error;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Vec<u8>,
}

impl Credentials {
    pub fn plain(username: impl Into<String>, password: impl Into<Vec<u8>>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// MSN compatibility decodes both the username and password as
    /// base64 before use.
    pub fn msn_base64(username: &str, password: &str) -> Result<Self, Error> {
        let username = base64::decode(username).map_err(|_| Error::InvalidCredentials)?;
        let username = String::from_utf8(username).map_err(|_| Error::InvalidCredentials)?;
        let password = base64::decode(password).map_err(|_| Error::InvalidCredentials)?;
        Ok(Self { username, password })
    }
}

/// Realm/nonce learned from a 401/438 challenge, cached so subsequent
/// requests in the same session don't need to be challenged again.
#[derive(Debug, Clone, Default)]
pub struct Challenge {
    pub realm: Option<String>,
    pub nonce: Option<String>,
}

impl Challenge {
    pub fn update(&mut self, realm: Option<String>, nonce: Option<String>) {
        if realm.is_some() {
            self.realm = realm;
        }
        if nonce.is_some() {
            self.nonce = nonce;
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.realm.is_some() && self.nonce.is_some()
    }
}
