use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

const SECRET_BYTES: usize = 32;

/// Broker credential bound to one rotation of a namespace. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub rotation_version: i64,
}

impl Credential {
    /// Fresh credential with a password drawn from the thread-local CSPRNG.
    pub fn generate(username: impl Into<String>, rotation_version: i64) -> Self {
        let secret: [u8; SECRET_BYTES] = rand::random();

        Self {
            username: username.into(),
            password: URL_SAFE_NO_PAD.encode(secret),
            rotation_version,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("rotation_version", &self.rotation_version)
            .finish()
    }
}
