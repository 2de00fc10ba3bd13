//! Session persistence configuration.

use serde::{Deserialize, Serialize};

fn default_keyring_service() -> String {
    String::from("campus-cli")
}

const fn default_expiry_buffer_secs() -> i64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// OS keychain service name the session is stored under.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// A stored session expiring within this window is refreshed on restore.
    #[serde(default = "default_expiry_buffer_secs")]
    pub expiry_buffer_secs: i64,

    /// Skip the keychain and persist only to `~/.campus/session.json`.
    #[serde(default)]
    pub file_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keyring_service: default_keyring_service(),
            expiry_buffer_secs: default_expiry_buffer_secs(),
            file_only: false,
        }
    }
}
