use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Session key of the one-shot notice shown on the next rendered page.
pub const FLASH_KEY: &str = "flash";
/// Session key holding the id of the logged-in user.
pub const AUTH_USER_ID_KEY: &str = "authenticated_user_id";
/// Session key holding the display name of the logged-in user.
pub const CURRENT_USER_KEY: &str = "current_user";

/// The values stored under one session token.
///
/// Serialized as JSON into the session store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Named values. Opaque to the store.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}
