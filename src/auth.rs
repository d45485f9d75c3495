use serde::{Deserialize, Serialize};

/// Basic-auth credentials for the Concourse token endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// Token issued by the Concourse auth endpoint (e.g. `{"type": "Bearer", "value": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "type")]
    pub token_type: String,
    pub value: String,
}

impl AuthToken {
    /// Value for the `Authorization` header of subsequent API calls.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.value)
    }
}
