use serde::{Deserialize, Serialize};

/// Payload of an access token. All times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user ID
    pub iat: i64,    // issued at
    pub nbf: i64,    // not before
    pub exp: i64,    // expires at
}
