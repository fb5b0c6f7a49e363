use serde::{Deserialize, Serialize};

/// JWT payload asserting a user's identity for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: i64,      // subject user ID
    pub email: String, // subject email at issuance
    pub app_id: i32,   // issuing application
    pub exp: i64,      // expires at (unix timestamp)
}
