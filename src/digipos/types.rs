//! Digipos request parameters and response schemas.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pipeline::SerdeSchema;

/// Query for commands that only identify the account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UsernameParams {
    pub username: String,
}

/// Query for `login`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginParams {
    pub username: String,
    pub password: String,
}

/// Query for `verify_otp`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpParams {
    pub username: String,
    pub otp: String,
}

/// Query for `sim_status`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimStatusParams {
    pub username: String,
    pub to: String,
}

/// Account balance as returned by the `balance` command.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Balance {
    pub ngrs: IndexMap<String, String>,
    pub linkaja: String,
    pub finpay: String,
}

/// Schema applied to `balance` responses.
pub const BALANCE_SCHEMA: SerdeSchema<Balance> = SerdeSchema::new("Balance");
