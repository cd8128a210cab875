//! Static credential checks for Digipos commands.

use crate::config::DigiposConfig;
use crate::error::{GatewayError, GatewayResult};

/// Compares presented credentials against the configured account.
#[derive(Debug, Clone)]
pub struct CredentialGuard {
    username: String,
    password: String,
}

impl CredentialGuard {
    pub fn new(config: &DigiposConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    pub fn check_username(&self, username: &str) -> GatewayResult<()> {
        if username != self.username {
            return Err(GatewayError::Authentication("username does not match".into()));
        }
        Ok(())
    }

    pub fn check_password(&self, password: &str) -> GatewayResult<()> {
        if password != self.password {
            return Err(GatewayError::Authentication("password does not match".into()));
        }
        Ok(())
    }

    /// Username and password, as required by `login`.
    pub fn check_login(&self, username: &str, password: &str) -> GatewayResult<()> {
        self.check_username(username)?;
        self.check_password(password)
    }
}
