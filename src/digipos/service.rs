//! Digipos command service.
//!
//! Each command checks credentials, issues one upstream GET and runs the
//! response through the pipeline. Presentation flags are never forwarded.

use serde_json::Value;
use std::fmt;

use crate::config::{DigiposConfig, DigiposEndpoints};
use crate::digipos::auth::CredentialGuard;
use crate::digipos::types::{Balance, BALANCE_SCHEMA};
use crate::error::GatewayResult;
use crate::pipeline::{self, NoSchema, PipelineOutput, Schema};
use crate::upstream::UpstreamClient;

/// Upstream commands exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Login,
    VerifyOtp,
    Balance,
    Profile,
    ListVa,
    Reward,
    Banner,
    Logout,
    SimStatus,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Login => "login",
            Command::VerifyOtp => "verify_otp",
            Command::Balance => "balance",
            Command::Profile => "profile",
            Command::ListVa => "list_va",
            Command::Reward => "reward",
            Command::Banner => "banner",
            Command::Logout => "logout",
            Command::SimStatus => "sim_status",
        }
    }

    /// Upstream path for this command.
    pub fn endpoint<'a>(&self, endpoints: &'a DigiposEndpoints) -> &'a str {
        match self {
            Command::Login => &endpoints.login,
            Command::VerifyOtp => &endpoints.verify_otp,
            Command::Balance => &endpoints.balance,
            Command::Profile => &endpoints.profile,
            Command::ListVa => &endpoints.list_va,
            Command::Reward => &endpoints.reward,
            Command::Banner => &endpoints.banner,
            Command::Logout => &endpoints.logout,
            Command::SimStatus => &endpoints.sim_status,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forwards Digipos commands and normalizes their responses.
pub struct DigiposService {
    upstream: UpstreamClient,
    guard: CredentialGuard,
    endpoints: DigiposEndpoints,
}

impl DigiposService {
    pub fn new(upstream: UpstreamClient, config: &DigiposConfig) -> Self {
        Self {
            upstream,
            guard: CredentialGuard::new(config),
            endpoints: config.endpoints.clone(),
        }
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    async fn execute<S: Schema>(
        &self,
        command: Command,
        params: &[(&str, &str)],
        debug: bool,
        schema: Option<&S>,
    ) -> GatewayResult<PipelineOutput<S::Output>> {
        let response = self
            .upstream
            .get(command.endpoint(&self.endpoints), params)
            .await?;
        Ok(pipeline::process(command.as_str(), &response, debug, schema))
    }

    async fn forward(
        &self,
        command: Command,
        params: &[(&str, &str)],
        debug: bool,
    ) -> GatewayResult<PipelineOutput<Value>> {
        self.execute(command, params, debug, None::<&NoSchema>).await
    }

    pub async fn login(&self, username: &str, password: &str, debug: bool) -> GatewayResult<PipelineOutput<Value>> {
        self.guard.check_login(username, password)?;
        self.forward(
            Command::Login,
            &[("username", username), ("password", password)],
            debug,
        )
        .await
    }

    pub async fn verify_otp(&self, username: &str, otp: &str, debug: bool) -> GatewayResult<PipelineOutput<Value>> {
        self.guard.check_username(username)?;
        self.forward(Command::VerifyOtp, &[("username", username), ("otp", otp)], debug)
            .await
    }

    /// Balance, validated against [`BALANCE_SCHEMA`].
    pub async fn balance(&self, username: &str, debug: bool) -> GatewayResult<PipelineOutput<Balance>> {
        self.guard.check_username(username)?;
        self.execute(
            Command::Balance,
            &[("username", username)],
            debug,
            Some(&BALANCE_SCHEMA),
        )
        .await
    }

    /// Commands that take only the account username.
    pub async fn account(&self, command: Command, username: &str, debug: bool) -> GatewayResult<PipelineOutput<Value>> {
        self.guard.check_username(username)?;
        self.forward(command, &[("username", username)], debug).await
    }

    pub async fn profile(&self, username: &str, debug: bool) -> GatewayResult<PipelineOutput<Value>> {
        self.account(Command::Profile, username, debug).await
    }

    pub async fn list_va(&self, username: &str, debug: bool) -> GatewayResult<PipelineOutput<Value>> {
        self.account(Command::ListVa, username, debug).await
    }

    pub async fn reward(&self, username: &str, debug: bool) -> GatewayResult<PipelineOutput<Value>> {
        self.account(Command::Reward, username, debug).await
    }

    pub async fn banner(&self, username: &str, debug: bool) -> GatewayResult<PipelineOutput<Value>> {
        self.account(Command::Banner, username, debug).await
    }

    pub async fn logout(&self, username: &str, debug: bool) -> GatewayResult<PipelineOutput<Value>> {
        self.account(Command::Logout, username, debug).await
    }

    pub async fn sim_status(&self, username: &str, to: &str, debug: bool) -> GatewayResult<PipelineOutput<Value>> {
        self.guard.check_username(username)?;
        self.forward(Command::SimStatus, &[("username", username), ("to", to)], debug)
            .await
    }
}
