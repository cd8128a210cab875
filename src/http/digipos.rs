//! Digipos command handlers.

use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

use crate::digipos::{Command, LoginParams, OtpParams, SimStatusParams, UsernameParams};
use crate::error::{GatewayError, GatewayResult};
use crate::http::request::request_id;
use crate::http::response::{render, render_error, OutputFlags};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::pipeline::PipelineOutput;

/// Command parameters plus presentation flags from one query string.
///
/// A malformed query is answered in the caller's output mode, falling back
/// to the configured mode when the flags themselves cannot be read.
pub struct CommandQuery<T> {
    pub params: T,
    pub flags: OutputFlags,
}

impl<T> FromRequestParts<AppState> for CommandQuery<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let flags = Query::<OutputFlags>::try_from_uri(&parts.uri);
        let mode = match &flags {
            Ok(Query(flags)) => flags.mode(&state.response),
            Err(_) => state.response.mode,
        };
        let reject = |rejection: QueryRejection| {
            tracing::warn!(
                request_id = request_id(&parts.headers),
                path = parts.uri.path(),
                error = %rejection.body_text(),
                "Rejected command query"
            );
            render_error(
                GatewayError::InvalidRequest(rejection.body_text()),
                mode,
                state.response.legacy.options(),
            )
        };

        let Query(flags) = flags.map_err(&reject)?;
        let Query(params) = Query::<T>::try_from_uri(&parts.uri).map_err(&reject)?;
        Ok(Self { params, flags })
    }
}

fn respond<T: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    command: Command,
    flags: OutputFlags,
    outcome: GatewayResult<PipelineOutput<T>>,
    started: Instant,
) -> Response {
    let mode = flags.mode(&state.response);
    let options = state.response.legacy.options();
    let response = match outcome {
        Ok(output) => render(&output, mode, options),
        Err(err) => {
            tracing::warn!(
                request_id = request_id(headers),
                command = command.as_str(),
                kind = err.kind(),
                error = %err,
                "Command failed"
            );
            render_error(err, mode, options)
        }
    };
    metrics::record_request(command.as_str(), response.status().as_u16(), started);
    response
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    CommandQuery { params, flags }: CommandQuery<LoginParams>,
) -> Response {
    let started = Instant::now();
    let outcome = state
        .service
        .login(&params.username, &params.password, flags.debug(&state.response))
        .await;
    respond(&state, &headers, Command::Login, flags, outcome, started)
}

pub async fn verify_otp(
    State(state): State<AppState>,
    headers: HeaderMap,
    CommandQuery { params, flags }: CommandQuery<OtpParams>,
) -> Response {
    let started = Instant::now();
    let outcome = state
        .service
        .verify_otp(&params.username, &params.otp, flags.debug(&state.response))
        .await;
    respond(&state, &headers, Command::VerifyOtp, flags, outcome, started)
}

pub async fn balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    CommandQuery { params, flags }: CommandQuery<UsernameParams>,
) -> Response {
    let started = Instant::now();
    let outcome = state
        .service
        .balance(&params.username, flags.debug(&state.response))
        .await;
    respond(&state, &headers, Command::Balance, flags, outcome, started)
}

pub async fn sim_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    CommandQuery { params, flags }: CommandQuery<SimStatusParams>,
) -> Response {
    let started = Instant::now();
    let outcome = state
        .service
        .sim_status(&params.username, &params.to, flags.debug(&state.response))
        .await;
    respond(&state, &headers, Command::SimStatus, flags, outcome, started)
}

async fn account(
    command: Command,
    state: AppState,
    headers: HeaderMap,
    params: UsernameParams,
    flags: OutputFlags,
) -> Response {
    let started = Instant::now();
    let outcome = state
        .service
        .account(command, &params.username, flags.debug(&state.response))
        .await;
    respond(&state, &headers, command, flags, outcome, started)
}

pub async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    CommandQuery { params, flags }: CommandQuery<UsernameParams>,
) -> Response {
    account(Command::Profile, state, headers, params, flags).await
}

pub async fn list_va(
    State(state): State<AppState>,
    headers: HeaderMap,
    CommandQuery { params, flags }: CommandQuery<UsernameParams>,
) -> Response {
    account(Command::ListVa, state, headers, params, flags).await
}

pub async fn reward(
    State(state): State<AppState>,
    headers: HeaderMap,
    CommandQuery { params, flags }: CommandQuery<UsernameParams>,
) -> Response {
    account(Command::Reward, state, headers, params, flags).await
}

pub async fn banner(
    State(state): State<AppState>,
    headers: HeaderMap,
    CommandQuery { params, flags }: CommandQuery<UsernameParams>,
) -> Response {
    account(Command::Banner, state, headers, params, flags).await
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    CommandQuery { params, flags }: CommandQuery<UsernameParams>,
) -> Response {
    account(Command::Logout, state, headers, params, flags).await
}
