//! Fully materialized upstream response.
//!
//! This is the only shape the response pipeline reads. The body has been
//! read to the end before a value of this type exists.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::time::{Duration, Instant};

/// Upstream response handed to the pipeline.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Request URL as sent, query string included.
    pub url: String,
    pub method: Method,
    pub elapsed: Duration,
}

impl UpstreamResponse {
    /// Read a `reqwest` response to completion.
    pub(crate) async fn read(
        response: reqwest::Response,
        method: Method,
        started: Instant,
    ) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
            url,
            method,
            elapsed: started.elapsed(),
        })
    }
}
