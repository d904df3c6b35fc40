//! `reqwest` transport for the HTTP cart gateway.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cart_sync::{GatewayError, HttpTransport};
use http::{Request, Response};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sends gateway requests with a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("cart-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

fn gateway_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(e.to_string())
    } else if e.is_connect() {
        GatewayError::Connection(e.to_string())
    } else if e.is_decode() || e.is_body() {
        GatewayError::Decode(e.to_string())
    } else {
        GatewayError::Request(e.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, GatewayError> {
        let request = reqwest::Request::try_from(request).map_err(gateway_error)?;
        tracing::debug!(method = %request.method(), url = %request.url(), "sending cart request");

        let response = self.client.execute(request).await.map_err(gateway_error)?;
        let mut builder = Response::builder().status(response.status());
        for (name, value) in response.headers() {
            builder = builder.header(name, value);
        }
        let body = response.bytes().await.map_err(gateway_error)?;
        Ok(builder.body(body.to_vec())?)
    }
}
