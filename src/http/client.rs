use std::collections::HashMap;
use std::time::Instant;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, info};

use crate::config::ConfigStore;
use crate::diagnostics;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::types::{Method, Payload};
use crate::{HarnessError, Result};

/// Which configured service a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Primary,
    Secondary,
}

impl Target {
    fn setting(&self) -> &'static str {
        match self {
            Target::Primary => ApiClient::BASE_URL_KEY,
            Target::Secondary => ApiClient::SECONDARY_BASE_URL_KEY,
        }
    }
}

/// HTTP request engine.
///
/// Every call logs the outgoing request, waits for the full response, logs the status
/// and body, and attaches the pretty-printed body to the scenario's diagnostics.
/// Transport failures are returned as-is: there are no retries and no client timeout.
#[derive(Clone)]
pub struct ApiClient {
    inner: reqwest::Client,
    primary: Option<String>,
    secondary: Option<String>,
}

impl ApiClient {
    pub const BASE_URL_KEY: &'static str = "api.base.url";
    pub const SECONDARY_BASE_URL_KEY: &'static str = "api.secondary.base.url";

    pub fn new(primary: Option<String>, secondary: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            inner: reqwest::Client::builder()
                .default_headers(headers)
                .build()?,
            primary,
            secondary,
        })
    }

    /// Client for the base endpoints named in configuration.
    ///
    /// A missing base URL only fails when a request is built against it.
    pub fn from_config(config: &ConfigStore) -> Result<Self> {
        Self::new(
            config.get(Self::BASE_URL_KEY),
            config.get(Self::SECONDARY_BASE_URL_KEY),
        )
    }

    fn base_url(&self, target: Target) -> Result<&str> {
        let base = match target {
            Target::Primary => self.primary.as_deref(),
            Target::Secondary => self.secondary.as_deref(),
        };
        base.ok_or_else(|| HarnessError::MissingSetting(target.setting().to_string()))
    }

    pub async fn execute(&self, target: Target, request: Request) -> Result<Response> {
        let url = request.url(self.base_url(target)?)?;
        let body = request.body.as_ref().map(Payload::to_body).transpose()?;

        info!(
            method = %request.method,
            endpoint = %request.endpoint,
            params = ?request.query_params,
            body = body.as_deref().unwrap_or(""),
            "Sending request to {}",
            url
        );

        let mut builder = self
            .inner
            .request(request.method.into(), url)
            .headers(request.headers);
        if let Some(auth) = &request.basic_auth {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let start = Instant::now();
        let response = builder.send().await?;
        let status = response.status();
        let status_line = format!("{:?} {}", response.version(), status);
        let headers = response.headers().clone();
        let text = response.text().await?;
        let duration = start.elapsed();

        let response = Response::new(status.as_u16(), status_line, headers, text, duration)?;
        log_response(&response);
        Ok(response)
    }

    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.execute(Target::Primary, Request::new(Method::Get, endpoint))
            .await
    }

    pub async fn get_with_query(
        &self,
        endpoint: &str,
        query: &HashMap<String, String>,
    ) -> Result<Response> {
        let request = Request::new(Method::Get, endpoint).with_query_params(query);
        self.execute(Target::Primary, request).await
    }

    pub async fn get_with_headers(
        &self,
        endpoint: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Response> {
        let request = Request::new(Method::Get, endpoint).with_headers(headers)?;
        self.execute(Target::Primary, request).await
    }

    pub async fn post(&self, endpoint: &str, body: impl Into<Payload>) -> Result<Response> {
        let request = Request::new(Method::Post, endpoint).with_body(body);
        self.execute(Target::Primary, request).await
    }

    /// POST to the secondary external service.
    pub async fn post_secondary(
        &self,
        endpoint: &str,
        body: impl Into<Payload>,
    ) -> Result<Response> {
        let request = Request::new(Method::Post, endpoint).with_body(body);
        self.execute(Target::Secondary, request).await
    }

    pub async fn put(&self, endpoint: &str, body: impl Into<Payload>) -> Result<Response> {
        let request = Request::new(Method::Put, endpoint).with_body(body);
        self.execute(Target::Primary, request).await
    }

    pub async fn patch(&self, endpoint: &str, body: impl Into<Payload>) -> Result<Response> {
        let request = Request::new(Method::Patch, endpoint).with_body(body);
        self.execute(Target::Primary, request).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Response> {
        self.execute(Target::Primary, Request::new(Method::Delete, endpoint))
            .await
    }

    pub async fn post_with_auth(
        &self,
        endpoint: &str,
        body: impl Into<Payload>,
        token: &str,
    ) -> Result<Response> {
        let request = Request::new(Method::Post, endpoint)
            .with_auth_bearer(token)?
            .with_body(body);
        self.execute(Target::Primary, request).await
    }

    pub async fn get_with_basic_auth(
        &self,
        endpoint: &str,
        username: &str,
        password: &str,
    ) -> Result<Response> {
        let request = Request::new(Method::Get, endpoint).with_basic_auth(username, password);
        self.execute(Target::Primary, request).await
    }
}

fn log_response(response: &Response) {
    let pretty = response.pretty_body();
    info!(
        status = response.status_code(),
        time_ms = response.time_ms() as u64,
        "Response status: {}",
        response.status_line
    );
    debug!("Response body: {}", pretty);

    diagnostics::attach("Response Body", "application/json", pretty);
}
