use std::collections::BTreeMap;

use reqwest::header::{HeaderMap as Headers, HeaderName, HeaderValue};

use crate::http::types::{Method, Payload};
use crate::{HarnessError, Result};

/// Basic-auth credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// One outgoing call, relative to a base endpoint.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub endpoint: String,
    pub headers: Headers,
    pub body: Option<Payload>,
    pub query_params: BTreeMap<String, String>,
    pub basic_auth: Option<BasicAuth>,
}

impl Request {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: Headers::new(),
            body: None,
            query_params: BTreeMap::new(),
            basic_auth: None,
        }
    }

    fn insert_header(&mut self, key: &str, value: &str) -> Result<()> {
        let name: HeaderName = key
            .parse()
            .map_err(|_| HarnessError::InvalidHeader(format!("invalid header name '{}'", key)))?;
        let value: HeaderValue = value
            .parse()
            .map_err(|_| HarnessError::InvalidHeader(format!("invalid value for '{}'", key)))?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self> {
        self.insert_header(key, value)?;
        Ok(self)
    }

    pub fn with_headers<'a, I>(mut self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in headers {
            self.insert_header(key, value)?;
        }
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Payload>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query_params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_query_params<'a, I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in params {
            self.query_params.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn with_auth_bearer(mut self, token: &str) -> Result<Self> {
        self.insert_header("Authorization", &format!("Bearer {}", token))?;
        Ok(self)
    }

    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    /// Join the endpoint onto a base URL.
    ///
    /// Absolute endpoints are used verbatim.
    pub fn url(&self, base: &str) -> Result<url::Url> {
        let endpoint = self.endpoint.trim();
        let joined = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.is_empty() {
            base.to_string()
        } else {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            )
        };

        let mut url = url::Url::parse(&joined)?;
        if !self.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query_params);
        }
        Ok(url)
    }
}
