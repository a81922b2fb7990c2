use std::collections::BTreeMap;

use crate::context::{ScenarioContext, substitute};
use crate::http::{Method, Request};

/// The request a scenario has prepared but not yet sent.
///
/// Stored in the scenario context under [`PendingRequest::KEY`]; each prepare step
/// replaces it wholesale, so a scenario never holds more than one.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub method: Method,
    pub endpoint: String,
    pub query: Option<BTreeMap<String, String>>,
    pub body: Option<String>,
}

impl PendingRequest {
    pub const KEY: &'static str = "pending_request";

    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: None,
            body: None,
        }
    }

    pub fn with_query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query = Some(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Build the request, filling `{{key}}` placeholders from `context`.
    pub fn to_request(&self, context: &ScenarioContext) -> Request {
        let mut request = Request::new(self.method, substitute(&self.endpoint, context));
        if let Some(query) = &self.query {
            for (key, value) in query {
                request = request.with_query(key, &substitute(value, context));
            }
        }
        if let Some(body) = &self.body {
            request = request.with_body(substitute(body, context));
        }
        request
    }
}
