use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::assertion::{self, AssertError, FieldPath};
use crate::config::ConfigStore;
use crate::context::current;
use crate::http::{ApiClient, Method, Response, Target};
use crate::steps::pending::PendingRequest;
use crate::{HarnessError, Result};

/// HTTP steps over the scenario context of the calling thread.
///
/// Prepare steps record a [`PendingRequest`], [`send_request`](Self::send_request) runs
/// it and captures the response, and the remaining steps assert on or extract from that
/// response. The future returned by `send_request` must be polled on the thread that
/// owns the scenario.
#[derive(Clone)]
pub struct ApiSteps {
    client: ApiClient,
}

impl ApiSteps {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ConfigStore) -> Result<Self> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn prepare(&self, pending: PendingRequest) {
        current::set(PendingRequest::KEY, pending);
    }

    pub fn prepare_get(&self, endpoint: &str) {
        self.prepare(PendingRequest::new(Method::Get, endpoint));
    }

    pub fn prepare_get_with_query<I, K, V>(&self, endpoint: &str, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.prepare(PendingRequest::new(Method::Get, endpoint).with_query(params));
    }

    pub fn prepare_post(&self, endpoint: &str, body: &str) {
        self.prepare(PendingRequest::new(Method::Post, endpoint).with_body(body));
    }

    pub fn prepare_put(&self, endpoint: &str, body: &str) {
        self.prepare(PendingRequest::new(Method::Put, endpoint).with_body(body));
    }

    pub fn prepare_patch(&self, endpoint: &str, body: &str) {
        self.prepare(PendingRequest::new(Method::Patch, endpoint).with_body(body));
    }

    pub fn prepare_delete(&self, endpoint: &str) {
        self.prepare(PendingRequest::new(Method::Delete, endpoint));
    }

    /// Send the prepared request to the primary service and capture the response.
    pub async fn send_request(&self) -> Result<()> {
        let request = current::with(|ctx| {
            let ctx = &*ctx;
            ctx.get_ref::<PendingRequest>(PendingRequest::KEY)
                .map(|pending| pending.to_request(ctx))
        })
        .ok_or(HarnessError::NoPendingRequest)?;

        info!("Sending {} request to {}", request.method, request.endpoint);
        let response = self.client.execute(Target::Primary, request).await?;
        current::set_response(response);
        Ok(())
    }

    pub fn the_response_status_code_should_be(&self, expected: u16) -> Result<()> {
        check(|response| assertion::status_code_is(response, expected))
    }

    pub fn the_response_field_should_be(&self, field: &str, expected: &str) -> Result<()> {
        let path: FieldPath = field.parse()?;
        check(|response| assertion::field_string_equals(response, &path, expected))
    }

    pub fn the_response_field_should_be_int(&self, field: &str, expected: i64) -> Result<()> {
        let path: FieldPath = field.parse()?;
        check(|response| assertion::field_equals(response, &path, &Value::from(expected)))
    }

    pub fn the_response_field_should_not_be_null(&self, field: &str) -> Result<()> {
        let path: FieldPath = field.parse()?;
        check(|response| assertion::field_not_null(response, &path).map(|_| ()))
    }

    /// Copy a response field into the scenario context under `key`.
    pub fn extract_and_store(&self, field: &str, key: &str) -> Result<Value> {
        let path: FieldPath = field.parse()?;
        let value = check(|response| assertion::extract(response, &path))?;
        info!("Extracted '{}' = {} and stored as '{}'", field, value, key);
        current::set(key, value.clone());
        Ok(value)
    }

    pub fn the_stored_value_should_equal(&self, key: &str, expected: i64) -> Result<()> {
        let subject = format!("Stored value '{}'", key);
        let expected = Value::from(expected);
        let (stored, present) = current::with(|ctx| (ctx.json_value(key), ctx.contains(key)));
        match stored {
            Some(actual) if assertion::values_equal(&actual, &expected) => Ok(()),
            Some(actual) => Err(AssertError::mismatch(subject, expected, actual).into()),
            None if present => {
                Err(AssertError::mismatch(subject, expected, "a non-scalar value").into())
            }
            None => Err(AssertError::mismatch(subject, expected, "nothing").into()),
        }
    }

    /// The whole body is a non-empty list; `label` names its items in the log.
    pub fn the_response_should_contain_a_list_of(&self, label: &str) -> Result<usize> {
        let len = check(|response| assertion::non_empty_list(response, &FieldPath::root()))?;
        info!("Response contains {} {}", len, label);
        Ok(len)
    }

    pub fn the_list_should_have_at_least_items(&self, min: usize) -> Result<()> {
        check(|response| assertion::list_len_at_least(response, &FieldPath::root(), min))
            .map(|_| ())
    }

    pub fn each_item_should_have_fields(&self, fields: &[&str]) -> Result<()> {
        check(|response| assertion::each_item_has_fields(response, &FieldPath::root(), fields))
    }

    pub fn all_values_in_the_list_should_be(&self, field: &str, expected: i64) -> Result<()> {
        let path: FieldPath = field.parse()?;
        check(|response| assertion::each_value_equals(response, &path, &Value::from(expected)))
    }

    pub fn the_first_item_field_should_be(&self, field: &str, expected: &str) -> Result<()> {
        check(|response| assertion::first_item_field_equals(response, field, expected))
    }

    pub fn the_response_time_should_be_less_than(&self, max_ms: u64) -> Result<()> {
        check(|response| {
            info!(
                "Response time: {}ms (max allowed: {}ms)",
                response.time_ms(),
                max_ms
            );
            assertion::response_time_below(response, Duration::from_millis(max_ms))
        })
    }
}

/// Run an assertion against the captured response.
fn check<R>(f: impl FnOnce(&Response) -> std::result::Result<R, AssertError>) -> Result<R> {
    let outcome = current::with_response(f).ok_or(HarnessError::NoResponse)?;
    Ok(outcome?)
}
