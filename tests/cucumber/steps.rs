//! Step definitions mapping Gherkin text onto the apicheck step library.

use std::sync::OnceLock;

use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use regex::Regex;

use crate::world::{ApiWorld, TestResult};

// ---------------------------------------------------------------------------
// Given
// ---------------------------------------------------------------------------

#[given("the user service is running")]
async fn given_user_service(world: &mut ApiWorld) -> TestResult {
    world.start_user_service().await
}

#[given(expr = "the database holds user {int} {string} with email {string}")]
async fn given_db_user(world: &mut ApiWorld, id: i64, username: String, email: String) -> TestResult {
    world.seed_user(id, &username, &email).await
}

#[given("the database is unreachable")]
fn given_db_unreachable(world: &mut ApiWorld) {
    world.make_database_unreachable();
}

#[given(expr = "I prepare a GET request to {string}")]
fn prepare_get(world: &mut ApiWorld, endpoint: String) -> TestResult {
    world.api()?.prepare_get(&endpoint);
    Ok(())
}

#[given(expr = "I prepare a GET request to {string} with query params")]
fn prepare_get_with_query(world: &mut ApiWorld, step: &Step, endpoint: String) -> TestResult {
    let table = step.table.as_ref().ok_or("query params need a data table")?;
    // first row is the `key | value` header
    let params = table
        .rows
        .iter()
        .skip(1)
        .filter_map(|row| Some((row.first()?.clone(), row.get(1)?.clone())));
    world.api()?.prepare_get_with_query(&endpoint, params);
    Ok(())
}

#[given(expr = "I prepare a POST request to {string} with body")]
fn prepare_post(world: &mut ApiWorld, step: &Step, endpoint: String) -> TestResult {
    world.api()?.prepare_post(&endpoint, docstring(step)?);
    Ok(())
}

#[given(expr = "I prepare a PUT request to {string} with body")]
fn prepare_put(world: &mut ApiWorld, step: &Step, endpoint: String) -> TestResult {
    world.api()?.prepare_put(&endpoint, docstring(step)?);
    Ok(())
}

#[given(expr = "I prepare a PATCH request to {string} with body")]
fn prepare_patch(world: &mut ApiWorld, step: &Step, endpoint: String) -> TestResult {
    world.api()?.prepare_patch(&endpoint, docstring(step)?);
    Ok(())
}

#[given(expr = "I prepare a DELETE request to {string}")]
fn prepare_delete(world: &mut ApiWorld, endpoint: String) -> TestResult {
    world.api()?.prepare_delete(&endpoint);
    Ok(())
}

#[given(expr = "I create test data in database for user {string}")]
async fn create_test_data(world: &mut ApiWorld, username: String) {
    world.db().create_test_user(&username).await;
}

// ---------------------------------------------------------------------------
// When
// ---------------------------------------------------------------------------

#[when("I send the request")]
async fn send_request(world: &mut ApiWorld) -> TestResult {
    world.api()?.send_request().await?;
    Ok(())
}

#[when(expr = "I extract and store the field {string} as {string}")]
fn extract_and_store(world: &mut ApiWorld, field: String, key: String) -> TestResult {
    world.api()?.extract_and_store(&field, &key)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Then
// ---------------------------------------------------------------------------

#[then(expr = "the response status code should be {int}")]
fn status_code(world: &mut ApiWorld, expected: u16) -> TestResult {
    world.api()?.the_response_status_code_should_be(expected)?;
    Ok(())
}

#[then(expr = "the response field {string} should be {string}")]
fn field_is_string(world: &mut ApiWorld, field: String, expected: String) -> TestResult {
    world.api()?.the_response_field_should_be(&field, &expected)?;
    Ok(())
}

#[then(expr = "the response field {string} should be {int}")]
fn field_is_int(world: &mut ApiWorld, field: String, expected: i64) -> TestResult {
    world.api()?.the_response_field_should_be_int(&field, expected)?;
    Ok(())
}

#[then(expr = "the response field {string} should not be null")]
fn field_not_null(world: &mut ApiWorld, field: String) -> TestResult {
    world.api()?.the_response_field_should_not_be_null(&field)?;
    Ok(())
}

#[then(expr = "the stored value {string} should equal {int}")]
fn stored_value(world: &mut ApiWorld, key: String, expected: i64) -> TestResult {
    world.api()?.the_stored_value_should_equal(&key, expected)?;
    Ok(())
}

#[then(expr = "the response should contain a list of {word}")]
fn contains_list(world: &mut ApiWorld, label: String) -> TestResult {
    world.api()?.the_response_should_contain_a_list_of(&label)?;
    Ok(())
}

#[then(expr = "the list should have at least {int} items")]
fn list_at_least(world: &mut ApiWorld, min: usize) -> TestResult {
    world.api()?.the_list_should_have_at_least_items(min)?;
    Ok(())
}

#[then(regex = r"^each \w+ should have fields (.+)$")]
fn each_has_fields(world: &mut ApiWorld, fields: String) -> TestResult {
    let fields = quoted(&fields);
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    world.api()?.each_item_should_have_fields(&fields)?;
    Ok(())
}

#[then(expr = "all {string} values in the list should be {int}")]
fn all_values(world: &mut ApiWorld, field: String, expected: i64) -> TestResult {
    world.api()?.all_values_in_the_list_should_be(&field, expected)?;
    Ok(())
}

#[then(regex = r#"^the first \w+'s "([^"]*)" should be "([^"]*)"$"#)]
fn first_item_field(world: &mut ApiWorld, field: String, expected: String) -> TestResult {
    world.api()?.the_first_item_field_should_be(&field, &expected)?;
    Ok(())
}

#[then(expr = "the response time should be less than {int} milliseconds")]
fn response_time(world: &mut ApiWorld, max_ms: u64) -> TestResult {
    world.api()?.the_response_time_should_be_less_than(max_ms)?;
    Ok(())
}

#[then(expr = "if database is available, validate field {string} for user id {int} matches API value")]
async fn validate_against_db(world: &mut ApiWorld, field: String, user_id: i64) -> TestResult {
    world.db().validate_field_against_db(&field, user_id).await?;
    Ok(())
}

#[then(expr = "I delete test data from database for user {string}")]
async fn delete_test_data(world: &mut ApiWorld, username: String) {
    world.db().delete_test_user(&username).await;
}

fn docstring(step: &Step) -> TestResult<&str> {
    step.docstring
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| "this step needs a doc string body".into())
}

/// `"id", "name", "email"` -> `["id", "name", "email"]`
fn quoted(list: &str) -> Vec<String> {
    static QUOTED_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = QUOTED_REGEX.get_or_init(|| Regex::new(r#""([^"]*)""#).unwrap());
    re.captures_iter(list).map(|caps| caps[1].to_string()).collect()
}
