use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::assertion::{AssertError, value_as_string};
use crate::context::current;
use crate::db::DatabaseGateway;
use crate::{HarnessError, Result};

/// Fixture and cross-check steps against the backing database.
///
/// Every step is a no-op with a warning when the database cannot be reached.
pub struct DatabaseSteps<'g> {
    gateway: &'g DatabaseGateway,
}

impl<'g> DatabaseSteps<'g> {
    pub fn new(gateway: &'g DatabaseGateway) -> Self {
        Self { gateway }
    }

    /// Compare `users.<field>` of row `user_id` with the API value stored in the
    /// context as `api_user_<field>`.
    pub async fn validate_field_against_db(&self, field: &str, user_id: i64) -> Result<()> {
        validate_identifier(field)?;

        if !self.gateway.is_available().await {
            warn!("Database not available, skipping DB validation");
            return Ok(());
        }

        let sql = format!("SELECT {} FROM users WHERE id = $1", field);
        let Some(db_value) = self.gateway.get_single_value(&sql, &[user_id.into()]).await else {
            warn!("No DB record found for user id={}", user_id);
            return Ok(());
        };
        let db_value = value_as_string(&db_value);

        let key = format!("api_user_{}", field);
        let api_value = current::with(|ctx| ctx.display_value(&key));
        info!("DB value: '{}', API value: '{:?}'", db_value, api_value);

        match api_value {
            Some(api_value) if api_value == db_value => Ok(()),
            api_value => Err(AssertError::mismatch(
                format!("DB vs API value of field '{}'", field),
                db_value,
                api_value.unwrap_or_else(|| "nothing".to_string()),
            )
            .into()),
        }
    }

    pub async fn create_test_user(&self, username: &str) -> u64 {
        if !self.gateway.is_available().await {
            warn!("Database not available, skipping test data creation");
            return 0;
        }
        let rows = self
            .gateway
            .execute_update(
                "INSERT INTO users (username, name, email) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
                &[
                    username.into(),
                    "Test User".into(),
                    format!("{}@test.com", username).into(),
                ],
            )
            .await;
        info!("Created {} test data rows for user '{}'", rows, username);
        rows
    }

    pub async fn delete_test_user(&self, username: &str) -> u64 {
        if !self.gateway.is_available().await {
            warn!("Database not available, skipping test data cleanup");
            return 0;
        }
        let rows = self
            .gateway
            .execute_update("DELETE FROM users WHERE username = $1", &[username.into()])
            .await;
        info!("Deleted {} rows for user '{}'", rows, username);
        rows
    }
}

/// Column names are spliced into SQL text, so only plain identifiers are accepted.
fn validate_identifier(name: &str) -> Result<()> {
    static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = IDENTIFIER_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

    if re.is_match(name) {
        Ok(())
    } else {
        Err(HarnessError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("email").is_ok());
        assert!(validate_identifier("first_name").is_ok());
        assert!(validate_identifier("_x1").is_ok());

        for bad in ["", "1abc", "name; DROP TABLE users", "a.b", "email--"] {
            assert!(matches!(
                validate_identifier(bad),
                Err(HarnessError::InvalidIdentifier(_))
            ));
        }
    }
}
