//! Scenario state for the behavioural suite.
//!
//! The world owns a mock user service and a scratch SQLite database. Request and
//! response state lives in the scenario context of the runner thread, not here.

use std::fmt;

use apicheck::db::{DatabaseGateway, DbSettings};
use apicheck::http::ApiClient;
use apicheck::steps::{ApiSteps, DatabaseSteps};
use cucumber::World;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(World)]
#[world(init = Self::new)]
pub struct ApiWorld {
    server: Option<MockServer>,
    api: Option<ApiSteps>,
    db_dir: TempDir,
    gateway: DatabaseGateway,
}

impl fmt::Debug for ApiWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiWorld")
            .field("server", &self.server.as_ref().map(MockServer::uri))
            .field("db_dir", &self.db_dir.path())
            .finish_non_exhaustive()
    }
}

impl ApiWorld {
    fn new() -> Self {
        let db_dir = TempDir::new().expect("temp dir for the scenario database");
        let url = format!("sqlite://{}?mode=rwc", db_dir.path().join("users.db").display());
        Self {
            server: None,
            api: None,
            gateway: DatabaseGateway::new(DbSettings::new(url)),
            db_dir,
        }
    }

    pub fn api(&self) -> TestResult<&ApiSteps> {
        self.api
            .as_ref()
            .ok_or_else(|| "the user service has not been started".into())
    }

    pub fn db(&self) -> DatabaseSteps<'_> {
        DatabaseSteps::new(&self.gateway)
    }

    pub fn gateway(&self) -> &DatabaseGateway {
        &self.gateway
    }

    /// Point the gateway at a database that cannot be opened.
    pub fn make_database_unreachable(&mut self) {
        let url = format!(
            "sqlite://{}",
            self.db_dir.path().join("missing").join("users.db").display()
        );
        self.gateway = DatabaseGateway::new(DbSettings::new(url));
    }

    pub async fn seed_user(&self, id: i64, username: &str, email: &str) -> TestResult {
        self.gateway
            .execute_update(
                "CREATE TABLE IF NOT EXISTS users \
                 (id INTEGER PRIMARY KEY, username TEXT UNIQUE, name TEXT, email TEXT)",
                &[],
            )
            .await;
        let inserted = self
            .gateway
            .execute_update(
                "INSERT INTO users (id, username, name, email) VALUES ($1, $2, $3, $4)",
                &[id.into(), username.into(), "Leanne Graham".into(), email.into()],
            )
            .await;
        if inserted == 1 {
            Ok(())
        } else {
            Err(format!("could not seed user {}", id).into())
        }
    }

    /// Start the mock user service and build the step library against it.
    pub async fn start_user_service(&mut self) -> TestResult {
        let server = MockServer::start().await;

        let users = json!([
            {"id": 1, "name": "Leanne Graham", "username": "Bret", "email": "Sincere@april.biz"},
            {"id": 2, "name": "Ervin Howell", "username": "Antonette", "email": "Shanna@melissa.tv"}
        ]);
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users[0].clone()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": 42, "name": "Alice"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/42"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 42, "name": "Alice"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .and(query_param("userId", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "userId": 1, "title": "first"},
                {"id": 2, "userId": 1, "title": "second"}
            ])))
            .mount(&server)
            .await;
        for verb in ["PUT", "PATCH"] {
            Mock::given(method(verb))
                .and(path("/posts/1"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"id": 1, "title": "updated", "userId": 1})),
                )
                .mount(&server)
                .await;
        }
        Mock::given(method("DELETE"))
            .and(path("/posts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        self.api = Some(ApiSteps::new(ApiClient::new(Some(server.uri()), None)?));
        self.server = Some(server);
        Ok(())
    }
}
