#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};

use social_feed::app_state::AppState;
use social_feed::config::Config;
use social_feed::error::{AppError, AppResult};
use social_feed::infrastructure::{EmailMessage, GoogleIdentity, IdTokenVerifier, Mailer};
use social_feed::services::AuthTokens;

pub const GOOGLE_CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
pub const PASSWORD: &str = "correct horse battery";

/// Keeps every message instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Accepts ID tokens of the form `good:<sub>:<email>`, with an empty email meaning none.
/// `unverified:<sub>:<email>` yields an identity whose email Google has not verified.
#[derive(Default)]
pub struct StubVerifier;

#[async_trait]
impl IdTokenVerifier for StubVerifier {
    async fn verify(&self, id_token: &str, client_id: &str) -> AppResult<GoogleIdentity> {
        assert_eq!(client_id, GOOGLE_CLIENT_ID);
        let parts: Vec<&str> = id_token.split(':').collect();
        match parts.as_slice() {
            [status @ ("good" | "unverified"), sub, email] => Ok(GoogleIdentity {
                sub: sub.to_string(),
                email: (!email.is_empty()).then(|| email.to_string()),
                email_verified: Some(*status == "good"),
                name: None,
                picture: Some(format!("https://example.com/{}.png", sub)),
            }),
            _ => Err(AppError::Upstream("Invalid Google token".to_string())),
        }
    }
}

pub fn test_config(google_enabled: bool) -> Config {
    Config::from_lookup(|key| match key {
        "SECRET_KEY" => Some("integration-test-secret".to_string()),
        "GOOGLE_CLIENT_ID" if google_enabled => Some(GOOGLE_CLIENT_ID.to_string()),
        _ => None,
    })
    .unwrap()
}

pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_app(pool: SqlitePool) -> TestApp {
    test_app_with(pool, true)
}

pub fn test_app_with(pool: SqlitePool, google_enabled: bool) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::with_parts(
        pool,
        test_config(google_enabled),
        mailer.clone(),
        Arc::new(StubVerifier),
    );
    TestApp { state, mailer }
}

pub async fn register(app: &TestApp, username: &str) -> AuthTokens {
    app.state
        .accounts
        .register(username, &format!("{}@example.com", username), PASSWORD)
        .await
        .unwrap()
}
