#![allow(dead_code)]
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use evently_backend::{
    config::{Config, PlacesConfig, SmsConfig, SmtpConfig},
    repositories::{InMemoryEventRepository, InMemoryUserRepository},
    routes::build_router,
    services::{
        AuthService, AuthSettings, InMemoryRevocationStore, Place, PlaceSearchQuery,
        PlacesClient, SmsGateway,
    },
    state::AppState,
    utils::{
        email::{EmailDispatcher, Mailer},
        Argon2Hasher, Clock, ManualClock, TokenIssuer,
    },
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        port: 0,
        jwt_secret: "integration-test-secret-0123456789abcdef".into(),
        jwt_expiration_hours: 1,
        reset_token_expiration_hours: 2,
        production_mode: false,
        cors_allow_origins: vec!["http://localhost:8000".into()],
        frontend_url: "http://localhost:8000".into(),
        smtp: SmtpConfig {
            host: "localhost".into(),
            port: 2525,
            username: "".into(),
            password: "".into(),
            from_address: "noreply@evently.local".into(),
            skip_send: true,
        },
        places: PlacesConfig {
            api_url: "http://places.invalid".into(),
            api_key: "".into(),
        },
        sms: SmsConfig {
            api_url: "http://sms.invalid".into(),
            token_auth: "".into(),
            sender_number: "21600000000".into(),
            country_code: "216".into(),
        },
    }
}

/// Captures reset emails instead of delivering them.
pub struct ChannelMailer(mpsc::UnboundedSender<(String, String)>);

impl Mailer for ChannelMailer {
    fn send_password_reset_email(&self, to_email: &str, reset_token: &str) -> anyhow::Result<()> {
        self.0
            .send((to_email.to_string(), reset_token.to_string()))
            .map_err(|e| anyhow::anyhow!("channel closed: {}", e))
    }
}

/// Reports each reset email on the channel, then fails delivery.
pub struct FailingMailer(mpsc::UnboundedSender<(String, String)>);

impl Mailer for FailingMailer {
    fn send_password_reset_email(&self, to_email: &str, reset_token: &str) -> anyhow::Result<()> {
        let _ = self
            .0
            .send((to_email.to_string(), reset_token.to_string()));
        anyhow::bail!("smtp unreachable")
    }
}

#[derive(Default)]
pub struct FakePlaces {
    pub places: Vec<Place>,
    pub fail: bool,
    pub queries: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl PlacesClient for FakePlaces {
    async fn search(&self, query: &PlaceSearchQuery) -> anyhow::Result<Vec<Place>> {
        self.queries
            .lock()
            .unwrap()
            .push((query.query.clone(), query.ll.clone()));
        if self.fail {
            anyhow::bail!("places API unreachable");
        }
        Ok(self.places.clone())
    }
}

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingSms {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsGateway for RecordingSms {
    async fn send(&self, recipient: &str, message: &str) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("gateway rejected request");
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.to_string()));
        Ok(())
    }

    async fn usage(&self) -> anyhow::Result<Value> {
        Ok(json!([{ "offerName": "SMS_OCB", "availableUnits": 120 }]))
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub events: Arc<InMemoryEventRepository>,
    pub clock: ManualClock,
    pub outbox: mpsc::UnboundedReceiver<(String, String)>,
    pub sms: Arc<RecordingSms>,
    pub places: Arc<FakePlaces>,
}

pub fn test_app() -> TestApp {
    test_app_with_places(FakePlaces::default())
}

pub fn test_app_with_places(places: FakePlaces) -> TestApp {
    let (tx, outbox) = mpsc::unbounded_channel();
    build_test_app(places, Arc::new(ChannelMailer(tx)), outbox)
}

/// Every reset email fails to send; attempts still land in `outbox`.
pub fn test_app_with_failing_mailer() -> TestApp {
    let (tx, outbox) = mpsc::unbounded_channel();
    build_test_app(FakePlaces::default(), Arc::new(FailingMailer(tx)), outbox)
}

fn build_test_app(
    places: FakePlaces,
    mailer: Arc<dyn Mailer>,
    outbox: mpsc::UnboundedReceiver<(String, String)>,
) -> TestApp {
    let config = test_config();
    let users = Arc::new(InMemoryUserRepository::new());
    let events = Arc::new(InMemoryEventRepository::new());
    let clock = ManualClock::default();
    let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
    let sms = Arc::new(RecordingSms::default());
    let places = Arc::new(places);

    let auth = AuthService::new(
        users.clone(),
        Arc::new(InMemoryRevocationStore::new()),
        Arc::new(Argon2Hasher),
        TokenIssuer::new(&config.jwt_secret, Arc::clone(&shared_clock)),
        shared_clock,
        EmailDispatcher::new(mailer),
        AuthSettings::from(&config),
    );
    let state = AppState::new(config, auth, events.clone(), places.clone(), sms.clone());

    TestApp {
        router: build_router(state),
        users,
        events,
        clock,
        outbox,
        sms,
        places,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("call router");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/auth/register",
            Some(json!({ "username": username, "email": email, "password": password })),
            None,
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/auth/login",
            Some(json!({ "username": username, "password": password })),
            None,
        )
        .await
    }

    /// Registers and logs in, returning the session token.
    pub async fn signed_in(&self, username: &str) -> String {
        let email = format!("{}@example.com", username);
        let (status, _) = self.register(username, &email, "pw1").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login(username, "pw1").await;
        assert_eq!(status, StatusCode::OK);
        body["accessToken"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    pub async fn create_event(&self, token: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/event/addEvent",
                Some(json!({
                    "name": "Launch Party",
                    "date": "2024-05-01",
                    "time": "18:30:00",
                    "location": "Tunis",
                    "description": "Product launch",
                    "capacity": 50
                })),
                Some(token),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["eventId"].as_str().expect("event id").to_string()
    }
}
