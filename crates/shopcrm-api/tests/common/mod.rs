//! Shared harness for API integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tower::ServiceExt;

use shopcrm_api::{AppState, build_app};
use shopcrm_core::config::AppConfig;
use shopcrm_core::traits::FixedClock;
use shopcrm_core::types::id::CustomerId;
use shopcrm_database::MemoryStore;
use shopcrm_entity::appointment::Appointment;
use shopcrm_entity::customer::Customer;
use shopcrm_notify::RecordingNotifier;
use shopcrm_service::{ReminderPolicy, ReminderScheduler};

/// Test application over the in-memory store and a recording notifier.
pub struct TestApp {
    /// The router under test
    pub router: Router,
    /// Backing store
    pub store: MemoryStore,
    /// Captured outbound messages
    pub notifier: RecordingNotifier,
    /// Clock time the scheduler sees
    pub now: DateTime<Utc>,
}

impl TestApp {
    /// Build an app whose clock is pinned to the moment of construction.
    ///
    /// Manual runs are validated against the wall clock, so the pinned time
    /// has to stay close to it.
    pub fn new() -> Self {
        let now = Utc::now();
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::new();

        let config = AppConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://localhost/shopcrm_test"
            "#,
        )
        .expect("test config");

        let scheduler = ReminderScheduler::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(notifier.clone()),
            Arc::new(FixedClock::new(now)),
            ReminderPolicy::default(),
            Duration::from_secs(5),
            "Test Garage",
        );

        let state = AppState::new(Arc::new(config), Arc::new(scheduler));

        Self {
            router: build_app(state),
            store,
            notifier,
            now,
        }
    }

    /// Seed a customer and an appointment `lead` from the pinned clock.
    pub async fn seed_appointment(&self, lead: chrono::Duration) -> Appointment {
        let customer = Customer {
            id: CustomerId::new(),
            name: "Morgan Lee".to_string(),
            email: Some("morgan@example.com".to_string()),
            phone: Some("+15550177".to_string()),
            created_at: self.now,
        };
        self.store.insert_customer(customer.clone()).await;

        let appointment = Appointment::new(customer.id, self.now + lead);
        self.store.insert_appointment(appointment.clone()).await;
        appointment
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
