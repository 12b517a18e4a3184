#![cfg(feature = "tracing")]
#![allow(clippy::unwrap_used, reason = "Fine for tests")]

use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex};

use futures_order_client::order::{OrderLookup, OrderRequest, Side};
use futures_order_client::{ClientConfig, ExchangeClient, ORDER_PATH, Transport as _};
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use rust_decimal_macros::dec;
use serde_json::json;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt as _};
use tracing_subscriber::{Layer, registry};

const API_KEY: &str = "logging-api-key";
const API_SECRET: &str = "logging-api-secret";

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with("WARN"))
            .collect()
    }
}

struct Fields(String);

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        write!(self.0, "{}={value:?} ", field.name()).unwrap();
    }
}

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields(String::new());
        event.record(&mut fields);
        let line = format!("{} {}", event.metadata().level(), fields.0);
        self.events.lock().unwrap().push(line);
    }
}

#[tokio::test]
async fn requests_and_responses_are_traced_without_secrets() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(ORDER_PATH);
            then.status(400)
                .json_body(json!({ "code": -1013, "msg": "Filter failure" }));
        })
        .await;

    let recorder = Recorder::default();
    let _guard = tracing::subscriber::set_default(registry().with(recorder.clone()));

    let config = ClientConfig::from_raw(&server.base_url(), API_KEY, API_SECRET).unwrap();
    let client = ExchangeClient::new(config).unwrap();
    let order = OrderRequest::market("BTCUSDT", Side::Buy, dec!(0.1));
    client.place_order(&order).await.unwrap_err();

    let events = recorder.events();
    let joined = events.join("\n");

    assert!(
        events
            .iter()
            .any(|e| e.starts_with("DEBUG") && e.contains("sending signed request")),
        "{joined}"
    );
    assert!(joined.contains("signature=%3Credacted%3E"), "{joined}");
    assert!(
        events
            .iter()
            .any(|e| e.contains("received response") && e.contains("status=400")),
        "{joined}"
    );
    assert!(
        events
            .iter()
            .any(|e| e.starts_with("WARN") && e.contains("Filter failure")),
        "{joined}"
    );
    assert!(!joined.contains(API_SECRET), "secret leaked: {joined}");
    assert!(!joined.contains(API_KEY), "api key leaked: {joined}");
}

#[tokio::test]
async fn malformed_success_body_is_warned() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(ORDER_PATH);
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let recorder = Recorder::default();
    let _guard = tracing::subscriber::set_default(registry().with(recorder.clone()));

    let config = ClientConfig::from_raw(&server.base_url(), API_KEY, API_SECRET).unwrap();
    let client = ExchangeClient::new(config).unwrap();
    client
        .query_order("BTCUSDT", &OrderLookup::by_order_id(1))
        .await
        .unwrap_err();

    let warnings = recorder.warnings();
    assert!(
        warnings
            .iter()
            .any(|e| e.contains("request failed") && e.contains("MalformedResponse")),
        "{warnings:?}"
    );
}

#[tokio::test]
async fn unsupported_method_is_warned() {
    let recorder = Recorder::default();
    let _guard = tracing::subscriber::set_default(registry().with(recorder.clone()));

    let config = ClientConfig::from_raw("http://127.0.0.1:9", API_KEY, API_SECRET).unwrap();
    let client = ExchangeClient::new(config).unwrap();
    client
        .transport()
        .send(reqwest::Method::PATCH, ORDER_PATH, &[])
        .await
        .unwrap_err();

    let warnings = recorder.warnings();
    assert!(
        warnings
            .iter()
            .any(|e| e.contains("request failed") && e.contains("UnsupportedMethod")),
        "{warnings:?}"
    );
}

#[tokio::test]
async fn lookup_without_ids_is_warned() {
    let recorder = Recorder::default();
    let _guard = tracing::subscriber::set_default(registry().with(recorder.clone()));

    let config = ClientConfig::from_raw("http://127.0.0.1:9", API_KEY, API_SECRET).unwrap();
    let client = ExchangeClient::new(config).unwrap();
    client
        .query_order("BTCUSDT", &OrderLookup::new(None, None))
        .await
        .unwrap_err();
    client
        .cancel_order("BTCUSDT", &OrderLookup::new(None, None))
        .await
        .unwrap_err();

    let warnings = recorder.warnings();
    assert!(
        warnings.iter().any(|e| e.contains("order query rejected locally")),
        "{warnings:?}"
    );
    assert!(
        warnings.iter().any(|e| e.contains("order cancel rejected locally")),
        "{warnings:?}"
    );
}
