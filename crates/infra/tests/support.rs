#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hoyosign_domain::{EndpointsConfig, LoginProgress};
use hoyosign_infra::mihoyo::TransportClient;
use hoyosign_infra::HttpClient;
use serde_json::{json, Value};
use wiremock::{MockServer, ResponseTemplate};

/// Transport pointed at `server` for every host, with fast retries.
pub fn transport(server: &MockServer) -> Arc<TransportClient> {
    let http = HttpClient::builder()
        .timeout(Duration::from_secs(5))
        .max_attempts(2)
        .base_backoff(Duration::from_millis(5))
        .build()
        .expect("http client should build");
    Arc::new(TransportClient::new(http, EndpointsConfig::all(server.uri())))
}

/// `200 OK` with a `retcode == 0` envelope around `data`.
pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "retcode": 0, "message": "OK", "data": data }))
}

/// `200 OK` with an application-level failure envelope.
pub fn app_error(retcode: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({ "retcode": retcode, "message": message, "data": null }))
}

/// Records every progress update of a login.
#[derive(Default, Clone)]
pub struct ProgressLog(Arc<Mutex<Vec<LoginProgress>>>);

impl ProgressLog {
    pub fn record(&self, progress: &LoginProgress) {
        self.0.lock().expect("progress log poisoned").push(progress.clone());
    }

    pub fn snapshot(&self) -> Vec<LoginProgress> {
        self.0.lock().expect("progress log poisoned").clone()
    }
}
