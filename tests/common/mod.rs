//! Common test fixtures for CCP integration tests.
//!
//! `CcpFixture` starts a wiremock server that answers `GetPassword` requests
//! the way a CCP `AIMWebService` endpoint does. The resolver is blocking, so
//! tests drive it through `blocking`, which runs the call on tokio's blocking
//! pool while the mock server keeps serving on the runtime.

#![allow(dead_code)]

use cyberark_secrets_backend::{CcpConfig, VerifyPolicy};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const APP_ID: &str = "airflow";
pub const SAFE: &str = "DataPlatform";
pub const ACCOUNTS_PATH: &str = "/AIMWebService/api/Accounts";

pub struct CcpFixture {
    pub server: MockServer,
}

impl CcpFixture {
    pub async fn new() -> Self {
        CcpFixture {
            server: MockServer::start().await,
        }
    }

    pub fn ccp_url(&self) -> String {
        format!("{}{}", self.server.uri(), ACCOUNTS_PATH)
    }

    pub fn config(&self) -> CcpConfig {
        CcpConfig::new(APP_ID, &self.ccp_url(), SAFE, Some(VerifyPolicy::Disabled))
    }

    /// Serve `body` with status 200 for `object`.
    pub async fn mount_object(&self, object: &str, body: Value) {
        self.mount_response(object, ResponseTemplate::new(200).set_body_json(body))
            .await;
    }

    /// Serve the CCP's "object not found" error for `object`.
    pub async fn mount_not_found(&self, object: &str) {
        let body = json!({
            "ErrorCode": "APPAP004E",
            "ErrorMsg": format!("Password object matching query [Safe={SAFE};Object={object}] was not found")
        });
        self.mount_response(object, ResponseTemplate::new(404).set_body_json(body))
            .await;
    }

    pub async fn mount_response(&self, object: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(ACCOUNTS_PATH))
            .and(query_param("AppID", APP_ID))
            .and(query_param("Safe", SAFE))
            .and(query_param("Object", object))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Object names requested so far, in order.
    pub async fn requested_objects(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|req| {
                req.url
                    .query_pairs()
                    .find(|(k, _)| k == "Object")
                    .map(|(_, v)| v.into_owned())
            })
            .collect()
    }
}

/// Run a blocking resolver call off the async runtime.
pub async fn blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}
