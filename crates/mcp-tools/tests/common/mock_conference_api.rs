//! Mock conference database API for testing the tool service

#![allow(dead_code)]

use confhub_common::ConferenceApiConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_PATH: &str = "/database/api/v1/conference";

pub struct MockConferenceApi {
    server: MockServer,
}

impl MockConferenceApi {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> ConferenceApiConfig {
        ConferenceApiConfig {
            base_url: format!("{}{}", self.server.uri(), API_PATH),
            timeout_secs: 5,
        }
    }

    /// Three US conferences for `country=United States&perPage=3&page=1`
    pub async fn setup_us_conferences(&self, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("country", "United States"))
            .and(query_param("perPage", "3"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payload": us_conferences()
            })))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn setup_json(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn setup_status(&self, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn received_query_pairs(&self) -> Vec<Vec<(String, String)>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                request
                    .url
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .collect()
    }
}

pub fn us_conferences() -> Value {
    json!([
        {"title": "International Conference on Machine Learning", "acronym": "ICML", "location": {"country": "United States"}},
        {"title": "Conference on Computer Vision and Pattern Recognition", "acronym": "CVPR", "location": {"country": "United States"}},
        {"title": "USENIX Security Symposium", "acronym": "USENIX Security", "location": {"country": "United States"}}
    ])
}
